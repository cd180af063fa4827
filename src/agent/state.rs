// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interception handler state machine
//!
//! Transitions are pure: every input the handler fetches (flag, domain
//! map) is passed in, and every side effect happens in the terminal
//! states' owner.

use url::Url;

use super::resolve::resolve_target;
use crate::bridge::InterceptedSubmission;
use crate::browser::form::ORIGINAL_ACTION_FIELD;
use crate::store::{DomainMap, DomainMapping};

/// Form the agent is about to build and submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSubmission {
    pub action: String,
    /// Hidden inputs, in order
    pub fields: Vec<(String, String)>,
}

impl PlannedSubmission {
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Why nothing was submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// The action host has no entry
    NoMapping,
    /// `originalAction` did not parse
    MalformedAction(String),
    /// The configured target did not normalize
    InvalidTarget(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerState {
    CheckingDisabled(InterceptedSubmission),
    Resolving(InterceptedSubmission),
    BuildingTarget {
        submission: InterceptedSubmission,
        original: Url,
        mapping: DomainMapping,
    },
    /// Interception off: send the captured fields where they were going
    Replay(PlannedSubmission),
    /// Send the captured fields to the mapped target
    Submit(PlannedSubmission),
    AbortNoMapping {
        host: Option<String>,
        reason: AbortReason,
    },
}

impl HandlerState {
    pub fn start(submission: InterceptedSubmission) -> Self {
        HandlerState::CheckingDisabled(submission)
    }

    pub fn name(&self) -> &'static str {
        match self {
            HandlerState::CheckingDisabled(_) => "checking_disabled",
            HandlerState::Resolving(_) => "resolving",
            HandlerState::BuildingTarget { .. } => "building_target",
            HandlerState::Replay(_) => "replay",
            HandlerState::Submit(_) => "submit",
            HandlerState::AbortNoMapping { .. } => "abort_no_mapping",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            HandlerState::Replay(_) | HandlerState::Submit(_) | HandlerState::AbortNoMapping { .. }
        )
    }

    /// CheckingDisabled -> Replay | Resolving
    pub fn after_disabled_check(self, disabled: bool) -> Self {
        match self {
            HandlerState::CheckingDisabled(submission) if disabled => {
                HandlerState::Replay(PlannedSubmission {
                    fields: owned_fields(&submission),
                    action: submission.original_action,
                })
            }
            HandlerState::CheckingDisabled(submission) => HandlerState::Resolving(submission),
            other => other,
        }
    }

    /// Resolving -> BuildingTarget | AbortNoMapping
    pub fn after_lookup(self, domain_map: &DomainMap) -> Self {
        let submission = match self {
            HandlerState::Resolving(submission) => submission,
            other => return other,
        };

        let original = match Url::parse(&submission.original_action) {
            Ok(url) => url,
            Err(e) => {
                return HandlerState::AbortNoMapping {
                    host: None,
                    reason: AbortReason::MalformedAction(e.to_string()),
                }
            }
        };

        let host = original.host_str().unwrap_or_default().to_string();
        match domain_map.lookup(&host) {
            Some(mapping) => HandlerState::BuildingTarget {
                mapping: mapping.clone(),
                original,
                submission,
            },
            None => HandlerState::AbortNoMapping {
                host: Some(host),
                reason: AbortReason::NoMapping,
            },
        }
    }

    /// BuildingTarget -> Submit | AbortNoMapping
    pub fn build(self) -> Self {
        let (submission, original, mapping) = match self {
            HandlerState::BuildingTarget {
                submission,
                original,
                mapping,
            } => (submission, original, mapping),
            other => return other,
        };

        match resolve_target(&original, &mapping.target) {
            Ok(target) => {
                let mut fields = owned_fields(&submission);
                fields.push((
                    ORIGINAL_ACTION_FIELD.to_string(),
                    submission.original_action,
                ));
                HandlerState::Submit(PlannedSubmission {
                    action: target.to_string(),
                    fields,
                })
            }
            Err(e) => HandlerState::AbortNoMapping {
                host: original.host_str().map(String::from),
                reason: AbortReason::InvalidTarget(e.to_string()),
            },
        }
    }
}

fn owned_fields(submission: &InterceptedSubmission) -> Vec<(String, String)> {
    submission
        .form_data
        .iter()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect()
}
