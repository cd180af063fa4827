// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Redirect target resolution

use url::Url;

use crate::error::{Error, Result};

/// Whether a schemeless target should default to plain HTTP
pub fn is_local_target(target: &str) -> bool {
    target.contains("localhost") || target.ends_with(".test") || target.ends_with(".local")
}

fn has_http_scheme(target: &str) -> bool {
    let lower = target.get(..8).unwrap_or(target).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Turn a configured target into an absolute URL
///
/// Only a leading `http://` or `https://` (any case) counts as a scheme;
/// anything else is treated as a bare host. Bare hosts get `http://` when
/// they contain `localhost` or end in `.test` or `.local`, `https://`
/// otherwise.
pub fn normalize_target(target: &str) -> Result<Url> {
    let target = target.trim();
    if target.is_empty() {
        return Err(Error::invalid_target(target, "empty target"));
    }

    let absolute = if has_http_scheme(target) {
        target.to_string()
    } else if is_local_target(target) {
        format!("http://{}", target)
    } else {
        format!("https://{}", target)
    };

    let url = Url::parse(&absolute).map_err(|e| Error::invalid_target(target, e.to_string()))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::invalid_target(target, "no host"));
    }
    Ok(url)
}

/// Rewrite `original` onto the configured `target`
///
/// A bare target inherits the original path; query parameters of the
/// original are appended after any the target already carries.
pub fn resolve_target(original: &Url, target: &str) -> Result<Url> {
    let mut resolved = normalize_target(target)?;

    if resolved.path() == "/" && !target.trim().ends_with('/') {
        resolved.set_path(original.path());
    }

    let extra: Vec<(String, String)> = original.query_pairs().into_owned().collect();
    if !extra.is_empty() {
        resolved.query_pairs_mut().extend_pairs(extra);
    }

    Ok(resolved)
}
