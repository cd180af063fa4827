// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Form extraction and classification

use url::Url;

use crate::bridge::FieldMap;
use crate::dom::{Document, Element};
use crate::error::{Error, Result};
use crate::http::FORM_URLENCODED;

/// Fields that make a form an authorization response worth intercepting
pub const CALLBACK_FIELDS: [&str; 2] = ["code", "state"];

/// Hidden field carrying the pre-rewrite action on relayed submissions
pub const ORIGINAL_ACTION_FIELD: &str = "original_action";

/// What an OAuth-aware reader makes of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    /// Carries `code` and `state` back to the relying party
    AuthorizationResponse,
    /// Starts an authorization request (`client_id` and friends)
    AuthorizeRequest,
    Other,
}

/// Extracted form data
#[derive(Debug, Clone)]
pub struct Form {
    /// Form ID
    pub id: Option<String>,
    /// Form name
    pub name: Option<String>,
    /// Raw action attribute
    pub action: Option<String>,
    /// HTTP method (GET/POST)
    pub method: String,
    /// Encoding type
    pub enctype: String,
    /// Form fields
    pub fields: Vec<FormField>,
}

/// Form field
#[derive(Debug, Clone)]
pub struct FormField {
    /// Field name
    pub name: Option<String>,
    /// Field type (text, password, hidden, etc.)
    pub field_type: String,
    /// Current value
    pub value: Option<String>,
    /// Whether field is disabled
    pub disabled: bool,
    /// Checkbox and radio state
    pub checked: bool,
}

impl Form {
    /// Create a form from a DOM element
    pub fn from_element(element: &Element) -> Self {
        let fields = element
            .form_controls()
            .into_iter()
            .map(|control| {
                let field_type = control.input_type();
                let value = if field_type == "select" {
                    selected_option_value(&control)
                } else {
                    control.value()
                };
                FormField {
                    name: control.name(),
                    field_type,
                    value,
                    disabled: control.disabled(),
                    checked: control.checked(),
                }
            })
            .collect();

        Self {
            id: element.id(),
            name: element.name(),
            action: element.get_attribute("action"),
            method: element
                .get_attribute("method")
                .unwrap_or_else(|| "GET".to_string())
                .to_uppercase(),
            enctype: element
                .get_attribute("enctype")
                .unwrap_or_else(|| FORM_URLENCODED.to_string()),
            fields,
        }
    }

    /// Name-value pairs a browser would send, in document order
    pub fn data(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter(|f| f.is_successful())
            .filter_map(|f| {
                let name = f.name.clone()?;
                let value = match f.field_type.as_str() {
                    "checkbox" | "radio" => f.value.clone().unwrap_or_else(|| "on".to_string()),
                    _ => f.value.clone().unwrap_or_default(),
                };
                Some((name, value))
            })
            .collect()
    }

    /// Check for a named field
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name.as_deref() == Some(name))
    }

    /// Classify by field names
    pub fn kind(&self) -> FormKind {
        if CALLBACK_FIELDS.iter().all(|n| self.has_field(n)) {
            FormKind::AuthorizationResponse
        } else if self.has_field("client_id")
            && (self.has_field("response_type") || self.has_field("redirect_uri"))
        {
            FormKind::AuthorizeRequest
        } else {
            FormKind::Other
        }
    }

    pub fn is_post(&self) -> bool {
        self.method == "POST"
    }
}

impl FormField {
    /// Whether the field takes part in a native submission
    pub fn is_successful(&self) -> bool {
        if self.disabled || self.name.as_deref().map_or(true, str::is_empty) {
            return false;
        }
        match self.field_type.as_str() {
            "submit" | "button" | "reset" | "image" | "file" => false,
            "checkbox" | "radio" => self.checked,
            _ => true,
        }
    }
}

fn selected_option_value(select: &Element) -> Option<String> {
    let options = select.elements_by_tag("option");
    let chosen = options
        .iter()
        .find(|o| o.has_attribute("selected"))
        .or_else(|| options.first())?;
    Some(
        chosen
            .get_attribute("value")
            .unwrap_or_else(|| chosen.text_content().trim().to_string()),
    )
}

fn resolve_action_value(action: Option<&str>, base_url: Option<&Url>) -> Result<Url> {
    let action = action.map(str::trim).unwrap_or("");

    if action.is_empty() {
        return base_url
            .cloned()
            .ok_or_else(|| Error::form_submission("no document URL to submit to"));
    }

    match base_url {
        Some(base) => Ok(base.join(action)?),
        None => Ok(Url::parse(action)?),
    }
}

/// Resolve a form element's action the way `form.action` reads in a page
pub fn resolve_form_action(form: &Element, base_url: Option<&Url>) -> Result<Url> {
    resolve_action_value(form.get_attribute("action").as_deref(), base_url)
}

/// Whether a form holds both callback inputs
pub fn is_callback_form(form: &Element) -> bool {
    CALLBACK_FIELDS.iter().all(|n| form.has_input_named(n))
}

/// Every `<input>` with a non-empty name, in DOM order
///
/// Duplicate names keep the first position and the last value.
pub fn extract_input_fields(form: &Element) -> FieldMap {
    let mut fields = FieldMap::new();
    for input in form.inputs() {
        let Some(name) = input.name().filter(|n| !n.is_empty()) else {
            continue;
        };
        fields.insert(name, input.get_attribute("value").unwrap_or_default());
    }
    fields
}

/// POST form carrying `code`, `id_token` and `state`
pub fn find_authorization_response_form(document: &Document) -> Option<Element> {
    document.forms().into_iter().find(|form| {
        form.get_attribute("method")
            .map(|m| m.eq_ignore_ascii_case("post"))
            .unwrap_or(false)
            && ["code", "id_token", "state"]
                .iter()
                .all(|n| form.has_input_named(n))
    })
}

/// First form that starts an authorization request
pub fn find_authorize_form(document: &Document) -> Option<Element> {
    document
        .forms()
        .into_iter()
        .find(|form| Form::from_element(form).kind() == FormKind::AuthorizeRequest)
}

/// Strict callback check first, then any form with `code` and `state`
pub fn find_callback_form(document: &Document) -> Option<Element> {
    find_authorization_response_form(document)
        .or_else(|| document.forms().into_iter().find(is_callback_form))
}

/// Build a detached, hidden POST form holding one hidden input per field
pub fn build_hidden_form<'a, I>(document: &Document, action: &str, fields: I) -> Element
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let form = document.create_element("form");
    form.set_attribute("method", "POST");
    form.set_attribute("action", action);
    form.set_attribute("style", "display: none");

    for (name, value) in fields {
        let input = document.create_element("input");
        input.set_attribute("type", "hidden");
        input.set_attribute("name", name);
        input.set_attribute("value", value);
        form.append_child(&input);
    }

    form
}
