// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Element-specific DOM operations

use super::node::{Node, NodeId, NodeStore, NodeType};

/// Element node with extended operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Inner node reference
    pub node: Node,
}

impl Element {
    /// Create a new element from a node
    pub fn new(node: Node) -> Option<Self> {
        if node.node_type() == NodeType::Element {
            Some(Self { node })
        } else {
            None
        }
    }

    pub(crate) fn from_id(id: NodeId, nodes: NodeStore) -> Option<Self> {
        Self::new(Node::new(id, nodes))
    }

    /// Get the tag name (uppercase, like browsers)
    pub fn tag_name(&self) -> String {
        self.local_name().to_uppercase()
    }

    /// Get local name (lowercase)
    pub fn local_name(&self) -> String {
        self.node.local_name().unwrap_or_default()
    }

    /// Get element ID
    pub fn id(&self) -> Option<String> {
        self.node.get_attribute("id")
    }

    /// Get the `name` attribute
    pub fn name(&self) -> Option<String> {
        self.node.get_attribute("name")
    }

    /// Get child elements (only element nodes)
    pub fn children(&self) -> Vec<Element> {
        self.node
            .children()
            .into_iter()
            .filter_map(Element::new)
            .collect()
    }

    /// Descendant elements with the given tag, in document order
    pub fn elements_by_tag(&self, tag: &str) -> Vec<Element> {
        self.node
            .descendants_by_tag(tag)
            .into_iter()
            .filter_map(|id| Element::from_id(id, self.node.store().clone()))
            .collect()
    }

    /// Descendant `input`, `select` and `textarea` elements, in document order
    pub fn form_controls(&self) -> Vec<Element> {
        self.node
            .descendants_by_tags(&["input", "select", "textarea"])
            .into_iter()
            .filter_map(|id| Element::from_id(id, self.node.store().clone()))
            .collect()
    }

    /// All `<input>` descendants, in document order
    pub fn inputs(&self) -> Vec<Element> {
        self.elements_by_tag("input")
    }

    /// First `<input>` descendant whose name equals `name`
    pub fn input_named(&self, name: &str) -> Option<Element> {
        self.inputs()
            .into_iter()
            .find(|input| input.name().as_deref() == Some(name))
    }

    /// Check whether the element holds an `<input>` with this name
    pub fn has_input_named(&self, name: &str) -> bool {
        self.input_named(name).is_some()
    }

    /// Get value for form elements
    pub fn value(&self) -> Option<String> {
        match self.local_name().as_str() {
            "input" | "select" => self.get_attribute("value"),
            "textarea" => Some(
                self.get_attribute("value")
                    .unwrap_or_else(|| self.text_content()),
            ),
            _ => None,
        }
    }

    /// Set value for form elements
    pub fn set_value(&self, value: impl Into<String>) {
        match self.local_name().as_str() {
            "input" | "select" | "textarea" => self.set_attribute("value", value),
            _ => {}
        }
    }

    /// Lowercased `type` attribute, defaulting like browsers do
    pub fn input_type(&self) -> String {
        self.get_attribute("type")
            .map(|t| t.to_lowercase())
            .unwrap_or_else(|| match self.local_name().as_str() {
                "textarea" => "textarea".to_string(),
                "select" => "select".to_string(),
                _ => "text".to_string(),
            })
    }

    /// Check if checkbox/radio is checked
    pub fn checked(&self) -> bool {
        self.has_attribute("checked")
    }

    /// Check if element is disabled
    pub fn disabled(&self) -> bool {
        self.has_attribute("disabled")
    }
}

impl std::ops::Deref for Element {
    type Target = Node;

    fn deref(&self) -> &Self::Target {
        &self.node
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::parse_html;

    #[test]
    fn test_inputs_in_document_order() {
        let doc = parse_html(
            r#"<form><input name="code" value="c1"><div><input name="state" value="s1"></div></form>"#,
        )
        .unwrap();
        let form = doc.forms().into_iter().next().unwrap();
        let names: Vec<_> = form.inputs().iter().filter_map(|i| i.name()).collect();
        assert_eq!(names, vec!["code", "state"]);
        assert!(form.has_input_named("state"));
        assert!(!form.has_input_named("id_token"));
    }
}
