// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Document representation

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use url::Url;

use super::element::Element;
use super::node::{Node, NodeData, NodeId, NodeStore};

/// HTML Document representation
#[derive(Debug, Clone)]
pub struct Document {
    /// Document URL
    pub url: Option<Url>,
    title: Arc<RwLock<String>>,
    root_id: NodeId,
    pub(crate) nodes: NodeStore,
    document_element_id: Option<NodeId>,
    head_id: Option<NodeId>,
    body_id: Option<NodeId>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        let root_id = NodeId::new();
        let mut nodes = HashMap::new();
        nodes.insert(root_id, NodeData::document());

        Self {
            url: None,
            title: Arc::new(RwLock::new(String::new())),
            root_id,
            nodes: Arc::new(RwLock::new(nodes)),
            document_element_id: None,
            head_id: None,
            body_id: None,
        }
    }

    /// Create a document with URL
    pub fn with_url(url: Url) -> Self {
        let mut doc = Self::new();
        doc.url = Some(url);
        doc
    }

    /// Get document title
    pub fn title(&self) -> String {
        self.title.read().clone()
    }

    /// Set document title
    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.write() = title.into();
    }

    /// Get the document element (<html>)
    pub fn document_element(&self) -> Option<Element> {
        self.document_element_id
            .and_then(|id| Element::from_id(id, self.nodes.clone()))
    }

    /// Get the <head> element
    pub fn head(&self) -> Option<Element> {
        self.head_id
            .and_then(|id| Element::from_id(id, self.nodes.clone()))
    }

    /// Get the <body> element
    pub fn body(&self) -> Option<Element> {
        self.body_id
            .and_then(|id| Element::from_id(id, self.nodes.clone()))
    }

    pub(crate) fn set_elements(
        &mut self,
        document_element: Option<NodeId>,
        head: Option<NodeId>,
        body: Option<NodeId>,
    ) {
        self.document_element_id = document_element;
        self.head_id = head;
        self.body_id = body;
    }

    /// Get the root node
    pub fn root(&self) -> Node {
        Node::new(self.root_id, self.nodes.clone())
    }

    /// All elements with the given tag, in document order
    pub fn elements_by_tag(&self, tag: &str) -> Vec<Element> {
        self.root()
            .descendants_by_tag(tag)
            .into_iter()
            .filter_map(|id| Element::from_id(id, self.nodes.clone()))
            .collect()
    }

    /// Get element by ID attribute
    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        let candidates: Vec<NodeId> = self
            .nodes
            .read()
            .iter()
            .filter(|(_, data)| data.attributes.get("id").map(String::as_str) == Some(id))
            .map(|(node_id, _)| *node_id)
            .collect();

        candidates
            .into_iter()
            .find(|node_id| self.contains(*node_id))
            .and_then(|node_id| Element::from_id(node_id, self.nodes.clone()))
    }

    /// Check whether a node is attached to this document's tree
    pub fn contains(&self, node_id: NodeId) -> bool {
        Node::new(node_id, self.nodes.clone()).is_descendant_of(self.root_id)
    }

    /// Create a new, detached element
    pub fn create_element(&self, tag: &str) -> Element {
        let id = NodeId::new();
        self.nodes.write().insert(id, NodeData::element(tag));
        Element {
            node: Node::new(id, self.nodes.clone()),
        }
    }

    /// Get all forms
    pub fn forms(&self) -> Vec<Element> {
        self.elements_by_tag("form")
    }

    /// Get the document's HTML
    pub fn outer_html(&self) -> String {
        self.root().outer_html()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_document_creation() {
        let doc = Document::new();
        assert!(doc.url.is_none());
        assert!(doc.title().is_empty());
        assert!(doc.document_element().is_none());
    }

    #[test]
    fn test_create_element_is_detached() {
        let doc = parse_html("<html><body></body></html>").unwrap();
        let form = doc.create_element("FORM");
        assert_eq!(form.tag_name(), "FORM");
        assert!(!doc.contains(form.node.id));

        doc.body().unwrap().append_child(&form);
        assert!(doc.contains(form.node.id));
        assert_eq!(doc.forms().len(), 1);
    }

    #[test]
    fn test_get_element_by_id() {
        let doc = parse_html("<html><body><div id='test'>Hello</div></body></html>").unwrap();
        let elem = doc.get_element_by_id("test");
        assert_eq!(elem.unwrap().text_content(), "Hello");
        assert!(doc.get_element_by_id("missing").is_none());

        // Detached relay forms share the node store but are not in the tree
        let ghost = doc.create_element("form");
        ghost.set_attribute("id", "ghost");
        assert!(doc.get_element_by_id("ghost").is_none());
        doc.body().unwrap().append_child(&ghost);
        assert!(doc.get_element_by_id("ghost").is_some());
    }
}
