// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! DOM Node types

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Shared node storage for one document
pub(crate) type NodeStore = Arc<RwLock<HashMap<NodeId, NodeData>>>;

/// Unique node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a new unique node ID
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Document node
    Document,
    /// Element node
    Element,
    /// Text node
    Text,
    /// Comment node
    Comment,
    /// Document type node (<!DOCTYPE>)
    DocumentType,
}

/// Internal node data
#[derive(Debug)]
pub struct NodeData {
    pub node_type: NodeType,
    /// Lowercase tag name (elements only)
    pub tag_name: Option<String>,
    /// Text for text/comment nodes
    pub text_content: Option<String>,
    pub attributes: HashMap<String, String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl NodeData {
    fn with_type(node_type: NodeType) -> Self {
        Self {
            node_type,
            tag_name: None,
            text_content: None,
            attributes: HashMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create a new element node data
    pub fn element(tag_name: impl Into<String>) -> Self {
        let mut data = Self::with_type(NodeType::Element);
        data.tag_name = Some(tag_name.into().to_lowercase());
        data
    }

    /// Create a new text node data
    pub fn text(content: impl Into<String>) -> Self {
        let mut data = Self::with_type(NodeType::Text);
        data.text_content = Some(content.into());
        data
    }

    /// Create a new comment node data
    pub fn comment(content: impl Into<String>) -> Self {
        let mut data = Self::with_type(NodeType::Comment);
        data.text_content = Some(content.into());
        data
    }

    /// Create a doctype node data
    pub fn doctype() -> Self {
        Self::with_type(NodeType::DocumentType)
    }

    /// Create a new document node data
    pub fn document() -> Self {
        Self::with_type(NodeType::Document)
    }
}

/// A reference to a node in the DOM tree
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    nodes: NodeStore,
}

impl Node {
    pub(crate) fn new(id: NodeId, nodes: NodeStore) -> Self {
        Self { id, nodes }
    }

    pub(crate) fn store(&self) -> &NodeStore {
        &self.nodes
    }

    /// Get the node type
    pub fn node_type(&self) -> NodeType {
        self.nodes
            .read()
            .get(&self.id)
            .map(|n| n.node_type)
            .unwrap_or(NodeType::Element)
    }

    /// Get the tag name in lowercase
    pub fn local_name(&self) -> Option<String> {
        self.nodes
            .read()
            .get(&self.id)
            .and_then(|n| n.tag_name.clone())
    }

    /// Check whether this is an element with the given tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.nodes
            .read()
            .get(&self.id)
            .and_then(|n| n.tag_name.as_deref().map(|t| t.eq_ignore_ascii_case(tag)))
            .unwrap_or(false)
    }

    /// Get text content
    pub fn text_content(&self) -> String {
        let nodes = self.nodes.read();
        collect_text(&nodes, self.id)
    }

    /// Get an attribute value
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.nodes
            .read()
            .get(&self.id)
            .and_then(|n| n.attributes.get(&name.to_lowercase()).cloned())
    }

    /// Set an attribute value
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        if let Some(node) = self.nodes.write().get_mut(&self.id) {
            node.attributes.insert(name.into().to_lowercase(), value.into());
        }
    }

    /// Remove an attribute
    pub fn remove_attribute(&self, name: &str) {
        if let Some(node) = self.nodes.write().get_mut(&self.id) {
            node.attributes.remove(&name.to_lowercase());
        }
    }

    /// Check if has an attribute
    pub fn has_attribute(&self, name: &str) -> bool {
        self.nodes
            .read()
            .get(&self.id)
            .map(|n| n.attributes.contains_key(&name.to_lowercase()))
            .unwrap_or(false)
    }

    /// Get child nodes
    pub fn children(&self) -> Vec<Node> {
        self.nodes
            .read()
            .get(&self.id)
            .map(|n| {
                n.children
                    .iter()
                    .map(|&id| Node::new(id, self.nodes.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check whether the node is attached under `ancestor`
    pub fn is_descendant_of(&self, ancestor: NodeId) -> bool {
        let nodes = self.nodes.read();
        let mut current = nodes.get(&self.id).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// Append a child node, detaching it from any previous parent
    pub fn append_child(&self, child: &Node) {
        let mut nodes = self.nodes.write();

        let old_parent = nodes.get(&child.id).and_then(|d| d.parent);
        if let Some(old_pid) = old_parent {
            if let Some(old) = nodes.get_mut(&old_pid) {
                old.children.retain(|&id| id != child.id);
            }
        }

        if let Some(child_data) = nodes.get_mut(&child.id) {
            child_data.parent = Some(self.id);
        }
        if let Some(parent_data) = nodes.get_mut(&self.id) {
            parent_data.children.push(child.id);
        }
    }

    /// Collect element descendants with the given tag, in document order
    pub fn descendants_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants_by_tags(&[tag])
    }

    /// Collect element descendants matching any of `tags`, in document order
    pub fn descendants_by_tags(&self, tags: &[&str]) -> Vec<NodeId> {
        let nodes = self.nodes.read();
        let mut out = Vec::new();
        walk(&nodes, self.id, &mut |id, data| {
            if let Some(tag) = data.tag_name.as_deref() {
                if tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                    out.push(id);
                }
            }
        });
        out
    }

    /// Get outer HTML
    pub fn outer_html(&self) -> String {
        let nodes = self.nodes.read();
        serialize(&nodes, self.id)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

/// Depth-first walk over the descendants of `root`, excluding `root` itself
fn walk<F>(nodes: &HashMap<NodeId, NodeData>, root: NodeId, visit: &mut F)
where
    F: FnMut(NodeId, &NodeData),
{
    if let Some(data) = nodes.get(&root) {
        for &child in &data.children {
            if let Some(child_data) = nodes.get(&child) {
                visit(child, child_data);
            }
            walk(nodes, child, visit);
        }
    }
}

fn collect_text(nodes: &HashMap<NodeId, NodeData>, node_id: NodeId) -> String {
    match nodes.get(&node_id) {
        Some(node) => match node.node_type {
            NodeType::Text => node.text_content.clone().unwrap_or_default(),
            NodeType::Element | NodeType::Document => node
                .children
                .iter()
                .map(|&child| collect_text(nodes, child))
                .collect(),
            _ => String::new(),
        },
        None => String::new(),
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

fn serialize(nodes: &HashMap<NodeId, NodeData>, node_id: NodeId) -> String {
    let Some(node) = nodes.get(&node_id) else {
        return String::new();
    };

    match node.node_type {
        NodeType::Text => html_escape(node.text_content.as_deref().unwrap_or("")),
        NodeType::Comment => format!("<!--{}-->", node.text_content.as_deref().unwrap_or("")),
        NodeType::DocumentType => "<!DOCTYPE html>".to_string(),
        NodeType::Document => node
            .children
            .iter()
            .map(|&id| serialize(nodes, id))
            .collect(),
        NodeType::Element => {
            let tag = node.tag_name.as_deref().unwrap_or("div");

            // Sorted so serialized output is stable across runs
            let mut attrs: Vec<_> = node.attributes.iter().collect();
            attrs.sort();
            let attrs: String = attrs
                .into_iter()
                .map(|(k, v)| format!(" {}=\"{}\"", k, html_escape(v)))
                .collect();

            if VOID_ELEMENTS.contains(&tag) {
                format!("<{}{}>", tag, attrs)
            } else {
                let children: String = node
                    .children
                    .iter()
                    .map(|&id| serialize(nodes, id))
                    .collect();
                format!("<{}{}>{}</{}>", tag, attrs, children, tag)
            }
        }
    }
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(data: Vec<(NodeId, NodeData)>) -> NodeStore {
        Arc::new(RwLock::new(data.into_iter().collect()))
    }

    #[test]
    fn test_node_id() {
        let id1 = NodeId::new();
        let id2 = NodeId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_append_and_walk() {
        let root = NodeId::new();
        let form = NodeId::new();
        let input = NodeId::new();
        let store = store_with(vec![
            (root, NodeData::element("div")),
            (form, NodeData::element("FORM")),
            (input, NodeData::element("input")),
        ]);

        let root_node = Node::new(root, store.clone());
        let form_node = Node::new(form, store.clone());
        let input_node = Node::new(input, store.clone());
        root_node.append_child(&form_node);
        form_node.append_child(&input_node);

        assert!(form_node.is_tag("form"));
        assert!(input_node.is_descendant_of(root));
        assert_eq!(root_node.descendants_by_tag("input"), vec![input]);

        // Re-parenting detaches from the old parent
        let other = Node::new(NodeId::new(), store.clone());
        store.write().insert(other.id, NodeData::element("section"));
        other.append_child(&form_node);
        assert!(!input_node.is_descendant_of(root));
        assert!(root_node.children().is_empty());
    }

    #[test]
    fn test_outer_html_escapes_attributes() {
        let id = NodeId::new();
        let store = store_with(vec![(id, NodeData::element("input"))]);
        let node = Node::new(id, store);
        node.set_attribute("value", "a\"b");
        node.set_attribute("name", "state");
        assert_eq!(
            node.outer_html(),
            "<input name=\"state\" value=\"a&quot;b\">"
        );
    }
}
