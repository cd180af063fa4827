// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTML parser using html5ever

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use url::Url;

use super::document::Document;
use super::node::{Node, NodeData, NodeId};
use crate::error::{Error, Result};

/// Parse HTML string into a Document
pub fn parse_html(html: &str) -> Result<Document> {
    parse_html_with_url(html, None)
}

/// Parse HTML string with a document URL (used to resolve form actions)
pub fn parse_html_with_url(html: &str, url: Option<Url>) -> Result<Document> {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            ..Default::default()
        },
        ..Default::default()
    };

    let dom = parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| Error::HtmlParse(e.to_string()))?;

    let mut doc = match url {
        Some(u) => Document::with_url(u),
        None => Document::new(),
    };

    let root_id = doc.root().id;
    let mut converter = DomConverter { doc: &doc };
    for child in dom.document.children.borrow().iter() {
        converter.convert_node(child, root_id);
    }

    let html_el = doc.elements_by_tag("html").into_iter().next();
    let head = doc.elements_by_tag("head").into_iter().next();
    let body = doc.elements_by_tag("body").into_iter().next();
    doc.set_elements(
        html_el.map(|e| e.node.id),
        head.map(|e| e.node.id),
        body.map(|e| e.node.id),
    );

    if let Some(title) = doc.elements_by_tag("title").into_iter().next() {
        doc.set_title(title.text_content().trim());
    }

    Ok(doc)
}

/// Copies the html5ever tree into the document's node store
struct DomConverter<'a> {
    doc: &'a Document,
}

impl DomConverter<'_> {
    fn convert_node(&mut self, handle: &Handle, parent_id: NodeId) {
        let data = match handle.data {
            RcNodeData::Document | RcNodeData::ProcessingInstruction { .. } => return,
            RcNodeData::Doctype { .. } => NodeData::doctype(),
            RcNodeData::Text { ref contents } => {
                let text = contents.borrow().to_string();
                if text.trim().is_empty() && text.len() > 1 {
                    return;
                }
                NodeData::text(text)
            }
            RcNodeData::Comment { ref contents } => NodeData::comment(contents.to_string()),
            RcNodeData::Element {
                ref name,
                ref attrs,
                ..
            } => {
                let mut data = NodeData::element(name.local.to_string());
                for attr in attrs.borrow().iter() {
                    data.attributes
                        .insert(attr.name.local.to_string(), attr.value.to_string());
                }
                data
            }
        };

        let node_id = NodeId::new();
        self.doc.nodes.write().insert(node_id, data);
        let parent = Node::new(parent_id, self.doc.nodes.clone());
        parent.append_child(&Node::new(node_id, self.doc.nodes.clone()));

        for child in handle.children.borrow().iter() {
            self.convert_node(child, node_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_html() {
        let doc = parse_html("<html><body><p>Hello</p></body></html>").unwrap();
        assert!(doc.body().is_some());
        assert!(doc.document_element().is_some());
    }

    #[test]
    fn test_fragment_gets_implied_structure() {
        let doc = parse_html("<form><input name='code'></form>").unwrap();
        assert!(doc.document_element().is_some());
        assert!(doc.head().is_some());
        assert_eq!(doc.body().unwrap().elements_by_tag("form").len(), 1);
    }

    #[test]
    fn test_idp_callback_page() {
        let html = r#"
            <!DOCTYPE html>
            <html>
            <head><title>Submit This Form</title></head>
            <body onload="javascript:document.forms[0].submit()">
                <form method="post" action="https://portal.example.com/signin-oidc">
                    <input type="hidden" name="code" value="abc123">
                    <input type="hidden" name="id_token" value="eyJ.x.y">
                    <input type="hidden" name="state" value="xyz">
                    <input type="hidden" name="session_state" value="s.1">
                </form>
            </body>
            </html>
        "#;
        let url = Url::parse("https://idp.example.com/authorize").unwrap();
        let doc = parse_html_with_url(html, Some(url)).unwrap();

        assert_eq!(doc.title(), "Submit This Form");
        let form = &doc.forms()[0];
        assert_eq!(form.get_attribute("method"), Some("post".to_string()));
        assert_eq!(form.inputs().len(), 4);
        assert_eq!(
            form.input_named("code").and_then(|i| i.value()),
            Some("abc123".to_string())
        );
    }
}
