//! Content tree handed over by the markup front-ends
//!
//! The core never interprets cell content. It only needs to tell lists and
//! list items apart from everything else, and to read the plain text at the
//! head of a cell when looking for markers.

use serde::{Deserialize, Serialize};

/// A node of author content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentNode {
    /// Literal text
    Text { value: String },
    /// A list container (`ul`/`ol`)
    List { children: Vec<ContentNode> },
    /// A list item (`li`)
    Item { children: Vec<ContentNode> },
    /// Any other node with children (emphasis, code, link, paragraph...)
    Element {
        name: String,
        #[serde(default)]
        children: Vec<ContentNode>,
    },
    /// A leaf without text (html, image, rule...)
    Opaque { name: String },
}

impl ContentNode {
    /// Create a text node
    pub fn text(value: impl Into<String>) -> Self {
        ContentNode::Text {
            value: value.into(),
        }
    }

    /// Create a list container
    pub fn list(children: Vec<ContentNode>) -> Self {
        ContentNode::List { children }
    }

    /// Create a list item
    pub fn item(children: Vec<ContentNode>) -> Self {
        ContentNode::Item { children }
    }

    /// Create a generic element
    pub fn element(name: impl Into<String>, children: Vec<ContentNode>) -> Self {
        ContentNode::Element {
            name: name.into(),
            children,
        }
    }

    /// Create an opaque leaf
    pub fn opaque(name: impl Into<String>) -> Self {
        ContentNode::Opaque { name: name.into() }
    }

    /// Children of a traversable node, empty for leaves
    pub fn children(&self) -> &[ContentNode] {
        match self {
            ContentNode::List { children }
            | ContentNode::Item { children }
            | ContentNode::Element { children, .. } => children,
            ContentNode::Text { .. } | ContentNode::Opaque { .. } => &[],
        }
    }

    /// Check if this is a list container
    pub fn is_list(&self) -> bool {
        matches!(self, ContentNode::List { .. })
    }

    /// Check if this is a list item
    pub fn is_item(&self) -> bool {
        matches!(self, ContentNode::Item { .. })
    }

    /// Whitespace-only text, such as the line breaks a parser leaves between items
    pub fn is_blank_text(&self) -> bool {
        matches!(self, ContentNode::Text { value } if value.trim().is_empty())
    }

    /// Short name of the node kind, used in diagnostics
    pub fn kind_name(&self) -> &str {
        match self {
            ContentNode::Text { .. } => "text",
            ContentNode::List { .. } => "list",
            ContentNode::Item { .. } => "item",
            ContentNode::Element { name, .. } | ContentNode::Opaque { name } => name,
        }
    }

    /// Concatenate every text leaf, depth first and left to right
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            ContentNode::Text { value } => out.push_str(value),
            ContentNode::Opaque { .. } => {}
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// Concatenate the text of a sequence of nodes
pub fn text_content(nodes: &[ContentNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.collect_text(&mut out);
    }
    out
}

impl std::fmt::Display for ContentNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text_content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_nested() {
        let node = ContentNode::element(
            "p",
            vec![
                ContentNode::text("Hello "),
                ContentNode::element("strong", vec![ContentNode::text("bold")]),
                ContentNode::text(" world"),
            ],
        );
        assert_eq!(node.text_content(), "Hello bold world");
    }

    #[test]
    fn test_text_content_opaque_is_empty() {
        let nodes = vec![
            ContentNode::text("a"),
            ContentNode::opaque("img"),
            ContentNode::text("b"),
        ];
        assert_eq!(text_content(&nodes), "ab");
        assert_eq!(ContentNode::opaque("hr").text_content(), "");
    }

    #[test]
    fn test_text_content_through_lists() {
        let node = ContentNode::list(vec![
            ContentNode::item(vec![ContentNode::text("x")]),
            ContentNode::item(vec![ContentNode::text("y")]),
        ]);
        assert_eq!(node.text_content(), "xy");
    }

    #[test]
    fn test_blank_text() {
        assert!(ContentNode::text("  \n").is_blank_text());
        assert!(!ContentNode::text(" a ").is_blank_text());
        assert!(!ContentNode::list(vec![]).is_blank_text());
    }

    #[test]
    fn test_json_shape() {
        let node = ContentNode::item(vec![ContentNode::text("A")]);
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(
            json,
            r#"{"type":"item","children":[{"type":"text","value":"A"}]}"#
        );
        let back: ContentNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
