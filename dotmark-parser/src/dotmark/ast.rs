//! Syntax tree for dotmark documents
//!
//! The tree is the folded form of the event stream: one node per
//! start/end event pair, one leaf per leaf event. Nodes serialize to
//! internally-tagged JSON (`"tag": "para"`, ...); the `pos` field is
//! present only when source positions were requested at parse time.

use serde::Serialize;

use super::range::Pos;

/// A parsed document: the root of the tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Doc {
    tag: &'static str,
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<Pos>,
}

impl Doc {
    pub fn new(children: Vec<Node>, pos: Option<Pos>) -> Self {
        Self {
            tag: "doc",
            children,
            pos,
        }
    }
}

/// A node of the document tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum Node {
    Heading {
        level: u8,
        children: Vec<Node>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pos: Option<Pos>,
    },
    Para {
        children: Vec<Node>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pos: Option<Pos>,
    },
    #[serde(rename = "blockquote")]
    BlockQuote {
        children: Vec<Node>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pos: Option<Pos>,
    },
    CodeBlock {
        #[serde(skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pos: Option<Pos>,
    },
    ThematicBreak {
        #[serde(skip_serializing_if = "Option::is_none")]
        pos: Option<Pos>,
    },
    Emph {
        children: Vec<Node>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pos: Option<Pos>,
    },
    Strong {
        children: Vec<Node>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pos: Option<Pos>,
    },
    Verbatim {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pos: Option<Pos>,
    },
    Str {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pos: Option<Pos>,
    },
    #[serde(rename = "softbreak")]
    SoftBreak {
        #[serde(skip_serializing_if = "Option::is_none")]
        pos: Option<Pos>,
    },
}

impl Node {
    /// The tag of this node, as serialized
    pub fn tag(&self) -> &'static str {
        match self {
            Node::Heading { .. } => "heading",
            Node::Para { .. } => "para",
            Node::BlockQuote { .. } => "blockquote",
            Node::CodeBlock { .. } => "code_block",
            Node::ThematicBreak { .. } => "thematic_break",
            Node::Emph { .. } => "emph",
            Node::Strong { .. } => "strong",
            Node::Verbatim { .. } => "verbatim",
            Node::Str { .. } => "str",
            Node::SoftBreak { .. } => "softbreak",
        }
    }

    /// Child nodes; empty for leaves
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Heading { children, .. }
            | Node::Para { children, .. }
            | Node::BlockQuote { children, .. }
            | Node::Emph { children, .. }
            | Node::Strong { children, .. } => children,
            _ => &[],
        }
    }

    /// The source position, when attached
    pub fn pos(&self) -> Option<&Pos> {
        match self {
            Node::Heading { pos, .. }
            | Node::Para { pos, .. }
            | Node::BlockQuote { pos, .. }
            | Node::CodeBlock { pos, .. }
            | Node::ThematicBreak { pos, .. }
            | Node::Emph { pos, .. }
            | Node::Strong { pos, .. }
            | Node::Verbatim { pos, .. }
            | Node::Str { pos, .. }
            | Node::SoftBreak { pos, .. } => pos.as_ref(),
        }
    }
}
