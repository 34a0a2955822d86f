pub mod document;

pub use document::*;

use indexmap::IndexMap;
use std::fmt;

/// A grammar model: tokens, sequence rules and alternation rules, keyed by name.
///
/// Cross references between nodes are plain names resolved through `nodes`,
/// so cyclic grammars (`Expression -> BinaryExpression -> Expression`) need no
/// shared ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub name: String,
    pub version: String,
    pub start: String,
    /// Insertion order drives generation order.
    pub nodes: IndexMap<String, Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Token(TokenNode),
    Deduction(DeductionNode),
    Union(UnionNode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenNode {
    pub description: Option<String>,
    pub pattern: TokenPattern,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPattern {
    Literal(String),
    Regex(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeductionNode {
    pub description: Option<String>,
    pub elements: Vec<Element>,
}

/// One position in a deduction. Without a `property` the element is matched
/// and printed but not stored (e.g. punctuation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub node_ref: String,
    pub property: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionNode {
    pub description: Option<String>,
    /// Try order for the parser, variant order for generated types.
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Token,
    Deduction,
    Union,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Token => "token",
            NodeKind::Deduction => "deduction",
            NodeKind::Union => "union",
        };
        f.write_str(s)
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Token(_) => NodeKind::Token,
            Node::Deduction(_) => NodeKind::Deduction,
            Node::Union(_) => NodeKind::Union,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Node::Token(t) => t.description.as_deref(),
            Node::Deduction(d) => d.description.as_deref(),
            Node::Union(u) => u.description.as_deref(),
        }
    }

    /// Every node name this node refers to, in declaration order.
    pub fn references(&self) -> Vec<&str> {
        match self {
            Node::Token(_) => Vec::new(),
            Node::Deduction(d) => d.elements.iter().map(|e| e.node_ref.as_str()).collect(),
            Node::Union(u) => u.members.iter().map(String::as_str).collect(),
        }
    }
}

impl Element {
    pub fn new(node_ref: impl Into<String>) -> Self {
        Self {
            node_ref: node_ref.into(),
            property: None,
        }
    }

    pub fn named(node_ref: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            node_ref: node_ref.into(),
            property: Some(property.into()),
        }
    }
}

impl Model {
    pub fn builder(name: impl Into<String>, start: impl Into<String>) -> ModelBuilder {
        ModelBuilder::new(name, start)
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<NodeKind> {
        self.nodes.get(name).map(Node::kind)
    }

    pub fn tokens(&self) -> impl Iterator<Item = (&String, &TokenNode)> {
        self.nodes.iter().filter_map(|(name, node)| match node {
            Node::Token(t) => Some((name, t)),
            _ => None,
        })
    }

    pub fn deductions(&self) -> impl Iterator<Item = (&String, &DeductionNode)> {
        self.nodes.iter().filter_map(|(name, node)| match node {
            Node::Deduction(d) => Some((name, d)),
            _ => None,
        })
    }

    pub fn unions(&self) -> impl Iterator<Item = (&String, &UnionNode)> {
        self.nodes.iter().filter_map(|(name, node)| match node {
            Node::Union(u) => Some((name, u)),
            _ => None,
        })
    }

    /// The literal text of `name` when it is a literal token.
    pub fn literal_of(&self, name: &str) -> Option<&str> {
        match self.nodes.get(name) {
            Some(Node::Token(TokenNode {
                pattern: TokenPattern::Literal(text),
                ..
            })) => Some(text),
            _ => None,
        }
    }
}

/// Programmatic construction of a [`Model`], mostly for tests and embedders
/// that do not go through the text notation.
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    model: Model,
}

impl ModelBuilder {
    pub fn new(name: impl Into<String>, start: impl Into<String>) -> Self {
        Self {
            model: Model {
                name: name.into(),
                version: "1.0.0".to_string(),
                start: start.into(),
                nodes: IndexMap::new(),
            },
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.model.version = version.into();
        self
    }

    pub fn literal(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.node(
            name,
            Node::Token(TokenNode {
                description: None,
                pattern: TokenPattern::Literal(text.into()),
            }),
        )
    }

    pub fn regex(self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.node(
            name,
            Node::Token(TokenNode {
                description: None,
                pattern: TokenPattern::Regex(pattern.into()),
            }),
        )
    }

    pub fn deduction(self, name: impl Into<String>, elements: Vec<Element>) -> Self {
        self.node(
            name,
            Node::Deduction(DeductionNode {
                description: None,
                elements,
            }),
        )
    }

    pub fn union<S: Into<String>>(
        self,
        name: impl Into<String>,
        members: impl IntoIterator<Item = S>,
    ) -> Self {
        self.node(
            name,
            Node::Union(UnionNode {
                description: None,
                members: members.into_iter().map(Into::into).collect(),
            }),
        )
    }

    /// Inserts or replaces a node. Replacing keeps the original position.
    pub fn node(mut self, name: impl Into<String>, node: Node) -> Self {
        self.model.nodes.insert(name.into(), node);
        self
    }

    pub fn build(self) -> Model {
        self.model
    }
}
