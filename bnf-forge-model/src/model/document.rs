//! The structured document form of a model, as handed over by an external
//! loader (YAML, JSON, ...).

use super::{DeductionNode, Element, Model, Node, TokenNode, TokenPattern, UnionNode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDocument {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub start: String,
    pub nodes: IndexMap<String, NodeDocument>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeDocument {
    Token {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        pattern: PatternDocument,
    },
    Deduction {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default)]
        elements: Vec<ElementDocument>,
    },
    Union {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default)]
        members: Vec<String>,
    },
}

/// A token pattern. Bare strings delimited by slashes (`/\d+/`) are regexes,
/// every other bare string is a literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternDocument {
    Text(String),
    Literal { literal: String },
    Regex { regex: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementDocument {
    Bare(String),
    Full {
        node: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        property: Option<String>,
    },
}

impl From<PatternDocument> for TokenPattern {
    fn from(p: PatternDocument) -> Self {
        match p {
            PatternDocument::Text(text) => {
                match text.strip_prefix('/').and_then(|s| s.strip_suffix('/')) {
                    Some(regex) if text.len() >= 2 => TokenPattern::Regex(regex.to_string()),
                    _ => TokenPattern::Literal(text),
                }
            }
            PatternDocument::Literal { literal } => TokenPattern::Literal(literal),
            PatternDocument::Regex { regex } => TokenPattern::Regex(regex),
        }
    }
}

impl From<ElementDocument> for Element {
    fn from(e: ElementDocument) -> Self {
        match e {
            ElementDocument::Bare(node) => Element::new(node),
            ElementDocument::Full { node, property } => Element {
                node_ref: node,
                property,
            },
        }
    }
}

impl From<NodeDocument> for Node {
    fn from(d: NodeDocument) -> Self {
        match d {
            NodeDocument::Token {
                description,
                pattern,
            } => Node::Token(TokenNode {
                description,
                pattern: pattern.into(),
            }),
            NodeDocument::Deduction {
                description,
                elements,
            } => Node::Deduction(DeductionNode {
                description,
                elements: elements.into_iter().map(Into::into).collect(),
            }),
            NodeDocument::Union {
                description,
                members,
            } => Node::Union(UnionNode {
                description,
                members,
            }),
        }
    }
}

impl From<ModelDocument> for Model {
    fn from(d: ModelDocument) -> Self {
        Self {
            name: d.name,
            version: d.version,
            start: d.start,
            nodes: d
                .nodes
                .into_iter()
                .map(|(name, node)| (name, node.into()))
                .collect(),
        }
    }
}

impl From<&Model> for ModelDocument {
    fn from(m: &Model) -> Self {
        let nodes = m
            .nodes
            .iter()
            .map(|(name, node)| {
                let doc = match node {
                    Node::Token(t) => NodeDocument::Token {
                        description: t.description.clone(),
                        pattern: match &t.pattern {
                            TokenPattern::Literal(literal) => PatternDocument::Literal {
                                literal: literal.clone(),
                            },
                            TokenPattern::Regex(regex) => PatternDocument::Regex {
                                regex: regex.clone(),
                            },
                        },
                    },
                    Node::Deduction(d) => NodeDocument::Deduction {
                        description: d.description.clone(),
                        elements: d
                            .elements
                            .iter()
                            .map(|e| ElementDocument::Full {
                                node: e.node_ref.clone(),
                                property: e.property.clone(),
                            })
                            .collect(),
                    },
                    Node::Union(u) => NodeDocument::Union {
                        description: u.description.clone(),
                        members: u.members.clone(),
                    },
                };
                (name.clone(), doc)
            })
            .collect();

        Self {
            name: m.name.clone(),
            version: m.version.clone(),
            start: m.start.clone(),
            nodes,
        }
    }
}
