use crate::naming::ResolvedNames;
use bnf_forge_model::{Model, Node, NodeKind, TokenPattern};

/// Declarations the schema renders, with every name already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaPlan {
    pub grammar: String,
    pub version: String,
    pub start: String,
    pub root_type: String,
    pub tokens: Vec<TokenDecl>,
    pub unions: Vec<UnionDecl>,
    pub deductions: Vec<DeductionDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDecl {
    pub node: String,
    pub type_name: String,
    pub variant: String,
    pub doc: Option<String>,
    /// Mapped types are used as they are; nothing is declared for them.
    pub mapped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionDecl {
    pub node: String,
    pub type_name: String,
    pub doc: Option<String>,
    pub variants: Vec<VariantDecl>,
    pub mapped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDecl {
    pub node: String,
    pub variant: String,
    pub type_name: String,
    /// Union members are boxed so that union cycles stay sized.
    pub boxed: bool,
    /// The member is a generated enum, which reports its own node type.
    pub nested: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeductionDecl {
    pub node: String,
    pub type_name: String,
    pub variant: String,
    pub module: String,
    pub doc: Option<String>,
    pub fields: Vec<FieldDecl>,
    pub mapped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub property: String,
    pub field: String,
    pub node_ref: String,
    pub type_name: String,
}

impl SchemaPlan {
    /// Every member is referenced by its resolved type name; nothing is
    /// expanded inline, so forward references and cycles need no ordering.
    pub fn build(model: &Model, names: &ResolvedNames, include_documentation: bool) -> Self {
        let doc = |text: Option<&str>, fallback: String| {
            include_documentation.then(|| text.map_or(fallback, str::to_string))
        };

        let mut plan = SchemaPlan {
            grammar: model.name.clone(),
            version: model.version.clone(),
            start: model.start.clone(),
            root_type: names.type_name(&model.start).to_string(),
            tokens: Vec::new(),
            unions: Vec::new(),
            deductions: Vec::new(),
        };

        for (name, node) in &model.nodes {
            match node {
                Node::Token(t) => {
                    let pattern = match &t.pattern {
                        TokenPattern::Literal(text) => format!("{:?}", text),
                        TokenPattern::Regex(regex) => format!("/{}/", regex),
                    };
                    plan.tokens.push(TokenDecl {
                        node: name.clone(),
                        type_name: names.type_name(name).to_string(),
                        variant: names.variant_name(name).to_string(),
                        doc: doc(
                            t.description.as_deref(),
                            format!("`{}` token matching `{}`.", name, pattern),
                        ),
                        mapped: names.is_mapped(name),
                    });
                }
                Node::Union(u) => {
                    let variants = u
                        .members
                        .iter()
                        .map(|member| VariantDecl {
                            node: member.clone(),
                            variant: names.variant_name(member).to_string(),
                            type_name: names.type_name(member).to_string(),
                            boxed: model.kind_of(member) == Some(NodeKind::Union),
                            nested: model.kind_of(member) == Some(NodeKind::Union) && !names.is_mapped(member),
                        })
                        .collect();
                    plan.unions.push(UnionDecl {
                        node: name.clone(),
                        type_name: names.type_name(name).to_string(),
                        doc: doc(
                            u.description.as_deref(),
                            format!("`{}`: one of {}.", name, u.members.join(" | ")),
                        ),
                        variants,
                        mapped: names.is_mapped(name),
                    });
                }
                Node::Deduction(d) => {
                    let fields = d
                        .elements
                        .iter()
                        .filter_map(|e| {
                            e.property.as_ref().map(|property| FieldDecl {
                                property: property.clone(),
                                field: names.field_name(property).to_string(),
                                node_ref: e.node_ref.clone(),
                                type_name: names.type_name(&e.node_ref).to_string(),
                            })
                        })
                        .collect();
                    let shape = d
                        .elements
                        .iter()
                        .map(|e| match &e.property {
                            Some(p) => format!("{}:{}", p, e.node_ref),
                            None => e.node_ref.clone(),
                        })
                        .collect::<Vec<_>>()
                        .join(" ");
                    plan.deductions.push(DeductionDecl {
                        node: name.clone(),
                        type_name: names.type_name(name).to_string(),
                        variant: names.variant_name(name).to_string(),
                        module: names.module_name(name).to_string(),
                        doc: doc(
                            d.description.as_deref(),
                            format!("`{}` = {}", name, shape),
                        ),
                        fields,
                        mapped: names.is_mapped(name),
                    });
                }
            }
        }

        plan
    }

    /// Every node name, tokens first, then unions, then deductions.
    pub fn node_types(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .map(|t| t.node.as_str())
            .chain(self.unions.iter().map(|u| u.node.as_str()))
            .chain(self.deductions.iter().map(|d| d.node.as_str()))
            .collect()
    }
}
