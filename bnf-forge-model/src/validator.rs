//! Semantic validation for the grammar model.
//!
//! Errors block generation; warnings (unreachable nodes) never do.

use crate::analysis;
use crate::error::ValidationError;
use crate::model::*;
use std::collections::HashSet;

/// Runs every structural check and returns all problems found, in check order.
/// An empty list means the model is valid.
#[tracing::instrument(level = "debug", skip_all, fields(model = %model.name))]
pub fn validate(model: &Model) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if model.nodes.is_empty() {
        errors.push(ValidationError::EmptyModel);
    }

    if !model.nodes.contains_key(&model.start) {
        errors.push(ValidationError::MissingStart(model.start.clone()));
    }

    for (owner, node) in &model.nodes {
        for name in node.references() {
            if !model.nodes.contains_key(name) {
                errors.push(ValidationError::UnknownReference {
                    name: name.to_string(),
                    owner: owner.clone(),
                });
            }
        }
    }

    for name in model.nodes.keys() {
        if !is_identifier(name) {
            errors.push(ValidationError::InvalidNodeName(name.clone()));
        }
    }

    for (owner, node) in &model.nodes {
        match node {
            Node::Union(u) if u.members.is_empty() => {
                errors.push(ValidationError::EmptyUnion(owner.clone()));
            }
            Node::Deduction(d) => validate_properties(owner, d, &mut errors),
            _ => {}
        }
    }

    tracing::debug!(errors = errors.len(), "validation complete");
    errors
}

/// Advisory messages for a model that may otherwise be valid.
pub fn validation_warnings(model: &Model) -> Vec<String> {
    if !model.nodes.contains_key(&model.start) {
        return Vec::new();
    }
    analysis::find_unreachable_nodes(model)
        .into_iter()
        .map(|name| {
            format!(
                "node '{}' is unreachable from start node '{}'",
                name, model.start
            )
        })
        .collect()
}

fn validate_properties(owner: &str, node: &DeductionNode, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for property in node.elements.iter().filter_map(|e| e.property.as_deref()) {
        if property == "type" {
            errors.push(ValidationError::ReservedProperty(owner.to_string()));
        } else if !is_identifier(property) {
            errors.push(ValidationError::InvalidPropertyName {
                property: property.to_string(),
                owner: owner.to_string(),
            });
        }
        if !seen.insert(property) {
            errors.push(ValidationError::DuplicateProperty {
                property: property.to_string(),
                owner: owner.to_string(),
            });
        }
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`: usable both as a PEG rule name and as the stem
/// of a Rust identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
