//! Graph analyses over a model: reachability, nullability, first-symbol
//! edges and left recursion.
//!
//! Everything here tolerates dangling references (they are simply not
//! followed), so analyses can run on models that failed validation.

use crate::model::*;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// Nodes never visited by a walk from `start` along element and member edges,
/// in model order.
pub fn find_unreachable_nodes(model: &Model) -> IndexSet<String> {
    let mut visited: IndexSet<&str> = IndexSet::new();
    let mut stack = Vec::new();
    if model.nodes.contains_key(&model.start) {
        stack.push(model.start.as_str());
    }

    while let Some(name) = stack.pop() {
        if !visited.insert(name) {
            continue;
        }
        if let Some(node) = model.node(name) {
            stack.extend(
                node.references()
                    .into_iter()
                    .filter(|r| model.nodes.contains_key(*r) && !visited.contains(*r)),
            );
        }
    }

    model
        .nodes
        .keys()
        .filter(|name| !visited.contains(name.as_str()))
        .cloned()
        .collect()
}

/// Nodes that can match the empty input.
///
/// A regex token is nullable when its pattern can match zero bytes; a pattern
/// that does not parse counts as non-nullable.
pub fn nullable_nodes(model: &Model) -> IndexSet<String> {
    let mut nullable: IndexSet<String> = IndexSet::new();
    loop {
        let mut changed = false;
        for (name, node) in &model.nodes {
            if nullable.contains(name) {
                continue;
            }
            let is_nullable = match node {
                Node::Token(t) => match &t.pattern {
                    TokenPattern::Literal(text) => text.is_empty(),
                    TokenPattern::Regex(pattern) => regex_is_nullable(pattern),
                },
                Node::Deduction(d) => d.elements.iter().all(|e| nullable.contains(&e.node_ref)),
                Node::Union(u) => u.members.iter().any(|m| nullable.contains(m)),
            };
            if is_nullable {
                nullable.insert(name.clone());
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}

fn regex_is_nullable(pattern: &str) -> bool {
    regex_syntax::ParserBuilder::new()
        .unicode(false)
        .utf8(false)
        .build()
        .parse(pattern)
        .map(|hir| hir.properties().minimum_len() == Some(0))
        .unwrap_or(false)
}

/// Edges `A -> B` where `B` can be the first thing matched while expanding `A`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSymbolGraph {
    pub edges: IndexMap<String, Vec<String>>,
}

impl FirstSymbolGraph {
    pub fn successors(&self, name: &str) -> &[String] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Builds the first-symbol graph: the first element of a deduction (and the
/// following ones while the prefix is nullable) and every member of a union.
/// Tokens have no outgoing edges.
pub fn first_symbol_graph(model: &Model) -> FirstSymbolGraph {
    let nullable = nullable_nodes(model);
    let mut edges = IndexMap::new();

    for (name, node) in &model.nodes {
        let mut targets: Vec<String> = Vec::new();
        match node {
            Node::Token(_) => {}
            Node::Deduction(d) => {
                for element in &d.elements {
                    if model.nodes.contains_key(&element.node_ref)
                        && !targets.contains(&element.node_ref)
                    {
                        targets.push(element.node_ref.clone());
                    }
                    if !nullable.contains(&element.node_ref) {
                        break;
                    }
                }
            }
            Node::Union(u) => {
                for member in &u.members {
                    if model.nodes.contains_key(member) && !targets.contains(member) {
                        targets.push(member.clone());
                    }
                }
            }
        }
        edges.insert(name.clone(), targets);
    }

    FirstSymbolGraph { edges }
}

/// Every cycle of the first-symbol graph, as the set of rule names taking
/// part in it (one strongly connected component each), in model order.
#[tracing::instrument(level = "debug", skip_all, fields(model = %model.name))]
pub fn left_recursive_cycles(model: &Model) -> Vec<Vec<String>> {
    let graph = first_symbol_graph(model);
    let mut finder = CycleFinder {
        graph: &graph,
        index: HashMap::new(),
        low: HashMap::new(),
        on_stack: IndexSet::new(),
        stack: Vec::new(),
        next_index: 0,
        components: Vec::new(),
    };

    for name in model.nodes.keys() {
        if !finder.index.contains_key(name.as_str()) {
            finder.visit(name);
        }
    }

    let position = |n: &String| model.nodes.get_index_of(n).unwrap_or(usize::MAX);
    let mut cycles: Vec<Vec<String>> = finder
        .components
        .into_iter()
        .filter(|component| {
            component.len() > 1 || graph.successors(&component[0]).contains(&component[0])
        })
        .map(|mut component| {
            component.sort_by_key(position);
            component
        })
        .collect();
    cycles.sort_by_key(|c| position(&c[0]));

    tracing::debug!(cycles = cycles.len(), "left recursion analysis complete");
    cycles
}

/// Names of all left-recursive rules, in model order.
pub fn left_recursive_rules(model: &Model) -> Vec<String> {
    let in_cycle: IndexSet<String> = left_recursive_cycles(model).into_iter().flatten().collect();
    model
        .nodes
        .keys()
        .filter(|name| in_cycle.contains(*name))
        .cloned()
        .collect()
}

/// Tarjan's strongly connected components: DFS with an on-stack set, a back
/// edge to a node still on the stack closes a cycle.
struct CycleFinder<'g> {
    graph: &'g FirstSymbolGraph,
    index: HashMap<&'g str, usize>,
    low: HashMap<&'g str, usize>,
    on_stack: IndexSet<&'g str>,
    stack: Vec<&'g str>,
    next_index: usize,
    components: Vec<Vec<String>>,
}

impl<'g> CycleFinder<'g> {
    fn visit(&mut self, name: &'g str) {
        self.index.insert(name, self.next_index);
        self.low.insert(name, self.next_index);
        self.next_index += 1;
        self.stack.push(name);
        self.on_stack.insert(name);

        let graph = self.graph;
        for next in graph.successors(name) {
            let next = next.as_str();
            if !self.index.contains_key(next) {
                self.visit(next);
                let low = self.low[name].min(self.low[next]);
                self.low.insert(name, low);
            } else if self.on_stack.contains(next) {
                let low = self.low[name].min(self.index[next]);
                self.low.insert(name, low);
            }
        }

        if self.low[name] == self.index[name] {
            let mut component = Vec::new();
            while let Some(top) = self.stack.pop() {
                self.on_stack.swap_remove(top);
                component.push(top.to_string());
                if top == name {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}

/// The token and deduction names a value typed as `name` may carry: `name`
/// itself for tokens and deductions, the members (recursively) for unions.
pub fn concrete_types(model: &Model, name: &str) -> IndexSet<String> {
    let mut out = IndexSet::new();
    let mut seen = IndexSet::new();
    collect_concrete(model, name, &mut seen, &mut out);
    out
}

fn collect_concrete<'m>(
    model: &'m Model,
    name: &'m str,
    seen: &mut IndexSet<&'m str>,
    out: &mut IndexSet<String>,
) {
    if !seen.insert(name) {
        return;
    }
    match model.node(name) {
        Some(Node::Union(u)) => {
            for member in &u.members {
                collect_concrete(model, member, seen, out);
            }
        }
        Some(_) => {
            out.insert(name.to_string());
        }
        None => {}
    }
}
