//! Type resolver: turns a frozen registry into an ordered, fully resolved model
//!
//! Resolution runs in a fixed order. Per-entity checks (references,
//! inheritance chain, field shadowing, default literals) are run entity by
//! entity in first-seen order, then the global dependency graph is checked
//! for value cycles and sorted topologically. Errors are accumulated across
//! all steps; any error means no model is produced.

use super::model::{Model, ResolvedEntity, ResolvedField};
use super::registry::FrozenRegistry;
use super::types::{EntityDecl, FieldType};
use super::validation::Diagnostics;
use crate::entity::types::{Literal, SchemaError};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use tracing::debug;

/// Resolver configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverOptions {
    /// Let a derived entity redeclare an inherited field. The derived
    /// declaration then takes the inherited field's slot.
    #[serde(default)]
    pub allow_shadowing: bool,
}

/// Resolves every declaration of a frozen registry
pub struct TypeResolver {
    options: ResolverOptions,
}

impl TypeResolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve the registry into a model, or report every problem found
    pub fn resolve(&self, registry: &FrozenRegistry) -> Result<Model, Diagnostics> {
        debug!("Resolving {} declarations", registry.len());

        let mut errors = Vec::new();
        let mut chains: HashMap<&str, Vec<String>> = HashMap::new();
        let mut reported_cycles: HashSet<Vec<String>> = HashSet::new();

        for decl in registry.iter() {
            self.check_references(decl, registry, &mut errors);

            match build_chain(decl, registry) {
                Chain::Complete(ancestors) => {
                    self.check_shadowing(decl, &ancestors, registry, &mut errors);
                    chains.insert(decl.name.as_str(), ancestors);
                }
                Chain::Cycle(cycle) => {
                    let chain = canonical_cycle(&cycle, registry);
                    if reported_cycles.insert(chain.clone()) {
                        errors.push(SchemaError::InheritanceCycle { chain });
                    }
                }
                Chain::Broken => {}
            }

            self.check_defaults(decl, registry, &mut errors);
        }

        debug!("Per-entity checks finished with {} error(s)", errors.len());

        let graph = DependencyGraph::build(registry);
        errors.extend(graph.value_cycles());

        if !errors.is_empty() {
            debug!("Resolution failed with {} error(s)", errors.len());
            return Err(Diagnostics::new(errors));
        }

        let order = graph.topological_order();
        debug!("Emission order: {}", order.join(", "));

        let mut entities = Vec::with_capacity(order.len());
        for (rank, name) in order.iter().enumerate() {
            let Some(decl) = registry.lookup(name) else {
                continue;
            };
            let ancestors = chains.remove(name.as_str()).unwrap_or_default();
            entities.push(self.materialize(decl, ancestors, rank, &graph, registry));
        }

        Ok(Model::new(entities))
    }

    /// Step 1: every referenced name and the base must be registered
    fn check_references(&self, decl: &EntityDecl, registry: &FrozenRegistry, errors: &mut Vec<SchemaError>) {
        if let Some(base) = decl.base.as_deref() {
            if base == decl.name {
                errors.push(
                    SchemaError::unresolved(&decl.name, None, base)
                        .with_reason("an entity cannot extend itself"),
                );
            } else {
                match registry.lookup(base) {
                    None => errors.push(SchemaError::unresolved(&decl.name, None, base)),
                    Some(target) if target.is_enum() => errors.push(
                        SchemaError::unresolved(&decl.name, None, base)
                            .with_reason("an enumeration cannot be used as a base"),
                    ),
                    Some(_) => {}
                }
            }
        }

        for field in &decl.fields {
            if let Some(referenced) = field.field_type.referenced_name() {
                if !registry.contains(referenced) {
                    errors.push(SchemaError::unresolved(&decl.name, Some(&field.name), referenced));
                }
            }
        }
    }

    /// Step 3: own field names must not repeat inherited ones
    fn check_shadowing(
        &self,
        decl: &EntityDecl,
        ancestors: &[String],
        registry: &FrozenRegistry,
        errors: &mut Vec<SchemaError>,
    ) {
        if self.options.allow_shadowing {
            return;
        }

        let mut inherited: HashMap<&str, &str> = HashMap::new();
        for ancestor in ancestors.iter().filter_map(|name| registry.lookup(name)) {
            for field in &ancestor.fields {
                inherited.entry(field.name.as_str()).or_insert(ancestor.name.as_str());
            }
        }

        for field in &decl.fields {
            if let Some(declared_in) = inherited.get(field.name.as_str()) {
                errors.push(SchemaError::FieldShadow {
                    entity: decl.name.clone(),
                    field: field.name.clone(),
                    declared_in: declared_in.to_string(),
                });
            }
        }
    }

    /// Step 6: defaults must be representable in the declared type
    fn check_defaults(&self, decl: &EntityDecl, registry: &FrozenRegistry, errors: &mut Vec<SchemaError>) {
        for field in &decl.fields {
            let Some(literal) = &field.default else {
                continue;
            };

            let expected = match &field.field_type {
                FieldType::Primitive(kind) => {
                    if kind.accepts(literal) {
                        continue;
                    }
                    kind.schema_name().to_string()
                }
                FieldType::Reference(name) => match registry.lookup(name) {
                    // Already reported as an unresolved reference
                    None => continue,
                    Some(target) if target.is_enum() => {
                        if enum_accepts(target, literal) {
                            continue;
                        }
                        format!("a value of enum '{}'", name)
                    }
                    Some(_) => format!("no default for entity reference '{}'", name),
                },
                FieldType::Collection(_) => "no default for a collection".to_string(),
            };

            errors.push(SchemaError::default_mismatch(
                &decl.name,
                &field.name,
                expected,
                literal.kind(),
            ));
        }
    }

    /// Step 7: build the resolved entity with its flattened field list
    fn materialize(
        &self,
        decl: &EntityDecl,
        ancestors: Vec<String>,
        rank: usize,
        graph: &DependencyGraph,
        registry: &FrozenRegistry,
    ) -> ResolvedEntity {
        let mut fields: Vec<ResolvedField> = Vec::new();

        let owners = ancestors
            .iter()
            .filter_map(|name| registry.lookup(name))
            .chain(std::iter::once(decl));

        for owner in owners {
            for field in &owner.fields {
                let resolved = ResolvedField {
                    name: field.name.clone(),
                    field_type: field.field_type.clone(),
                    default: field.default.clone(),
                    declared_in: owner.name.clone(),
                };

                // Only reachable with shadowing allowed
                match fields.iter_mut().find(|f| f.name == field.name) {
                    Some(slot) => *slot = resolved,
                    None => fields.push(resolved),
                }
            }
        }

        let mut references: Vec<String> = Vec::new();
        for field in &decl.fields {
            if let Some(name) = field.field_type.referenced_name() {
                if name != decl.name && !references.iter().any(|r| r == name) {
                    references.push(name.to_string());
                }
            }
        }

        ResolvedEntity {
            name: decl.name.clone(),
            kind: decl.kind.clone(),
            ancestors,
            fields,
            rank,
            dependencies: graph.dependencies(&decl.name),
            references,
            description: decl.description.clone(),
            namespace: decl.namespace.clone(),
            package: decl.package.clone(),
            implements: decl.implements.clone(),
            subdir: decl.subdir.clone(),
        }
    }
}

impl Default for TypeResolver {
    fn default() -> Self {
        Self::new(ResolverOptions::default())
    }
}

fn enum_accepts(target: &EntityDecl, literal: &Literal) -> bool {
    literal
        .as_str()
        .is_some_and(|value| target.enum_values().iter().any(|v| v == value))
}

/// Outcome of following base links from one entity
enum Chain {
    /// Ancestors, root first
    Complete(Vec<String>),
    /// Names along the cycle, first name repeated at the end
    Cycle(Vec<String>),
    /// A base link is missing or invalid; already reported in step 1
    Broken,
}

/// Step 2: follow base links and detect revisits
fn build_chain(decl: &EntityDecl, registry: &FrozenRegistry) -> Chain {
    let mut chain: Vec<&str> = vec![decl.name.as_str()];
    let mut current = decl;

    while let Some(base) = current.base.as_deref() {
        if base == current.name {
            return Chain::Broken;
        }

        if let Some(pos) = chain.iter().position(|name| *name == base) {
            let mut cycle: Vec<String> = chain[pos..].iter().map(|n| n.to_string()).collect();
            cycle.push(base.to_string());
            return Chain::Cycle(cycle);
        }

        match registry.lookup(base) {
            Some(parent) if !parent.is_enum() => {
                chain.push(parent.name.as_str());
                current = parent;
            }
            _ => return Chain::Broken,
        }
    }

    Chain::Complete(chain[1..].iter().rev().map(|n| n.to_string()).collect())
}

/// Rotate a cycle so it starts at its earliest-registered member
fn canonical_cycle(cycle: &[String], registry: &FrozenRegistry) -> Vec<String> {
    let members = &cycle[..cycle.len() - 1];
    let start = members
        .iter()
        .enumerate()
        .min_by_key(|(_, name)| registry.position(name).unwrap_or(usize::MAX))
        .map(|(i, _)| i)
        .unwrap_or(0);

    let mut rotated: Vec<String> = members[start..]
        .iter()
        .chain(members[..start].iter())
        .cloned()
        .collect();
    if let Some(first) = rotated.first().cloned() {
        rotated.push(first);
    }
    rotated
}

/// How a hard edge arises
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeVia {
    Base,
    Field(String),
}

/// Hard dependency of one entity on another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub target: String,
    pub via: EdgeVia,
}

/// Entity dependency graph keyed by name
///
/// Only hard edges are recorded: the base link and fields that hold another
/// entity by value. References behind a collection are not edges.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Node names in first-seen order
    nodes: Vec<String>,
    /// Outgoing edges per node, in declaration order
    edges: HashMap<String, Vec<Edge>>,
}

impl DependencyGraph {
    pub fn build(registry: &FrozenRegistry) -> Self {
        let mut graph = Self::default();

        for decl in registry.iter() {
            let mut out = Vec::new();

            if let Some(base) = decl.base.as_deref() {
                let is_class = registry.lookup(base).is_some_and(|b| !b.is_enum());
                if base != decl.name && is_class {
                    out.push(Edge {
                        target: base.to_string(),
                        via: EdgeVia::Base,
                    });
                }
            }

            for field in &decl.fields {
                if let Some(target) = field.field_type.direct_reference() {
                    if registry.contains(target) {
                        out.push(Edge {
                            target: target.to_string(),
                            via: EdgeVia::Field(field.name.clone()),
                        });
                    }
                }
            }

            graph.nodes.push(decl.name.clone());
            graph.edges.insert(decl.name.clone(), out);
        }

        graph
    }

    pub fn edges(&self, name: &str) -> &[Edge] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct hard dependencies of a node, in edge order
    pub fn dependencies(&self, name: &str) -> Vec<String> {
        let mut deps: Vec<String> = Vec::new();
        for edge in self.edges(name) {
            if !deps.contains(&edge.target) {
                deps.push(edge.target.clone());
            }
        }
        deps
    }

    /// Step 4: report every strongly connected component that holds a field edge
    ///
    /// Components made only of base edges are inheritance cycles, which the
    /// chain walk has already reported.
    pub fn value_cycles(&self) -> Vec<SchemaError> {
        let mut errors = Vec::new();

        for component in self.strongly_connected_components() {
            let members: HashSet<&str> = component.iter().map(|&i| self.nodes[i].as_str()).collect();

            let is_cycle = component.len() > 1
                || self
                    .edges(&self.nodes[component[0]])
                    .iter()
                    .any(|e| e.target == self.nodes[component[0]]);
            if !is_cycle {
                continue;
            }

            // First field edge inside the component, by first-seen order
            let entry = component.iter().find_map(|&i| {
                let source = self.nodes[i].as_str();
                self.edges(source).iter().find_map(|edge| match &edge.via {
                    EdgeVia::Field(field) if members.contains(edge.target.as_str()) => {
                        Some((source, field.as_str(), edge.target.as_str()))
                    }
                    _ => None,
                })
            });

            if let Some((entity, field, target)) = entry {
                let mut cycle = vec![entity.to_string()];
                cycle.extend(self.path_within(target, entity, &members));
                errors.push(SchemaError::ValueCycle {
                    entity: entity.to_string(),
                    field: field.to_string(),
                    cycle,
                });
            }
        }

        errors
    }

    /// Shortest path `from -> ... -> to` inside a component, both ends included
    fn path_within(&self, from: &str, to: &str, members: &HashSet<&str>) -> Vec<String> {
        let mut previous: HashMap<&str, &str> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        let mut visited: HashSet<&str> = HashSet::from([from]);

        while let Some(node) = queue.pop_front() {
            if node == to {
                break;
            }
            for edge in self.edges(node) {
                let next = edge.target.as_str();
                if members.contains(next) && visited.insert(next) {
                    previous.insert(next, node);
                    queue.push_back(next);
                }
            }
        }

        let mut path = vec![to.to_string()];
        let mut node = to;
        while node != from {
            match previous.get(node) {
                Some(&prev) => {
                    path.push(prev.to_string());
                    node = prev;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }

    /// Tarjan's algorithm; components are returned with members in first-seen order
    fn strongly_connected_components(&self) -> Vec<Vec<usize>> {
        struct Tarjan<'g> {
            graph: &'g DependencyGraph,
            positions: HashMap<&'g str, usize>,
            index: Vec<Option<usize>>,
            lowlink: Vec<usize>,
            on_stack: Vec<bool>,
            stack: Vec<usize>,
            counter: usize,
            components: Vec<Vec<usize>>,
        }

        impl Tarjan<'_> {
            fn visit(&mut self, v: usize) {
                self.index[v] = Some(self.counter);
                self.lowlink[v] = self.counter;
                self.counter += 1;
                self.stack.push(v);
                self.on_stack[v] = true;

                let graph = self.graph;
                for edge in graph.edges(&graph.nodes[v]) {
                    let Some(&w) = self.positions.get(edge.target.as_str()) else {
                        continue;
                    };
                    match self.index[w] {
                        None => {
                            self.visit(w);
                            self.lowlink[v] = self.lowlink[v].min(self.lowlink[w]);
                        }
                        Some(w_index) if self.on_stack[w] => {
                            self.lowlink[v] = self.lowlink[v].min(w_index);
                        }
                        Some(_) => {}
                    }
                }

                if Some(self.lowlink[v]) == self.index[v] {
                    let mut component = Vec::new();
                    while let Some(w) = self.stack.pop() {
                        self.on_stack[w] = false;
                        component.push(w);
                        if w == v {
                            break;
                        }
                    }
                    component.sort_unstable();
                    self.components.push(component);
                }
            }
        }

        let n = self.nodes.len();
        let mut tarjan = Tarjan {
            graph: self,
            positions: self.nodes.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect(),
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            counter: 0,
            components: Vec::new(),
        };

        for v in 0..n {
            if tarjan.index[v].is_none() {
                tarjan.visit(v);
            }
        }

        let mut components = tarjan.components;
        components.sort_by_key(|c| c[0]);
        components
    }

    /// Step 5: Kahn's algorithm, lowest first-seen index first among ready nodes
    ///
    /// Must only be called on an acyclic graph.
    pub fn topological_order(&self) -> Vec<String> {
        let positions: HashMap<&str, usize> =
            self.nodes.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();

        let mut pending = vec![0usize; self.nodes.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];

        for (i, name) in self.nodes.iter().enumerate() {
            for dep in self.dependencies(name) {
                if let Some(&d) = positions.get(dep.as_str()) {
                    pending[i] += 1;
                    dependents[d].push(i);
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = pending
            .iter()
            .enumerate()
            .filter(|(_, count)| **count == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(Reverse(i)) = ready.pop() {
            order.push(self.nodes[i].clone());
            for &dependent in &dependents[i] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        debug_assert_eq!(order.len(), self.nodes.len(), "topological_order called on a cyclic graph");
        order
    }
}
