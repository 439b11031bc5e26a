//! Table dependency graph and topological resolution
//!
//! An edge `from -> to` means "`from` has a foreign key referencing `to`",
//! so `to` must be created and populated before `from`. The resolved order
//! drives generated INSERT statements, which is why a cycle is a hard
//! failure: a partial order that silently drops tables would produce
//! incomplete sample data without any signal.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// The foreign-key graph contains a cycle among two or more tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("dependency cycle among tables: {}", members.join(", "))]
pub struct CycleError {
    /// Every table on a cycle, in ascending name order
    pub members: Vec<String>,
}

/// Foreign-key dependency graph over table names
///
/// Construct one graph per analysis run; the graph is not designed for
/// concurrent mutation.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// All table names, including isolated ones
    nodes: BTreeSet<String>,

    /// table -> tables it references (non-self edges only)
    deps: BTreeMap<String, BTreeSet<String>>,

    /// table -> tables referencing it (non-self edges only)
    dependents: BTreeMap<String, BTreeSet<String>>,

    /// Tables with a self-referencing foreign key
    self_refs: BTreeSet<String>,
}

impl DependencyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table with no edges
    pub fn add_node(&mut self, name: impl Into<String>) {
        self.nodes.insert(name.into());
    }

    /// Record a foreign-key edge: `from` references `to`
    ///
    /// A self-edge (`from == to`) is tagged as self-referential and
    /// excluded from the ordering algorithm.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let from = from.into();
        let to = to.into();

        self.nodes.insert(from.clone());
        self.nodes.insert(to.clone());

        if from == to {
            self.self_refs.insert(from);
            return;
        }

        self.deps.entry(from.clone()).or_default().insert(to.clone());
        self.dependents.entry(to).or_default().insert(from);
    }

    /// Whether the table has a self-referencing foreign key
    ///
    /// Exposed separately so SQL generation can special-case deferred
    /// self-FK inserts (insert then update). This is a signal only.
    pub fn has_self_reference(&self, name: &str) -> bool {
        self.self_refs.contains(name)
    }

    /// All table names, in ascending order
    pub fn nodes(&self) -> impl Iterator<Item = &String> {
        self.nodes.iter()
    }

    /// Number of tables in the graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolve a creation/population order for all tables
    ///
    /// Kahn's algorithm over the non-self edges. Ties among ready tables
    /// break by ascending name, so identical input always yields an
    /// identical order. Tables with no edges at all are appended in name
    /// order after every connected table.
    ///
    /// Any cycle spanning two or more distinct tables fails the whole
    /// call with a [`CycleError`] naming every cycle member.
    pub fn topological_order(&self) -> Result<Vec<String>, CycleError> {
        let connected: BTreeSet<&String> = self
            .deps
            .keys()
            .chain(self.dependents.keys())
            .collect();

        let mut in_degree: HashMap<&String, usize> = connected
            .iter()
            .map(|&n| (n, self.deps.get(n).map_or(0, |d| d.len())))
            .collect();

        let mut ready: BTreeSet<&String> = in_degree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(&n, _)| n)
            .collect();

        let mut order: Vec<String> = Vec::with_capacity(self.nodes.len());

        while let Some(node) = ready.pop_first() {
            order.push(node.clone());

            if let Some(children) = self.dependents.get(node) {
                for child in children {
                    let degree = in_degree
                        .get_mut(child)
                        .expect("dependent of a connected node is connected");
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(child);
                    }
                }
            }
        }

        if order.len() < connected.len() {
            return Err(CycleError {
                members: self.cycle_members(),
            });
        }

        // Isolated tables still need a defined, stable position
        for node in &self.nodes {
            if !connected.contains(node) {
                order.push(node.clone());
            }
        }

        Ok(order)
    }

    /// Every table on a cycle: the union of all strongly connected
    /// components of size two or more (Tarjan)
    fn cycle_members(&self) -> Vec<String> {
        let mut state = TarjanState {
            graph: self,
            index: 0,
            indices: HashMap::new(),
            lowlinks: HashMap::new(),
            on_stack: BTreeSet::new(),
            stack: Vec::new(),
            members: BTreeSet::new(),
        };

        for node in &self.nodes {
            if !state.indices.contains_key(node) {
                state.visit(node);
            }
        }

        state.members.into_iter().collect()
    }
}

struct TarjanState<'g> {
    graph: &'g DependencyGraph,
    index: usize,
    indices: HashMap<&'g String, usize>,
    lowlinks: HashMap<&'g String, usize>,
    on_stack: BTreeSet<&'g String>,
    stack: Vec<&'g String>,
    members: BTreeSet<String>,
}

impl<'g> TarjanState<'g> {
    fn visit(&mut self, node: &'g String) {
        self.indices.insert(node, self.index);
        self.lowlinks.insert(node, self.index);
        self.index += 1;
        self.stack.push(node);
        self.on_stack.insert(node);

        if let Some(deps) = self.graph.deps.get(node) {
            for dep in deps {
                if !self.indices.contains_key(dep) {
                    self.visit(dep);
                    let dep_low = self.lowlinks[dep];
                    let low = self.lowlinks.get_mut(node).unwrap();
                    *low = (*low).min(dep_low);
                } else if self.on_stack.contains(dep) {
                    let dep_index = self.indices[dep];
                    let low = self.lowlinks.get_mut(node).unwrap();
                    *low = (*low).min(dep_index);
                }
            }
        }

        if self.lowlinks[node] == self.indices[node] {
            let mut component = Vec::new();
            while let Some(top) = self.stack.pop() {
                self.on_stack.remove(top);
                component.push(top);
                if top == node {
                    break;
                }
            }
            if component.len() >= 2 {
                for member in component {
                    self.members.insert(member.clone());
                }
            }
        }
    }
}
