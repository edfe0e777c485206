//! Frozen dependency graph
//!
//! Built once, after every pending asset has been resolved. Nodes live in
//! an arena; each node keeps its direct dependencies in declaration order
//! and its transitive closure as a set of arena indices. A graph only
//! exists for acyclic input: [`DependencyGraph::build`] returns the names
//! at which cycles were detected instead.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    deps: Vec<usize>,
    closure: BTreeSet<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Absent,
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencyGraph {
    names: IndexSet<String>,
    nodes: Vec<Node>,
}

impl DependencyGraph {
    /// Build from a name → direct dependencies map.
    ///
    /// Walks every name depth-first with three-state marks. Reaching a name
    /// that is still in progress is a cycle; the name is reported and that
    /// edge is not followed. Any cycle means no graph.
    pub fn build(deps: &IndexMap<String, Vec<String>>) -> Result<Self, Vec<String>> {
        let mut names: IndexSet<String> = deps.keys().cloned().collect();
        for targets in deps.values() {
            for target in targets {
                names.insert(target.clone());
            }
        }

        let mut nodes: Vec<Node> = names
            .iter()
            .map(|name| Node {
                deps: deps
                    .get(name)
                    .map(|targets| {
                        targets
                            .iter()
                            .filter_map(|t| names.get_index_of(t))
                            .collect()
                    })
                    .unwrap_or_default(),
                closure: BTreeSet::new(),
            })
            .collect();

        let mut marks = vec![Mark::Absent; nodes.len()];
        let mut cycles = Vec::new();

        for root in 0..nodes.len() {
            if marks[root] != Mark::Absent {
                continue;
            }
            marks[root] = Mark::InProgress;
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

            while let Some((node, pos)) = stack.last_mut() {
                let node = *node;
                if let Some(&child) = nodes[node].deps.get(*pos) {
                    *pos += 1;
                    match marks[child] {
                        Mark::Absent => {
                            marks[child] = Mark::InProgress;
                            stack.push((child, 0));
                        }
                        Mark::InProgress => cycles.push(names[child].clone()),
                        Mark::Done => {}
                    }
                } else {
                    stack.pop();
                    let mut closure = BTreeSet::new();
                    for &dep in &nodes[node].deps {
                        closure.insert(dep);
                        closure.extend(nodes[dep].closure.iter().copied());
                    }
                    nodes[node].closure = closure;
                    marks[node] = Mark::Done;
                }
            }
        }

        if cycles.is_empty() {
            Ok(Self { names, nodes })
        } else {
            Err(cycles)
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Direct dependencies in declaration order
    pub fn direct_deps(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.names.get_index_of(name)?;
        Some(self.nodes[idx].deps.iter().map(|&d| self.name(d)).collect())
    }

    /// Every asset `name` depends on, directly or transitively
    pub fn closure(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.names.get_index_of(name)?;
        Some(self.nodes[idx].closure.iter().map(|&d| self.name(d)).collect())
    }

    pub fn depends_on(&self, name: &str, dep: &str) -> bool {
        match (self.names.get_index_of(name), self.names.get_index_of(dep)) {
            (Some(n), Some(d)) => self.nodes[n].closure.contains(&d),
            _ => false,
        }
    }

    /// `name` and its closure, dependencies first, each name once
    pub fn load_order(&self, name: &str) -> Option<Vec<&str>> {
        let root = self.names.get_index_of(name)?;
        let mut seen = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        let mut stack = vec![(root, 0)];
        seen[root] = true;

        while let Some((node, pos)) = stack.last_mut() {
            let node = *node;
            if let Some(&child) = self.nodes[node].deps.get(*pos) {
                *pos += 1;
                if !seen[child] {
                    seen[child] = true;
                    stack.push((child, 0));
                }
            } else {
                stack.pop();
                order.push(self.name(node));
            }
        }
        Some(order)
    }

    fn name(&self, idx: usize) -> &str {
        self.names
            .get_index(idx)
            .map(String::as_str)
            .unwrap_or_default()
    }
}
