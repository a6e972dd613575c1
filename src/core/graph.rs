use crate::domain::model::Catalog;
use crate::domain::route::RouteTarget;
use crate::utils::error::{Result, TourError};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Imports,
    LazyLoads,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            EdgeKind::Imports => "imports",
            EdgeKind::LazyLoads => "lazy-loads",
        };
        write!(f, "{} --{}--> {}", self.from, label, self.to)
    }
}

/// Edges between catalog modules. Framework modules are left out.
#[derive(Debug, Clone)]
pub struct ModuleGraph {
    nodes: Vec<String>,
    edges: Vec<Edge>,
}

impl ModuleGraph {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let nodes: Vec<String> = catalog.modules.iter().map(|m| m.name.clone()).collect();
        let mut edges = Vec::new();

        for module in &catalog.modules {
            for import in &module.imports {
                if catalog.module(&import.module).is_some() {
                    edges.push(Edge {
                        from: module.name.clone(),
                        to: import.module.clone(),
                        kind: EdgeKind::Imports,
                    });
                }
            }
            let routes = module.routing.iter().flat_map(|r| r.routes.iter());
            for route in routes {
                if let RouteTarget::LazyModule(target) = &route.target {
                    if catalog.module(target).is_some() {
                        edges.push(Edge {
                            from: module.name.clone(),
                            to: target.clone(),
                            kind: EdgeKind::LazyLoads,
                        });
                    }
                }
            }
        }

        Self { nodes, edges }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    fn eager_targets(&self, from: &str) -> impl Iterator<Item = &str> {
        let from = from.to_string();
        self.edges
            .iter()
            .filter(move |e| e.kind == EdgeKind::Imports && e.from == from)
            .map(|e| e.to.as_str())
    }

    /// Modules ordered so each one comes after everything it imports.
    /// Among modules that are ready at the same time, catalog order wins.
    /// Module names must be unique.
    pub fn dependency_order(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = self.nodes.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(TourError::ConfigError {
                message: format!("module {} is defined more than once", duplicate),
            });
        }

        if let Some(path) = self.find_cycle() {
            return Err(TourError::ImportCycle { path });
        }

        let mut remaining: HashMap<&str, usize> = self
            .nodes
            .iter()
            .map(|n| (n.as_str(), self.eager_targets(n).count()))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while order.len() < self.nodes.len() {
            let next = self
                .nodes
                .iter()
                .find(|n| remaining.get(n.as_str()) == Some(&0))
                .ok_or_else(|| TourError::ConfigError {
                    message: format!("could not order {} module(s)", remaining.len()),
                })?;
            remaining.remove(next.as_str());
            for edge in self.edges.iter().filter(|e| e.kind == EdgeKind::Imports && &e.to == next) {
                if let Some(count) = remaining.get_mut(edge.from.as_str()) {
                    *count -= 1;
                }
            }
            order.push(next.clone());
        }

        Ok(order)
    }

    /// First eager import cycle, as `A -> B -> A`.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit<'g>(
            graph: &'g ModuleGraph,
            node: &'g str,
            marks: &mut HashMap<&'g str, Mark>,
            stack: &mut Vec<&'g str>,
        ) -> Option<Vec<String>> {
            marks.insert(node, Mark::InProgress);
            stack.push(node);

            for target in graph.eager_targets(node) {
                match marks.get(target).copied().unwrap_or(Mark::Unvisited) {
                    Mark::InProgress => {
                        let start = stack.iter().position(|n| *n == target).unwrap_or(0);
                        let mut path: Vec<String> =
                            stack[start..].iter().map(|n| n.to_string()).collect();
                        path.push(target.to_string());
                        return Some(path);
                    }
                    Mark::Unvisited => {
                        if let Some(path) = visit(graph, target, marks, stack) {
                            return Some(path);
                        }
                    }
                    Mark::Done => {}
                }
            }

            stack.pop();
            marks.insert(node, Mark::Done);
            None
        }

        let mut marks: HashMap<&str, Mark> = HashMap::new();
        for node in &self.nodes {
            if marks.get(node.as_str()).copied().unwrap_or(Mark::Unvisited) == Mark::Unvisited {
                let mut stack = Vec::new();
                if let Some(path) = visit(self, node, &mut marks, &mut stack) {
                    return Some(path);
                }
            }
        }
        None
    }

    /// One printable line per edge.
    pub fn lines(&self) -> Vec<String> {
        self.edges.iter().map(|e| e.to_string()).collect()
    }
}
