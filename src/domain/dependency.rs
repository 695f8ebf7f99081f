//! Dependency graph over ticket IDs: cycle detection and ordering.

use anyhow::{anyhow, bail, Result};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::ticket::Ticket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Directed graph where an edge `A -> B` means A depends on B.
///
/// Nodes keep their insertion order so every traversal is deterministic.
/// Edges to IDs that are not nodes are dropped.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<String>,
    edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Build from `(id, dependencies)` pairs. The first entry for an ID wins.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let entries: Vec<_> = entries.into_iter().collect();
        let known: HashSet<&str> = entries.iter().map(|(id, _)| id.as_str()).collect();

        let mut nodes = Vec::new();
        let mut edges = HashMap::new();
        for (id, deps) in &entries {
            if edges.contains_key(id) {
                continue;
            }
            let deps: Vec<String> = deps
                .iter()
                .filter(|dep| known.contains(dep.as_str()))
                .cloned()
                .collect();
            nodes.push(id.clone());
            edges.insert(id.clone(), deps);
        }

        Self { nodes, edges }
    }

    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        Self::new(
            tickets
                .iter()
                .map(|t| (t.id().to_string(), t.base().dependencies.clone())),
        )
    }

    pub fn contains(&self, id: &str) -> bool {
        self.edges.contains_key(id)
    }

    pub fn dependencies_of(&self, id: &str) -> &[String] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// IDs that list `id` as a dependency, in node order.
    pub fn dependents_of(&self, id: &str) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|node| self.dependencies_of(node).iter().any(|dep| dep == id))
            .map(String::as_str)
            .collect()
    }

    /// Every cycle closed by a back edge, each as a path whose first ID is
    /// repeated at the end (`A -> B -> C -> A`).
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut state = HashMap::new();
        let mut path = Vec::new();

        for node in &self.nodes {
            if !state.contains_key(node.as_str()) {
                self.cycle_dfs(node, &mut state, &mut path, &mut cycles);
            }
        }

        cycles
    }

    fn cycle_dfs<'a>(
        &'a self,
        node: &'a str,
        state: &mut HashMap<&'a str, Visit>,
        path: &mut Vec<&'a str>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        state.insert(node, Visit::InProgress);
        path.push(node);

        for dep in self.dependencies_of(node) {
            match state.get(dep.as_str()).copied() {
                None => self.cycle_dfs(dep, state, path, cycles),
                Some(Visit::InProgress) => {
                    if let Some(start) = path.iter().position(|id| *id == dep) {
                        let mut cycle: Vec<String> =
                            path[start..].iter().map(|id| id.to_string()).collect();
                        cycle.push(dep.clone());
                        cycles.push(cycle);
                    }
                }
                Some(Visit::Done) => {}
            }
        }

        path.pop();
        state.insert(node, Visit::Done);
    }

    /// All IDs with dependencies before their dependents.
    ///
    /// Among IDs that are ready at the same time, node order is kept.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        if let Some(cycle) = self.detect_cycles().first() {
            bail!("Circular dependency detected: {}", cycle.join(" -> "));
        }

        let mut in_degree: HashMap<&str, usize> = self
            .nodes
            .iter()
            .map(|id| (id.as_str(), self.dependencies_of(id).len()))
            .collect();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for id in &self.nodes {
            for dep in self.dependencies_of(id) {
                dependents.entry(dep.as_str()).or_default().push(id.as_str());
            }
        }

        let mut queue: VecDeque<&str> = self
            .nodes
            .iter()
            .map(String::as_str)
            .filter(|id| in_degree.get(id) == Some(&0))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(id) = queue.pop_front() {
            order.push(id.to_string());
            for dependent in dependents.get(id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(*dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*dependent);
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            return Err(anyhow!(
                "Dependency order is incomplete: {} of {} tickets ordered",
                order.len(),
                self.nodes.len()
            ));
        }
        Ok(order)
    }

    /// `id` and everything it transitively depends on, dependencies first.
    pub fn dependency_closure(&self, id: &str) -> Result<Vec<String>> {
        if !self.contains(id) {
            bail!("Ticket not found: {}", id);
        }

        let mut state = HashMap::new();
        let mut path = Vec::new();
        let mut order = Vec::new();
        self.closure_dfs(id, &mut state, &mut path, &mut order)?;
        Ok(order)
    }

    fn closure_dfs<'a>(
        &'a self,
        node: &'a str,
        state: &mut HashMap<&'a str, Visit>,
        path: &mut Vec<&'a str>,
        order: &mut Vec<String>,
    ) -> Result<()> {
        state.insert(node, Visit::InProgress);
        path.push(node);

        for dep in self.dependencies_of(node) {
            match state.get(dep.as_str()).copied() {
                None => self.closure_dfs(dep, state, path, order)?,
                Some(Visit::InProgress) => {
                    let start = path.iter().position(|id| *id == dep).unwrap_or(0);
                    let mut cycle: Vec<&str> = path[start..].to_vec();
                    cycle.push(dep.as_str());
                    bail!("Circular dependency detected: {}", cycle.join(" -> "));
                }
                Some(Visit::Done) => {}
            }
        }

        path.pop();
        state.insert(node, Visit::Done);
        order.push(node.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(entries: &[(&str, &[&str])]) -> DependencyGraph {
        DependencyGraph::new(entries.iter().map(|(id, deps)| {
            (
                id.to_string(),
                deps.iter().map(|d| d.to_string()).collect(),
            )
        }))
    }

    fn pos(order: &[String], id: &str) -> usize {
        order.iter().position(|x| x == id).unwrap()
    }

    #[test]
    fn test_detect_cycles_no_cycles() {
        let g = graph(&[
            ("TSK-0001", &[]),
            ("TSK-0002", &["TSK-0001"]),
            ("TSK-0003", &["TSK-0002"]),
        ]);
        assert!(g.detect_cycles().is_empty());
    }

    #[test]
    fn test_detect_cycles_three_node() {
        let g = graph(&[("A", &["B"]), ("B", &["C"]), ("C", &["A"])]);
        let cycles = g.detect_cycles();
        assert_eq!(cycles, vec![vec!["A", "B", "C", "A"]]);
    }

    #[test]
    fn test_detect_cycles_self_reference() {
        let g = graph(&[("A", &["A"])]);
        assert_eq!(g.detect_cycles(), vec![vec!["A", "A"]]);
    }

    #[test]
    fn test_detect_cycles_reports_each_back_edge() {
        let g = graph(&[("A", &["B"]), ("B", &["A", "C"]), ("C", &["B"])]);
        let cycles = g.detect_cycles();
        assert_eq!(cycles.len(), 2);
        assert!(cycles.contains(&vec!["A".to_string(), "B".to_string(), "A".to_string()]));
        assert!(cycles.contains(&vec!["B".to_string(), "C".to_string(), "B".to_string()]));
    }

    #[test]
    fn test_dangling_dependencies_are_skipped() {
        let g = graph(&[("A", &["MISSING"]), ("B", &["A"])]);
        assert!(g.detect_cycles().is_empty());
        assert!(g.dependencies_of("A").is_empty());
        assert_eq!(g.topological_order().unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_topological_order_linear_chain() {
        let g = graph(&[("A", &["B"]), ("B", &["C"]), ("C", &[])]);
        assert_eq!(g.topological_order().unwrap(), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_topological_order_diamond() {
        let g = graph(&[
            ("A", &["B", "C"]),
            ("B", &["D"]),
            ("C", &["D"]),
            ("D", &[]),
        ]);
        let order = g.topological_order().unwrap();
        assert_eq!(order.len(), 4);
        assert!(pos(&order, "D") < pos(&order, "B"));
        assert!(pos(&order, "D") < pos(&order, "C"));
        assert!(pos(&order, "B") < pos(&order, "A"));
        assert!(pos(&order, "C") < pos(&order, "A"));
    }

    #[test]
    fn test_topological_order_keeps_input_order_for_independent() {
        let g = graph(&[("Z", &[]), ("M", &[]), ("A", &[])]);
        assert_eq!(g.topological_order().unwrap(), vec!["Z", "M", "A"]);
    }

    #[test]
    fn test_topological_order_cycle_error() {
        let g = graph(&[("A", &["B"]), ("B", &["A"])]);
        let err = g.topological_order().unwrap_err();
        assert!(err.to_string().contains("Circular dependency detected: A -> B -> A"));
    }

    #[test]
    fn test_topological_order_empty() {
        assert!(graph(&[]).topological_order().unwrap().is_empty());
    }

    #[test]
    fn test_dependency_closure() {
        let g = graph(&[
            ("A", &["B", "C"]),
            ("B", &["D"]),
            ("C", &[]),
            ("D", &[]),
            ("E", &["A"]),
        ]);
        assert_eq!(g.dependency_closure("A").unwrap(), vec!["D", "B", "C", "A"]);
        assert_eq!(g.dependency_closure("C").unwrap(), vec!["C"]);
        assert!(g.dependency_closure("X").is_err());
    }

    #[test]
    fn test_dependency_closure_cycle() {
        let g = graph(&[("A", &["B"]), ("B", &["C"]), ("C", &["B"])]);
        let err = g.dependency_closure("A").unwrap_err();
        assert!(err.to_string().contains("B -> C -> B"));
    }

    #[test]
    fn test_dependents_of() {
        let g = graph(&[("A", &["C"]), ("B", &["C"]), ("C", &[])]);
        assert_eq!(g.dependents_of("C"), vec!["A", "B"]);
        assert!(g.dependents_of("A").is_empty());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let g = graph(&[("A", &["B"]), ("B", &[]), ("A", &[])]);
        assert_eq!(g.dependencies_of("A"), &["B".to_string()]);
    }
}
