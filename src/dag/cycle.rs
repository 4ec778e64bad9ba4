// src/dag/cycle.rs

//! Acyclicity gate run before tier calculation and before any scheduling
//! decision.

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graphmap::DiGraphMap;

use crate::dag::graph::TaskGraph;
use crate::engine::TaskId;

/// Build a petgraph view of the in-graph dependency edges.
///
/// Edge direction: dep -> task. Dangling dependencies have no node and
/// therefore cannot take part in a cycle.
fn dependency_graph(graph: &TaskGraph) -> DiGraphMap<&str, ()> {
    let mut g: DiGraphMap<&str, ()> = DiGraphMap::new();

    for id in graph.ids() {
        g.add_node(id);
    }

    for node in graph.nodes() {
        for dep in graph.in_graph_dependencies(&node.id) {
            g.add_edge(dep, node.id.as_str(), ());
        }
    }

    g
}

/// Returns `true` if the dependency relation (restricted to ids in the
/// graph) is acyclic.
pub fn validate(graph: &TaskGraph) -> bool {
    !is_cyclic_directed(&dependency_graph(graph))
}

/// Returns a task id that sits on a dependency cycle, if any.
pub fn find_cycle(graph: &TaskGraph) -> Option<TaskId> {
    if let Some(node) = graph
        .nodes()
        .find(|n| n.dependencies.contains(n.id.as_str()))
    {
        return Some(node.id.clone());
    }

    match toposort(&dependency_graph(graph), None) {
        Ok(_order) => None,
        Err(cycle) => Some(cycle.node_id().to_string()),
    }
}
