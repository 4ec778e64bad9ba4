// src/dag/tiers.rs

//! Tier (dependency depth) calculation and the reporting aggregates built on
//! top of it.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::dag::graph::TaskGraph;
use crate::engine::TaskId;

/// Compute every task's tier in place.
///
/// `tier = 0` when a task has no in-graph dependencies, otherwise
/// `1 + max(tier(dep))`. Dangling dependencies do not contribute.
///
/// Callers are expected to run [`crate::dag::cycle::validate`] first; the
/// `visiting` set only keeps the recursion finite if a cycle slips through.
pub fn compute_tiers(graph: &mut TaskGraph) {
    let mut memo: HashMap<TaskId, u32> = HashMap::new();

    {
        let view: &TaskGraph = graph;
        for id in view.ids() {
            let mut visiting: HashSet<TaskId> = HashSet::new();
            tier_of(view, id, &mut memo, &mut visiting);
        }
    }

    for node in graph.nodes_mut() {
        node.tier = memo.get(&node.id).copied();
    }

    debug!(tasks = memo.len(), "computed task tiers");
}

fn tier_of(
    graph: &TaskGraph,
    id: &str,
    memo: &mut HashMap<TaskId, u32>,
    visiting: &mut HashSet<TaskId>,
) -> u32 {
    if let Some(tier) = memo.get(id) {
        return *tier;
    }

    if !visiting.insert(id.to_string()) {
        warn!(task = %id, "tier recursion re-entered a task; graph is not acyclic");
        return 0;
    }

    let tier = graph
        .in_graph_dependencies(id)
        .into_iter()
        .map(|dep| tier_of(graph, dep, memo, visiting) + 1)
        .max()
        .unwrap_or(0);

    visiting.remove(id);
    memo.insert(id.to_string(), tier);
    tier
}

/// Group task ids by tier. Tasks without a computed tier are left out.
pub fn tier_groups(graph: &TaskGraph) -> BTreeMap<u32, Vec<TaskId>> {
    let mut groups: BTreeMap<u32, Vec<TaskId>> = BTreeMap::new();
    for node in graph.nodes() {
        if let Some(tier) = node.tier {
            groups.entry(tier).or_default().push(node.id.clone());
        }
    }
    groups
}

/// Longest dependency chain: the highest tier value.
pub fn critical_path_length(groups: &BTreeMap<u32, Vec<TaskId>>) -> u32 {
    groups.keys().next_back().copied().unwrap_or(0)
}

/// Size of the largest tier group; an upper bound on useful concurrent
/// agents.
pub fn max_parallelism(groups: &BTreeMap<u32, Vec<TaskId>>) -> usize {
    groups.values().map(Vec::len).max().unwrap_or(0)
}
