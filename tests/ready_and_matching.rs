// tests/ready_and_matching.rs

mod common;
use crate::common::builders::{plain_pool, task};
use crate::common::init_tracing;

use tierflow::dag::task::TaskNode;
use tierflow::dag::{TaskGraph, ready_tasks, tiers};
use tierflow::engine::{Session, SessionOptions};
use tierflow::pool::{Agent, AgentPool, capability_score, match_agent};

fn ready_ids(graph: &TaskGraph) -> Vec<String> {
    ready_tasks(graph).into_iter().map(|n| n.id.clone()).collect()
}

fn tiered(records: &[tierflow::config::TaskRecord]) -> TaskGraph {
    let mut graph = TaskGraph::from_records(records);
    tiers::compute_tiers(&mut graph);
    graph
}

fn node(id: &str, name: &str) -> TaskNode {
    TaskNode::from_record(&task(id).name(name).build())
}

#[test]
fn priority_orders_before_everything_else() {
    let graph = tiered(&[
        task("a").priority(2).hours(10.0).build(),
        task("b").priority(1).hours(1.0).build(),
    ]);
    assert_eq!(ready_ids(&graph), vec!["b", "a"]);
}

#[test]
fn longer_estimate_breaks_priority_and_tier_ties() {
    let graph = tiered(&[task("a").hours(2.0).build(), task("b").hours(5.0).build()]);
    assert_eq!(ready_ids(&graph), vec!["b", "a"]);
}

#[test]
fn id_is_the_final_tie_break() {
    let graph = tiered(&[task("c").build(), task("a").build(), task("b").build()]);
    assert_eq!(ready_ids(&graph), vec!["a", "b", "c"]);
}

#[test]
fn dangling_dependency_is_satisfied() {
    let graph = tiered(&[task("2").after("99").build()]);
    assert_eq!(ready_ids(&graph), vec!["2"]);
}

#[test]
fn parent_is_not_ready_until_children_complete() {
    let graph = tiered(&[
        task("1").build(),
        task("1.1").after("1").build(),
        task("1.2").after("1").build(),
    ]);
    assert_eq!(ready_ids(&graph), vec!["1.1", "1.2"]);
}

#[test]
fn lower_tier_goes_first_among_equal_priorities() -> tierflow::errors::Result<()> {
    init_tracing();

    // One agent so tasks run one by one.
    let records = vec![
        task("a").build(),
        task("b").after("a").build(),
        task("c").build(),
    ];
    let mut session = Session::new(&records, plain_pool(1), SessionOptions::default());

    let first = session.step()?;
    assert_eq!(first.assignments()[0].task_id, "a");
    session.resolve("a", tierflow::engine::TaskOutcome::Success)?;

    // b (tier 1) sorts before c by id, but c is tier 0.
    assert_eq!(session.ready_tasks(), vec!["c", "b"]);
    Ok(())
}

#[test]
fn default_pool_has_four_agents_with_phase_capabilities() {
    let pool = AgentPool::default_pool();
    assert_eq!(pool.len(), 4);

    let ids: Vec<&str> = pool.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["agent-1", "agent-2", "agent-3", "agent-4"]);

    let tester = pool.get("agent-2").unwrap();
    assert!(tester.capabilities.contains("testing"));
    assert!(pool.iter().all(|a| a.available && a.current_task.is_none()));
}

#[test]
fn empty_agent_config_falls_back_to_default_pool() {
    let pool = AgentPool::from_configs(&[]);
    assert_eq!(pool.len(), 4);
}

#[test]
fn capability_score_matches_substrings_both_ways() {
    let pool = AgentPool::default_pool();
    let developer = pool.get("agent-1").unwrap();
    let deployer = pool.get("agent-3").unwrap();
    let reviewer = pool.get("agent-4").unwrap();

    // Token inside capability.
    assert_eq!(capability_score("dev setup", developer), 1);
    // Capability inside token, two capabilities hit.
    assert_eq!(capability_score("deployment of release", deployer), 2);
    // Case-insensitive.
    assert_eq!(capability_score("REVIEW the code", reviewer), 1);
    assert_eq!(capability_score("paint the fence", reviewer), 0);
}

#[test]
fn best_scoring_agent_wins() {
    let pool = AgentPool::default_pool();
    let available: Vec<&Agent> = pool.iter().collect();

    let chosen = match_agent(&node("1", "Run testing suite"), &available).unwrap();
    assert_eq!(chosen.id, "agent-2");

    let chosen = match_agent(&node("2", "Deployment and release"), &available).unwrap();
    assert_eq!(chosen.id, "agent-3");
}

#[test]
fn score_ties_go_to_smallest_agent_id() {
    let b = Agent::new("b-agent", "B", ["docs"]);
    let a = Agent::new("a-agent", "A", ["docs"]);
    let available = vec![&b, &a];

    let chosen = match_agent(&node("1", "write docs"), &available).unwrap();
    assert_eq!(chosen.id, "a-agent");
}

#[test]
fn no_match_falls_back_to_first_available() {
    let b = Agent::new("b-agent", "B", ["docs"]);
    let a = Agent::new("a-agent", "A", ["docs"]);
    let available = vec![&b, &a];

    let chosen = match_agent(&node("1", "paint fence"), &available).unwrap();
    assert_eq!(chosen.id, "b-agent");
}

#[test]
fn no_available_agents_means_no_match() {
    assert!(match_agent(&node("1", "anything"), &[]).is_none());
}

#[test]
fn assignment_uses_capabilities_when_scheduling() -> tierflow::errors::Result<()> {
    let records = vec![
        task("1").name("Run testing suite").build(),
        task("2").name("Review documentation").build(),
    ];
    let mut session = Session::new(&records, AgentPool::default_pool(), SessionOptions::default());

    let step = session.step()?;
    let pairs: Vec<(&str, &str)> = step
        .assignments()
        .iter()
        .map(|a| (a.task_id.as_str(), a.agent_id.as_str()))
        .collect();
    assert_eq!(pairs, vec![("1", "agent-2"), ("2", "agent-4")]);

    assert_eq!(session.agents().available_count(), 2);
    assert_eq!(
        session.agents().get("agent-2").unwrap().current_task.as_deref(),
        Some("1")
    );
    Ok(())
}
