use callgraph_trace::aggregator::{
    collapse_stats, CallHandle, CollapsedStack, ManualTicks, MethodCallTree, MethodRef, MethodStats,
    MethodStatsNode,
};
use callgraph_trace::utils::TraceError;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashSet;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn handle(raw: u64) -> CallHandle {
    CallHandle::new(raw).unwrap()
}

fn method(name: &str) -> MethodRef {
    MethodRef::new("App", name)
}

/// root -> A -> B (twice), root -> B (once); 100 ticks elapsed
fn traced_a_b(clock: &ManualTicks) -> MethodCallTree<&ManualTicks> {
    let (a, b) = (handle(1), handle(2));
    let mut tree = MethodCallTree::with_clock(clock);

    tree.start_method(a, &method("A"));
    tree.start_method(b, &method("B"));
    tree.finish_method(b, 10).unwrap();
    tree.start_method(b, &method("B"));
    tree.finish_method(b, 20).unwrap();
    tree.finish_method(a, 50).unwrap();
    tree.start_method(b, &method("B"));
    tree.finish_method(b, 5).unwrap();

    clock.set(100);
    tree
}

fn stats(name: Option<&str>, calls: u64, ticks: i64, percent: f64) -> MethodStats {
    MethodStats {
        method: name.map(method),
        calls,
        ticks,
        percent,
    }
}

#[test]
fn test_tree_snapshot_of_nested_calls() {
    init_logging();
    let clock = ManualTicks::new(0);
    let tree = traced_a_b(&clock);

    let snapshot = tree.snapshot_tree();
    let expected = MethodStatsNode {
        stats: stats(None, 0, 0, 100.0),
        children: vec![
            MethodStatsNode {
                stats: stats(Some("A"), 1, 50, 50.0),
                children: vec![MethodStatsNode {
                    stats: stats(Some("B"), 2, 30, 30.0),
                    children: vec![],
                }],
            },
            MethodStatsNode {
                stats: stats(Some("B"), 1, 5, 5.0),
                children: vec![],
            },
        ],
    };
    assert_eq!(snapshot, expected);
}

#[test]
fn test_flat_snapshot_uses_self_ticks() {
    init_logging();
    let clock = ManualTicks::new(0);
    let tree = traced_a_b(&clock);

    let list = tree.stats_as_list(100);
    assert_eq!(
        list,
        vec![
            stats(None, 1, 45, 45.0),
            stats(Some("B"), 3, 35, 35.0),
            stats(Some("A"), 1, 20, 20.0),
        ]
    );
    assert_eq!(list.iter().map(|s| s.ticks).sum::<i64>(), 100);
}

#[test]
fn test_child_outlasting_parent_gives_negative_self_ticks() {
    init_logging();
    let clock = ManualTicks::new(0);
    let mut tree = MethodCallTree::with_clock(&clock);
    tree.start_method(handle(1), &method("A"));
    tree.start_method(handle(2), &method("B"));
    tree.finish_method(handle(2), 100).unwrap();
    tree.finish_method(handle(1), 50).unwrap();
    clock.set(200);

    let list = tree.stats_as_list(200);
    assert_eq!(
        list,
        vec![
            stats(None, 1, 150, 75.0),
            stats(Some("B"), 1, 100, 50.0),
            stats(Some("A"), 1, -50, -25.0),
        ]
    );
    assert_eq!(list.iter().map(|s| s.ticks).sum::<i64>(), 200);

    let snapshot = tree.snapshot_tree();
    assert_eq!(snapshot.children[0].stats, stats(Some("A"), 1, 50, 25.0));
    assert_eq!(
        snapshot.children[0].children[0].stats,
        stats(Some("B"), 1, 100, 50.0)
    );

    // collapsed stacks clamp the negative self time
    assert_eq!(
        collapse_stats(&snapshot),
        vec![
            CollapsedStack::new("App.A;App.B".to_string(), 100),
            CollapsedStack::new("App.A".to_string(), 0),
        ]
    );
}

#[test]
fn test_generic_instantiations_merge_in_flat_form() {
    init_logging();
    let definition = MethodRef::new("App.Cache", "Get").with_generic_parameters(["T"]);
    let of_int = definition.instantiate(["int"]);
    let of_string = definition.instantiate(["string"]);

    let mut tree = MethodCallTree::with_clock(ManualTicks::new(0));
    tree.start_method(handle(10), &of_int);
    tree.finish_method(handle(10), 7).unwrap();
    tree.start_method(handle(11), &of_string);
    tree.finish_method(handle(11), 3).unwrap();

    let snapshot = tree.stats_as_tree(10);
    assert_eq!(snapshot.children.len(), 2);

    let list = tree.stats_as_list(10);
    let merged: Vec<&MethodStats> = list.iter().filter(|s| s.method.is_some()).collect();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].method.as_ref(), Some(&definition));
    assert_eq!(merged[0].calls, 2);
    assert_eq!(merged[0].ticks, 10);
}

#[test]
fn test_balanced_trace_returns_to_root() {
    init_logging();
    let mut tree = MethodCallTree::with_clock(ManualTicks::new(0));
    let mut seed: u64 = 0x2545_F491;
    let mut stack: Vec<CallHandle> = Vec::new();
    let mut finishes = 0u64;

    for _ in 0..2000 {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let push = stack.is_empty() || (stack.len() < 12 && (seed >> 33) % 3 != 0);
        if push {
            let callee = handle((seed >> 40) % 17 + 1);
            tree.start_method(callee, &MethodRef::new("App", format!("M{}", callee.get())));
            stack.push(callee);
        } else if let Some(callee) = stack.pop() {
            tree.finish_method(callee, 1).unwrap();
            finishes += 1;
        }
    }
    while let Some(callee) = stack.pop() {
        tree.finish_method(callee, 1).unwrap();
        finishes += 1;
    }

    assert!(tree.is_at_root());
    assert_eq!(recorded_calls(&tree), finishes);
}

fn recorded_calls(tree: &MethodCallTree<ManualTicks>) -> u64 {
    let mut total = 0;
    let mut pending = vec![tree.root()];
    while let Some(id) = pending.pop() {
        total += tree.node(id).map_or(0, |node| node.calls());
        pending.extend(tree.children(id));
    }
    total
}

#[test]
fn test_child_tables_never_hold_two_handles_in_one_slot() {
    init_logging();
    let mut tree = MethodCallTree::with_clock(ManualTicks::new(0));
    let raw: Vec<u64> = (1..=64u64).map(|i| i * 24).collect();
    for key in &raw {
        tree.start_method(handle(*key), &MethodRef::new("App", format!("M{}", key)));
        tree.finish_method(handle(*key), 1).unwrap();
    }

    let slots = tree.table_slots(tree.root());
    let len = slots.len() as u64;
    let stored: Vec<CallHandle> = slots.iter().flatten().copied().collect();
    assert_eq!(stored.len(), raw.len());
    assert_eq!(stored.iter().collect::<HashSet<_>>().len(), raw.len());
    for (index, slot) in slots.iter().enumerate() {
        if let Some(h) = slot {
            assert_eq!(h.get() % len, index as u64);
        }
    }
    assert_eq!(tree.children(tree.root()).count(), raw.len());
}

#[test]
fn test_clear_keeps_tree_shape() {
    init_logging();
    let clock = ManualTicks::new(0);
    let mut tree = traced_a_b(&clock);
    let nodes_before = tree.node_count();
    let slots_before = tree.table_slots(tree.root());

    clock.set(500);
    tree.clear_stats();

    assert_eq!(tree.node_count(), nodes_before);
    assert_eq!(tree.table_slots(tree.root()), slots_before);
    assert_eq!(tree.children(tree.root()).count(), 0);
    assert_eq!(tree.stats_as_list(500), vec![stats(None, 1, 0, 0.0)]);

    let a = tree.start_method(handle(1), &method("A"));
    tree.finish_method(handle(1), 8).unwrap();
    assert_eq!(tree.node_count(), nodes_before);
    assert_eq!(tree.node(a).unwrap().calls(), 1);
    assert_eq!(tree.stats_as_tree(510).children[0].stats.percent, 80.0);
}

#[test]
fn test_out_of_order_finish_is_rejected() {
    init_logging();
    let mut tree = MethodCallTree::with_clock(ManualTicks::new(0));
    tree.start_method(handle(1), &method("A"));
    tree.start_method(handle(2), &method("B"));

    let err = tree.finish_method(handle(1), 3).unwrap_err();
    assert_eq!(
        err,
        TraceError::NestingMismatch {
            expected: Some(handle(2)),
            actual: handle(1),
        }
    );
    assert!(err.to_string().contains("0x1"));
}

#[test]
fn test_root_percent_with_no_elapsed_time() {
    let tree = MethodCallTree::with_clock(ManualTicks::new(5));
    let snapshot = tree.stats_as_tree(5);
    assert_eq!(snapshot.stats.percent, 100.0);
    assert!(snapshot.children.is_empty());
}

#[test]
fn test_snapshot_serializes_to_json() {
    let clock = ManualTicks::new(0);
    let mut tree = MethodCallTree::with_clock(&clock);
    tree.start_method(handle(1), &method("Run"));
    tree.finish_method(handle(1), 40).unwrap();

    let value = serde_json::to_value(tree.stats_as_tree(80)).unwrap();
    assert_eq!(
        value,
        json!({
            "stats": { "method": null, "calls": 0, "ticks": 0, "percent": 100.0 },
            "children": [{
                "stats": {
                    "method": { "declaring_type": "App", "name": "Run" },
                    "calls": 1,
                    "ticks": 40,
                    "percent": 50.0
                },
                "children": []
            }]
        })
    );

    let list: Vec<MethodStats> =
        serde_json::from_str(&serde_json::to_string(&tree.stats_as_list(80)).unwrap()).unwrap();
    assert_eq!(list.len(), 2);
}

#[test]
fn test_collapsed_stacks_from_tree() {
    let clock = ManualTicks::new(0);
    let tree = traced_a_b(&clock);

    let stacks = collapse_stats(&tree.snapshot_tree());
    assert_eq!(
        stacks,
        vec![
            CollapsedStack::new("App.A;App.B".to_string(), 30),
            CollapsedStack::new("App.A".to_string(), 20),
            CollapsedStack::new("App.B".to_string(), 5),
        ]
    );
}
