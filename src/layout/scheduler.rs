//! Topological scheduling of layout evaluation
//!
//! Depth-first sort with three-colour marking over an explicit stack, so deep
//! trees cannot overflow the call stack. Revisiting a node that is still in
//! progress means a cycle and aborts the sort.
//!
//! # Determinism
//!
//! Roots are taken in the order of `known`, dependencies in id order, so the
//! same graph always yields the same order.

use std::collections::HashMap;

use tracing::debug;

use crate::document::NodeId;

use super::error::LayoutError;
use super::graph::DependencyGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Order `known` so that every node follows all of its dependencies.
///
/// Dependencies outside `known` are ignored. When the viewport `00` is known
/// it is always emitted first.
pub fn sort<'a>(
    graph: &DependencyGraph,
    known: impl IntoIterator<Item = &'a NodeId>,
) -> Result<Vec<NodeId>, LayoutError> {
    let ids: Vec<NodeId> = known.into_iter().cloned().collect();
    let index: HashMap<&NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (id, i)).collect();

    let deps: Vec<Vec<usize>> = ids
        .iter()
        .map(|id| {
            graph
                .get(id)
                .map(|set| set.iter().filter_map(|d| index.get(d).copied()).collect())
                .unwrap_or_default()
        })
        .collect();

    let mut marks = vec![Mark::Unvisited; ids.len()];
    let mut order = Vec::with_capacity(ids.len());

    let viewport_first = ids.iter().position(NodeId::is_viewport);
    let starts = viewport_first.into_iter().chain(0..ids.len());

    let mut stack: Vec<(usize, usize)> = Vec::new();
    for start in starts {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        marks[start] = Mark::InProgress;
        stack.push((start, 0));

        while let Some(top) = stack.last_mut() {
            let node = top.0;
            if let Some(&dep) = deps[node].get(top.1) {
                top.1 += 1;
                match marks[dep] {
                    Mark::Unvisited => {
                        marks[dep] = Mark::InProgress;
                        stack.push((dep, 0));
                    }
                    Mark::InProgress => {
                        return Err(LayoutError::CyclicDependency {
                            node_id: ids[dep].clone(),
                        });
                    }
                    Mark::Done => {}
                }
            } else {
                marks[node] = Mark::Done;
                order.push(ids[node].clone());
                stack.pop();
            }
        }
    }

    debug!(nodes = order.len(), "scheduled layout order");
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn id(s: &str) -> NodeId {
        NodeId::parse(s).unwrap()
    }

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        edges
            .iter()
            .map(|(node, deps)| (id(node), deps.iter().map(|d| id(d)).collect::<BTreeSet<_>>()))
            .collect()
    }

    fn ids(list: &[&str]) -> Vec<NodeId> {
        list.iter().map(|s| id(s)).collect()
    }

    fn position(order: &[NodeId], node: &str) -> usize {
        order.iter().position(|n| n == &id(node)).unwrap()
    }

    #[test]
    fn test_dependencies_come_first() {
        let g = graph(&[
            ("01", &[]),
            ("0101", &["01", "0102"]),
            ("0102", &["01"]),
            ("0103", &["0101"]),
        ]);
        let known = ids(&["01", "0101", "0102", "0103"]);
        let order = sort(&g, &known).unwrap();

        for (node, deps) in &g {
            for dep in deps {
                assert!(
                    position(&order, dep.as_str()) < position(&order, node.as_str()),
                    "{} must precede {}",
                    dep,
                    node
                );
            }
        }
    }

    #[test]
    fn test_sort_is_deterministic() {
        let g = graph(&[("01", &[]), ("0101", &["0102"]), ("0102", &[]), ("0103", &["0101"])]);
        let known = ids(&["01", "0101", "0102", "0103"]);
        let first = sort(&g, &known).unwrap();
        for _ in 0..5 {
            assert_eq!(sort(&g, &known).unwrap(), first);
        }
        assert_eq!(first, ids(&["01", "0102", "0101", "0103"]));
    }

    #[test]
    fn test_two_node_cycle() {
        let g = graph(&[("0101", &["0102"]), ("0102", &["0101"])]);
        let known = ids(&["0101", "0102"]);
        match sort(&g, &known) {
            Err(LayoutError::CyclicDependency { node_id }) => {
                assert!(node_id == id("0101") || node_id == id("0102"));
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let g = graph(&[("0101", &["0101"])]);
        assert_eq!(
            sort(&g, &ids(&["0101"])),
            Err(LayoutError::CyclicDependency { node_id: id("0101") })
        );
    }

    #[test]
    fn test_viewport_forced_first() {
        let g = graph(&[("01", &[]), ("0101", &["01"])]);
        let known = ids(&["01", "0101", "00"]);
        let order = sort(&g, &known).unwrap();
        assert_eq!(order[0], NodeId::viewport());
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_unknown_dependencies_are_ignored() {
        let g = graph(&[("01", &["0199"])]);
        assert_eq!(sort(&g, &ids(&["01"])).unwrap(), ids(&["01"]));
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let mut chain = vec![id("01")];
        for _ in 0..40 {
            let next = chain.last().unwrap().child(1).unwrap();
            chain.push(next);
        }
        let g: DependencyGraph = chain
            .windows(2)
            .map(|w| (w[1].clone(), BTreeSet::from([w[0].clone()])))
            .collect();
        let mut known = chain.clone();
        known.reverse();
        assert_eq!(sort(&g, &known).unwrap(), chain);
    }
}
