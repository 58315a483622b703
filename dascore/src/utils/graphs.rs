//! Graph routines on top of `petgraph`.

use petgraph::graph::{IndexType, NodeIndex};
use petgraph::prelude::*;
use petgraph::visit::{depth_first_search, Control, DfsEvent};

/// Finds a simple cycle going through `start`, listed from `start` along the edges.
///
/// Returns `None` if `start` is not on any cycle.
pub fn find_any_cycle<N, E, Ix: IndexType>(
    graph: &DiGraph<N, E, Ix>,
    start: NodeIndex<Ix>,
) -> Option<Vec<NodeIndex<Ix>>> {
    let mut predecessor = vec![None; graph.node_count()];
    let mut closed = false;

    depth_first_search(graph, Some(start), |event| match event {
        DfsEvent::TreeEdge(from, to) => {
            predecessor[to.index()] = Some(from);
            Control::<()>::Continue
        }
        DfsEvent::BackEdge(from, to) if to == start => {
            predecessor[start.index()] = Some(from);
            closed = true;
            Control::Break(())
        }
        _ => Control::Continue,
    });
    if !closed {
        return None;
    }

    let mut cycle = vec![start];
    let mut node = predecessor[start.index()]?;
    while node != start {
        cycle.push(node);
        node = predecessor[node.index()]?;
    }
    cycle[1..].reverse();
    Some(cycle)
}

#[cfg(test)]
mod tests {
    use super::find_any_cycle;
    use petgraph::graph::node_index as n;
    use petgraph::prelude::*;

    #[test]
    fn cycle_starts_at_the_given_node() {
        let graph: Graph<(), ()> = Graph::from_edges(&[(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(find_any_cycle(&graph, n(2)), Some(vec![n(2), n(3), n(0), n(1)]));
    }

    #[test]
    fn other_cycles_are_ignored() {
        let graph: Graph<(), ()> = Graph::from_edges(&[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]);
        assert_eq!(find_any_cycle(&graph, n(3)), Some(vec![n(3), n(4), n(5)]));
        let graph: Graph<(), ()> = Graph::from_edges(&[(0, 1), (1, 2), (2, 1)]);
        assert_eq!(find_any_cycle(&graph, n(0)), None);
    }

    #[test]
    fn self_loops_and_acyclic_graphs() {
        let graph: Graph<(), ()> = Graph::from_edges(&[(0, 1), (1, 1)]);
        assert_eq!(find_any_cycle(&graph, n(1)), Some(vec![n(1)]));
        let graph: Graph<(), ()> = Graph::from_edges(&[(0, 1), (0, 2), (1, 2)]);
        assert_eq!(find_any_cycle(&graph, n(0)), None);
    }
}
