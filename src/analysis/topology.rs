use crate::store::{OperationId, Registry};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};

/// Orders live operations so that every producer appears before its consumers.
///
/// Dependencies flow from an operation to the operations consuming one of its
/// exposed output values. On a cycle, returns the operations taking part in it.
pub fn sort(registry: &Registry) -> Result<Vec<OperationId>, Vec<OperationId>> {
    let count = registry.operation_slots();
    let mut order = Vec::with_capacity(count);
    let mut state = vec![VisitState::None; count];

    // Visit every slot so disconnected operations are included too.
    for op in registry.operations().map(|op| op.id) {
        if state[op.index()] == VisitState::None {
            visit(op, registry, &mut state, &mut order)?;
        }
    }

    Ok(order)
}

#[derive(Clone, PartialEq, Eq)]
enum VisitState {
    None,
    Visiting,
    Visited,
}

fn visit(
    op: OperationId,
    registry: &Registry,
    state: &mut Vec<VisitState>,
    order: &mut Vec<OperationId>,
) -> Result<(), Vec<OperationId>> {
    match state[op.index()] {
        VisitState::Visited => return Ok(()),
        VisitState::Visiting => {
            return Err(cycles(registry).into_iter().find(|c| c.contains(&op)).unwrap_or_else(|| vec![op]))
        }
        VisitState::None => state[op.index()] = VisitState::Visiting,
    }

    for upstream in registry.upstream_of(op) {
        visit(upstream, registry, state, order)?;
    }

    state[op.index()] = VisitState::Visited;
    order.push(op);
    Ok(())
}

/// Builds the producer -> consumer graph over live operations.
pub fn dependency_graph(registry: &Registry) -> (DiGraph<OperationId, ()>, HashMap<OperationId, NodeIndex>) {
    let mut graph = DiGraph::new();
    let nodes: HashMap<OperationId, NodeIndex> =
        registry.operations().map(|op| (op.id, graph.add_node(op.id))).collect();

    for op in registry.operations() {
        for upstream in registry.upstream_of(op.id) {
            if let (Some(&from), Some(&to)) = (nodes.get(&upstream), nodes.get(&op.id)) {
                graph.add_edge(from, to, ());
            }
        }
    }
    (graph, nodes)
}

/// Every dependency cycle, each listed in ascending id order.
///
/// An operation consuming its own output forms a cycle of one.
pub fn cycles(registry: &Registry) -> Vec<Vec<OperationId>> {
    let (graph, _) = dependency_graph(registry);
    let mut found: Vec<Vec<OperationId>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut ops: Vec<OperationId> = scc.into_iter().map(|n| graph[n]).collect();
            ops.sort();
            ops
        })
        .collect();
    found.sort();
    found
}

/// Identifies `start_ops` and every operation downstream of them.
/// Used for incremental invalidation.
pub fn downstream_from(registry: &Registry, start_ops: &[OperationId]) -> HashSet<OperationId> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from(start_ops.to_vec());

    while let Some(op) = queue.pop_front() {
        if visited.insert(op) {
            for output in registry.outputs_of(op) {
                queue.extend(registry.consumers_of(output));
            }
        }
    }
    visited
}
