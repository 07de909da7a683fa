//! Least-cost route planning over the star graph.
//!
//! Dijkstra over non-negative edge weights. Callers that must respect
//! blocked edges pass `graph.filtered()`; the planner itself treats every
//! edge it is given as traversable.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use crate::graph::{NodeId, StarGraph};

/// Which edge attribute drives the cost. Both are non-negative by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeWeight {
    YearsCost,
    DistanceLy,
}

/// A planned route: ordered node list plus the recomputable total weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub path: Vec<NodeId>,
    pub total_weight: f64,
}

/// Planner failure. "No path" is an expected outcome, distinguishable
/// from referencing a node that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    NodeNotFound(NodeId),
    NoPath { source: NodeId, target: NodeId },
}

impl std::fmt::Display for RouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node {} not found", id),
            Self::NoPath { source, target } => {
                write!(f, "no path from {} to {}", source, target)
            }
        }
    }
}

impl std::error::Error for RouteError {}

/// Heap entry ordered so the cheapest (cost, node) pops first. Equal
/// costs resolve to the lower node id, which keeps tie-breaking
/// deterministic.
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    cost: f64,
    node: NodeId,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the min element.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn weight_of(graph: &StarGraph, u: NodeId, v: NodeId, weight: EdgeWeight) -> Option<f64> {
    graph.edge(u, v).map(|e| match weight {
        EdgeWeight::YearsCost => e.years_cost,
        EdgeWeight::DistanceLy => e.distance_ly,
    })
}

/// Single-pair least-cost path.
///
/// `source == target` returns a single-element route with weight 0
/// without touching the graph's edges.
pub fn shortest_path(
    graph: &StarGraph,
    source: NodeId,
    target: NodeId,
    weight: EdgeWeight,
) -> Result<Route, RouteError> {
    if !graph.contains_star(source) {
        return Err(RouteError::NodeNotFound(source));
    }
    if !graph.contains_star(target) {
        return Err(RouteError::NodeNotFound(target));
    }
    if source == target {
        return Ok(Route {
            path: vec![source],
            total_weight: 0.0,
        });
    }

    let mut dist: BTreeMap<NodeId, f64> = BTreeMap::new();
    let mut prev: BTreeMap<NodeId, NodeId> = BTreeMap::new();
    let mut heap = BinaryHeap::new();

    dist.insert(source, 0.0);
    heap.push(HeapEntry {
        cost: 0.0,
        node: source,
    });

    while let Some(HeapEntry { cost, node }) = heap.pop() {
        if node == target {
            break;
        }
        // Stale entry — a cheaper route to this node was already settled.
        if cost > dist.get(&node).copied().unwrap_or(f64::INFINITY) {
            continue;
        }
        for next in graph.neighbors(node) {
            let Some(step) = weight_of(graph, node, next, weight) else {
                continue;
            };
            let candidate = cost + step;
            if candidate < dist.get(&next).copied().unwrap_or(f64::INFINITY) {
                dist.insert(next, candidate);
                prev.insert(next, node);
                heap.push(HeapEntry {
                    cost: candidate,
                    node: next,
                });
            }
        }
    }

    let Some(&total_weight) = dist.get(&target) else {
        return Err(RouteError::NoPath { source, target });
    };

    let mut path = vec![target];
    let mut cursor = target;
    while let Some(&p) = prev.get(&cursor) {
        path.push(p);
        cursor = p;
    }
    path.reverse();

    Ok(Route { path, total_weight })
}
