//! Star graph store: nodes, undirected edges with travel attributes, and
//! the blocked-edge mechanism used by route planning.
//!
//! Edges are keyed canonically by `(min(u,v), max(u,v))`, so each
//! unordered pair has exactly one record. Blocking an edge removes it
//! from the planner's `filtered()` view but not from the topology —
//! `neighbors` still reports it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::HealthTier;

pub type NodeId = u32;

/// Fixed per-visit effects attached to a star, applied unconditionally
/// when the traveler visits.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StarEffects {
    pub life_delta_years: Option<f64>,
    pub health_set: Option<HealthTier>,
}

/// A star node. Simulation parameters are optional; missing values fall
/// back to rule-level defaults at use sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub id: NodeId,
    pub label: String,
    pub x: f64,
    pub y: f64,
    /// Visual radius — carried for the display layer, not used by the sim.
    pub radius: f64,
    pub hypergiant: bool,
    /// Years the traveler dedicates to research during a visit.
    pub research_years: Option<f64>,
    /// Years required to consume one kg of food at this star.
    pub feed_years_per_kg: Option<f64>,
    /// Energy % lost per research-year at this star.
    pub research_energy_cost_per_year_pct: Option<f64>,
    /// Optional cap on kg eaten in a single visit.
    pub max_food_kg_per_visit: Option<f64>,
    pub effects: Option<StarEffects>,
}

impl Star {
    pub fn new(id: NodeId, label: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id,
            label: label.into(),
            x,
            y,
            radius: 0.5,
            hypergiant: false,
            research_years: None,
            feed_years_per_kg: None,
            research_energy_cost_per_year_pct: None,
            max_food_kg_per_visit: None,
            effects: None,
        }
    }

    /// Euclidean distance to another star, in light-years.
    pub fn distance_to(&self, other: &Star) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.hypot(dy)
    }
}

/// Undirected edge between two stars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarEdge {
    pub u: NodeId,
    pub v: NodeId,
    pub distance_ly: f64,
    pub years_cost: f64,
    pub blocked: bool,
}

impl StarEdge {
    pub fn new(u: NodeId, v: NodeId, distance_ly: f64, years_cost: f64) -> Self {
        Self {
            u,
            v,
            distance_ly,
            years_cost,
            blocked: false,
        }
    }
}

/// Graph store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// No edge exists between the two nodes.
    EdgeNotFound(NodeId, NodeId),
    /// The node id is not in the graph.
    NodeNotFound(NodeId),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EdgeNotFound(u, v) => write!(f, "no edge between {} and {}", u, v),
            Self::NodeNotFound(id) => write!(f, "node {} not found", id),
        }
    }
}

impl std::error::Error for GraphError {}

/// The graph store. BTreeMaps keep iteration deterministic, which the
/// planners rely on for reproducible tie-breaking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StarGraph {
    stars: BTreeMap<NodeId, Star>,
    edges: BTreeMap<(NodeId, NodeId), StarEdge>,
}

fn edge_key(u: NodeId, v: NodeId) -> (NodeId, NodeId) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

impl StarGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a star; an existing star with the same id is replaced.
    pub fn add_star(&mut self, star: Star) {
        self.stars.insert(star.id, star);
    }

    pub fn star(&self, id: NodeId) -> Option<&Star> {
        self.stars.get(&id)
    }

    pub fn contains_star(&self, id: NodeId) -> bool {
        self.stars.contains_key(&id)
    }

    pub fn stars(&self) -> impl Iterator<Item = &Star> {
        self.stars.values()
    }

    pub fn stars_mut(&mut self) -> impl Iterator<Item = &mut Star> {
        self.stars.values_mut()
    }

    pub fn star_count(&self) -> usize {
        self.stars.len()
    }

    /// Insert an edge under its canonical key; last write wins.
    pub fn add_edge(&mut self, edge: StarEdge) {
        self.edges.insert(edge_key(edge.u, edge.v), edge);
    }

    pub fn edge(&self, u: NodeId, v: NodeId) -> Option<&StarEdge> {
        self.edges.get(&edge_key(u, v))
    }

    pub fn edges(&self) -> impl Iterator<Item = &StarEdge> {
        self.edges.values()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Flip the blocked flag on an edge. Returns the new value.
    /// Instantaneous and idempotent in pairs: toggling twice restores the
    /// original state.
    pub fn toggle_blocked(&mut self, u: NodeId, v: NodeId) -> Result<bool, GraphError> {
        let edge = self
            .edges
            .get_mut(&edge_key(u, v))
            .ok_or(GraphError::EdgeNotFound(u, v))?;
        edge.blocked = !edge.blocked;
        Ok(edge.blocked)
    }

    /// Adjacent node ids, blocked edges included — blocking affects
    /// planning, not topology.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &(a, b) in self.edges.keys() {
            if a == id {
                out.push(b);
            } else if b == id {
                out.push(a);
            }
        }
        out
    }

    /// A fresh copy of the graph without blocked edges. Always recomputed
    /// from current state so the latest toggles are reflected.
    pub fn filtered(&self) -> StarGraph {
        StarGraph {
            stars: self.stars.clone(),
            edges: self
                .edges
                .iter()
                .filter(|(_, e)| !e.blocked)
                .map(|(k, e)| (*k, e.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_graph() -> StarGraph {
        // 1 --- 2 --- 3, unit spacing on the x axis
        let mut g = StarGraph::new();
        g.add_star(Star::new(1, "a", 0.0, 0.0));
        g.add_star(Star::new(2, "b", 1.0, 0.0));
        g.add_star(Star::new(3, "c", 2.0, 0.0));
        g.add_edge(StarEdge::new(1, 2, 1.0, 0.05));
        g.add_edge(StarEdge::new(2, 3, 1.0, 0.05));
        g
    }

    #[test]
    fn test_edge_key_canonical() {
        let g = line_graph();
        assert!(g.edge(1, 2).is_some());
        assert!(g.edge(2, 1).is_some());
        assert_eq!(g.edge(1, 2), g.edge(2, 1));
    }

    #[test]
    fn test_add_edge_last_write_wins() {
        let mut g = line_graph();
        g.add_edge(StarEdge::new(2, 1, 9.0, 0.45));
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.edge(1, 2).unwrap().distance_ly, 9.0);
    }

    #[test]
    fn test_toggle_blocked_flips_and_reports() {
        let mut g = line_graph();
        assert_eq!(g.toggle_blocked(1, 2), Ok(true));
        assert!(g.edge(1, 2).unwrap().blocked);
        assert_eq!(g.toggle_blocked(2, 1), Ok(false));
        assert!(!g.edge(1, 2).unwrap().blocked);
    }

    #[test]
    fn test_toggle_blocked_missing_edge() {
        let mut g = line_graph();
        assert_eq!(g.toggle_blocked(1, 3), Err(GraphError::EdgeNotFound(1, 3)));
    }

    #[test]
    fn test_toggle_involutive_on_filtered_view() {
        let mut g = line_graph();
        let before = g.filtered().edge_count();
        g.toggle_blocked(1, 2).unwrap();
        assert_eq!(g.filtered().edge_count(), before - 1);
        g.toggle_blocked(1, 2).unwrap();
        assert_eq!(g.filtered().edge_count(), before);
    }

    #[test]
    fn test_neighbors_ignore_blocked() {
        let mut g = line_graph();
        g.toggle_blocked(1, 2).unwrap();
        assert_eq!(g.neighbors(2), vec![1, 3]);
    }

    #[test]
    fn test_filtered_reflects_latest_toggles() {
        let mut g = line_graph();
        g.toggle_blocked(2, 3).unwrap();
        let view = g.filtered();
        assert!(view.edge(2, 3).is_none());
        assert!(view.edge(1, 2).is_some());
        // Stars survive filtering untouched.
        assert_eq!(view.star_count(), 3);
    }

    #[test]
    fn test_distance_to() {
        let a = Star::new(1, "a", 0.0, 0.0);
        let b = Star::new(2, "b", 3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }
}
