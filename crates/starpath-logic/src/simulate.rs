//! Replay a full route through the effect engine, alternating travel and
//! visit at each hop.

use rand::Rng;

use crate::graph::{NodeId, StarGraph};
use crate::rules::Rules;
use crate::state::{SimEvent, Traveler};
use crate::travel::travel;
use crate::visit::visit;

/// Outcome of replaying a route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteReplay {
    pub final_state: Traveler,
    /// Total light-years across traversed edges.
    pub sum_ly: f64,
    /// Total precomputed years-cost across traversed edges.
    pub sum_years: f64,
    pub events: Vec<SimEvent>,
}

/// Walk the traveler along `route`, applying travel then visit at each
/// node. An unpositioned traveler is placed at the first node free of
/// charge. Stops early once the traveler dies; missing edges contribute
/// no travel effects (scenario data may be partial).
pub fn simulate_route(
    state: &Traveler,
    route: &[NodeId],
    graph: &StarGraph,
    rules: &Rules,
    rng: &mut impl Rng,
) -> RouteReplay {
    let mut s = state.clone();
    let mut events = Vec::new();
    let mut sum_ly = 0.0;
    let mut sum_years = 0.0;

    let mut start_idx = 0;
    if s.position.is_none() {
        if let Some(&first) = route.first() {
            s.position = Some(first);
            start_idx = 1;
        }
    }

    for &next in &route[start_idx.min(route.len())..] {
        if s.is_dead() {
            break;
        }
        let here = s.position;

        if let Some(u) = here {
            if u != next {
                if let Some(edge) = graph.edge(u, next) {
                    sum_ly += edge.distance_ly;
                    sum_years += edge.years_cost;
                    let (after, evs) = travel(&s, edge, rules);
                    events.extend(evs);
                    s = after;
                    s.position = Some(next);
                    if s.is_dead() {
                        break;
                    }
                }
            }
        }

        if let Some(star) = graph.star(next) {
            let (after, evs) = visit(&s, star, rules, rng, None);
            events.extend(evs);
            s = after;
        }
    }

    RouteReplay {
        final_state: s,
        sum_ly,
        sum_years,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Star, StarEdge};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line_graph(n: u32) -> StarGraph {
        let mut g = StarGraph::new();
        for i in 1..=n {
            let mut star = Star::new(i, format!("s{}", i), i as f64, 0.0);
            star.research_years = Some(0.0);
            star.feed_years_per_kg = Some(1.0);
            g.add_star(star);
        }
        for i in 1..n {
            g.add_edge(StarEdge::new(i, i + 1, 1.0, 0.05));
        }
        g
    }

    fn rules() -> Rules {
        let mut rules = Rules::default();
        rules.energy.energy_cost_per_ly_pct = 0.5;
        rules
    }

    #[test]
    fn test_replay_line_accumulates_costs() {
        let g = line_graph(4);
        let mut start = Traveler::new(None, 100.0, 100.0);
        start.food_kg = 10.0;
        let mut rng = StdRng::seed_from_u64(1);
        let replay = simulate_route(&start, &[1, 2, 3, 4], &g, &rules(), &mut rng);

        assert_eq!(replay.final_state.position, Some(4));
        // Placement at node 1 is free and does not count as a visit.
        assert_eq!(replay.final_state.visited_count(), 3);
        assert!((replay.sum_ly - 3.0).abs() < 1e-12);
        assert!((replay.sum_years - 0.15).abs() < 1e-12);
        // 3 ly × 0.05 = 0.15 life-years spent on travel, research is 0.
        assert!((replay.final_state.life_years_left - 99.85).abs() < 1e-9);
    }

    #[test]
    fn test_unpositioned_traveler_placed_without_penalty() {
        let g = line_graph(2);
        let start = Traveler::new(None, 10.0, 100.0);
        let mut rng = StdRng::seed_from_u64(1);
        let replay = simulate_route(&start, &[1], &g, &rules(), &mut rng);
        // Placement costs nothing and is not itself a visit.
        assert_eq!(replay.final_state.position, Some(1));
        assert_eq!(replay.final_state.life_years_left, 10.0);
        assert_eq!(replay.sum_ly, 0.0);
        assert!(replay.final_state.visited.is_empty());
    }

    #[test]
    fn test_visit_current_node_without_travel() {
        let g = line_graph(2);
        let start = Traveler::new(Some(1), 10.0, 100.0);
        let mut rng = StdRng::seed_from_u64(1);
        let replay = simulate_route(&start, &[1], &g, &rules(), &mut rng);
        assert_eq!(replay.sum_ly, 0.0);
        assert!(replay.final_state.visited.contains(&1));
    }

    #[test]
    fn test_replay_stops_at_death() {
        let g = line_graph(4);
        let start = Traveler::new(Some(1), 0.07, 100.0);
        let mut rng = StdRng::seed_from_u64(1);
        let replay = simulate_route(&start, &[2, 3, 4], &g, &rules(), &mut rng);
        // First hop costs 0.05y, second kills mid-travel.
        assert!(replay.final_state.is_dead());
        assert!(replay.final_state.visited_count() <= 2);
        assert!(replay
            .events
            .contains(&SimEvent::DiedDuringTravel));
    }

    #[test]
    fn test_empty_route_is_noop() {
        let g = line_graph(2);
        let start = Traveler::new(Some(1), 10.0, 100.0);
        let mut rng = StdRng::seed_from_u64(1);
        let replay = simulate_route(&start, &[], &g, &rules(), &mut rng);
        assert_eq!(replay.final_state, start);
        assert!(replay.events.is_empty());
    }
}
