//! Bounded-width best-first itinerary search.
//!
//! Explores forward from a start state, expanding each beam member to its
//! unvisited neighbors, running travel + visit per expansion, and keeping
//! the best `beam_width` unique candidates per round. The objective is
//! stars visited before death, not reaching a target alive — states that
//! die mid-expansion stay in the candidate pool so their partial progress
//! can win.
//!
//! Blocked edges: pass `graph.filtered()` to respect them; the search
//! expands over whatever edges the given graph contains.

use std::cmp::Ordering;
use std::collections::HashMap;

use rand::Rng;

use crate::graph::{NodeId, StarGraph};
use crate::rules::Rules;
use crate::state::Traveler;
use crate::travel::travel;
use crate::visit::visit;

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The start state was already dead; nothing was expanded.
    StartDead,
    /// A round produced no expansions (every beam member is a dead end).
    NoCandidates,
    /// Every surviving beam member is dead.
    AllDead,
    MaxDepthReached,
}

/// Search knobs. `from_rules` pulls the scenario's planning defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamParams {
    pub beam_width: usize,
    pub max_depth: usize,
    pub avoid_revisit: bool,
    /// Decimal places used when rounding resources for deduplication.
    pub dedup_precision: u32,
}

impl Default for BeamParams {
    fn default() -> Self {
        Self {
            beam_width: 12,
            max_depth: 50,
            avoid_revisit: true,
            dedup_precision: 2,
        }
    }
}

impl BeamParams {
    pub fn from_rules(rules: &Rules) -> Self {
        Self {
            beam_width: rules.planning.beam_width,
            max_depth: rules.planning.max_depth,
            avoid_revisit: rules.planning.avoid_revisit,
            dedup_precision: 2,
        }
    }
}

/// Search result metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamMeta {
    pub final_state: Traveler,
    pub visited_count: usize,
    pub expansions: usize,
    pub depth_reached: usize,
    pub reason_stop: StopReason,
}

/// Lexicographic score, all components maximized.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Score {
    visited: usize,
    life: f64,
    energy: f64,
}

impl Score {
    fn of(state: &Traveler) -> Self {
        Self {
            visited: state.visited_count(),
            life: state.life_years_left,
            energy: state.energy_pct,
        }
    }

    fn cmp(&self, other: &Self) -> Ordering {
        self.visited
            .cmp(&other.visited)
            .then_with(|| self.life.total_cmp(&other.life))
            .then_with(|| self.energy.total_cmp(&other.energy))
    }
}

/// Rounded dedup key. Resources are held as scaled integers so equality
/// and hashing are exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Fingerprint {
    node: NodeId,
    visited: Vec<NodeId>,
    life: i64,
    energy: i64,
    food: i64,
}

fn fingerprint(state: &Traveler, node: NodeId, precision: u32) -> Fingerprint {
    let scale = 10f64.powi(precision as i32);
    let q = |x: f64| (x * scale).round() as i64;
    Fingerprint {
        node,
        visited: state.visited.iter().copied().collect(),
        life: q(state.life_years_left),
        energy: q(state.energy_pct),
        food: q(state.food_kg),
    }
}

struct Candidate {
    score: Score,
    order: usize,
    state: Traveler,
    path: Vec<NodeId>,
}

/// Search for the itinerary that visits the most stars before death.
///
/// Returns the best path found (starting at the start node) and metadata
/// including the final state of that path, total expansion count, depth
/// reached, and the stop reason. The best-ever state across all rounds
/// wins, not the last round's best — a shallower itinerary may beat
/// deeper ones that die early.
pub fn beam_search(
    start: &Traveler,
    graph: &StarGraph,
    rules: &Rules,
    params: &BeamParams,
    rng: &mut impl Rng,
) -> (Vec<NodeId>, BeamMeta) {
    if start.is_dead() {
        return (
            Vec::new(),
            BeamMeta {
                final_state: start.clone(),
                visited_count: 0,
                expansions: 0,
                depth_reached: 0,
                reason_stop: StopReason::StartDead,
            },
        );
    }
    let Some(start_node) = start.position else {
        // Unplaced traveler: nothing to expand from.
        return (
            Vec::new(),
            BeamMeta {
                final_state: start.clone(),
                visited_count: 0,
                expansions: 0,
                depth_reached: 0,
                reason_stop: StopReason::NoCandidates,
            },
        );
    };

    let mut root = start.clone();
    root.mark_visited(start_node);

    let mut best_score = Score::of(&root);
    let mut best_state = root.clone();
    let mut best_path = vec![start_node];

    let mut beam: Vec<(Traveler, Vec<NodeId>)> = vec![(root, vec![start_node])];
    let mut expansions = 0usize;
    let mut depth_reached = 0usize;
    let mut reason = StopReason::MaxDepthReached;

    for depth in 1..=params.max_depth {
        depth_reached = depth;
        let mut candidates: Vec<Candidate> = Vec::new();

        for (state, path) in &beam {
            if state.is_dead() {
                continue;
            }
            let Some(u) = state.position else {
                continue;
            };
            for v in graph.neighbors(u) {
                if params.avoid_revisit && state.visited.contains(&v) {
                    continue;
                }
                let Some(edge) = graph.edge(u, v) else {
                    continue;
                };
                expansions += 1;

                let (mut moved, _) = travel(state, edge, rules);
                moved.position = Some(v);

                let arrived = if moved.is_dead() {
                    // Died en route; still a valid terminal candidate.
                    moved
                } else {
                    match graph.star(v) {
                        Some(star) => visit(&moved, star, rules, rng, None).0,
                        None => moved,
                    }
                };

                let mut new_path = path.clone();
                new_path.push(v);
                candidates.push(Candidate {
                    score: Score::of(&arrived),
                    order: expansions,
                    state: arrived,
                    path: new_path,
                });
            }
        }

        if candidates.is_empty() {
            reason = StopReason::NoCandidates;
            break;
        }

        // Deduplicate by rounded fingerprint, keeping the better score.
        let mut unique: HashMap<Fingerprint, Candidate> = HashMap::new();
        for cand in candidates {
            let node = cand.state.position.unwrap_or(start_node);
            let key = fingerprint(&cand.state, node, params.dedup_precision);
            match unique.get(&key) {
                Some(prev) if cand.score.cmp(&prev.score) != Ordering::Greater => {}
                _ => {
                    unique.insert(key, cand);
                }
            }
        }

        let mut survivors: Vec<Candidate> = unique.into_values().collect();
        // Score descending; discovery order as the final, deterministic key.
        survivors.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.order.cmp(&b.order)));
        survivors.truncate(params.beam_width);

        for cand in &survivors {
            if cand.score.cmp(&best_score) == Ordering::Greater {
                best_score = cand.score;
                best_state = cand.state.clone();
                best_path = cand.path.clone();
            }
        }

        let all_dead = survivors.iter().all(|c| c.state.is_dead());
        beam = survivors
            .into_iter()
            .map(|c| (c.state, c.path))
            .collect();

        if all_dead {
            reason = StopReason::AllDead;
            break;
        }
    }

    let meta = BeamMeta {
        visited_count: best_state.visited_count(),
        final_state: best_state,
        expansions,
        depth_reached,
        reason_stop: reason,
    };
    (best_path, meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Star, StarEdge};
    use crate::state::HealthTier;
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

    fn quiet_rules() -> Rules {
        let mut rules = Rules::default();
        rules.energy.energy_cost_per_ly_pct = 0.5;
        rules
    }

    fn start_at(node: NodeId, life: f64, energy: f64, food: f64) -> Traveler {
        let mut t = Traveler::new(Some(node), life, energy);
        t.food_kg = food;
        t
    }

    #[test]
    fn test_dead_start_short_circuits() {
        let g = line_graph(3);
        let mut dead = start_at(1, 0.0, 50.0, 0.0);
        dead.health = HealthTier::Dead;
        let mut rng = StdRng::seed_from_u64(1);
        let (path, meta) = beam_search(&dead, &g, &quiet_rules(), &BeamParams::default(), &mut rng);
        assert!(path.is_empty());
        assert_eq!(meta.reason_stop, StopReason::StartDead);
        assert_eq!(meta.expansions, 0);
        assert_eq!(meta.visited_count, 0);
    }

    #[test]
    fn test_line_visits_all_in_order() {
        let g = line_graph(4);
        let start = start_at(1, 100.0, 100.0, 10.0);
        let mut rng = StdRng::seed_from_u64(42);
        let params = BeamParams {
            beam_width: 6,
            max_depth: 10,
            ..BeamParams::default()
        };
        let (path, meta) = beam_search(&start, &g, &quiet_rules(), &params, &mut rng);
        assert_eq!(path, vec![1, 2, 3, 4]);
        assert_eq!(meta.visited_count, 4);
        // 3 unit hops at 0.05 y/ly and nothing else (no research).
        assert!((meta.final_state.life_years_left - (100.0 - 3.0 * 0.05)).abs() < 1e-9);
        assert!(matches!(
            meta.reason_stop,
            StopReason::MaxDepthReached | StopReason::NoCandidates
        ));
        assert_ne!(meta.reason_stop, StopReason::AllDead);
    }

    #[test]
    fn test_path_starts_at_start_node() {
        let g = line_graph(4);
        let start = start_at(2, 100.0, 100.0, 5.0);
        let mut rng = StdRng::seed_from_u64(7);
        let (path, _) = beam_search(&start, &g, &quiet_rules(), &BeamParams::default(), &mut rng);
        assert_eq!(path[0], 2);
    }

    #[test]
    fn test_visited_count_matches_unique_path_nodes() {
        let g = line_graph(5);
        let start = start_at(1, 100.0, 100.0, 5.0);
        let mut rng = StdRng::seed_from_u64(7);
        let (path, meta) = beam_search(&start, &g, &quiet_rules(), &BeamParams::default(), &mut rng);
        let unique: std::collections::BTreeSet<_> = path.iter().collect();
        assert_eq!(unique.len(), meta.visited_count);
        assert_eq!(path.len(), unique.len(), "avoid_revisit must forbid repeats");
    }

    #[test]
    fn test_partial_progress_counts_when_all_die() {
        // Life only covers two hops; the best candidate dies after
        // visiting what it can, and that partial progress is the answer.
        let g = line_graph(6);
        let start = start_at(1, 0.12, 100.0, 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        let (path, meta) = beam_search(&start, &g, &quiet_rules(), &BeamParams::default(), &mut rng);
        assert!(path.len() >= 2);
        assert!(meta.visited_count >= 2);
        assert_eq!(meta.reason_stop, StopReason::AllDead);
    }

    #[test]
    fn test_branching_prefers_more_stars() {
        // Hub 1 connects to a dead-end (2) and to a chain 3-4-5. The
        // chain side visits more stars.
        let mut g = StarGraph::new();
        for (id, x) in [(1u32, 0.0), (2, 1.0), (3, 0.0), (4, 0.0), (5, 0.0)] {
            let mut s = Star::new(id, format!("s{}", id), x, id as f64);
            s.research_years = Some(0.0);
            g.add_star(s);
        }
        g.add_edge(StarEdge::new(1, 2, 1.0, 0.05));
        g.add_edge(StarEdge::new(1, 3, 1.0, 0.05));
        g.add_edge(StarEdge::new(3, 4, 1.0, 0.05));
        g.add_edge(StarEdge::new(4, 5, 1.0, 0.05));

        let start = start_at(1, 100.0, 100.0, 0.0);
        let mut rng = StdRng::seed_from_u64(5);
        let (path, meta) = beam_search(&start, &g, &quiet_rules(), &BeamParams::default(), &mut rng);
        assert!(path.ends_with(&[3, 4, 5]) || meta.visited_count >= 4);
        assert!(meta.visited_count >= 4);
    }

    #[test]
    fn test_blocked_edges_respected_via_filtered_graph() {
        let mut g = line_graph(4);
        g.toggle_blocked(2, 3).unwrap();
        let start = start_at(1, 100.0, 100.0, 0.0);
        let mut rng = StdRng::seed_from_u64(5);
        let (path, meta) = beam_search(
            &start,
            &g.filtered(),
            &quiet_rules(),
            &BeamParams::default(),
            &mut rng,
        );
        assert_eq!(path, vec![1, 2]);
        assert_eq!(meta.visited_count, 2);
        assert_eq!(meta.reason_stop, StopReason::NoCandidates);
    }

    #[test]
    fn test_deterministic_given_fixed_seed() {
        let g = line_graph(5);
        let mut rules = quiet_rules();
        rules.time_and_life.investigation = Some(crate::rules::InvestigationRules::default());
        for star_years in [1.0, 2.0] {
            let mut g2 = g.clone();
            for star in g2.stars_mut() {
                star.research_years = Some(star_years);
            }
            let run = || {
                let start = start_at(1, 100.0, 100.0, 10.0);
                let mut rng = StdRng::seed_from_u64(77);
                beam_search(&start, &g2, &rules, &BeamParams::default(), &mut rng)
            };
            let (p1, m1) = run();
            let (p2, m2) = run();
            assert_eq!(p1, p2);
            assert_eq!(m1.final_state, m2.final_state);
        }
    }

    #[test]
    fn test_start_counts_itself_as_visited() {
        let g = line_graph(2);
        let start = start_at(1, 100.0, 100.0, 0.0);
        let mut rng = StdRng::seed_from_u64(1);
        let (path, meta) = beam_search(&start, &g, &quiet_rules(), &BeamParams::default(), &mut rng);
        assert_eq!(path, vec![1, 2]);
        assert_eq!(meta.visited_count, 2);
    }
}
