//! Starpath Headless Simulation Harness
//!
//! Validates the pure simulation logic against the bundled scenario —
//! no GUI, no file watching, no rendering.
//!
//! Usage:
//!   cargo run -p starpath-simtest
//!   cargo run -p starpath-simtest -- --verbose

use rand::rngs::StdRng;
use rand::SeedableRng;

use starpath_logic::beam::{beam_search, BeamParams, StopReason};
use starpath_logic::routing::{shortest_path, EdgeWeight, RouteError};
use starpath_logic::rules::{populate_star_defaults, StarDefaultRanges};
use starpath_logic::scenario::{load_scenario_str, Scenario};
use starpath_logic::simulate::simulate_route;
use starpath_logic::state::Traveler;

// ── Bundled scenario (same JSON a GUI front end would load) ────────────
const STARFIELD_JSON: &str = include_str!("../../../data/starfield.json");

// ── Test harness ───────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Starpath Simulation Harness ===\n");

    let mut results = Vec::new();

    let scenario = match load_scenario_str(STARFIELD_JSON) {
        Ok(s) => s,
        Err(e) => {
            println!("  ✗ scenario_load: {}", e);
            std::process::exit(1);
        }
    };

    results.extend(validate_scenario(&scenario, verbose));
    results.extend(validate_graph_store(&scenario));
    results.extend(validate_routing(&scenario));
    results.extend(validate_effect_engine(&scenario));
    results.extend(validate_beam_search(&scenario));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Scenario data ───────────────────────────────────────────────────

fn validate_scenario(scenario: &Scenario, verbose: bool) -> Vec<TestResult> {
    println!("--- Scenario data ---");
    let mut results = Vec::new();

    results.push(check(
        "scenario_stars",
        scenario.graph.star_count() == 8,
        format!("{} stars", scenario.graph.star_count()),
    ));
    results.push(check(
        "scenario_edges",
        scenario.graph.edge_count() == 10,
        format!("{} edges", scenario.graph.edge_count()),
    ));
    results.push(check(
        "scenario_clean",
        scenario.warnings.is_empty(),
        format!("{} warnings", scenario.warnings.len()),
    ));
    if verbose {
        for w in &scenario.warnings {
            println!("    warning: {}", w);
        }
    }
    results.push(check(
        "scenario_seed",
        scenario.seed.is_some(),
        format!("seed = {:?}", scenario.seed),
    ));
    results.push(check(
        "traveler_alive",
        !scenario.traveler.is_dead() && scenario.traveler.position.is_none(),
        format!(
            "life {:.1}y, energy {:.0}%, food {:.0}kg",
            scenario.traveler.life_years_left,
            scenario.traveler.energy_pct,
            scenario.traveler.food_kg
        ),
    ));
    results
}

// ── 2. Graph store ─────────────────────────────────────────────────────

fn validate_graph_store(scenario: &Scenario) -> Vec<TestResult> {
    println!("--- Graph store ---");
    let mut results = Vec::new();
    let mut graph = scenario.graph.clone();

    let filtered_before = graph.filtered().edge_count();
    results.push(check(
        "filtered_drops_blocked",
        filtered_before == graph.edge_count() - 1,
        format!("{} of {} edges pass", filtered_before, graph.edge_count()),
    ));

    let toggled = graph.toggle_blocked(1, 2);
    let restored = graph.toggle_blocked(2, 1);
    results.push(check(
        "toggle_involutive",
        toggled == Ok(true)
            && restored == Ok(false)
            && graph.filtered().edge_count() == filtered_before,
        "blocked 1-2, unblocked 2-1, filtered view restored",
    ));

    results.push(check(
        "toggle_missing_edge",
        graph.toggle_blocked(1, 8).is_err(),
        "1-8 does not exist",
    ));

    results.push(check(
        "neighbors_ignore_blocked",
        graph.neighbors(3).contains(&4),
        "3-4 blocked but still adjacent",
    ));

    results
}

// ── 3. Route planning ──────────────────────────────────────────────────

fn validate_routing(scenario: &Scenario) -> Vec<TestResult> {
    println!("--- Route planning ---");
    let mut results = Vec::new();
    let filtered = scenario.graph.filtered();

    match shortest_path(&filtered, 1, 8, EdgeWeight::YearsCost) {
        Ok(route) => {
            let recomputed: f64 = route
                .path
                .windows(2)
                .map(|w| filtered.edge(w[0], w[1]).map(|e| e.years_cost).unwrap_or(0.0))
                .sum();
            results.push(check(
                "route_1_to_8",
                (route.total_weight - recomputed).abs() < 1e-9 && route.path.first() == Some(&1),
                format!("path {:?}, {:.3}y", route.path, route.total_weight),
            ));
        }
        Err(e) => results.push(check("route_1_to_8", false, e.to_string())),
    }

    let trivial = shortest_path(&filtered, 5, 5, EdgeWeight::DistanceLy);
    results.push(check(
        "route_trivial",
        matches!(&trivial, Ok(r) if r.path == vec![5] && r.total_weight == 0.0),
        "5 -> 5 is a zero-cost single-node path",
    ));

    // The blocked 3-4 edge must not be usable directly.
    match shortest_path(&filtered, 3, 4, EdgeWeight::DistanceLy) {
        Ok(route) => results.push(check(
            "route_detours_blocked",
            route.path.len() > 2,
            format!("3 -> 4 detours via {:?}", route.path),
        )),
        Err(e) => results.push(check("route_detours_blocked", false, e.to_string())),
    }

    let missing = shortest_path(&filtered, 1, 999, EdgeWeight::DistanceLy);
    results.push(check(
        "route_missing_node",
        missing == Err(RouteError::NodeNotFound(999)),
        "unknown target is an explicit error",
    ));

    results
}

// ── 4. Effect engine ───────────────────────────────────────────────────

fn validate_effect_engine(scenario: &Scenario) -> Vec<TestResult> {
    println!("--- Effect engine ---");
    let mut results = Vec::new();

    let mut graph = scenario.graph.clone();
    let mut rng = StdRng::seed_from_u64(scenario.seed.unwrap_or(0));
    populate_star_defaults(&mut graph, &StarDefaultRanges::default(), &mut rng);

    let all_filled = graph.stars().all(|s| {
        s.research_years.is_some()
            && s.feed_years_per_kg.is_some()
            && s.research_energy_cost_per_year_pct.is_some()
    });
    results.push(check(
        "star_defaults_filled",
        all_filled,
        "every star has research/feeding parameters",
    ));

    let route = [1u32, 2, 3, 5, 6, 8];
    let replay = simulate_route(&scenario.traveler, &route, &graph, &scenario.rules, &mut rng);
    let s = &replay.final_state;
    let in_bounds = s.energy_pct >= 0.0
        && s.energy_pct <= 100.0
        && s.life_years_left >= 0.0
        && s.food_kg >= 0.0;
    results.push(check(
        "replay_invariants",
        in_bounds,
        format!(
            "after {:.1} ly: life {:.2}y, energy {:.2}%, food {:.2}kg, {} events",
            replay.sum_ly,
            s.life_years_left,
            s.energy_pct,
            s.food_kg,
            replay.events.len()
        ),
    ));
    results.push(check(
        "replay_visits_logged",
        s.visited_count() >= 1 && !s.event_log.is_empty(),
        format!("{} stars visited", s.visited_count()),
    ));

    results
}

// ── 5. Beam search ─────────────────────────────────────────────────────

fn validate_beam_search(scenario: &Scenario) -> Vec<TestResult> {
    println!("--- Beam search ---");
    let mut results = Vec::new();

    let mut graph = scenario.graph.clone();
    let seed = scenario.seed.unwrap_or(0);
    let mut rng = StdRng::seed_from_u64(seed);
    populate_star_defaults(&mut graph, &StarDefaultRanges::default(), &mut rng);
    let filtered = graph.filtered();

    let mut start = scenario.traveler.clone();
    start.position = Some(1);

    let params = BeamParams::from_rules(&scenario.rules);
    let run = |run_seed: u64| {
        let mut search_rng = StdRng::seed_from_u64(run_seed);
        beam_search(&start, &filtered, &scenario.rules, &params, &mut search_rng)
    };

    let (path, meta) = run(seed);
    results.push(check(
        "beam_path_anchored",
        path.first() == Some(&1),
        format!("path {:?}", path),
    ));
    let unique: std::collections::BTreeSet<_> = path.iter().collect();
    results.push(check(
        "beam_no_revisits",
        unique.len() == path.len() && meta.visited_count == unique.len(),
        format!("{} unique stars", unique.len()),
    ));
    results.push(check(
        "beam_terminates",
        matches!(
            meta.reason_stop,
            StopReason::MaxDepthReached | StopReason::NoCandidates | StopReason::AllDead
        ) && meta.depth_reached <= params.max_depth,
        format!(
            "{:?} after depth {}, {} expansions",
            meta.reason_stop, meta.depth_reached, meta.expansions
        ),
    ));

    let (path2, meta2) = run(seed);
    results.push(check(
        "beam_deterministic",
        path2 == path && meta2.final_state == meta.final_state,
        "identical result for identical seed",
    ));

    let dead = Traveler::new(Some(1), 0.0, 0.0);
    let mut dead_rng = StdRng::seed_from_u64(seed);
    let (dead_path, dead_meta) =
        beam_search(&dead, &filtered, &scenario.rules, &params, &mut dead_rng);
    results.push(check(
        "beam_dead_start",
        dead_path.is_empty() && dead_meta.reason_stop == StopReason::StartDead,
        "dead start returns empty path",
    ));

    results
}
