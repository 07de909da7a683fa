//! Scenario interchange: the normalized structure the external parser
//! hands the core, and construction of the graph and initial traveler
//! from it.
//!
//! Loading is strict about structure (duplicate ids, unparseable JSON)
//! but lenient about content: edges referencing unknown stars are skipped
//! with a warning, and every numeric knob has a default.

use serde::{Deserialize, Serialize};

use crate::graph::{NodeId, Star, StarEdge, StarEffects, StarGraph};
use crate::rules::Rules;
use crate::state::{HealthTier, Traveler};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

/// One star as authored in scenario data. Simulation fields are optional;
/// `populate_star_defaults` or rule defaults cover the gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarRecord {
    pub id: NodeId,
    #[serde(default)]
    pub label: Option<String>,
    pub coordinates: Coordinates,
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default)]
    pub hypergiant: bool,
    #[serde(default)]
    pub research_years: Option<f64>,
    #[serde(default)]
    pub feed_years_per_kg: Option<f64>,
    #[serde(default)]
    pub research_energy_cost_per_year_pct: Option<f64>,
    #[serde(default)]
    pub max_food_kg_per_visit: Option<f64>,
    #[serde(default)]
    pub effects: Option<StarEffects>,
}

fn default_radius() -> f64 {
    0.5
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub u: NodeId,
    pub v: NodeId,
    #[serde(default)]
    pub blocked: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConstellationRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stars: Vec<NodeId>,
}

/// Seed record for the traveler's survival state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialState {
    pub initial_energy_percent: f64,
    pub health_state: HealthTier,
    pub food_kg: f64,
    pub current_age_years: f64,
    pub death_age_years: f64,
}

impl Default for InitialState {
    fn default() -> Self {
        Self {
            initial_energy_percent: 100.0,
            health_state: HealthTier::Excellent,
            food_kg: 0.0,
            current_age_years: 0.0,
            death_age_years: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioMeta {
    pub name: Option<String>,
    pub simulation_seed: Option<u64>,
}

/// The full normalized scenario document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioFile {
    pub meta: ScenarioMeta,
    pub stars: Vec<StarRecord>,
    pub edges: Vec<EdgeRecord>,
    pub constellations: Vec<ConstellationRecord>,
    pub initial_state: InitialState,
    pub rules: Rules,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioError {
    /// Two stars share an id — structurally invalid, not repairable.
    DuplicateStar(NodeId),
    /// The JSON itself failed to parse.
    Parse(String),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateStar(id) => write!(f, "duplicate star id {}", id),
            Self::Parse(msg) => write!(f, "scenario parse error: {}", msg),
        }
    }
}

impl std::error::Error for ScenarioError {}

/// Everything the core needs to run, plus non-fatal data lints.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub graph: StarGraph,
    pub traveler: Traveler,
    pub rules: Rules,
    pub warnings: Vec<String>,
    /// Effective seed: `meta.simulation_seed` wins over `rules.rng_seed`.
    pub seed: Option<u64>,
}

/// Hypergiant density lint threshold per constellation.
const MAX_HYPERGIANTS_PER_CONSTELLATION: usize = 2;

/// Build a runnable scenario from a parsed file.
pub fn build_scenario(file: &ScenarioFile) -> Result<Scenario, ScenarioError> {
    let mut warnings = Vec::new();
    let mut graph = StarGraph::new();

    for record in &file.stars {
        if graph.contains_star(record.id) {
            return Err(ScenarioError::DuplicateStar(record.id));
        }
        let label = record
            .label
            .clone()
            .unwrap_or_else(|| format!("star{}", record.id));
        let mut star = Star::new(record.id, label, record.coordinates.x, record.coordinates.y);
        star.radius = record.radius;
        star.hypergiant = record.hypergiant;
        star.research_years = record.research_years;
        star.feed_years_per_kg = record.feed_years_per_kg;
        star.research_energy_cost_per_year_pct = record.research_energy_cost_per_year_pct;
        star.max_food_kg_per_visit = record.max_food_kg_per_visit;
        star.effects = record.effects.clone();
        graph.add_star(star);
    }

    let factor = file.rules.time_and_life.distance_ly_to_years_factor;
    for record in &file.edges {
        let (Some(su), Some(sv)) = (graph.star(record.u), graph.star(record.v)) else {
            warnings.push(format!(
                "edge {} -> {} references an undefined star; skipped",
                record.u, record.v
            ));
            continue;
        };
        let distance_ly = su.distance_to(sv);
        if let Some(existing) = graph.edge(record.u, record.v) {
            if existing.blocked != record.blocked {
                warnings.push(format!(
                    "edge {} <-> {} appears twice with conflicting blocked flags; last wins",
                    record.u, record.v
                ));
            }
        }
        let mut edge = StarEdge::new(record.u, record.v, distance_ly, distance_ly * factor);
        edge.blocked = record.blocked;
        graph.add_edge(edge);
    }

    for constellation in &file.constellations {
        let hypergiants = constellation
            .stars
            .iter()
            .filter(|id| graph.star(**id).map(|s| s.hypergiant).unwrap_or(false))
            .count();
        if hypergiants > MAX_HYPERGIANTS_PER_CONSTELLATION {
            warnings.push(format!(
                "constellation '{}' has {} hypergiants (max {})",
                constellation.name, hypergiants, MAX_HYPERGIANTS_PER_CONSTELLATION
            ));
        }
    }

    Ok(Scenario {
        traveler: traveler_from_initial(&file.initial_state),
        seed: file.meta.simulation_seed.or(file.rules.rng_seed),
        rules: file.rules.clone(),
        graph,
        warnings,
    })
}

/// Parse and build in one step.
pub fn load_scenario_str(json: &str) -> Result<Scenario, ScenarioError> {
    let file: ScenarioFile =
        serde_json::from_str(json).map_err(|e| ScenarioError::Parse(e.to_string()))?;
    build_scenario(&file)
}

/// Derive the traveler from the initial-state seed record. Position is
/// left unset; the caller (GUI or harness) chooses the origin later.
pub fn traveler_from_initial(init: &InitialState) -> Traveler {
    let life = (init.death_age_years - init.current_age_years).max(0.0);
    let mut traveler = Traveler::new(None, life, init.initial_energy_percent);
    traveler.health = init.health_state;
    traveler.food_kg = init.food_kg;
    traveler.age_years = init.current_age_years;
    traveler
}
