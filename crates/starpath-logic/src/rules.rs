//! The rules bundle: every numeric knob of the simulation, with defaults
//! so partially-authored scenario data still parses.
//!
//! Per-node parameters override rule defaults; the resolution always goes
//! node value → rule default, never the other way.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::graph::StarGraph;
use crate::state::HealthTier;

/// Life-time accounting rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeAndLifeRules {
    /// Years of life lost per light-year travelled.
    pub distance_ly_to_years_factor: f64,
    /// When true, travel life loss is `distance_ly × factor`; when false,
    /// the edge's precomputed `years_cost` is charged instead.
    pub use_distance_as_life_loss: bool,
    /// Fraction of a visit's research time that may be spent eating.
    pub max_eat_fraction_of_stay: f64,
    /// Probabilistic research outcome configuration; absent means every
    /// investigation resolves neutral with no draw consumed.
    pub investigation: Option<InvestigationRules>,
}

impl Default for TimeAndLifeRules {
    fn default() -> Self {
        Self {
            distance_ly_to_years_factor: 0.05,
            use_distance_as_life_loss: true,
            max_eat_fraction_of_stay: 0.5,
            investigation: None,
        }
    }
}

/// Illness/success probabilities and effect ranges for research outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestigationRules {
    pub p_illness: f64,
    pub p_success: f64,
    /// Uniform life-years loss range on illness.
    pub illness_life_loss_range: (f64, f64),
    /// Uniform life-years gain range on success.
    pub success_life_gain_range: (f64, f64),
    /// Probability that a success also improves health one tier.
    pub success_improve_health_p: f64,
}

impl Default for InvestigationRules {
    fn default() -> Self {
        Self {
            p_illness: 0.4,
            p_success: 0.4,
            illness_life_loss_range: (1.0, 3.0),
            success_life_gain_range: (0.0, 1.0),
            success_improve_health_p: 0.5,
        }
    }
}

/// Energy consumption and gain rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyRules {
    /// Energy % lost per light-year travelled.
    pub energy_cost_per_ly_pct: f64,
    /// Rule-level default energy % lost per research-year; a star's own
    /// rate takes precedence.
    pub energy_cost_per_research_year_pct: f64,
    /// Energy % gained per kg eaten, keyed by health tier.
    pub energy_gain_per_kg_by_health: BTreeMap<HealthTier, f64>,
    /// Whether gains are capped at 100%.
    pub apply_energy_cap: bool,
}

impl Default for EnergyRules {
    fn default() -> Self {
        let mut gain = BTreeMap::new();
        gain.insert(HealthTier::Excellent, 5.0);
        gain.insert(HealthTier::Good, 3.0);
        gain.insert(HealthTier::Bad, 2.0);
        gain.insert(HealthTier::NearDeath, 1.0);
        gain.insert(HealthTier::Dead, 0.0);
        Self {
            energy_cost_per_ly_pct: 0.0,
            energy_cost_per_research_year_pct: 0.0,
            energy_gain_per_kg_by_health: gain,
            apply_energy_cap: true,
        }
    }
}

impl EnergyRules {
    /// Per-kg energy gain for a tier. Missing tiers fall back to the
    /// `Good` rate, then to 3%.
    pub fn energy_gain_per_kg(&self, tier: HealthTier) -> f64 {
        self.energy_gain_per_kg_by_health
            .get(&tier)
            .or_else(|| self.energy_gain_per_kg_by_health.get(&HealthTier::Good))
            .copied()
            .unwrap_or(3.0)
    }
}

/// Feeding eligibility and sizing rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedingRules {
    /// Eat only when energy is strictly below this threshold.
    pub eat_below_energy_pct: f64,
    /// Minimum portion when any eating happens at all.
    pub min_kg_per_eat: f64,
    /// Rule-level per-visit cap; a star's own cap takes precedence.
    pub max_kg_per_visit: Option<f64>,
}

impl Default for FeedingRules {
    fn default() -> Self {
        Self {
            eat_below_energy_pct: 50.0,
            min_kg_per_eat: 0.1,
            max_kg_per_visit: None,
        }
    }
}

/// Hypergiant visit bonus rules. The recharge is relative: energy grows
/// by `energy_recharge_fraction` of its current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HypergiantRules {
    pub energy_recharge_fraction: f64,
    pub food_multiplier: f64,
}

impl Default for HypergiantRules {
    fn default() -> Self {
        Self {
            energy_recharge_fraction: 0.5,
            food_multiplier: 2.0,
        }
    }
}

/// Itinerary-search defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningRules {
    pub beam_width: usize,
    pub max_depth: usize,
    pub avoid_revisit: bool,
}

impl Default for PlanningRules {
    fn default() -> Self {
        Self {
            beam_width: 12,
            max_depth: 50,
            avoid_revisit: true,
        }
    }
}

/// The full rules bundle consumed by the effect engine and planners.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub time_and_life: TimeAndLifeRules,
    pub energy: EnergyRules,
    pub feeding: FeedingRules,
    pub hypergiant: HypergiantRules,
    pub planning: PlanningRules,
    /// Seed for the simulation's random stream. `None` leaves seeding to
    /// the caller.
    pub rng_seed: Option<u64>,
}

/// Ranges used to fill in per-star parameters that scenario data left
/// unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarDefaultRanges {
    pub research_years: (f64, f64),
    pub feed_years_per_kg: (f64, f64),
    pub research_energy_cost_per_year_pct: (f64, f64),
}

impl Default for StarDefaultRanges {
    fn default() -> Self {
        Self {
            research_years: (1.0, 5.0),
            feed_years_per_kg: (1.0, 5.0),
            research_energy_cost_per_year_pct: (0.05, 0.5),
        }
    }
}

/// Fill missing per-star simulation parameters from the configured
/// ranges. Values already present are respected. Draws happen in node-id
/// order, so a fixed RNG yields identical graphs.
pub fn populate_star_defaults(
    graph: &mut StarGraph,
    ranges: &StarDefaultRanges,
    rng: &mut impl Rng,
) {
    for star in graph.stars_mut() {
        if star.research_years.is_none() {
            star.research_years = Some(draw(rng, ranges.research_years));
        }
        if star.feed_years_per_kg.is_none() {
            star.feed_years_per_kg = Some(draw(rng, ranges.feed_years_per_kg));
        }
        if star.research_energy_cost_per_year_pct.is_none() {
            star.research_energy_cost_per_year_pct =
                Some(draw(rng, ranges.research_energy_cost_per_year_pct));
        }
    }
}

fn draw(rng: &mut impl Rng, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}
