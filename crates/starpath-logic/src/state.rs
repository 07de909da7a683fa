//! Traveler survival state: resource vector, health tiers, and the
//! append-only structured event log.
//!
//! The state is threaded through pure transitions (`travel`, `visit`);
//! every transition clones before mutating, so callers can hold many
//! divergent futures from one parent without interference.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

/// Ordered survival-quality tier. Gates feeding energy-gain rates and
/// marks terminal death.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HealthTier {
    Excellent,
    Good,
    Bad,
    NearDeath,
    Dead,
}

impl HealthTier {
    /// Worsen exactly one tier. Saturates at `Dead`.
    pub fn degrade(self) -> Self {
        match self {
            Self::Excellent => Self::Good,
            Self::Good => Self::Bad,
            Self::Bad => Self::NearDeath,
            Self::NearDeath | Self::Dead => Self::Dead,
        }
    }

    /// Recover exactly one tier. Saturates at `Excellent`, and never
    /// revives `Dead` — death is terminal.
    pub fn improve(self) -> Self {
        match self {
            Self::Excellent | Self::Good => Self::Excellent,
            Self::Bad => Self::Good,
            Self::NearDeath => Self::Bad,
            Self::Dead => Self::Dead,
        }
    }

    /// Whether `self` is a strictly better tier than `other`.
    pub fn better_than(self, other: Self) -> bool {
        // Derived Ord follows declaration order: Excellent is smallest.
        self < other
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Bad => "Bad",
            Self::NearDeath => "NearDeath",
            Self::Dead => "Dead",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "Excellent" => Some(Self::Excellent),
            "Good" => Some(Self::Good),
            "Bad" => Some(Self::Bad),
            "NearDeath" => Some(Self::NearDeath),
            "Dead" => Some(Self::Dead),
            _ => None,
        }
    }
}

/// Result branch of a probabilistic investigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestigationOutcome {
    Illness,
    Successful,
    Neutral,
}

/// Structured record of one investigation draw. Exactly one is appended
/// per investigating visit, regardless of the branch taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigationRecord {
    pub outcome: InvestigationOutcome,
    pub life_delta: f64,
    pub health_from: HealthTier,
    pub health_to: HealthTier,
    pub energy_delta: f64,
    pub note: String,
}

/// One entry in the traveler's audit log. Deltas are signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum SimEvent {
    Travelled { distance_ly: f64, life_delta: f64 },
    TravelEnergy { energy_delta: f64 },
    Ate { kg: f64, energy_delta: f64 },
    Researched { years: f64, energy_delta: f64 },
    LifeEffect { life_delta: f64 },
    HealthSet { from: HealthTier, to: HealthTier },
    Investigation(InvestigationRecord),
    HypergiantUsed { energy_delta: f64, food_multiplier: f64 },
    DiedDuringTravel,
    DiedDuringVisit,
}

/// The traveler's full survival state.
///
/// Invariants (upheld by every mutator here and every transition):
/// - `energy_pct` stays in `[0, 100]` (upper cap configurable)
/// - `life_years_left` and `food_kg` never go below 0
/// - dead iff `life_years_left <= 0 || energy_pct <= 0 || health == Dead`
/// - `visited` only grows; `event_log` is append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traveler {
    /// Current node, or `None` before first placement.
    pub position: Option<NodeId>,
    pub life_years_left: f64,
    pub health: HealthTier,
    pub energy_pct: f64,
    pub food_kg: f64,
    pub age_years: f64,
    pub visited: BTreeSet<NodeId>,
    pub event_log: Vec<SimEvent>,
    /// Most recent investigation record, if any visit has drawn one.
    pub last_event: Option<InvestigationRecord>,
}

impl Traveler {
    pub fn new(position: Option<NodeId>, life_years_left: f64, energy_pct: f64) -> Self {
        Self {
            position,
            life_years_left,
            health: HealthTier::Excellent,
            energy_pct,
            food_kg: 0.0,
            age_years: 0.0,
            visited: BTreeSet::new(),
            event_log: Vec::new(),
            last_event: None,
        }
    }

    /// Terminal-state predicate. Once true it stays true: no transition
    /// applies beneficial deltas to a dead state.
    pub fn is_dead(&self) -> bool {
        self.life_years_left <= 0.0 || self.energy_pct <= 0.0 || self.health == HealthTier::Dead
    }

    /// Add a signed energy delta, flooring at 0 and (optionally) capping
    /// at 100.
    pub fn apply_energy_delta(&mut self, delta_pct: f64, cap_at_100: bool) {
        self.energy_pct += delta_pct;
        if cap_at_100 && self.energy_pct > 100.0 {
            self.energy_pct = 100.0;
        }
        if self.energy_pct < 0.0 {
            self.energy_pct = 0.0;
        }
    }

    /// Add a signed life delta, flooring at 0.
    pub fn apply_life_delta(&mut self, delta_years: f64) {
        self.life_years_left += delta_years;
        if self.life_years_left < 0.0 {
            self.life_years_left = 0.0;
        }
    }

    /// Remove food from stock, flooring at 0. Returns the kg actually
    /// removed.
    pub fn consume_food(&mut self, kg: f64) -> f64 {
        let taken = kg.min(self.food_kg).max(0.0);
        self.food_kg -= taken;
        if self.food_kg < 0.0 {
            self.food_kg = 0.0;
        }
        taken
    }

    pub fn push_event(&mut self, event: SimEvent) {
        if let SimEvent::Investigation(record) = &event {
            self.last_event = Some(record.clone());
        }
        self.event_log.push(event);
    }

    pub fn mark_visited(&mut self, node: NodeId) {
        self.visited.insert(node);
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
