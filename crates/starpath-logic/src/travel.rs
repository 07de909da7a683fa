//! Travel transition: apply an edge's cost to the traveler.
//!
//! Pure — returns a new state plus the events it emitted; the input is
//! never mutated.

use crate::graph::StarEdge;
use crate::rules::Rules;
use crate::state::{HealthTier, SimEvent, Traveler};

/// Apply one edge traversal.
///
/// Life loss is `distance_ly × distance_ly_to_years_factor` when the
/// distance rule is on, else the edge's precomputed `years_cost`. Energy
/// drops by `distance_ly × energy_cost_per_ly_pct`. If the traveler runs
/// out of life, health is set to `Dead` and a terminal event is emitted.
///
/// A dead input state is returned unchanged with no events: death is
/// terminal and never an error path.
pub fn travel(state: &Traveler, edge: &StarEdge, rules: &Rules) -> (Traveler, Vec<SimEvent>) {
    if state.is_dead() {
        return (state.clone(), Vec::new());
    }

    let mut s = state.clone();
    let mut events = Vec::new();

    let years_loss = if rules.time_and_life.use_distance_as_life_loss {
        edge.distance_ly * rules.time_and_life.distance_ly_to_years_factor
    } else {
        edge.years_cost
    };
    s.apply_life_delta(-years_loss);
    let life_event = SimEvent::Travelled {
        distance_ly: edge.distance_ly,
        life_delta: -years_loss,
    };
    events.push(life_event.clone());
    s.push_event(life_event);

    let energy_loss = edge.distance_ly * rules.energy.energy_cost_per_ly_pct;
    s.apply_energy_delta(-energy_loss, rules.energy.apply_energy_cap);
    let energy_event = SimEvent::TravelEnergy {
        energy_delta: -energy_loss,
    };
    events.push(energy_event.clone());
    s.push_event(energy_event);

    if s.life_years_left <= 0.0 || s.energy_pct <= 0.0 {
        s.health = HealthTier::Dead;
        events.push(SimEvent::DiedDuringTravel);
        s.push_event(SimEvent::DiedDuringTravel);
    }

    (s, events)
}
