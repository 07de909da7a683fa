//! Visit transition: feeding, research, fixed star effects, the
//! probabilistic investigation outcome, and the hypergiant bonus.
//!
//! Pure except for the injected RNG. Missing per-star parameters fall
//! back to rule defaults — scenario data is externally authored and may
//! be partial, so the engine never fails on absent fields.

use rand::Rng;

use crate::graph::{Star, StarEffects};
use crate::rules::Rules;
use crate::state::{
    HealthTier, InvestigationOutcome, InvestigationRecord, SimEvent, Traveler,
};

/// Per-visit overrides supplied by the caller (e.g. a route form asking
/// for a specific research duration at one star).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitOverrides {
    pub research_years: Option<f64>,
    pub effects: Option<StarEffects>,
}

fn emit(s: &mut Traveler, events: &mut Vec<SimEvent>, event: SimEvent) {
    events.push(event.clone());
    s.push_event(event);
}

/// Apply one star visit.
///
/// Order of effects: feeding, research energy cost, fixed star effects,
/// investigation outcome, hypergiant bonus, visited-set update, death
/// check. A dead input state is returned unchanged with no events.
pub fn visit(
    state: &Traveler,
    star: &Star,
    rules: &Rules,
    rng: &mut impl Rng,
    overrides: Option<&VisitOverrides>,
) -> (Traveler, Vec<SimEvent>) {
    if state.is_dead() {
        return (state.clone(), Vec::new());
    }

    let mut s = state.clone();
    let mut events = Vec::new();
    let default_overrides = VisitOverrides::default();
    let uo = overrides.unwrap_or(&default_overrides);

    let research_years = uo
        .research_years
        .or(star.research_years)
        .unwrap_or(0.0)
        .max(0.0);

    apply_feeding(&mut s, &mut events, star, rules, research_years);
    apply_research_cost(&mut s, &mut events, star, rules, research_years);
    apply_fixed_effects(&mut s, &mut events, star, uo);
    apply_investigation(&mut s, &mut events, rules, rng, research_years);
    apply_hypergiant(&mut s, &mut events, star, rules);

    s.position = Some(star.id);
    s.mark_visited(star.id);

    if s.energy_pct <= 0.0 || s.life_years_left <= 0.0 {
        s.health = HealthTier::Dead;
        emit(&mut s, &mut events, SimEvent::DiedDuringVisit);
    }

    (s, events)
}

/// Eat only when hungry for energy (below the threshold) and stocked.
/// Portion is bounded by the time budget, the stock, and the per-visit
/// cap, but raised to the minimum portion when eating happens at all.
fn apply_feeding(
    s: &mut Traveler,
    events: &mut Vec<SimEvent>,
    star: &Star,
    rules: &Rules,
    research_years: f64,
) {
    if s.energy_pct >= rules.feeding.eat_below_energy_pct || s.food_kg <= 0.0 {
        return;
    }

    let max_eat_years = research_years * rules.time_and_life.max_eat_fraction_of_stay;
    let feed_years_per_kg = star.feed_years_per_kg.unwrap_or(1.0);
    // Non-positive divisor means the star imposes no time limit on eating.
    let kg_by_time = if feed_years_per_kg > 0.0 {
        max_eat_years / feed_years_per_kg
    } else {
        f64::INFINITY
    };
    if kg_by_time <= 0.0 {
        return;
    }

    let cap = star
        .max_food_kg_per_visit
        .or(rules.feeding.max_kg_per_visit)
        .unwrap_or(f64::INFINITY);

    let mut desired = kg_by_time;
    if desired < rules.feeding.min_kg_per_eat {
        desired = rules.feeding.min_kg_per_eat;
    }
    desired = desired.min(s.food_kg).min(cap);
    if desired <= 0.0 {
        return;
    }

    let gain_per_kg = rules.energy.energy_gain_per_kg(s.health);
    let old_energy = s.energy_pct;
    let eaten = s.consume_food(desired);
    s.apply_energy_delta(gain_per_kg * eaten, rules.energy.apply_energy_cap);
    let event = SimEvent::Ate {
        kg: eaten,
        energy_delta: s.energy_pct - old_energy,
    };
    emit(s, events, event);
}

fn apply_research_cost(
    s: &mut Traveler,
    events: &mut Vec<SimEvent>,
    star: &Star,
    rules: &Rules,
    research_years: f64,
) {
    let per_year = star
        .research_energy_cost_per_year_pct
        .unwrap_or(rules.energy.energy_cost_per_research_year_pct);
    let loss = research_years * per_year;
    s.apply_energy_delta(-loss, rules.energy.apply_energy_cap);
    emit(
        s,
        events,
        SimEvent::Researched {
            years: research_years,
            energy_delta: -loss,
        },
    );
}

/// Fixed star effects apply unconditionally. Caller overrides take
/// precedence over the star's own values, field by field.
fn apply_fixed_effects(
    s: &mut Traveler,
    events: &mut Vec<SimEvent>,
    star: &Star,
    uo: &VisitOverrides,
) {
    let star_fx = star.effects.clone().unwrap_or_default();
    let over_fx = uo.effects.clone().unwrap_or_default();

    let life_delta = over_fx
        .life_delta_years
        .or(star_fx.life_delta_years)
        .unwrap_or(0.0);
    if life_delta != 0.0 {
        s.apply_life_delta(life_delta);
        emit(s, events, SimEvent::LifeEffect { life_delta });
    }

    if let Some(tier) = over_fx.health_set.or(star_fx.health_set) {
        let from = s.health;
        s.health = tier;
        emit(s, events, SimEvent::HealthSet { from, to: tier });
    }
}

/// One uniform draw decides illness / success / neutral. Exactly one
/// structured record is appended regardless of the branch.
fn apply_investigation(
    s: &mut Traveler,
    events: &mut Vec<SimEvent>,
    rules: &Rules,
    rng: &mut impl Rng,
    research_years: f64,
) {
    let Some(inv) = &rules.time_and_life.investigation else {
        return;
    };
    if research_years <= 0.0 {
        return;
    }

    let health_from = s.health;
    let old_energy = s.energy_pct;
    let r: f64 = rng.gen();

    let record = if r < inv.p_illness {
        let loss = draw_range(rng, inv.illness_life_loss_range);
        s.apply_life_delta(-loss);
        s.health = s.health.degrade();
        InvestigationRecord {
            outcome: InvestigationOutcome::Illness,
            life_delta: -loss,
            health_from,
            health_to: s.health,
            energy_delta: s.energy_pct - old_energy,
            note: format!("fell ill after {:.2}y of research", research_years),
        }
    } else if r < inv.p_illness + inv.p_success {
        let gain = draw_range(rng, inv.success_life_gain_range);
        s.apply_life_delta(gain);
        if rng.gen::<f64>() < inv.success_improve_health_p {
            s.health = s.health.improve();
        }
        InvestigationRecord {
            outcome: InvestigationOutcome::Successful,
            life_delta: gain,
            health_from,
            health_to: s.health,
            energy_delta: s.energy_pct - old_energy,
            note: format!("breakthrough after {:.2}y of research", research_years),
        }
    } else {
        InvestigationRecord {
            outcome: InvestigationOutcome::Neutral,
            life_delta: 0.0,
            health_from,
            health_to: s.health,
            energy_delta: 0.0,
            note: String::new(),
        }
    };

    emit(s, events, SimEvent::Investigation(record));
}

/// Relative recharge: energy grows by a fraction of its current value,
/// and the food stock is multiplied.
fn apply_hypergiant(s: &mut Traveler, events: &mut Vec<SimEvent>, star: &Star, rules: &Rules) {
    if !star.hypergiant {
        return;
    }
    let old_energy = s.energy_pct;
    let recharge = s.energy_pct * rules.hypergiant.energy_recharge_fraction;
    s.apply_energy_delta(recharge, rules.energy.apply_energy_cap);
    s.food_kg *= rules.hypergiant.food_multiplier;
    let event = SimEvent::HypergiantUsed {
        energy_delta: s.energy_pct - old_energy,
        food_multiplier: rules.hypergiant.food_multiplier,
    };
    emit(s, events, event);
}

fn draw_range(rng: &mut impl Rng, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}
