//! Pure star-travel simulation logic for Starpath.
//!
//! This crate contains all simulation and planning logic, independent of
//! any GUI, file format, or runtime. Functions take plain data and return
//! new values, making them unit-testable and portable: the state is
//! cloned before every transition, so a planner can hold many divergent
//! hypothetical futures from one parent without interference.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`graph`] | Star nodes, undirected edges, blocked flags, filtered views |
//! | [`routing`] | Dijkstra least-cost paths over a chosen edge weight |
//! | [`state`] | Traveler survival state, health tiers, structured event log |
//! | [`rules`] | Simulation rule bundle with defaults and per-star fill-in |
//! | [`travel`] | Edge-traversal transition (life and energy costs) |
//! | [`visit`] | Star-visit transition (feeding, research, outcomes, hypergiants) |
//! | [`simulate`] | Replay a full route through travel + visit |
//! | [`beam`] | Bounded-width itinerary search maximizing stars visited |
//! | [`scenario`] | Normalized scenario interchange and graph construction |

pub mod beam;
pub mod graph;
pub mod routing;
pub mod rules;
pub mod scenario;
pub mod simulate;
pub mod state;
pub mod travel;
pub mod visit;
