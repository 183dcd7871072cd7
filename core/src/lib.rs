#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the lane tactics engine.
//!
//! This crate defines the vocabulary that connects the external board oracle,
//! the decision systems and the adapters. The oracle answers read-only
//! [`BoardQuery`] questions and executes [`Oracle`] commands; engine code only
//! ever issues commands through a [`Turn`], which reads the spendable balance
//! once, clamps every request against it and is consumed by
//! [`Turn::submit`]. Events reported by the resolved combat arrive as
//! [`EventRecord`] values, and every tuning constant lives in one immutable
//! [`Settings`] value resolved at startup.

pub mod catalog;
pub mod config;
pub mod events;
pub mod geometry;
pub mod oracle;
pub mod turn;
pub mod units;

pub use catalog::{UnitCatalog, UnitStats};
pub use config::{
    CellList, ConfigError, CorridorLayout, DangerTuning, InterceptionTuning, LaneCorridor,
    OffenseTuning, Settings, SkeletonLayout, StrategyConfig,
};
pub use events::{
    decode_frame, BreachEvent, DamageEvent, DecodedFrame, EventKind, EventRecord, FrameError,
};
pub use geometry::{Lane, Location, LocationError, Quadrant, ARENA_SIZE, HALF_ARENA};
pub use oracle::{BoardQuery, Command, Oracle};
pub use turn::{Balance, GapProbe, Placement, Turn, TurnSummary};
pub use units::{Cost, Occupant, Player, ResourceKind, StructureKind, UnitKind};
