// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod attendance;
pub mod category;
pub mod ids;
pub mod roster;
pub mod saga;
pub mod team;

pub use attendance::{AttendanceService, UpsertOutcome};
pub use category::CategoryService;
pub use roster::{CascadeReport, RosterService};
pub use team::TeamService;
