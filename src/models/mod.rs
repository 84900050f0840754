// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod attendance;
pub mod fields;
pub mod player;
pub mod team;

pub use attendance::{AttendanceEntry, AttendanceRecord};
pub use fields::Record;
pub use player::{Player, PlayerFields, Position};
pub use team::{Category, Team};
