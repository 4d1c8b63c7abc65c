//! # Habitual Core Library
//!
//! Core business logic for Habitual, a habit tracker built around a
//! materialized calendar. The library generates week periods and calendar
//! days ahead of real time, creates one completion placeholder per
//! `(habit, day)` a habit is scheduled on, backfills any gap left by
//! downtime, and rolls completion facts up into point-weighted day and week
//! rates. It is invoked in-process; there is no wire format here.
//!
//! ## Architecture
//!
//! - **Calendar**: week-period and calendar-day generators, bounded by the
//!   calendar year and "today"
//! - **Materialize**: completion placeholders and zero-initialized rate
//!   rows, with marker-based backfill for both
//! - **Rollup**: point-weighted day rates and their week aggregation
//! - **Engine**: the serialized orchestrator choosing between the one-time
//!   bootstrap and the incremental daily pass
//! - **Storage**: SQLite persistence with versioned migrations and a TOML
//!   config
//!
//! ## Key Components
//!
//! - [`Engine`]: orchestration entry points and toggle/creation hooks
//! - [`Database`]: CRUD-style storage collaborator
//! - [`Config`]: application configuration

pub mod calendar;
pub mod engine;
pub mod error;
pub mod materialize;
pub mod model;
pub mod rollup;
pub mod seed;
pub mod storage;

pub use engine::{Engine, RunReport, RunState};
pub use error::{ConfigError, CoreError, Result, StoreError, ValidationError};
pub use model::{
    CalendarDay, CompletionFact, DayRate, Habit, HabitCategory, PriorityLevel, User, WeekPeriod,
    WeekRate,
};
pub use storage::{Config, Database};
