//! Exam scheduling and seat allocation engine.
//!
//! Given courses with their enrolled students, an exam window, holidays and
//! a venue catalog, the engine assigns every course one exam date and then
//! seats each day's students in the venues.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Course`, `Calendar`, `DateWindow`,
//!   `ConflictGraph`, `Schedule`, `Venue`, `SeatPlan`
//! - **`dispatching`**: Course ordering rules and rule engine
//! - **`scheduler`**: Window estimation, date generation, manual moves, audit, KPIs
//! - **`seating`**: Seat planner and per-date seating lifecycle
//! - **`validation`**: Input integrity checks (duplicate codes, inverted window, venue layout)
//! - **`config`**: Engine caps and search budget
//! - **`logging`**: `tracing` subscriber setup
//!
//! # Pipeline
//!
//! ```text
//! Calendar ─┐
//!           ├─▶ MinimumWindowEstimator ─▶ ScheduleGenerator ─▶ Schedule ─▶ ScheduleMutator
//! Courses ──┘                                                     │
//!                                                  roster_for(date)│
//!                                                                 ▼
//!                                        Venues ─▶ SeatPlanner ─▶ SeatPlan ─▶ SeatingLedger
//! ```
//!
//! Every component is a pure, synchronous computation over its inputs.
//! Identical input always yields identical output.
//!
//! # References
//!
//! - Carter, Laporte & Lee (1996), "Examination timetabling: algorithmic
//!   strategies and applications"
//! - Burke & Petrovic (2002), "Recent research directions in automated
//!   timetabling"

pub mod config;
pub mod dispatching;
pub mod error;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod seating;
pub mod validation;

pub use config::EngineConfig;
pub use error::{EngineError, Infeasibility, Result};
