//! Per-date seating lifecycle.
//!
//! ```text
//! Unplanned ──generate──▶ Generated ──save──▶ Saved
//!     ▲                    │    ▲               │
//!     │                    └────┘ generate      │
//!     └──────────────── clear ◀─────────────────┘
//! ```
//!
//! A generated plan is an in-memory proposal and may be regenerated or
//! discarded. Only saved plans are visible to students. A saved plan is
//! immutable until cleared.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::planner::{SeatPlanner, SeatingRequest};
use crate::error::{EngineError, Result};
use crate::models::{SeatAssignment, SeatPlan};

/// Seating state of one exam date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeatingState {
    /// No plan.
    Unplanned,
    /// Proposal held in memory.
    Generated,
    /// Persisted and visible.
    Saved,
}

impl SeatingState {
    fn as_str(self) -> &'static str {
        match self {
            SeatingState::Unplanned => "unplanned",
            SeatingState::Generated => "generated",
            SeatingState::Saved => "saved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DatePlan {
    state: SeatingState,
    plan: SeatPlan,
}

/// Seat plans keyed by exam date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatingLedger {
    plans: BTreeMap<NaiveDate, DatePlan>,
}

impl SeatingLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a date.
    pub fn state(&self, date: NaiveDate) -> SeatingState {
        self.plans
            .get(&date)
            .map_or(SeatingState::Unplanned, |p| p.state)
    }

    fn reject(&self, date: NaiveDate, action: &'static str) -> EngineError {
        EngineError::InvalidSeatingTransition {
            date,
            action,
            state: self.state(date).as_str(),
        }
    }

    /// Runs the planner and stores the result as a proposal.
    ///
    /// Allowed from `Unplanned` and `Generated`; a saved date must be
    /// cleared first.
    pub fn generate(
        &mut self,
        planner: &SeatPlanner,
        request: &SeatingRequest,
    ) -> Result<&SeatPlan> {
        let date = request.date;
        if self.state(date) == SeatingState::Saved {
            return Err(self.reject(date, "generate"));
        }
        let plan = planner.plan(request)?;
        debug!(%date, "seating proposal stored");
        let proposal = DatePlan {
            state: SeatingState::Generated,
            plan,
        };
        let entry = match self.plans.entry(date) {
            Entry::Occupied(mut slot) => {
                slot.insert(proposal);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(proposal),
        };
        Ok(&entry.plan)
    }

    /// Persists the proposal for a date.
    pub fn save(&mut self, date: NaiveDate) -> Result<&SeatPlan> {
        let state = self.state(date);
        match self.plans.get_mut(&date) {
            Some(entry) if state == SeatingState::Generated => {
                entry.state = SeatingState::Saved;
                info!(%date, seats = entry.plan.assigned_count(), "seating saved");
                Ok(&entry.plan)
            }
            _ => Err(EngineError::InvalidSeatingTransition {
                date,
                action: "save",
                state: state.as_str(),
            }),
        }
    }

    /// Deletes the plan of a date, returning it to `Unplanned`.
    pub fn clear(&mut self, date: NaiveDate) -> Result<SeatPlan> {
        match self.plans.remove(&date) {
            Some(entry) => {
                info!(%date, "seating cleared");
                Ok(entry.plan)
            }
            None => Err(self.reject(date, "clear")),
        }
    }

    /// The plan of a date as students see it: saved plans only.
    pub fn visible_plan(&self, date: NaiveDate) -> Option<&SeatPlan> {
        self.plans
            .get(&date)
            .filter(|p| p.state == SeatingState::Saved)
            .map(|p| &p.plan)
    }

    /// Proposal or saved plan of a date.
    pub fn plan(&self, date: NaiveDate) -> Option<&SeatPlan> {
        self.plans.get(&date).map(|p| &p.plan)
    }

    /// A student's published seat on a date.
    pub fn seat_of(&self, student_id: &str, date: NaiveDate) -> Option<&SeatAssignment> {
        self.visible_plan(date)?.assignment_for(student_id)
    }

    /// Dates with a saved plan, ascending.
    pub fn saved_dates(&self) -> Vec<NaiveDate> {
        self.plans
            .iter()
            .filter(|(_, p)| p.state == SeatingState::Saved)
            .map(|(d, _)| *d)
            .collect()
    }
}
