//! Exam scheduling domain models.
//!
//! Provides the data types for exam date assignment and seat allocation.
//!
//! # Domain Mappings
//!
//! | exam-schedule | Generic scheduling |
//! |---------------|--------------------|
//! | Course | Task |
//! | Exam date | Time slot |
//! | ConflictGraph | Disjunctive / min-delay constraints |
//! | Venue | Resource with a seat grid |
//! | Schedule | Solution |

mod calendar;
mod conflict;
mod course;
mod schedule;
mod seating;
mod venue;

pub use calendar::{Calendar, CalendarSummary, DateWindow, DayKind, Holiday};
pub use conflict::ConflictGraph;
pub use course::{Course, ProgramType, DEFAULT_GAP_DAYS};
pub use schedule::{Schedule, ScheduleEntry, TimeSlot};
pub use seating::{SeatAssignment, SeatCandidate, SeatCell, SeatPlan, VenueGrid};
pub use venue::{row_letters, seat_label, Venue};
