//! Exam timetabling domain models.
//!
//! Provides the data types the allocation engine consumes and produces.
//!
//! # Domain Mappings
//!
//! | u-examplan | Meaning |
//! |------------|---------|
//! | Exam | One sitting to place, with a duration |
//! | Cohort | Group of people who cannot be in two places at once |
//! | Room | Seats, reduced by the seating gap |
//! | SlotKey | One of five daily windows on one day |
//! | Placement | Exam × room × slot row |

mod calendar;
mod exam;
mod placement;
mod room;

pub use calendar::{SlotGrid, SlotKey, TimeWindow, WINDOW_CATALOG, WINDOW_MINUTES};
pub use exam::{Cohort, Exam, Subject};
pub use placement::Placement;
pub use room::Room;
