//! Filter and pagination reconciliation for the citizens table.
//!
//! [`state::FilterController`] is the pure state machine, [`debounce::DebounceTimers`]
//! holds the per-field quiet periods and [`runtime::ControllerHandle`] runs both on a
//! single tokio task together with the in-flight fetches.

pub mod debounce;
pub mod runtime;
pub mod state;

pub use debounce::{DebounceTimers, DEFAULT_DEBOUNCE};
pub use runtime::{ControllerHandle, ControllerOptions};
pub use state::{
    FetchOutcome, FetchRequest, FilterController, PageRequest, ResultPage, Row, TableView,
    DEFAULT_PAGE_SIZE,
};
