//! Polling controller for backend analytics.
//!
//! [`PollController`] repeatedly fetches the analytics record for one entity
//! until the backend reports a terminal status, normalizes every response and
//! hands each snapshot to a single observer. Sessions are cancellable at any
//! point; once [`PollController::cancel`] returns no further callbacks run.

pub mod controller;
pub mod error;
pub mod policy;
pub mod request;
pub mod source;
pub mod update;

pub use controller::{PollController, PollObserver, PollState};
pub use error::PollError;
pub use policy::PollPolicy;
pub use request::AnalyticsRequest;
pub use source::AnalyticsSource;
pub use update::PollUpdate;
