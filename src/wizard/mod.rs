//! Order wizard: session state, the step machine and its HTTP routes.
//!
//! Steps run `practice -> prescribers -> review -> order -> confirmed`.
//! Moving forward requires the current step to pass its guard; a step can be
//! jumped to directly once every step before it passes.

pub mod confirmation;
pub mod error;
pub mod routes;
pub mod session;
pub mod step;

pub use confirmation::OrderConfirmation;
pub use error::WizardError;
pub use session::{SessionView, ValidationReport, WizardSession};
pub use step::{Action, NavigationRequest, Step};
