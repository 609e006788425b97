use std::collections::BTreeMap;

use thiserror::Error;
use uuid::Uuid;

use super::step::{Action, Step};
use crate::jurisdiction::SecurityTier;
use crate::pricing::PricingError;

/// Errors raised by wizard operations.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("session {0} not found")]
    SessionNotFound(Uuid),
    #[error("{kind} {index} does not exist")]
    IndexOutOfRange { kind: &'static str, index: usize },
    #[error("at most {max} {kind} entries are allowed")]
    LimitReached { kind: &'static str, max: usize },
    #[error("at least one {0} is required")]
    LastEntry(&'static str),
    #[error("order has been submitted; start a new order to make changes")]
    Locked,
    #[error("cannot {action} from the {from} step")]
    InvalidTransition { from: Step, action: Action },
    #[error("the {0} step is locked until the previous steps are complete")]
    StepLocked(Step),
    #[error("the {step} step has invalid fields")]
    Invalid {
        step: Step,
        errors: BTreeMap<String, String>,
    },
    #[error("the proof must be approved before ordering")]
    ProofNotApproved,
    #[error("security tier {0} is not offered")]
    TierNotOffered(SecurityTier),
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl WizardError {
    /// Short machine-readable kind used in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            WizardError::SessionNotFound(_) | WizardError::IndexOutOfRange { .. } => "NotFound",
            WizardError::LimitReached { .. }
            | WizardError::LastEntry(_)
            | WizardError::Locked => "Conflict",
            WizardError::InvalidTransition { .. }
            | WizardError::StepLocked(_)
            | WizardError::TierNotOffered(_) => "BadRequest",
            WizardError::Invalid { .. } | WizardError::ProofNotApproved => "ValidationFailed",
            WizardError::Pricing(_) => "InternalServerError",
        }
    }
}
