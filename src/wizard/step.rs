//! Wizard steps and the transition table between them.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Practice,
    Prescribers,
    Review,
    Order,
    Confirmed,
}

impl Step {
    /// Steps in wizard order.
    pub const ALL: [Step; 5] = [
        Step::Practice,
        Step::Prescribers,
        Step::Review,
        Step::Order,
        Step::Confirmed,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Step::Practice => "practice",
            Step::Prescribers => "prescribers",
            Step::Review => "review",
            Step::Order => "order",
            Step::Confirmed => "confirmed",
        }
    }

    /// Steps before this one.
    pub fn predecessors(self) -> impl Iterator<Item = Step> {
        Step::ALL.into_iter().take_while(move |step| *step != self)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Back,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Continue => f.write_str("continue"),
            Action::Back => f.write_str("back"),
        }
    }
}

/// Every legal (from, action) -> to move. Anything else is rejected.
/// `Confirmed` is terminal; only a reset leaves it.
pub const TRANSITIONS: [(Step, Action, Step); 7] = [
    (Step::Practice, Action::Continue, Step::Prescribers),
    (Step::Prescribers, Action::Back, Step::Practice),
    (Step::Prescribers, Action::Continue, Step::Review),
    (Step::Review, Action::Back, Step::Prescribers),
    (Step::Review, Action::Continue, Step::Order),
    (Step::Order, Action::Back, Step::Review),
    (Step::Order, Action::Continue, Step::Confirmed),
];

pub fn transition(from: Step, action: Action) -> Option<Step> {
    TRANSITIONS
        .iter()
        .find(|(step, candidate, _)| *step == from && *candidate == action)
        .map(|(_, _, to)| *to)
}

/// Navigation command sent by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NavigationRequest {
    Continue,
    Back,
    GoTo { step: Step },
}
