//! One customer's in-progress order and its position in the wizard.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::confirmation::OrderConfirmation;
use super::error::WizardError;
use super::step::{transition, Action, NavigationRequest, Step};
use crate::jurisdiction::{Jurisdiction, JurisdictionConfig, SecurityTier};
use crate::layout::{derive_layout, derive_preview, LayoutInput, PadLayout};
use crate::models::{
    sample_practice, sample_prescriber, OrderDraft, PadOptions, PracticeLocation, Prescriber,
    UpdatePracticeRequest, UpdatePrescriberRequest,
};
use crate::pricing::{OrderOptions, Quote};
use crate::validation::{
    format_phone, practice_errors, prescriber_errors, ValidationErrors, ValidationOutcome,
};

const PRACTICE_KIND: &str = "practice location";
const PRESCRIBER_KIND: &str = "prescriber";

/// Per-record validation of a session plus the steps it may navigate to.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidationReport {
    pub practices: Vec<ValidationOutcome>,
    pub prescribers: Vec<ValidationOutcome>,
    pub proof_approved: bool,
    pub unlocked_steps: Vec<Step>,
    /// Whether `continue` would succeed from the current step.
    pub can_continue: bool,
}

/// Serialised snapshot of a session.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionView {
    pub id: Uuid,
    pub step: Step,
    pub unlocked_steps: Vec<Step>,
    pub draft: OrderDraft,
    pub confirmation: Option<OrderConfirmation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WizardSession {
    id: Uuid,
    step: Step,
    draft: OrderDraft,
    confirmation: Option<OrderConfirmation>,
    jurisdiction: Arc<Jurisdiction>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Prefixes every field of a record's errors with `<list>[<index>].`.
fn collect_indexed(
    list: &str,
    outcomes: impl Iterator<Item = ValidationErrors>,
) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for (index, errors) in outcomes.enumerate() {
        for (field, message) in errors.field_map() {
            map.insert(format!("{}[{}].{}", list, index, field), message);
        }
    }
    map
}

fn apply(target: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

impl WizardSession {
    pub fn new(jurisdiction: Arc<Jurisdiction>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            step: Step::Practice,
            draft: OrderDraft::new(&jurisdiction.rules),
            confirmation: None,
            jurisdiction,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    pub fn rules(&self) -> &JurisdictionConfig {
        &self.jurisdiction.rules
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.step == Step::Confirmed {
            return Err(WizardError::Locked);
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// The approved proof no longer matches; approval must be given again.
    fn proof_changed(&mut self) {
        self.draft.proof_approved = false;
        if self.step > Step::Review {
            log::debug!("Session {} returned to review after proof edit", self.id);
            self.step = Step::Review;
        }
        self.touch();
    }

    // ------------------------------------------------------------------
    // Practice locations
    // ------------------------------------------------------------------

    pub fn update_practice(
        &mut self,
        index: usize,
        update: &UpdatePracticeRequest,
    ) -> Result<&PracticeLocation, WizardError> {
        self.ensure_editable()?;
        let practice = self
            .draft
            .practices
            .get_mut(index)
            .ok_or(WizardError::IndexOutOfRange {
                kind: PRACTICE_KIND,
                index,
            })?;

        apply(&mut practice.name, &update.name);
        apply(&mut practice.address, &update.address);
        apply(&mut practice.city, &update.city);
        apply(&mut practice.state, &update.state);
        apply(&mut practice.zip, &update.zip);
        if let Some(phone) = &update.phone {
            practice.phone = format_phone(phone);
        }
        if let Some(fax) = &update.fax {
            practice.fax = format_phone(fax);
        }

        self.proof_changed();
        Ok(&self.draft.practices[index])
    }

    /// Appends a blank location; returns its index.
    pub fn add_practice(&mut self) -> Result<usize, WizardError> {
        self.ensure_editable()?;
        let max = self.rules().max_locations;
        if self.draft.practices.len() >= max {
            return Err(WizardError::LimitReached {
                kind: PRACTICE_KIND,
                max,
            });
        }
        let blank = PracticeLocation::in_state(&self.rules().state_code);
        self.draft.practices.push(blank);
        self.proof_changed();
        Ok(self.draft.practices.len() - 1)
    }

    pub fn remove_practice(&mut self, index: usize) -> Result<(), WizardError> {
        self.ensure_editable()?;
        if index >= self.draft.practices.len() {
            return Err(WizardError::IndexOutOfRange {
                kind: PRACTICE_KIND,
                index,
            });
        }
        if self.draft.practices.len() == 1 {
            return Err(WizardError::LastEntry(PRACTICE_KIND));
        }
        self.draft.practices.remove(index);
        self.proof_changed();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Prescribers
    // ------------------------------------------------------------------

    pub fn update_prescriber(
        &mut self,
        index: usize,
        update: &UpdatePrescriberRequest,
    ) -> Result<&Prescriber, WizardError> {
        self.ensure_editable()?;
        let prescriber =
            self.draft
                .prescribers
                .get_mut(index)
                .ok_or(WizardError::IndexOutOfRange {
                    kind: PRESCRIBER_KIND,
                    index,
                })?;

        apply(&mut prescriber.name, &update.name);
        apply(&mut prescriber.credentials, &update.credentials);
        apply(&mut prescriber.specialty, &update.specialty);
        apply(&mut prescriber.license_number, &update.license_number);
        apply(&mut prescriber.npi_number, &update.npi_number);
        apply(&mut prescriber.dea_number, &update.dea_number);
        if let Some(hide_license) = update.hide_license {
            prescriber.hide_license = hide_license;
        }

        self.proof_changed();
        Ok(&self.draft.prescribers[index])
    }

    pub fn add_prescriber(&mut self) -> Result<usize, WizardError> {
        self.ensure_editable()?;
        let max = self.rules().max_prescribers;
        if self.draft.prescribers.len() >= max {
            return Err(WizardError::LimitReached {
                kind: PRESCRIBER_KIND,
                max,
            });
        }
        self.draft.prescribers.push(Prescriber::default());
        self.proof_changed();
        Ok(self.draft.prescribers.len() - 1)
    }

    pub fn remove_prescriber(&mut self, index: usize) -> Result<(), WizardError> {
        self.ensure_editable()?;
        if index >= self.draft.prescribers.len() {
            return Err(WizardError::IndexOutOfRange {
                kind: PRESCRIBER_KIND,
                index,
            });
        }
        if self.draft.prescribers.len() == 1 {
            return Err(WizardError::LastEntry(PRESCRIBER_KIND));
        }
        self.draft.prescribers.remove(index);
        self.proof_changed();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Options
    // ------------------------------------------------------------------

    pub fn set_pad_options(&mut self, options: PadOptions) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft.pad_options = options;
        self.proof_changed();
        Ok(())
    }

    pub fn set_security_tier(&mut self, tier: SecurityTier) -> Result<(), WizardError> {
        self.ensure_editable()?;
        if !self.rules().offers(tier) {
            return Err(WizardError::TierNotOffered(tier));
        }
        if self.draft.security_tier != tier {
            self.draft.security_tier = tier;
            self.proof_changed();
        }
        Ok(())
    }

    /// Quantity, paper and production do not change the proof.
    pub fn set_order_options(&mut self, options: OrderOptions) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft.order_options = options;
        self.touch();
        Ok(())
    }

    /// Approval is only accepted once the proof can be reviewed.
    pub fn set_approval(&mut self, approved: bool) -> Result<(), WizardError> {
        self.ensure_editable()?;
        if approved && !self.is_unlocked(Step::Review) {
            return Err(WizardError::StepLocked(Step::Review));
        }
        if approved {
            self.draft.proof_approved = true;
            self.touch();
        } else {
            self.proof_changed();
        }
        Ok(())
    }

    /// Fills the first location and prescriber with sample data.
    pub fn prefill_sample(&mut self) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft.practices[0] = sample_practice();
        self.draft.prescribers[0] = sample_prescriber();
        self.proof_changed();
        Ok(())
    }

    /// Starts a new order, discarding everything entered so far.
    pub fn reset(&mut self) {
        self.draft = OrderDraft::new(&self.jurisdiction.rules);
        self.step = Step::Practice;
        self.confirmation = None;
        self.touch();
    }

    // ------------------------------------------------------------------
    // Guards and navigation
    // ------------------------------------------------------------------

    pub fn practice_errors(&self) -> BTreeMap<String, String> {
        collect_indexed("practices", self.draft.practices.iter().map(practice_errors))
    }

    pub fn prescriber_errors(&self) -> BTreeMap<String, String> {
        collect_indexed(
            "prescribers",
            self.draft.prescribers.iter().map(prescriber_errors),
        )
    }

    /// Condition for leaving `step` forwards.
    pub fn check_guard(&self, step: Step) -> Result<(), WizardError> {
        match step {
            Step::Practice => {
                let errors = self.practice_errors();
                if !errors.is_empty() {
                    return Err(WizardError::Invalid { step, errors });
                }
            }
            Step::Prescribers => {
                let errors = self.prescriber_errors();
                if !errors.is_empty() {
                    return Err(WizardError::Invalid { step, errors });
                }
            }
            Step::Review => {
                if !self.draft.proof_approved {
                    return Err(WizardError::ProofNotApproved);
                }
            }
            Step::Order => {
                self.quote()?;
            }
            Step::Confirmed => {}
        }
        Ok(())
    }

    /// A step is reachable once every step before it passes its guard.
    /// `Confirmed` is only reached by submitting.
    pub fn is_unlocked(&self, step: Step) -> bool {
        if step == Step::Confirmed {
            return self.step == Step::Confirmed;
        }
        if self.step == Step::Confirmed {
            return false;
        }
        step.predecessors().all(|prior| self.check_guard(prior).is_ok())
    }

    pub fn unlocked_steps(&self) -> Vec<Step> {
        Step::ALL
            .into_iter()
            .filter(|step| self.is_unlocked(*step))
            .collect()
    }

    pub fn navigate(
        &mut self,
        request: NavigationRequest,
        now: DateTime<Utc>,
    ) -> Result<Step, WizardError> {
        match request {
            NavigationRequest::Continue => {
                if self.step == Step::Order {
                    self.submit(now)?;
                    return Ok(self.step);
                }
                let next = self.next_step(Action::Continue)?;
                self.check_guard(self.step)?;
                self.step = next;
            }
            NavigationRequest::Back => {
                self.step = self.next_step(Action::Back)?;
            }
            NavigationRequest::GoTo { step } => {
                self.ensure_editable()?;
                if !self.is_unlocked(step) {
                    return Err(WizardError::StepLocked(step));
                }
                self.step = step;
            }
        }
        self.touch();
        log::debug!("Session {} moved to {}", self.id, self.step);
        Ok(self.step)
    }

    fn next_step(&self, action: Action) -> Result<Step, WizardError> {
        transition(self.step, action).ok_or(WizardError::InvalidTransition {
            from: self.step,
            action,
        })
    }

    /// Places the order from the `order` step.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<&OrderConfirmation, WizardError> {
        self.ensure_editable()?;
        let next = self.next_step(Action::Continue)?;
        if next != Step::Confirmed {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                action: Action::Continue,
            });
        }
        for step in Step::Confirmed.predecessors() {
            self.check_guard(step)?;
        }

        let quote = self.quote()?;
        let confirmation = OrderConfirmation::new(
            self.draft.security_tier,
            self.draft.order_options,
            quote,
            now,
        );
        log::info!(
            "Session {} submitted order {} (total ${})",
            self.id,
            confirmation.order_number,
            quote.total
        );

        self.step = Step::Confirmed;
        self.updated_at = now;
        Ok(self.confirmation.insert(confirmation))
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    pub fn quote(&self) -> Result<Quote, WizardError> {
        Ok(self
            .jurisdiction
            .pricing
            .quote(self.draft.security_tier, &self.draft.order_options)?)
    }

    pub fn layout(&self) -> PadLayout {
        derive_layout(&LayoutInput::from(&self.draft), self.rules())
    }

    pub fn preview(&self) -> PadLayout {
        derive_preview(&LayoutInput::from(&self.draft), self.rules())
    }

    /// File name context: the tier id, prefixed with `Proof-` for proofs.
    pub fn export_context(&self, proof: bool) -> String {
        let tier = self.draft.security_tier.id();
        if proof {
            format!("Proof-{}", tier)
        } else {
            tier.to_string()
        }
    }

    pub fn validation_report(&self) -> ValidationReport {
        let can_continue = match self.step {
            Step::Confirmed => false,
            step => self.check_guard(step).is_ok(),
        };
        ValidationReport {
            practices: self
                .draft
                .practices
                .iter()
                .map(|p| practice_errors(p).into())
                .collect(),
            prescribers: self
                .draft
                .prescribers
                .iter()
                .map(|p| prescriber_errors(p).into())
                .collect(),
            proof_approved: self.draft.proof_approved,
            unlocked_steps: self.unlocked_steps(),
            can_continue,
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            step: self.step,
            unlocked_steps: self.unlocked_steps(),
            draft: self.draft.clone(),
            confirmation: self.confirmation.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
