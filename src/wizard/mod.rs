//! Add-medication wizard.
//!
//! A draft is built step by step (name and presentation, frequency,
//! doses, refill threshold, instructions) in a [`DraftBook`] owned by one
//! [`AddMedicationFlow`], then submitted once. The CLI persists the book
//! between steps through [`ScratchFile`].

pub mod book;
pub mod scratch;

pub use book::DraftBook;
pub use scratch::{ScratchError, ScratchFile, SubmitLock};

use uuid::Uuid;

use crate::api::{ApiError, MedicationRepository};
use crate::dosing::{self, DoseEdit, DosingError, FrequencyPreset};
use crate::models::{Dose, Medication, ModelError, Presentation};

/// Stock a new draft starts with until the refill step says otherwise.
pub const DEFAULT_STOCK_UNITS: u32 = 500;

/// Refill threshold a new draft starts with.
pub const DEFAULT_MIN_UNITS: u32 = 8;

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("No medication is being added")]
    NotStarted,

    #[error("No draft named '{0}'")]
    DraftNotFound(String),

    #[error("Draft '{0}' has no doses")]
    NoDoses(String),

    #[error(transparent)]
    Invalid(#[from] ModelError),

    #[error(transparent)]
    Dosing(#[from] DosingError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Scratch(#[from] ScratchError),
}

impl WizardError {
    pub fn user_message(&self) -> String {
        match self {
            Self::NotStarted => "Start by choosing a medication and its presentation.".into(),
            Self::DraftNotFound(name) => format!("'{name}' is not being added right now."),
            Self::NoDoses(_) => "Add at least one dose before saving.".into(),
            Self::Invalid(e) => e.to_string(),
            Self::Dosing(e) => e.to_string(),
            Self::Api(e) => e.user_message(),
            Self::Scratch(_) => "Your in-progress medication could not be read or saved.".into(),
        }
    }
}

/// One add-medication session.
pub struct AddMedicationFlow {
    id: Uuid,
    book: DraftBook,
    current: Option<String>,
}

impl Default for AddMedicationFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl AddMedicationFlow {
    pub fn new() -> Self {
        Self::resume(DraftBook::new())
    }

    /// Continue from a saved book; the latest draft becomes current.
    pub fn resume(book: DraftBook) -> Self {
        let current = book.latest().map(|d| d.name.clone());
        Self {
            id: Uuid::new_v4(),
            book,
            current,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn book(&self) -> &DraftBook {
        &self.book
    }

    pub fn current(&self) -> Option<&Medication> {
        self.current.as_deref().and_then(|name| self.book.locate(name))
    }

    /// Name and presentation chosen: begin (or restart) a draft.
    pub fn start(&mut self, name: &str, presentation: Presentation) -> Result<&Medication, WizardError> {
        if name.trim().is_empty() {
            return Err(ModelError::MissingField("nombre").into());
        }
        let draft = self.book.initialize(name, presentation);
        tracing::debug!(flow = %self.id, name = %draft.name, "Draft started");
        self.current = Some(draft.name.clone());
        Ok(&*draft)
    }

    fn draft_mut(&mut self) -> Result<&mut Medication, WizardError> {
        let name = self.current.as_deref().ok_or(WizardError::NotStarted)?;
        self.book
            .locate_mut(name)
            .ok_or_else(|| WizardError::DraftNotFound(name.to_string()))
    }

    /// Frequency step. Existing doses keep their position; missing ones
    /// come from the preset. Unset stock counts get their defaults here.
    pub fn select_frequency(&mut self, preset: &FrequencyPreset) -> Result<&Medication, WizardError> {
        let draft = self.draft_mut()?;
        draft.frequency = preset.frequency();
        draft.total_units.get_or_insert(DEFAULT_STOCK_UNITS);
        draft.remaining_units.get_or_insert(DEFAULT_STOCK_UNITS);
        draft.min_units.get_or_insert(DEFAULT_MIN_UNITS);
        let doses = dosing::apply_template(std::mem::take(&mut draft.doses), &preset.template());
        draft.set_doses(doses);
        Ok(&*draft)
    }

    /// Fixed-layout dose screen: the given doses replace those with the
    /// same numbers.
    pub fn save_fixed_doses(&mut self, doses: Vec<Dose>) -> Result<&Medication, WizardError> {
        let draft = self.draft_mut()?;
        let merged = dosing::replace_numbered(std::mem::take(&mut draft.doses), doses);
        draft.set_doses(merged);
        Ok(&*draft)
    }

    pub fn edit_dose(&mut self, index: usize, edit: DoseEdit) -> Result<&Medication, WizardError> {
        let draft = self.draft_mut()?;
        dosing::edit_dose(&mut draft.doses, index, edit)?;
        Ok(&*draft)
    }

    pub fn set_refill(
        &mut self,
        remaining: u32,
        min: u32,
        total: Option<u32>,
    ) -> Result<&Medication, WizardError> {
        let draft = self.draft_mut()?;
        draft.remaining_units = Some(remaining);
        draft.min_units = Some(min);
        if total.is_some() {
            draft.total_units = total;
        }
        Ok(&*draft)
    }

    pub fn set_instructions(&mut self, text: &str) -> Result<&Medication, WizardError> {
        let draft = self.draft_mut()?;
        let text = text.trim();
        draft.instructions = (!text.is_empty()).then(|| text.to_string());
        Ok(&*draft)
    }

    /// Submit the current draft. On success the whole scratch list is
    /// cleared and the created record is returned; on failure the draft
    /// is kept so the user can retry.
    pub async fn finalize<R: MedicationRepository>(
        &mut self,
        repo: &R,
    ) -> Result<Medication, WizardError> {
        let name = self.current.clone().ok_or(WizardError::NotStarted)?;
        let mut draft = self
            .book
            .locate(&name)
            .cloned()
            .ok_or_else(|| WizardError::DraftNotFound(name.clone()))?;
        if draft.doses.is_empty() {
            return Err(WizardError::NoDoses(name));
        }

        let doses = dosing::renumber(std::mem::take(&mut draft.doses));
        draft.set_doses(doses);
        if draft.unit.as_deref().map_or(true, |u| u.trim().is_empty()) {
            draft.unit = draft.presentation.as_ref().map(|p| p.label().to_string());
        }

        let created = repo.create(&draft).await?;
        self.book.clear();
        self.current = None;
        tracing::info!(flow = %self.id, name = %created.name, doses = created.doses.len(), "Medication added");
        Ok(created)
    }

    /// Abandon the flow and drop every draft.
    pub fn cancel(&mut self) {
        self.book.clear();
        self.current = None;
        tracing::debug!(flow = %self.id, "Add-medication flow cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockMedicationRepository, RepoCall};
    use crate::models::{Frequency, MealRelation};
    use chrono::NaiveTime;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn ibuprofeno_twice_daily_with_edited_evening_dose() {
        let mut flow = AddMedicationFlow::new();
        flow.start("Ibuprofeno", Presentation::Pills).unwrap();
        let draft = flow
            .select_frequency(&FrequencyPreset::parse("Dos veces al día"))
            .unwrap();
        assert_eq!(draft.frequency, Frequency::Daily);
        assert_eq!(
            draft.doses,
            vec![
                Dose::new(1, hm(8, 0), 1, Some(MealRelation::Before)),
                Dose::new(2, hm(20, 0), 1, Some(MealRelation::After)),
            ]
        );

        flow.edit_dose(1, DoseEdit::Time(hm(21, 30))).unwrap();

        let repo = MockMedicationRepository::new();
        let created = flow.finalize(&repo).await.unwrap();
        assert!(created.id.is_some());

        let calls = repo.calls();
        assert_eq!(calls.len(), 1);
        let RepoCall::Create(sent) = &calls[0] else {
            panic!("expected a create call, got {calls:?}");
        };
        assert_eq!(sent.doses.len(), 2);
        assert_eq!(sent.dose_count, 2);
        assert_eq!(sent.doses[0].time, hm(8, 0));
        assert_eq!(sent.doses[1].time, hm(21, 30));
        assert_eq!(sent.doses[1].meal_relation, Some(MealRelation::After));
        assert_eq!(sent.unit.as_deref(), Some("Pastillas"));
    }

    #[tokio::test]
    async fn finalize_clears_scratch_and_creates_once() {
        let mut flow = AddMedicationFlow::new();
        flow.start("Loratadina", Presentation::Tablets).unwrap();
        flow.start("Omeprazol", Presentation::Pills).unwrap();
        flow.select_frequency(&FrequencyPreset::OnceDaily).unwrap();
        flow.set_refill(20, 5, Some(30)).unwrap();
        flow.set_instructions("  En ayunas ").unwrap();

        let repo = MockMedicationRepository::new();
        flow.finalize(&repo).await.unwrap();

        assert!(flow.book().is_empty());
        assert!(flow.current().is_none());
        let calls = repo.calls();
        assert_eq!(calls.len(), 1);
        let RepoCall::Create(sent) = &calls[0] else {
            panic!("expected a create call");
        };
        assert_eq!(sent.name, "Omeprazol");
        assert_eq!(sent.instructions.as_deref(), Some("En ayunas"));
        assert_eq!(sent.remaining_units, Some(20));
        assert_eq!(sent.total_units, Some(30));
    }

    #[test]
    fn frequency_step_seeds_stock_counts() {
        let mut flow = AddMedicationFlow::new();
        flow.start("Omeprazol", Presentation::Pills).unwrap();
        let draft = flow.select_frequency(&FrequencyPreset::OnceDaily).unwrap();
        assert_eq!(draft.total_units, Some(DEFAULT_STOCK_UNITS));
        assert_eq!(draft.remaining_units, Some(DEFAULT_STOCK_UNITS));
        assert_eq!(draft.min_units, Some(DEFAULT_MIN_UNITS));

        flow.set_refill(20, 5, None).unwrap();
        let draft = flow.select_frequency(&FrequencyPreset::TwiceDaily).unwrap();
        assert_eq!(draft.remaining_units, Some(20));
        assert_eq!(draft.min_units, Some(5));
        assert_eq!(draft.total_units, Some(DEFAULT_STOCK_UNITS));
    }

    #[tokio::test]
    async fn zero_doses_never_reach_the_repository() {
        let mut flow = AddMedicationFlow::new();
        flow.start("Paracetamol", Presentation::Syrup).unwrap();
        flow.select_frequency(&FrequencyPreset::AsNeeded).unwrap();

        let repo = MockMedicationRepository::new();
        let err = flow.finalize(&repo).await.unwrap_err();
        assert!(matches!(err, WizardError::NoDoses(_)));
        assert!(repo.calls().is_empty());
        assert_eq!(flow.book().len(), 1);
    }

    #[tokio::test]
    async fn failed_create_keeps_the_draft() {
        let mut flow = AddMedicationFlow::new();
        flow.start("Ibuprofeno", Presentation::Pills).unwrap();
        flow.select_frequency(&FrequencyPreset::OnceDaily).unwrap();

        let repo = MockMedicationRepository::failing(500);
        let err = flow.finalize(&repo).await.unwrap_err();
        assert!(matches!(err, WizardError::Api(_)));
        assert_eq!(flow.current().unwrap().doses.len(), 1);
    }

    #[test]
    fn steps_before_start_are_rejected() {
        let mut flow = AddMedicationFlow::new();
        assert!(matches!(
            flow.set_instructions("x"),
            Err(WizardError::NotStarted)
        ));
        assert!(flow.start("  ", Presentation::Pills).is_err());
    }

    #[test]
    fn fixed_dose_screen_replaces_matching_numbers() {
        let mut flow = AddMedicationFlow::new();
        flow.start("Metformina", Presentation::Tablets).unwrap();
        flow.select_frequency(&FrequencyPreset::ThreeTimesDaily).unwrap();

        let draft = flow
            .save_fixed_doses(vec![Dose::new(1, hm(7, 0), 1, Some(MealRelation::During))])
            .unwrap();
        assert_eq!(draft.doses.len(), 3);
        assert_eq!(draft.dose_count, 3);
        assert_eq!(draft.doses[2].time, hm(7, 0));
    }

    #[test]
    fn preset_change_keeps_edited_first_dose() {
        let mut flow = AddMedicationFlow::new();
        flow.start("Metformina", Presentation::Tablets).unwrap();
        flow.select_frequency(&FrequencyPreset::OnceDaily).unwrap();
        flow.edit_dose(0, DoseEdit::Time(hm(6, 45))).unwrap();

        let draft = flow.select_frequency(&FrequencyPreset::ThreeTimesDaily).unwrap();
        assert_eq!(draft.doses.len(), 3);
        assert_eq!(draft.doses[0].time, hm(6, 45));
        assert_eq!(draft.doses[1].time, hm(14, 0));
    }

    #[test]
    fn resume_picks_latest_draft_and_cancel_clears() {
        let mut book = DraftBook::new();
        book.initialize("A", Presentation::Pills);
        book.initialize("B", Presentation::Cream);
        let mut flow = AddMedicationFlow::resume(book);
        assert_eq!(flow.current().unwrap().name, "B");

        flow.cancel();
        assert!(flow.book().is_empty());
        assert!(matches!(flow.edit_dose(0, DoseEdit::Quantity(1)), Err(WizardError::NotStarted)));
    }
}
