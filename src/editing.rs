//! Editing a medication that already exists on the backend.
//!
//! `MedicationEditor` loads the full record, hands a working copy of its
//! doses to a `DoseEditor`, merges the result back and PUTs the whole
//! record.

use crate::api::{ApiError, MedicationRepository};
use crate::dosing::{self, DoseEdit, DosingError, MAX_DAILY_DOSES};
use crate::models::{Dose, Medication, ModelError, RecordId};

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("Medication has no id")]
    MissingId,

    #[error(transparent)]
    Invalid(#[from] ModelError),

    #[error(transparent)]
    Dosing(#[from] DosingError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl EditError {
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingId => "This medication has not been saved yet.".into(),
            Self::Invalid(e) => e.to_string(),
            Self::Dosing(e) => e.to_string(),
            Self::Api(e) => e.user_message(),
        }
    }
}

pub struct MedicationEditor {
    id: RecordId,
    medication: Medication,
}

impl MedicationEditor {
    pub async fn load<R: MedicationRepository>(repo: &R, id: &RecordId) -> Result<Self, EditError> {
        let medication = repo.fetch_with_doses(id).await?;
        tracing::debug!(id = %id, doses = medication.doses.len(), "Medication loaded for editing");
        Ok(Self {
            id: id.clone(),
            medication,
        })
    }

    /// Wrap a record already in hand. It must carry an id.
    pub fn from_record(medication: Medication) -> Result<Self, EditError> {
        let id = medication.id.clone().ok_or(EditError::MissingId)?;
        Ok(Self { id, medication })
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn medication(&self) -> &Medication {
        &self.medication
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), EditError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelError::MissingField("nombre").into());
        }
        self.medication.name = name.to_string();
        Ok(())
    }

    pub fn set_unit(&mut self, unit: &str) {
        let unit = unit.trim();
        self.medication.unit = (!unit.is_empty()).then(|| unit.to_string());
    }

    pub fn open_doses(&self) -> DoseEditor {
        DoseEditor::new(self.medication.doses.clone())
    }

    /// Take the doses produced by a [`DoseEditor`].
    pub fn apply_doses(&mut self, doses: Vec<Dose>) {
        self.medication.set_doses(dosing::renumber(doses));
    }

    /// Merge a fixed-layout screen's doses into the current list.
    pub fn merge_doses(&mut self, replacements: Vec<Dose>) {
        let merged = dosing::replace_numbered(std::mem::take(&mut self.medication.doses), replacements);
        self.medication.set_doses(merged);
    }

    /// PUT the complete record (name, unit and every dose).
    pub async fn save<R: MedicationRepository>(&mut self, repo: &R) -> Result<&Medication, EditError> {
        let doses = dosing::renumber(std::mem::take(&mut self.medication.doses));
        self.medication.set_doses(doses);
        self.medication.id = Some(self.id.clone());
        repo.update(&self.id, &self.medication).await?;
        Ok(&self.medication)
    }
}

/// Working copy of a dose list with a doses-per-day selector.
#[derive(Debug, Clone)]
pub struct DoseEditor {
    doses: Vec<Dose>,
}

impl DoseEditor {
    pub fn new(doses: Vec<Dose>) -> Self {
        Self { doses }
    }

    pub fn doses(&self) -> &[Dose] {
        &self.doses
    }

    /// Label shown by the selector, e.g. "2 veces al día".
    pub fn frequency_label(&self) -> String {
        dosing::frequency_label(self.doses.len())
    }

    pub fn change_frequency(&mut self, per_day: usize) -> Result<(), EditError> {
        if per_day == 0 || per_day > MAX_DAILY_DOSES {
            return Err(DosingError::UnsupportedCount(per_day).into());
        }
        self.doses = dosing::apply_frequency(std::mem::take(&mut self.doses), per_day);
        Ok(())
    }

    /// Change frequency from a selector label such as "3 veces al día".
    pub fn change_frequency_label(&mut self, label: &str) -> Result<(), EditError> {
        let count = dosing::parse_frequency_count(label)
            .ok_or_else(|| DosingError::UnsupportedCount(0))?;
        self.change_frequency(count)
    }

    pub fn edit(&mut self, index: usize, edit: DoseEdit) -> Result<(), EditError> {
        dosing::edit_dose(&mut self.doses, index, edit)?;
        Ok(())
    }

    /// Renumbered doses plus the selector label.
    pub fn finish(self) -> (Vec<Dose>, String) {
        let label = self.frequency_label();
        (dosing::renumber(self.doses), label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockMedicationRepository, RepoCall};
    use crate::models::{MealRelation, Presentation};
    use chrono::NaiveTime;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn stored() -> Medication {
        let mut med = Medication::draft("Metformina", Presentation::Tablets);
        med.id = Some(RecordId::Number(3));
        med.set_doses(vec![
            Dose::new(1, hm(7, 0), 1, Some(MealRelation::During)),
            Dose::new(2, hm(19, 0), 1, Some(MealRelation::During)),
        ]);
        med
    }

    #[tokio::test]
    async fn grow_to_three_doses_and_save() {
        let repo = MockMedicationRepository::with_records(vec![stored()]);
        let mut editor = MedicationEditor::load(&repo, &RecordId::Number(3)).await.unwrap();

        let mut doses = editor.open_doses();
        assert_eq!(doses.frequency_label(), "2 veces al día");
        doses.change_frequency_label("3 veces al día").unwrap();
        doses.edit(2, DoseEdit::Time(hm(13, 0))).unwrap();
        let (edited, label) = doses.finish();
        assert_eq!(label, "3 veces al día");

        editor.apply_doses(edited);
        editor.set_unit("tabletas");
        editor.save(&repo).await.unwrap();

        let calls = repo.calls();
        let RepoCall::Update(id, sent) = &calls[1] else {
            panic!("expected update, got {calls:?}");
        };
        assert_eq!(id, &RecordId::Number(3));
        assert_eq!(sent.dose_count, 3);
        assert_eq!(sent.doses[2].time, hm(13, 0));
        assert_eq!(sent.doses[2].dose_number, 3);
        assert_eq!(sent.unit.as_deref(), Some("tabletas"));
    }

    #[test]
    fn frequency_outside_selector_is_rejected() {
        let mut doses = DoseEditor::new(Vec::new());
        assert!(matches!(
            doses.change_frequency(4),
            Err(EditError::Dosing(DosingError::UnsupportedCount(4)))
        ));
        assert!(doses.change_frequency(0).is_err());
        assert!(doses.change_frequency_label("Diaria").is_err());
        assert!(doses.doses().is_empty());
    }

    #[test]
    fn shrinking_drops_last_doses() {
        let mut doses = DoseEditor::new(stored().doses);
        doses.change_frequency(1).unwrap();
        assert_eq!(doses.doses().len(), 1);
        assert_eq!(doses.doses()[0].time, hm(7, 0));
    }

    #[test]
    fn merge_keeps_unreplaced_dose() {
        let mut med = stored();
        med.set_doses(vec![
            Dose::new(1, hm(7, 0), 1, None),
            Dose::new(2, hm(13, 0), 1, None),
            Dose::new(3, hm(22, 0), 1, None),
        ]);
        let mut editor = MedicationEditor::from_record(med).unwrap();
        editor.merge_doses(vec![
            Dose::new(1, hm(8, 0), 2, None),
            Dose::new(2, hm(20, 0), 2, None),
        ]);
        let doses = &editor.medication().doses;
        assert_eq!(doses.len(), 3);
        assert_eq!(doses[0].time, hm(22, 0));
        assert_eq!(doses[0].dose_number, 3);
    }

    #[test]
    fn rename_rejects_blank_and_unit_clears() {
        let mut editor = MedicationEditor::from_record(stored()).unwrap();
        assert!(editor.set_name("   ").is_err());
        editor.set_name(" Ibuprofeno 600 ").unwrap();
        editor.set_unit(" ");
        assert_eq!(editor.medication().name, "Ibuprofeno 600");
        assert_eq!(editor.medication().unit, None);
    }

    #[test]
    fn record_without_id_cannot_be_edited() {
        let med = Medication::draft("X", Presentation::Pills);
        assert!(matches!(
            MedicationEditor::from_record(med),
            Err(EditError::MissingId)
        ));
    }

    #[tokio::test]
    async fn load_of_unknown_id_surfaces_status() {
        let repo = MockMedicationRepository::new();
        let err = MedicationEditor::load(&repo, &RecordId::Number(99))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, EditError::Api(ApiError::Status { status: 404, .. })));
    }
}
