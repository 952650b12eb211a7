//! Today's reminders and refill warnings derived from the medication list.

use chrono::NaiveTime;
use serde::Serialize;

use crate::models::{Medication, RecordId};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Medication '{name}' has no dose number {dose_number}")]
    UnknownDose { name: String, dose_number: u32 },
}

/// One line of the daily list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub medication_id: Option<RecordId>,
    pub name: String,
    pub dose_number: u32,
    pub time: NaiveTime,
    /// e.g. "Tomar 1 pastillas antes".
    pub action: String,
    pub icon: &'static str,
    pub administered: bool,
}

pub fn todays_reminders(medications: &[Medication]) -> Vec<Reminder> {
    let mut reminders: Vec<Reminder> = medications
        .iter()
        .flat_map(|med| {
            let presentation = med.effective_presentation();
            let unit = med.display_unit().to_lowercase();
            med.doses.iter().map(move |dose| {
                let mut action = format!("{} {} {}", presentation.action_verb(), dose.quantity, unit);
                if let Some(meal) = dose.meal_relation {
                    action.push(' ');
                    action.push_str(meal.as_str());
                }
                Reminder {
                    medication_id: med.id.clone(),
                    name: med.name.clone(),
                    dose_number: dose.dose_number,
                    time: dose.time,
                    action: action.trim_end().to_string(),
                    icon: presentation.icon(),
                    administered: dose.administered,
                }
            })
        })
        .collect();
    reminders.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.name.cmp(&b.name)));
    reminders
}

pub fn refill_alerts(medications: &[Medication]) -> Vec<&Medication> {
    medications.iter().filter(|m| m.needs_refill()).collect()
}

/// Copy of `medication` with one dose flagged as taken, ready for `update`.
pub fn mark_administered(medication: &Medication, dose_number: u32) -> Result<Medication, ScheduleError> {
    let mut updated = medication.clone();
    let dose = updated
        .doses
        .iter_mut()
        .find(|d| d.dose_number == dose_number)
        .ok_or_else(|| ScheduleError::UnknownDose {
            name: medication.name.clone(),
            dose_number,
        })?;
    dose.administered = true;
    Ok(updated)
}
