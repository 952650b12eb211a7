use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::clock::{clock_time, format_clock};
use super::enums::{meal_relation_opt, Frequency, MealRelation, Presentation};
use super::{null_as_default, RecordId};

/// One scheduled administration of a medication, repeated every day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dose {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "numero_dosis")]
    pub dose_number: u32,
    #[serde(rename = "hora_dosis", with = "clock_time")]
    pub time: NaiveTime,
    #[serde(rename = "cantidadP", default, deserialize_with = "null_as_default")]
    pub quantity: u32,
    #[serde(rename = "momento_comida", with = "meal_relation_opt", default)]
    pub meal_relation: Option<MealRelation>,
    #[serde(rename = "suministrada", default, deserialize_with = "null_as_default")]
    pub administered: bool,
}

impl Dose {
    pub fn new(
        dose_number: u32,
        time: NaiveTime,
        quantity: u32,
        meal_relation: Option<MealRelation>,
    ) -> Self {
        Self {
            id: None,
            dose_number,
            time,
            quantity,
            meal_relation,
            administered: false,
        }
    }

    pub fn time_label(&self) -> String {
        format_clock(&self.time)
    }
}

/// A medication record, either a local draft or as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "presentacion", default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<Presentation>,
    #[serde(rename = "unidad", default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "frecuencia", default)]
    pub frequency: Frequency,
    #[serde(rename = "numero_dosis", default, deserialize_with = "null_as_default")]
    pub dose_count: usize,
    #[serde(rename = "dosis", default, deserialize_with = "null_as_default")]
    pub doses: Vec<Dose>,
    #[serde(rename = "total_unidades", default, skip_serializing_if = "Option::is_none")]
    pub total_units: Option<u32>,
    #[serde(rename = "unidades_restantes", default, skip_serializing_if = "Option::is_none")]
    pub remaining_units: Option<u32>,
    #[serde(rename = "unidades_min", default, skip_serializing_if = "Option::is_none")]
    pub min_units: Option<u32>,
    #[serde(rename = "instrucciones", default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl Medication {
    /// A fresh draft: no doses, no frequency.
    pub fn draft(name: &str, presentation: Presentation) -> Self {
        Self {
            id: None,
            name: name.trim().to_string(),
            presentation: Some(presentation),
            unit: None,
            frequency: Frequency::Unset,
            dose_count: 0,
            doses: Vec::new(),
            total_units: None,
            remaining_units: None,
            min_units: None,
            instructions: None,
        }
    }

    /// Unit shown to the user: the server's `unidad`, else the presentation label.
    pub fn display_unit(&self) -> String {
        match (&self.unit, &self.presentation) {
            (Some(unit), _) if !unit.trim().is_empty() => unit.clone(),
            (_, Some(p)) => p.label().to_string(),
            _ => String::new(),
        }
    }

    /// Presentation used for the action verb and icon, derived from the
    /// unit when the record came from the server without one.
    pub fn effective_presentation(&self) -> Presentation {
        match (&self.presentation, &self.unit) {
            (Some(p), _) => p.clone(),
            (None, Some(unit)) => Presentation::parse(unit),
            (None, None) => Presentation::Other(String::new()),
        }
    }

    pub fn needs_refill(&self) -> bool {
        matches!(
            (self.remaining_units, self.min_units),
            (Some(remaining), Some(min)) if remaining <= min
        )
    }

    /// Replace the dose list and keep `dose_count` in step with it.
    pub fn set_doses(&mut self, doses: Vec<Dose>) {
        self.dose_count = doses.len();
        self.doses = doses;
    }

    pub fn doses_consistent(&self) -> bool {
        self.dose_count == self.doses.len()
    }
}
