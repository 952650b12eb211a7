//! Dose-list reconciliation.
//!
//! Pure functions that keep a medication's dose list in step with its
//! frequency: growing/shrinking on a frequency change, single-field edits,
//! renumbering before a save, and merging an edited sub-range back into
//! the full list. Nothing here performs I/O.

pub mod preset;

pub use preset::FrequencyPreset;

use chrono::NaiveTime;

use crate::models::{Dose, MealRelation};

/// Highest doses-per-day the editors offer.
pub const MAX_DAILY_DOSES: usize = 3;

/// Time given to padded doses.
pub fn default_dose_time() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DosingError {
    #[error("Dose index {index} out of range (list has {len} doses)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unsupported number of daily doses: {0}")]
    UnsupportedCount(usize),

    #[error("Unrecognised time: {0}")]
    InvalidTime(String),
}

/// A single-field change to one dose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoseEdit {
    Time(NaiveTime),
    Quantity(u32),
    MealRelation(Option<MealRelation>),
}

impl DoseEdit {
    /// Quantity typed by the user. Anything that is not a non-negative
    /// integer becomes 0.
    pub fn quantity_text(text: &str) -> Self {
        Self::Quantity(parse_quantity(text))
    }
}

pub fn parse_quantity(text: &str) -> u32 {
    text.trim().parse::<u32>().unwrap_or(0)
}

// ═══════════════════════════════════════════
// Frequency → template expansion
// ═══════════════════════════════════════════

/// Grow or shrink `doses` to exactly `target` entries.
///
/// Existing entries keep their position and content. New entries are
/// numbered after the current length with the default time, quantity 1
/// and "antes". Truncation always drops the highest positions first.
pub fn apply_frequency(mut doses: Vec<Dose>, target: usize) -> Vec<Dose> {
    if doses.len() > target {
        doses.truncate(target);
        return doses;
    }
    let current = doses.len();
    doses.extend((current..target).map(|i| {
        Dose::new(
            (i + 1) as u32,
            default_dose_time(),
            1,
            Some(MealRelation::Before),
        )
    }));
    doses
}

/// Like [`apply_frequency`], but missing positions are filled from a
/// template instead of the generic default.
pub fn apply_template(mut doses: Vec<Dose>, template: &[Dose]) -> Vec<Dose> {
    let target = template.len();
    if doses.len() >= target {
        doses.truncate(target);
        return doses;
    }
    let current = doses.len();
    doses.extend(template[current..].iter().cloned());
    doses
}

// ═══════════════════════════════════════════
// Edits
// ═══════════════════════════════════════════

pub fn edit_dose(doses: &mut [Dose], index: usize, edit: DoseEdit) -> Result<(), DosingError> {
    let len = doses.len();
    let dose = doses
        .get_mut(index)
        .ok_or(DosingError::IndexOutOfRange { index, len })?;
    match edit {
        DoseEdit::Time(time) => dose.time = time,
        DoseEdit::Quantity(quantity) => dose.quantity = quantity,
        DoseEdit::MealRelation(meal) => dose.meal_relation = meal,
    }
    Ok(())
}

/// Reassign every dose number to its 1-based position.
pub fn renumber(mut doses: Vec<Dose>) -> Vec<Dose> {
    for (i, dose) in doses.iter_mut().enumerate() {
        dose.dose_number = (i + 1) as u32;
    }
    doses
}

/// Merge-back for the fixed-layout dose screens.
///
/// Existing doses whose number appears among the replacements are dropped
/// and the replacements appended. Doses outside that set stay untouched,
/// numbering included; call [`renumber`] afterwards to repair positions.
pub fn replace_numbered(existing: Vec<Dose>, replacements: Vec<Dose>) -> Vec<Dose> {
    let mut merged: Vec<Dose> = existing
        .into_iter()
        .filter(|d| !replacements.iter().any(|r| r.dose_number == d.dose_number))
        .collect();
    merged.extend(replacements);
    merged
}

// ═══════════════════════════════════════════
// Frequency labels used by the dose editor
// ═══════════════════════════════════════════

pub fn frequency_label(count: usize) -> String {
    format!("{count} veces al día")
}

/// Leading integer of a label such as "2 veces al día".
pub fn parse_frequency_count(label: &str) -> Option<usize> {
    label.split_whitespace().next()?.parse().ok()
}
