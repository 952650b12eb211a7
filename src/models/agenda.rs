use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ModelError, RecordId};

/// Words of the note used as the entry title.
const TITLE_WORDS: usize = 6;

pub const DEFAULT_AGENDA_KIND: &str = "general";

/// A free-text health note pinned to a moment in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "nombre", default)]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "hora")]
    pub at: DateTime<Utc>,
    #[serde(rename = "tipo", default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    DEFAULT_AGENDA_KIND.to_string()
}

impl AgendaEntry {
    /// Build an entry from a note; the title is the note's first words.
    pub fn from_note(note: &str, at: DateTime<Utc>, kind: Option<&str>) -> Result<Self, ModelError> {
        let note = note.trim();
        if note.is_empty() {
            return Err(ModelError::EmptyNote);
        }
        let title = note.split_whitespace().take(TITLE_WORDS).collect::<Vec<_>>().join(" ");
        Ok(Self {
            id: None,
            title,
            description: note.to_string(),
            at,
            kind: kind
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .unwrap_or(DEFAULT_AGENDA_KIND)
                .to_string(),
        })
    }

    /// Title for list views.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Sin título"
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn title_is_first_six_words() {
        let entry = AgendaEntry::from_note(
            "Dolor de cabeza fuerte desde la mañana después del desayuno",
            noon(),
            None,
        )
        .unwrap();
        assert_eq!(entry.title, "Dolor de cabeza fuerte desde la");
        assert_eq!(entry.kind, "general");
        assert!(entry.description.ends_with("desayuno"));
    }

    #[test]
    fn empty_note_is_rejected() {
        assert!(matches!(
            AgendaEntry::from_note("   ", noon(), None),
            Err(ModelError::EmptyNote)
        ));
    }

    #[test]
    fn serializes_timestamp_as_rfc3339() {
        let entry = AgendaEntry::from_note("Tomar presión", noon(), Some("síntoma")).unwrap();
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["hora"], "2026-03-01T12:00:00Z");
        assert_eq!(value["tipo"], "síntoma");
    }

    #[test]
    fn untitled_entries_get_placeholder() {
        let entry: AgendaEntry =
            serde_json::from_str(r#"{"id":3,"hora":"2026-03-01T12:00:00.000Z"}"#).unwrap();
        assert_eq!(entry.display_title(), "Sin título");
        assert_eq!(entry.kind, "general");
    }
}
