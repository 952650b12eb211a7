use serde::{Deserialize, Serialize};

use crate::models::{Medication, Presentation};

/// The scratch list of in-progress medication drafts.
///
/// At most one draft exists per `(name, presentation)`; initializing an
/// existing key replaces it. Steps locate their draft by name, most
/// recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftBook {
    drafts: Vec<Medication>,
}

impl DraftBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh draft, discarding any previous one with the same key.
    pub fn initialize(&mut self, name: &str, presentation: Presentation) -> &mut Medication {
        let draft = Medication::draft(name, presentation);
        self.drafts
            .retain(|d| !(d.name == draft.name && d.presentation == draft.presentation));
        self.drafts.push(draft);
        let last = self.drafts.len() - 1;
        &mut self.drafts[last]
    }

    pub fn locate(&self, name: &str) -> Option<&Medication> {
        let name = name.trim();
        self.drafts.iter().rev().find(|d| d.name == name)
    }

    pub fn locate_mut(&mut self, name: &str) -> Option<&mut Medication> {
        let name = name.trim();
        self.drafts.iter_mut().rev().find(|d| d.name == name)
    }

    /// The most recently initialized draft.
    pub fn latest(&self) -> Option<&Medication> {
        self.drafts.last()
    }

    pub fn drafts(&self) -> &[Medication] {
        &self.drafts
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn clear(&mut self) {
        self.drafts.clear();
    }
}
