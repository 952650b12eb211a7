//! Bundled medication catalog used by the search step.

use serde::Deserialize;

use crate::models::Presentation;

/// Shortest query that produces results.
pub const MIN_QUERY_CHARS: usize = 3;

const BUILTIN: &str = include_str!("../assets/medications.json");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "presentacion")]
    pub presentation: Presentation,
    /// Strength in mg.
    #[serde(rename = "contenido", default)]
    pub content_mg: u32,
}

impl CatalogEntry {
    /// "Pastillas, 400 mg"
    pub fn details(&self) -> String {
        format!("{}, {} mg", self.presentation, self.content_mg)
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn builtin() -> Result<Self, serde_json::Error> {
        Self::from_json(BUILTIN)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            entries: serde_json::from_str(raw)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring match on the name. Queries shorter
    /// than [`MIN_QUERY_CHARS`] return nothing.
    pub fn search(&self, query: &str) -> Vec<&CatalogEntry> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        assert!(!catalog.is_empty());
    }

    #[test]
    fn short_queries_return_nothing() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.search("ib").is_empty());
        assert!(catalog.search("  i ").is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let catalog = Catalog::builtin().unwrap();
        let hits = catalog.search("PROF");
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|e| e.name == "Ibuprofeno"));
        assert_eq!(hits[0].details(), "Pastillas, 400 mg");
    }

    #[test]
    fn accented_names_match() {
        let catalog = Catalog::builtin().unwrap();
        let hits = catalog.search("losartán");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].presentation, Presentation::Tablets);
    }
}
