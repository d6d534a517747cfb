//! Categorical label encoding with a mandatory `Unknown` fallback.
//!
//! `encode` is total: any label missing from the mapping resolves to the
//! `Unknown` code. A mapping without `Unknown` is rejected when it is built or
//! loaded, so the fallback can never be missing at query time.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Reserved label for values not seen during fitting.
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, u32>", into = "BTreeMap<String, u32>")]
pub struct CategoryEncoder {
    codes: BTreeMap<String, u32>,
    unknown: u32,
}

impl CategoryEncoder {
    /// Build from an explicit mapping. Fails if `Unknown` is absent.
    pub fn from_mapping(codes: BTreeMap<String, u32>) -> Result<Self, String> {
        let unknown = *codes
            .get(UNKNOWN_LABEL)
            .ok_or_else(|| format!("category mapping is missing the `{UNKNOWN_LABEL}` entry"))?;
        Ok(Self { codes, unknown })
    }

    /// Assign codes `0..k` to the distinct labels in sorted order and `k` to `Unknown`.
    pub fn fit<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let distinct: BTreeSet<&str> = labels
            .into_iter()
            .map(str::trim)
            .filter(|l| !l.is_empty() && *l != UNKNOWN_LABEL)
            .collect();

        let mut codes: BTreeMap<String, u32> = distinct
            .into_iter()
            .enumerate()
            .map(|(i, l)| (l.to_string(), i as u32))
            .collect();
        let unknown = codes.len() as u32;
        codes.insert(UNKNOWN_LABEL.to_string(), unknown);
        Self { codes, unknown }
    }

    pub fn encode(&self, label: &str) -> u32 {
        self.codes.get(label.trim()).copied().unwrap_or(self.unknown)
    }

    pub fn unknown_code(&self) -> u32 {
        self.unknown
    }

    /// Known labels sorted, with `Unknown` last.
    pub fn labels(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .codes
            .keys()
            .map(String::as_str)
            .filter(|l| *l != UNKNOWN_LABEL)
            .collect();
        out.push(UNKNOWN_LABEL);
        out
    }

    /// Indicator vector over the known labels in sorted order.
    ///
    /// `Unknown` has no slot: an unseen label encodes as all zeros.
    pub fn one_hot(&self, label: &str) -> impl Iterator<Item = f64> + '_ {
        let label = label.trim().to_string();
        self.codes
            .keys()
            .filter(|l| *l != UNKNOWN_LABEL)
            .map(move |l| if *l == label { 1.0 } else { 0.0 })
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl TryFrom<BTreeMap<String, u32>> for CategoryEncoder {
    type Error = String;

    fn try_from(value: BTreeMap<String, u32>) -> Result<Self, Self::Error> {
        Self::from_mapping(value)
    }
}

impl From<CategoryEncoder> for BTreeMap<String, u32> {
    fn from(value: CategoryEncoder) -> Self {
        value.codes
    }
}

/// Load a `{label: code}` JSON mapping.
pub fn read_encoder_json(path: &Path) -> Result<CategoryEncoder, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open mapping '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid mapping '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_labels_fall_back_to_unknown() {
        let enc = CategoryEncoder::fit(["Vitamin", "Herbal", "Vitamin", " Omega "]);
        assert_eq!(enc.encode("Herbal"), 0);
        assert_eq!(enc.encode("Omega"), 1);
        assert_eq!(enc.encode("Vitamin"), 2);
        assert_eq!(enc.encode("NonExistentCategory"), 3);
        assert_eq!(enc.unknown_code(), 3);
        assert_eq!(enc.labels(), vec!["Herbal", "Omega", "Vitamin", "Unknown"]);
    }

    #[test]
    fn one_hot_has_a_slot_per_known_label() {
        let enc = CategoryEncoder::fit(["USA", "UK", "Canada"]);
        assert_eq!(enc.one_hot("UK").collect::<Vec<_>>(), vec![0.0, 1.0, 0.0]);
        assert_eq!(enc.one_hot(" Canada ").collect::<Vec<_>>(), vec![1.0, 0.0, 0.0]);
        assert_eq!(enc.one_hot("Mars").collect::<Vec<_>>(), vec![0.0; 3]);
        assert_eq!(enc.one_hot(UNKNOWN_LABEL).collect::<Vec<_>>(), vec![0.0; 3]);
    }

    #[test]
    fn mapping_without_unknown_is_rejected() {
        let json = r#"{"USA": 0, "UK": 1}"#;
        let err = serde_json::from_str::<CategoryEncoder>(json).unwrap_err();
        assert!(err.to_string().contains("Unknown"));
    }

    #[test]
    fn mapping_with_unknown_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("platform.json");
        std::fs::write(&path, r#"{"Amazon": 0, "Walmart": 1, "Unknown": 9}"#).unwrap();

        let enc = read_encoder_json(&path).unwrap();
        assert_eq!(enc.encode("Walmart"), 1);
        assert_eq!(enc.encode("eBay"), 9);
        assert_eq!(enc.len(), 3);
        assert!(!enc.is_empty());
    }
}
