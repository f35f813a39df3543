use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::base::NaborError;

/// Reserved key every library must carry; fingerprints without a curated
/// entry resolve to it.
pub const UNKNOWN_KEY: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
/// One curated local-environment motif
pub struct Pattern {
    pub key: String,
    pub label: String,
    pub fingerprint: String,
    pub color: String,
}

/// On-disk record; the key lives in the enclosing JSON object
#[derive(Debug, Serialize, Deserialize)]
struct PatternRecord {
    label: String,
    fingerprint: String,
    color: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PatternFile {
    patterns: BTreeMap<String, PatternRecord>,
}

#[derive(Debug, Clone)]
/// Curated map from fingerprints to labeled, colored motifs, addressable both
/// by fingerprint and by key.
pub struct PatternLibrary {
    by_fingerprint: BTreeMap<String, Pattern>,
    by_key: BTreeMap<String, Pattern>,
}

impl PatternLibrary {
    /// A library holding only the reserved `unknown` entry
    pub fn new() -> Self {
        let mut library = Self {
            by_fingerprint: BTreeMap::new(),
            by_key: BTreeMap::new(),
        };
        library
            .add(UNKNOWN_KEY, "", "Unknown", "000000")
            .expect("the reserved entry is valid");
        library
    }

    /// Load a library from its JSON representation. A library without the
    /// `unknown` entry is rejected.
    pub fn load(path: &Path) -> Result<Self, NaborError> {
        let text = fs::read_to_string(path)?;
        let file: PatternFile = serde_json::from_str(&text).map_err(|e| {
            NaborError::InvalidInput(format!("malformed pattern file {}: {}", path.display(), e))
        })?;

        let mut library = Self {
            by_fingerprint: BTreeMap::new(),
            by_key: BTreeMap::new(),
        };
        for (key, record) in file.patterns {
            library.add(&key, &record.fingerprint, &record.label, &record.color)?;
        }

        if !library.by_key.contains_key(UNKNOWN_KEY) {
            return Err(NaborError::InvalidInput(format!(
                "pattern file {} is missing the '{}' entry",
                path.display(),
                UNKNOWN_KEY
            )));
        }

        debug!("loaded {} patterns from {}", library.len(), path.display());
        Ok(library)
    }

    /// Store the library as JSON
    pub fn save(&self, path: &Path) -> Result<(), NaborError> {
        let file = PatternFile {
            patterns: self
                .by_key
                .iter()
                .map(|(key, pattern)| {
                    (
                        key.clone(),
                        PatternRecord {
                            label: pattern.label.clone(),
                            fingerprint: pattern.fingerprint.clone(),
                            color: pattern.color.clone(),
                        },
                    )
                })
                .collect(),
        };
        let text = serde_json::to_string_pretty(&file)
            .map_err(|e| NaborError::InvalidState(format!("serialization failed: {}", e)))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Add a pattern; key, fingerprint and color syntax are validated and
    /// duplicates are rejected.
    pub fn add(
        &mut self,
        key: &str,
        fingerprint: &str,
        label: &str,
        color: &str,
    ) -> Result<(), NaborError> {
        Self::validate(key, fingerprint, color)?;
        if self.by_key.contains_key(key) {
            return Err(NaborError::InvalidInput(format!(
                "key '{}' already exists in the library",
                key
            )));
        }
        if self.by_fingerprint.contains_key(fingerprint) {
            return Err(NaborError::InvalidInput(format!(
                "fingerprint '{}' already exists in the library",
                fingerprint
            )));
        }

        let pattern = Pattern {
            key: key.to_string(),
            label: label.to_string(),
            fingerprint: fingerprint.to_string(),
            color: color.to_string(),
        };
        self.by_fingerprint
            .insert(fingerprint.to_string(), pattern.clone());
        self.by_key.insert(key.to_string(), pattern);
        Ok(())
    }

    /// Replace the fingerprint, label and color of an existing key
    pub fn edit(
        &mut self,
        key: &str,
        fingerprint: &str,
        label: &str,
        color: &str,
    ) -> Result<(), NaborError> {
        Self::validate(key, fingerprint, color)?;
        let existing = self
            .by_key
            .get(key)
            .ok_or_else(|| NaborError::NotFound(format!("unknown pattern key: {}", key)))?;
        if let Some(other) = self.by_fingerprint.get(fingerprint) {
            if other.key != key {
                return Err(NaborError::InvalidInput(format!(
                    "fingerprint '{}' already belongs to key '{}'",
                    fingerprint, other.key
                )));
            }
        }

        let old_fingerprint = existing.fingerprint.clone();
        let pattern = Pattern {
            key: key.to_string(),
            label: label.to_string(),
            fingerprint: fingerprint.to_string(),
            color: color.to_string(),
        };
        self.by_fingerprint.remove(&old_fingerprint);
        self.by_fingerprint
            .insert(fingerprint.to_string(), pattern.clone());
        self.by_key.insert(key.to_string(), pattern);
        Ok(())
    }

    /// Remove the pattern stored under `key`; the reserved `unknown` entry
    /// cannot be removed.
    pub fn remove(&mut self, key: &str) -> Result<(), NaborError> {
        if key == UNKNOWN_KEY {
            return Err(NaborError::InvalidInput(format!(
                "the '{}' entry is reserved and cannot be removed",
                UNKNOWN_KEY
            )));
        }
        let pattern = self
            .by_key
            .remove(key)
            .ok_or_else(|| NaborError::NotFound(format!("unknown pattern key: {}", key)))?;
        self.by_fingerprint.remove(&pattern.fingerprint);
        Ok(())
    }

    /// Look a pattern up by fingerprint, falling back to the `unknown` entry.
    /// A library without `unknown` is in an invalid state.
    pub fn get(&self, fingerprint: &str) -> Result<&Pattern, NaborError> {
        if let Some(pattern) = self.by_fingerprint.get(fingerprint) {
            return Ok(pattern);
        }
        self.by_key.get(UNKNOWN_KEY).ok_or_else(|| {
            NaborError::InvalidState(format!("library does not contain the '{}' entry", UNKNOWN_KEY))
        })
    }

    /// Look a pattern up by key
    pub fn get_by_key(&self, key: &str) -> Result<&Pattern, NaborError> {
        self.by_key
            .get(key)
            .ok_or_else(|| NaborError::NotFound(format!("unknown pattern key: {}", key)))
    }

    /// Human-readable label for a fingerprint
    pub fn identify(&self, fingerprint: &str) -> Result<&str, NaborError> {
        Ok(&self.get(fingerprint)?.label)
    }

    /// All patterns in key order
    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.by_key.values()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    fn validate(key: &str, fingerprint: &str, color: &str) -> Result<(), NaborError> {
        if !Self::is_valid_key(key) {
            return Err(NaborError::InvalidInput(format!("malformed key: '{}'", key)));
        }
        if !Self::is_valid_fingerprint(fingerprint) {
            return Err(NaborError::InvalidInput(format!(
                "malformed fingerprint: '{}'",
                fingerprint
            )));
        }
        if !Self::is_valid_color(color) {
            return Err(NaborError::InvalidInput(format!(
                "malformed color code: '{}'",
                color
            )));
        }
        Ok(())
    }

    /// A fingerprint is a possibly empty sequence of `count(n,e,p)` tokens
    pub fn is_valid_fingerprint(fingerprint: &str) -> bool {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"^([1-9][0-9]*\([0-9]+,[0-9]+,[0-9]+\))*$").unwrap())
            .is_match(fingerprint)
    }

    pub fn is_valid_key(key: &str) -> bool {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap())
            .is_match(key)
    }

    /// A color is a six digit hexadecimal RGB code
    pub fn is_valid_color(color: &str) -> bool {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"^[A-Fa-f0-9]{6}$").unwrap())
            .is_match(color)
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}
