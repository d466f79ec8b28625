//! Redaction policies.
//!
//! A policy is the declarative rulebook a calling module ships for its
//! exportable fields. Field order in the policy fixes column order in every
//! output file.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Privacy action applied to a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactionAction {
    /// Value passes through unchanged.
    Include,
    /// Value is replaced by a truncated digest.
    Hash,
    /// Interior characters are replaced by a mask character.
    Mask,
    /// Field is dropped from the output row entirely.
    Exclude,
}

impl RedactionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::Hash => "hash",
            Self::Mask => "mask",
            Self::Exclude => "exclude",
        }
    }

    /// Returns true for actions that transform the value instead of passing it through.
    pub fn is_redacting(&self) -> bool {
        matches!(self, Self::Hash | Self::Mask)
    }
}

impl fmt::Display for RedactionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field export rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Dot-path into a raw record (e.g. `contact.email`).
    pub key: String,
    /// Column header shown in output files.
    pub label: String,
    pub action: RedactionAction,
    /// Whether a confirmed full export may lift this field's redaction.
    #[serde(default)]
    pub overridable: bool,
    #[serde(default = "default_selected")]
    pub default_selected: bool,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_selected() -> bool {
    true
}

fn default_category() -> String {
    "general".to_string()
}

impl FieldConfig {
    pub fn new(key: impl Into<String>, label: impl Into<String>, action: RedactionAction) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            action,
            overridable: false,
            default_selected: true,
            category: default_category(),
        }
    }

    #[must_use]
    pub fn overridable(mut self) -> Self {
        self.overridable = true;
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn not_selected_by_default(mut self) -> Self {
        self.default_selected = false;
        self
    }

    /// Resolve the action that actually applies for this export.
    ///
    /// A full export lifts the declared action to `include` only for
    /// overridable fields. Non-overridable fields keep their declared action
    /// no matter what, which is what keeps hard `exclude` fields out of every
    /// file.
    pub fn effective_action(&self, full_export: bool) -> RedactionAction {
        if full_export && self.overridable {
            RedactionAction::Include
        } else {
            self.action
        }
    }
}

/// The complete rulebook for one exporting module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionPolicy {
    pub module: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub requires_full_export_confirmation: bool,
    pub fields: Vec<FieldConfig>,
}

fn default_version() -> u32 {
    1
}

impl RedactionPolicy {
    /// Build a policy, rejecting empty or duplicate field keys.
    pub fn new(module: impl Into<String>, fields: Vec<FieldConfig>) -> Result<Self> {
        let policy = Self {
            module: module.into(),
            version: default_version(),
            requires_full_export_confirmation: false,
            fields,
        };
        policy.validate()?;
        Ok(policy)
    }

    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn requiring_confirmation(mut self) -> Self {
        self.requires_full_export_confirmation = true;
        self
    }

    /// Check the unique-key invariant. Deserialized policies must pass this
    /// before use.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if field.key.trim().is_empty() {
                return Err(ModelError::EmptyFieldKey {
                    module: self.module.clone(),
                });
            }
            if !seen.insert(field.key.as_str()) {
                return Err(ModelError::DuplicateField {
                    module: self.module.clone(),
                    key: field.key.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn field(&self, key: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Keys a fresh export form should pre-select.
    pub fn default_selection(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|field| field.default_selected)
            .map(|field| field.key.clone())
            .collect()
    }

    /// Fields that are active for the given selection, in policy order.
    pub fn active_fields<'a>(&'a self, selected: &[String]) -> Vec<&'a FieldConfig> {
        let selected: BTreeSet<&str> = selected.iter().map(String::as_str).collect();
        self.fields
            .iter()
            .filter(|field| selected.contains(field.key.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_policy() -> RedactionPolicy {
        RedactionPolicy::new(
            "organizations",
            vec![
                FieldConfig::new("_id", "ID", RedactionAction::Hash),
                FieldConfig::new("name", "Name", RedactionAction::Include),
                FieldConfig::new("email", "Email", RedactionAction::Mask).overridable(),
                FieldConfig::new("ssn", "SSN", RedactionAction::Exclude)
                    .not_selected_by_default(),
            ],
        )
        .expect("valid policy")
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let err = RedactionPolicy::new(
            "plans",
            vec![
                FieldConfig::new("name", "Name", RedactionAction::Include),
                FieldConfig::new("name", "Name again", RedactionAction::Mask),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateField { ref key, .. } if key == "name"));
    }

    #[test]
    fn empty_keys_are_rejected() {
        let err = RedactionPolicy::new(
            "plans",
            vec![FieldConfig::new("  ", "Blank", RedactionAction::Include)],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::EmptyFieldKey { .. }));
    }

    #[test]
    fn full_export_only_lifts_overridable_fields() {
        let policy = sample_policy();
        let email = policy.field("email").unwrap();
        let ssn = policy.field("ssn").unwrap();
        let id = policy.field("_id").unwrap();
        assert_eq!(email.effective_action(true), RedactionAction::Include);
        assert_eq!(email.effective_action(false), RedactionAction::Mask);
        assert_eq!(ssn.effective_action(true), RedactionAction::Exclude);
        assert_eq!(id.effective_action(true), RedactionAction::Hash);
    }

    #[test]
    fn active_fields_keep_policy_order() {
        let policy = sample_policy();
        let selected = vec!["email".to_string(), "_id".to_string(), "unknown".to_string()];
        let keys: Vec<&str> = policy
            .active_fields(&selected)
            .iter()
            .map(|field| field.key.as_str())
            .collect();
        assert_eq!(keys, vec!["_id", "email"]);
    }

    #[test]
    fn default_selection_skips_unselected_fields() {
        let policy = sample_policy();
        assert_eq!(policy.default_selection(), vec!["_id", "name", "email"]);
    }

    #[test]
    fn policy_deserializes_with_defaults() {
        let json = r#"{
            "module": "plans",
            "fields": [{"key": "title", "label": "Title", "action": "include"}]
        }"#;
        let policy: RedactionPolicy = serde_json::from_str(json).expect("parse policy");
        assert_eq!(policy.version, 1);
        assert!(!policy.requires_full_export_confirmation);
        let field = &policy.fields[0];
        assert!(!field.overridable);
        assert!(field.default_selected);
        assert_eq!(field.category, "general");
    }
}
