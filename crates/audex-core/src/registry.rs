//! Runtime lookup tables for format adapters and redaction policies.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use audex_model::{ExportFormat, FormatAdapter, RedactionPolicy};
use audex_pdf::PdfAdapter;
use audex_xlsx::XlsxAdapter;

use crate::error::{ExportError, Result};

/// Format key to encoder. Registering under an existing key replaces the
/// previous adapter.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<ExportFormat, Arc<dyn FormatAdapter>>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in spreadsheet and document encoders.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(XlsxAdapter::new());
        registry.register(PdfAdapter::new());
        registry
    }

    pub fn register(&mut self, adapter: impl FormatAdapter + 'static) {
        self.register_arc(Arc::new(adapter));
    }

    pub fn register_arc(&mut self, adapter: Arc<dyn FormatAdapter>) {
        let format = adapter.format();
        if self.adapters.insert(format, adapter).is_some() {
            debug!(%format, "adapter replaced");
        }
    }

    pub fn get(&self, format: ExportFormat) -> Option<Arc<dyn FormatAdapter>> {
        self.adapters.get(&format).cloned()
    }

    pub fn formats(&self) -> Vec<ExportFormat> {
        self.adapters.keys().copied().collect()
    }
}

/// Module name to policy.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: BTreeMap<String, RedactionPolicy>,
}

#[derive(Debug, Deserialize)]
struct PolicyCatalog {
    #[serde(default)]
    policy: Vec<RedactionPolicy>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a policy after checking its field keys. Replaces any policy
    /// already registered for the same module.
    pub fn register(&mut self, policy: RedactionPolicy) -> Result<()> {
        policy.validate()?;
        self.policies.insert(policy.module.clone(), policy);
        Ok(())
    }

    pub fn from_policies(policies: impl IntoIterator<Item = RedactionPolicy>) -> Result<Self> {
        let mut registry = Self::new();
        for policy in policies {
            registry.register(policy)?;
        }
        Ok(registry)
    }

    /// Parse a TOML catalog of `[[policy]]` tables.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let catalog: PolicyCatalog =
            toml::from_str(contents).map_err(|source| ExportError::CatalogParse { source })?;
        Self::from_policies(catalog.policy)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ExportError::CatalogIo {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), policies = registry.len(), "policy catalog loaded");
        Ok(registry)
    }

    pub fn get(&self, module: &str) -> Option<&RedactionPolicy> {
        self.policies.get(module)
    }

    pub fn modules(&self) -> Vec<String> {
        self.policies.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RedactionPolicy> {
        self.policies.values()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audex_model::RedactionAction;

    const CATALOG: &str = r#"
[[policy]]
module = "members"
version = 3
requires_full_export_confirmation = true

[[policy.fields]]
key = "email"
label = "Email"
action = "mask"
overridable = true
category = "contact"

[[policy.fields]]
key = "name"
label = "Name"
action = "include"

[[policy]]
module = "plans"

[[policy.fields]]
key = "_id"
label = "ID"
action = "hash"
default_selected = false
"#;

    #[test]
    fn catalog_parses() {
        let registry = PolicyRegistry::from_toml_str(CATALOG).unwrap();
        assert_eq!(registry.modules(), vec!["members", "plans"]);

        let members = registry.get("members").unwrap();
        assert_eq!(members.version, 3);
        assert!(members.requires_full_export_confirmation);
        assert_eq!(members.fields[0].action, RedactionAction::Mask);
        assert!(members.fields[0].overridable);
        assert_eq!(members.fields[0].category, "contact");
        assert_eq!(members.fields[1].category, "general");

        let plans = registry.get("plans").unwrap();
        assert_eq!(plans.version, 1);
        assert!(plans.default_selection().is_empty());
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let catalog = r#"
[[policy]]
module = "m"
[[policy.fields]]
key = "a"
label = "A"
action = "include"
[[policy.fields]]
key = "a"
label = "A again"
action = "hash"
"#;
        assert!(matches!(
            PolicyRegistry::from_toml_str(catalog),
            Err(ExportError::Policy(_))
        ));
    }

    #[test]
    fn malformed_catalog_is_a_parse_error() {
        assert!(matches!(
            PolicyRegistry::from_toml_str("[[policy]]\nmodule = 3"),
            Err(ExportError::CatalogParse { .. })
        ));
    }

    #[test]
    fn defaults_cover_both_formats() {
        let registry = AdapterRegistry::with_defaults();
        assert_eq!(registry.formats(), vec![ExportFormat::Xlsx, ExportFormat::Pdf]);
        assert_eq!(
            registry.get(ExportFormat::Pdf).map(|a| a.mime_type()),
            Some("application/pdf")
        );
    }
}
