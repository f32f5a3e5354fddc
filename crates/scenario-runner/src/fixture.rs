//! Fixture templates
//!
//! Fixtures live under a root directory as `<entity>.json`, each file an
//! object keyed by lowercase category then lowercase variant. The shipped
//! templates are under `fixtures/request_json/` in this crate.

use std::path::PathBuf;

use finops_core::{FinopsError, Result};
use serde_json::Value;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct FixtureStore {
    root: PathBuf,
}

impl FixtureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the fixtures shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/request_json"))
    }

    /// Load the template for `(entity, category, variant)` as an owned value
    /// the caller is free to mutate. Category and variant match
    /// case-insensitively.
    #[instrument(skip(self))]
    pub fn load(&self, entity: &str, category: &str, variant: &str) -> Result<Value> {
        let path = self.root.join(format!("{entity}.json"));
        let raw = std::fs::read_to_string(&path).map_err(|e| FinopsError::FixtureUnreadable {
            entity: entity.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;
        let templates: Value =
            serde_json::from_str(&raw).map_err(|e| FinopsError::FixtureUnreadable {
                entity: entity.to_string(),
                reason: format!("{}: {e}", path.display()),
            })?;

        templates
            .get(category.to_lowercase())
            .and_then(|c| c.get(variant.to_lowercase()))
            .cloned()
            .ok_or_else(|| FinopsError::FixtureVariantNotFound {
                entity: entity.to_string(),
                category: category.to_string(),
                variant: variant.to_string(),
            })
    }
}
