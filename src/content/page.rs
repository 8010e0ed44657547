//! Page copy lookup with caller-supplied fallbacks.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::content::defaults;
use crate::db::models::PageContentItem;

/// `section -> key -> value` view of a page, defaults filled in.
pub type ResolvedContent = BTreeMap<String, BTreeMap<String, Value>>;

/// All content rows fetched for one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageContent {
    pub page: String,
    pub items: Vec<PageContentItem>,
}

impl PageContent {
    pub fn new(page: impl Into<String>, items: Vec<PageContentItem>) -> Self {
        Self {
            page: page.into(),
            items,
        }
    }

    /// Content for a page whose rows could not be loaded.
    pub fn empty(page: impl Into<String>) -> Self {
        Self::new(page, Vec::new())
    }

    fn find(&self, section: &str, key: &str) -> Option<&PageContentItem> {
        self.items
            .iter()
            .find(|item| item.section == section && item.content_key == key)
    }

    /// Text stored under `(section, key)`; `default` when absent or empty.
    pub fn value(&self, section: &str, key: &str, default: &str) -> String {
        self.find(section, key)
            .and_then(|item| item.content_value.as_deref())
            .filter(|value| !value.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    /// Structured content under `(section, key)`; `default` when absent,
    /// null, or not shaped like `T`.
    pub fn json<T: DeserializeOwned>(&self, section: &str, key: &str, default: T) -> T {
        let Some(raw) = self
            .find(section, key)
            .and_then(|item| item.content_json.as_ref())
            .filter(|value| !value.is_null())
        else {
            return default;
        };

        match serde_json::from_value(raw.clone()) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(
                    page = %self.page,
                    section,
                    key,
                    error = %e,
                    "stored page content has unexpected shape, using default"
                );
                default
            }
        }
    }

    /// Every slot the page knows about: hard-coded defaults overlaid with
    /// whatever rows exist.
    pub fn resolve(&self) -> ResolvedContent {
        let mut resolved = ResolvedContent::new();

        for entry in defaults::page_defaults(&self.page) {
            resolved
                .entry(entry.section.to_string())
                .or_default()
                .insert(entry.key.to_string(), entry.value);
        }

        for item in &self.items {
            let value = match (&item.content_json, &item.content_value) {
                (Some(json), _) if !json.is_null() => json.clone(),
                (_, Some(text)) if !text.is_empty() => Value::String(text.clone()),
                _ => continue,
            };
            resolved
                .entry(item.section.clone())
                .or_default()
                .insert(item.content_key.clone(), value);
        }

        resolved
    }
}
