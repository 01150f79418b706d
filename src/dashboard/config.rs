use crate::dashboard::widgets::WidgetRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

fn default_version() -> u32 {
    1
}

/// One persisted dashboard widget entry. Ordering within
/// [`DashboardConfig::widgets`] is the display order; there is no separate
/// order field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub settings: serde_json::Value,
}

impl WidgetConfig {
    pub fn new(id: impl Into<String>, kind: &str, title: &str) -> Self {
        Self {
            id: id.into(),
            kind: kind.to_string(),
            title: title.to_string(),
            settings: serde_json::Value::Null,
        }
    }

    pub fn with_settings(mut self, settings: serde_json::Value) -> Self {
        self.settings = settings;
        self
    }
}

/// Primary dashboard layout document as written to disk or sent to the
/// layout persistence endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub widgets: Vec<WidgetConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            widgets: Vec::new(),
        }
    }
}

impl DashboardConfig {
    pub fn with_widgets(widgets: Vec<WidgetConfig>) -> Self {
        Self {
            version: default_version(),
            widgets,
        }
    }

    /// Load a layout from disk. An empty or missing file yields the provided
    /// fallback layout. Invalid entries are cleaned up using the registry.
    pub fn load(
        path: impl AsRef<Path>,
        registry: &WidgetRegistry,
        fallback: impl FnOnce() -> Vec<WidgetConfig>,
    ) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::with_widgets(fallback()));
        }
        let mut cfg: DashboardConfig = serde_json::from_str(&content)?;
        let warnings = cfg.sanitize(registry);
        for w in warnings {
            tracing::warn!("{w}");
        }
        Ok(cfg)
    }

    /// Save the layout to disk atomically (write to a temp file, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Drop malformed entries and fill in default settings.
    ///
    /// Unknown widget kinds are kept: they round-trip through persistence and
    /// simply render nothing. Entries with an empty id or a duplicate id are
    /// dropped since the id is the identity used for reorder and removal.
    pub fn sanitize(&mut self, registry: &WidgetRegistry) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();
        self.widgets.retain(|w| {
            if w.id.trim().is_empty() || w.kind.is_empty() {
                warnings.push(format!("widget entry '{}' missing id or type", w.title));
                return false;
            }
            if !seen.insert(w.id.clone()) {
                warnings.push(format!("duplicate widget id '{}' dropped", w.id));
                return false;
            }
            true
        });
        for w in &mut self.widgets {
            if !registry.contains(&w.kind) {
                warnings.push(format!("unknown dashboard widget type '{}'", w.kind));
                continue;
            }
            if w.settings.is_null() {
                w.settings = registry
                    .default_settings(&w.kind)
                    .unwrap_or_else(|| serde_json::json!({}));
            }
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> WidgetRegistry {
        WidgetRegistry::with_defaults()
    }

    #[test]
    fn empty_file_falls_back_to_default_layout() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let cfg = DashboardConfig::load(tmp.path(), &registry(), || {
            vec![WidgetConfig::new("a", "stat_products", "Products")]
        })
        .unwrap();
        assert_eq!(cfg.widgets.len(), 1);
        assert_eq!(cfg.widgets[0].kind, "stat_products");
    }

    #[test]
    fn round_trips_through_disk() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let cfg = DashboardConfig::with_widgets(vec![
            WidgetConfig::new("a", "stat_orders", "Orders"),
            WidgetConfig::new("b", "recent_orders", "Recent orders")
                .with_settings(json!({ "limit": 3 })),
        ]);
        cfg.save(tmp.path()).unwrap();
        let loaded = DashboardConfig::load(tmp.path(), &registry(), Vec::new).unwrap();
        assert_eq!(loaded.widgets.len(), 2);
        assert_eq!(loaded.widgets[1].settings["limit"], json!(3));
    }

    #[test]
    fn sanitize_drops_duplicate_ids() {
        let mut cfg = DashboardConfig::with_widgets(vec![
            WidgetConfig::new("a", "stat_products", "Products"),
            WidgetConfig::new("a", "stat_orders", "Orders"),
        ]);
        let warnings = cfg.sanitize(&registry());
        assert_eq!(cfg.widgets.len(), 1);
        assert!(warnings.iter().any(|w| w.contains("duplicate")));
    }

    #[test]
    fn sanitize_keeps_unknown_kinds() {
        let mut cfg = DashboardConfig::with_widgets(vec![WidgetConfig::new(
            "a",
            "crystal_ball",
            "Future revenue",
        )]);
        let warnings = cfg.sanitize(&registry());
        assert_eq!(cfg.widgets.len(), 1);
        assert!(warnings.iter().any(|w| w.contains("unknown")));
    }

    #[test]
    fn sanitize_fills_default_settings() {
        let mut cfg = DashboardConfig::with_widgets(vec![WidgetConfig::new(
            "a",
            "recent_orders",
            "Recent orders",
        )]);
        cfg.sanitize(&registry());
        assert!(cfg.widgets[0].settings.is_object());
        assert_eq!(cfg.widgets[0].settings["limit"], serde_json::json!(5));
    }
}
