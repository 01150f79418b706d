use crate::dashboard::config::{DashboardConfig, WidgetConfig};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The id set handed to [`LayoutStore::reorder`] does not match the
    /// current layout (missing, extra, or duplicated ids).
    #[error("reorder rejected: id set does not match the current layout")]
    InvalidReorder,
    /// A widget of this kind is already on the dashboard and the kind is
    /// enforced as single-instance by the store.
    #[error("widget of type '{0}' is already on the dashboard")]
    DuplicateWidget(String),
}

/// Persistence collaborator notified whenever layout order or membership
/// changes. Called fire-and-forget: the store never blocks or rolls back on
/// a sink failure, it only records the error for a non-fatal notification.
pub trait LayoutSink: Send {
    fn persist(&mut self, widgets: &[WidgetConfig]) -> anyhow::Result<()>;
}

/// Default sink writing the layout document to a JSON file.
pub struct FileLayoutSink {
    path: PathBuf,
}

impl FileLayoutSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LayoutSink for FileLayoutSink {
    fn persist(&mut self, widgets: &[WidgetConfig]) -> anyhow::Result<()> {
        DashboardConfig::with_widgets(widgets.to_vec()).save(&self.path)
    }
}

/// Authoritative ordered list of widget configurations for the current
/// dashboard session. Array position is the sort key.
pub struct LayoutStore {
    widgets: Vec<WidgetConfig>,
    /// Kinds the store refuses to add twice. Per-type, caller-configured;
    /// the usual uniqueness mechanism is the add-widget selector filtering
    /// kinds already present.
    singleton_kinds: HashSet<String>,
    sink: Option<Box<dyn LayoutSink>>,
    last_persist_error: Option<String>,
    rng: StdRng,
}

impl LayoutStore {
    /// Create a store from an explicit initial layout. The initial set is a
    /// constructor parameter rather than ambient module state so tests and
    /// hosts control exactly what the dashboard starts with.
    pub fn new(initial: Vec<WidgetConfig>) -> Self {
        Self {
            widgets: initial,
            singleton_kinds: HashSet::new(),
            sink: None,
            last_persist_error: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic id generation for tests.
    pub fn from_seed(initial: Vec<WidgetConfig>, seed: u64) -> Self {
        let mut store = Self::new(initial);
        store.rng = StdRng::seed_from_u64(seed);
        store
    }

    pub fn with_sink(mut self, sink: Box<dyn LayoutSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Mark a widget kind as single-instance. Adding a second widget of this
    /// kind fails with [`LayoutError::DuplicateWidget`].
    pub fn enforce_singleton(&mut self, kind: &str) {
        self.singleton_kinds.insert(kind.to_string());
    }

    pub fn widgets(&self) -> &[WidgetConfig] {
        &self.widgets
    }

    pub fn get(&self, id: &str) -> Option<&WidgetConfig> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.widgets.iter().any(|w| w.id == id)
    }

    /// Widget kinds currently on the dashboard, in display order. Consumed
    /// by the add-widget selector to filter out non-repeatable kinds.
    pub fn kinds(&self) -> Vec<String> {
        self.widgets.iter().map(|w| w.kind.clone()).collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.widgets.iter().map(|w| w.id.clone()).collect()
    }

    /// Append a new widget at the end of the layout and notify the sink.
    /// Returns the created entry.
    pub fn add_widget(
        &mut self,
        kind: &str,
        title: &str,
        settings: Option<serde_json::Value>,
    ) -> Result<WidgetConfig, LayoutError> {
        if self.singleton_kinds.contains(kind) && self.widgets.iter().any(|w| w.kind == kind) {
            return Err(LayoutError::DuplicateWidget(kind.to_string()));
        }
        let id = self.fresh_id();
        let mut config = WidgetConfig::new(id, kind, title);
        if let Some(settings) = settings {
            config = config.with_settings(settings);
        }
        self.widgets.push(config.clone());
        tracing::debug!(id = %config.id, kind, "widget added");
        self.notify_sink();
        Ok(config)
    }

    /// Remove the widget with the given id. A missing id is a no-op since
    /// the UI may race a double-click on the remove button.
    pub fn remove_widget(&mut self, id: &str) {
        let before = self.widgets.len();
        self.widgets.retain(|w| w.id != id);
        if self.widgets.len() != before {
            tracing::debug!(id, "widget removed");
            self.notify_sink();
        }
    }

    /// Replace the layout order with `new_order`, which must contain exactly
    /// the current id set. On mismatch the stored order is left unchanged.
    pub fn reorder(&mut self, new_order: &[String]) -> Result<(), LayoutError> {
        if new_order.len() != self.widgets.len() {
            return Err(LayoutError::InvalidReorder);
        }
        let unique: HashSet<&str> = new_order.iter().map(String::as_str).collect();
        if unique.len() != new_order.len() {
            return Err(LayoutError::InvalidReorder);
        }
        if !new_order.iter().all(|id| self.contains(id)) {
            return Err(LayoutError::InvalidReorder);
        }

        let mut remaining: Vec<WidgetConfig> = std::mem::take(&mut self.widgets);
        let mut reordered = Vec::with_capacity(new_order.len());
        for id in new_order {
            let pos = remaining
                .iter()
                .position(|w| &w.id == id)
                .ok_or(LayoutError::InvalidReorder)?;
            reordered.push(remaining.swap_remove(pos));
        }
        self.widgets = reordered;
        self.notify_sink();
        Ok(())
    }

    /// Replace one widget's settings in place and notify the sink.
    pub fn update_settings(&mut self, id: &str, settings: serde_json::Value) {
        if let Some(w) = self.widgets.iter_mut().find(|w| w.id == id) {
            w.settings = settings;
            self.notify_sink();
        }
    }

    /// Most recent persistence failure, if any. Consuming it arms the UI's
    /// one-shot "layout may not be saved" toast.
    pub fn take_persist_error(&mut self) -> Option<String> {
        self.last_persist_error.take()
    }

    fn notify_sink(&mut self) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if let Err(e) = sink.persist(&self.widgets) {
            tracing::error!("failed to persist dashboard layout: {e:#}");
            self.last_persist_error = Some(format!("Layout change may not be saved: {e}"));
        }
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let suffix: String = (&mut self.rng)
                .sample_iter(&Alphanumeric)
                .take(8)
                .map(char::from)
                .collect();
            let id = format!("w-{suffix}");
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct RecordingSink {
        orders: Arc<Mutex<Vec<Vec<String>>>>,
        fail: bool,
    }

    impl LayoutSink for RecordingSink {
        fn persist(&mut self, widgets: &[WidgetConfig]) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("layout endpoint returned 503");
            }
            self.orders
                .lock()
                .unwrap()
                .push(widgets.iter().map(|w| w.id.clone()).collect());
            Ok(())
        }
    }

    fn three_widgets() -> Vec<WidgetConfig> {
        vec![
            WidgetConfig::new("A", "stat_products", "Products"),
            WidgetConfig::new("B", "stat_orders", "Orders"),
            WidgetConfig::new("C", "recent_orders", "Recent orders"),
        ]
    }

    fn recorded_store() -> (LayoutStore, Arc<Mutex<Vec<Vec<String>>>>) {
        let orders = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink {
            orders: Arc::clone(&orders),
            fail: false,
        };
        let store = LayoutStore::from_seed(three_widgets(), 42).with_sink(Box::new(sink));
        (store, orders)
    }

    #[test]
    fn reorder_applies_any_valid_permutation() {
        let perms: [[&str; 3]; 6] = [
            ["A", "B", "C"],
            ["A", "C", "B"],
            ["B", "A", "C"],
            ["B", "C", "A"],
            ["C", "A", "B"],
            ["C", "B", "A"],
        ];
        for perm in perms {
            let mut store = LayoutStore::new(three_widgets());
            let order: Vec<String> = perm.iter().map(|s| s.to_string()).collect();
            store.reorder(&order).unwrap();
            assert_eq!(store.ids(), order);
            // Non-order fields survive the shuffle.
            assert_eq!(store.get("C").unwrap().kind, "recent_orders");
            assert_eq!(store.get("A").unwrap().title, "Products");
        }
    }

    #[test]
    fn reorder_rejects_malformed_id_sets() {
        let cases: Vec<Vec<&str>> = vec![
            vec!["A", "B"],           // missing
            vec!["A", "B", "C", "C"], // extra + duplicate
            vec!["A", "B", "X"],      // foreign
            vec!["A", "A", "B"],      // duplicate hiding a missing id
        ];
        for case in cases {
            let mut store = LayoutStore::new(three_widgets());
            let order: Vec<String> = case.iter().map(|s| s.to_string()).collect();
            assert_eq!(store.reorder(&order), Err(LayoutError::InvalidReorder));
            assert_eq!(store.ids(), vec!["A", "B", "C"]);
        }
    }

    #[test]
    fn add_widget_appends_with_fresh_id() {
        let mut store = LayoutStore::from_seed(three_widgets(), 7);
        let created = store.add_widget("products_list", "Inventory", None).unwrap();
        let ids = store.ids();
        assert_eq!(ids.len(), 4);
        assert_eq!(ids[3], created.id);
        assert_eq!(created.kind, "products_list");
        assert!(!["A", "B", "C"].contains(&created.id.as_str()));
    }

    #[test]
    fn remove_missing_widget_is_a_noop() {
        let (mut store, orders) = recorded_store();
        store.remove_widget("nope");
        assert_eq!(store.ids(), vec!["A", "B", "C"]);
        assert!(orders.lock().unwrap().is_empty());
    }

    #[test]
    fn remove_notifies_sink_once() {
        let (mut store, orders) = recorded_store();
        store.remove_widget("B");
        assert_eq!(store.ids(), vec!["A", "C"]);
        assert_eq!(orders.lock().unwrap().as_slice(), &[vec!["A", "C"]]);
    }

    #[test]
    fn singleton_kind_rejects_second_instance() {
        let mut store = LayoutStore::from_seed(three_widgets(), 1);
        store.enforce_singleton("stat_orders");
        assert_eq!(
            store.add_widget("stat_orders", "Orders again", None),
            Err(LayoutError::DuplicateWidget("stat_orders".into()))
        );
        // Repeatable kinds stay unaffected.
        assert!(store.add_widget("recent_orders", "More orders", None).is_ok());
    }

    #[test]
    fn reorder_notifies_sink_with_new_order() {
        let (mut store, orders) = recorded_store();
        let order = vec!["C".to_string(), "A".to_string(), "B".to_string()];
        store.reorder(&order).unwrap();
        assert_eq!(orders.lock().unwrap().as_slice(), &[vec!["C", "A", "B"]]);
    }

    #[test]
    fn sink_failure_keeps_order_and_surfaces_error() {
        let sink = RecordingSink {
            orders: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        };
        let mut store = LayoutStore::from_seed(three_widgets(), 3).with_sink(Box::new(sink));
        let order = vec!["B".to_string(), "C".to_string(), "A".to_string()];
        store.reorder(&order).unwrap();
        // Optimistic local state: the in-memory order already changed.
        assert_eq!(store.ids(), order);
        let err = store.take_persist_error().unwrap();
        assert!(err.contains("may not be saved"));
        assert!(store.take_persist_error().is_none());
    }

    #[test]
    fn generated_ids_are_unique_under_collisions() {
        let mut store = LayoutStore::from_seed(Vec::new(), 99);
        let mut seen = HashSet::new();
        for i in 0..50 {
            let created = store
                .add_widget("products_list", &format!("List {i}"), None)
                .unwrap();
            assert!(seen.insert(created.id));
        }
    }
}
