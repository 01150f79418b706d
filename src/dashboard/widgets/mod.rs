use crate::dashboard::view::DashboardContext;
use crate::data::FetchState;
use eframe::egui;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

mod open_tickets;
mod products_list;
mod recent_orders;
mod recent_reviews;
mod stat;

pub use open_tickets::OpenTicketsWidget;
pub use products_list::ProductsListWidget;
pub use recent_orders::RecentOrdersWidget;
pub use recent_reviews::RecentReviewsWidget;
pub use stat::{StatMetric, StatWidget};

/// Result of activating a widget row, handed back to the host application
/// (e.g. to navigate to the order detail page).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetAction {
    OpenRecord { collection: String, id: String },
}

impl WidgetAction {
    pub fn open(collection: &str, id: &str) -> Self {
        Self::OpenRecord {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

/// Catalog entry describing a registered widget kind, consumed by the
/// add-widget selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetMetadata {
    pub kind: String,
    pub title: String,
    /// Whether more than one instance of this kind may be on a dashboard.
    pub repeatable: bool,
}

/// Widget trait implemented by all dashboard renderers.
pub trait Widget: Send {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction>;

    /// Called when the persisted settings for this widget changed while the
    /// instance is kept alive.
    fn on_config_updated(&mut self, _settings: &Value) {}
}

/// Descriptor for building widgets from persisted JSON settings. Each kind
/// owns a typed settings struct; the type tag in the layout entry selects
/// the descriptor, so settings form a union discriminated by widget kind.
#[derive(Clone)]
pub struct WidgetDescriptor {
    title: String,
    repeatable: bool,
    ctor: Arc<dyn Fn(&Value) -> Box<dyn Widget> + Send + Sync>,
    default_settings: Arc<dyn Fn() -> Value + Send + Sync>,
}

pub type WidgetFactory = WidgetDescriptor;

impl WidgetDescriptor {
    pub fn new<T, C>(title: &str, build: impl Fn(C) -> T + Send + Sync + 'static) -> Self
    where
        T: Widget + 'static,
        C: DeserializeOwned + Serialize + Default + 'static,
    {
        Self {
            title: title.to_string(),
            repeatable: false,
            ctor: Arc::new(move |v| {
                let cfg = serde_json::from_value::<C>(v.clone()).unwrap_or_default();
                Box::new(build(cfg))
            }),
            default_settings: Arc::new(|| {
                serde_json::to_value(C::default()).unwrap_or_else(|_| json!({}))
            }),
        }
    }

    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    pub fn default_settings(&self) -> Value {
        (self.default_settings)()
    }

    /// Build a renderer instance. Stored settings are merged over the
    /// declared defaults, so partial settings fall back per field.
    pub fn create(&self, settings: &Value) -> Box<dyn Widget> {
        let merged = merge_json(&self.default_settings(), settings);
        (self.ctor)(&merged)
    }

    pub fn metadata(&self, kind: &str) -> WidgetMetadata {
        WidgetMetadata {
            kind: kind.to_string(),
            title: self.title.clone(),
            repeatable: self.repeatable,
        }
    }
}

/// Closed mapping from widget-kind tag to descriptor. Built once at
/// startup; a miss is not an error, the slot just renders nothing.
#[derive(Clone, Default)]
pub struct WidgetRegistry {
    map: HashMap<String, WidgetDescriptor>,
}

impl WidgetRegistry {
    pub fn with_defaults() -> Self {
        let mut reg = Self::default();
        reg.register(
            "stat_products",
            WidgetFactory::new("Products", |cfg| StatWidget::new(StatMetric::Products, cfg)),
        );
        reg.register(
            "stat_orders",
            WidgetFactory::new("Orders", |cfg| StatWidget::new(StatMetric::Orders, cfg)),
        );
        reg.register(
            "stat_users",
            WidgetFactory::new("Customers", |cfg| StatWidget::new(StatMetric::Users, cfg)),
        );
        reg.register(
            "stat_reviews",
            WidgetFactory::new("Reviews", |cfg| StatWidget::new(StatMetric::Reviews, cfg)),
        );
        reg.register(
            "recent_orders",
            WidgetFactory::new("Recent orders", RecentOrdersWidget::new),
        );
        reg.register(
            "products_list",
            WidgetFactory::new("Inventory", ProductsListWidget::new).repeatable(),
        );
        reg.register(
            "recent_reviews",
            WidgetFactory::new("Latest reviews", RecentReviewsWidget::new),
        );
        reg.register(
            "open_tickets",
            WidgetFactory::new("Helpdesk tickets", OpenTicketsWidget::new),
        );
        reg
    }

    pub fn register(&mut self, kind: &str, descriptor: WidgetDescriptor) {
        self.map.insert(kind.to_string(), descriptor);
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.map.contains_key(kind)
    }

    pub fn descriptor(&self, kind: &str) -> Option<&WidgetDescriptor> {
        self.map.get(kind)
    }

    pub fn create(&self, kind: &str, settings: &Value) -> Option<Box<dyn Widget>> {
        self.map.get(kind).map(|d| d.create(settings))
    }

    pub fn default_settings(&self, kind: &str) -> Option<Value> {
        self.map.get(kind).map(|d| d.default_settings())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.map.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn metadata(&self) -> Vec<WidgetMetadata> {
        let mut meta: Vec<WidgetMetadata> = self
            .map
            .iter()
            .map(|(kind, descriptor)| descriptor.metadata(kind))
            .collect();
        meta.sort_by(|a, b| a.kind.cmp(&b.kind));
        meta
    }

    pub fn metadata_for(&self, kind: &str) -> Option<WidgetMetadata> {
        self.map.get(kind).map(|d| d.metadata(kind))
    }

    /// Kinds the add-widget selector may offer given the kinds already on
    /// the dashboard: non-repeatable kinds already present are filtered out.
    pub fn selectable_kinds(&self, current: &[String]) -> Vec<WidgetMetadata> {
        self.metadata()
            .into_iter()
            .filter(|meta| meta.repeatable || !current.contains(&meta.kind))
            .collect()
    }
}

pub(crate) fn merge_json(base: &Value, updates: &Value) -> Value {
    match (base, updates) {
        (Value::Object(a), Value::Object(b)) => {
            let mut merged = a.clone();
            for (k, v) in b {
                merged.insert(k.clone(), v.clone());
            }
            Value::Object(merged)
        }
        (base, Value::Null) => base.clone(),
        _ => updates.clone(),
    }
}

/// The four mutually exclusive body states of a list widget. Derived from
/// the fetch state plus the configured display cap; a populated body never
/// exceeds `limit` entries no matter how many records the source returned.
#[derive(Debug, PartialEq)]
pub enum ListBody<'a, T> {
    Loading,
    Error(&'a str),
    Empty,
    Populated(&'a [T]),
}

pub fn list_body<T>(fetch: &FetchState<Arc<Vec<T>>>, limit: usize) -> ListBody<'_, T> {
    match fetch {
        FetchState::Loading => ListBody::Loading,
        FetchState::Failed(msg) => ListBody::Error(msg),
        FetchState::Ready(items) if items.is_empty() || limit == 0 => ListBody::Empty,
        FetchState::Ready(items) => ListBody::Populated(&items[..limit.min(items.len())]),
    }
}

/// Render the standard loading/error/empty chrome, delegating populated
/// rows to `row`. Exactly one of the four states is drawn.
pub(crate) fn show_list<T>(
    ui: &mut egui::Ui,
    fetch: &FetchState<Arc<Vec<T>>>,
    limit: usize,
    mut row: impl FnMut(&mut egui::Ui, &T) -> Option<WidgetAction>,
) -> Option<WidgetAction> {
    match list_body(fetch, limit) {
        ListBody::Loading => {
            ui.weak("Loading…");
            None
        }
        ListBody::Error(msg) => {
            ui.colored_label(egui::Color32::RED, format!("Failed to load: {msg}"));
            None
        }
        ListBody::Empty => {
            ui.weak("Nothing to show yet.");
            None
        }
        ListBody::Populated(items) => {
            let mut action = None;
            for item in items {
                action = action.or(row(ui, item));
            }
            action
        }
    }
}

pub(crate) fn default_limit() -> usize {
    5
}
