use crate::dashboard::config::{DashboardConfig, WidgetConfig};
use crate::dashboard::data_cache::DashboardDataCache;
use crate::dashboard::drag::{DragController, DropOutcome};
use crate::dashboard::store::{FileLayoutSink, LayoutError, LayoutStore};
use crate::dashboard::widgets::{WidgetAction, WidgetMetadata, WidgetRegistry};
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::Hasher;
use std::path::Path;

/// Context shared with widgets at render time.
pub struct DashboardContext<'a> {
    pub data_cache: &'a DashboardDataCache,
}

struct WidgetRuntime {
    id: String,
    title: String,
    hash: u64,
    widget: Box<dyn crate::dashboard::widgets::Widget>,
}

fn settings_hash(kind: &str, settings: &serde_json::Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write(kind.as_bytes());
    if let Ok(bytes) = serde_json::to_vec(settings) {
        hasher.write(&bytes);
    }
    hasher.finish()
}

/// The dashboard view: renders the ordered widget list with uniform chrome
/// (title, drag handle, remove button), wires pointer gestures into the
/// drag controller, and surfaces persistence failures as toasts.
pub struct Dashboard {
    store: LayoutStore,
    registry: WidgetRegistry,
    drag: DragController,
    runtime: Vec<WidgetRuntime>,
    toasts: Toasts,
    load_error: Option<String>,
}

impl Dashboard {
    pub fn new(store: LayoutStore, registry: WidgetRegistry) -> Self {
        let mut dashboard = Self {
            store,
            registry,
            drag: DragController::new(),
            runtime: Vec::new(),
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
            load_error: None,
        };
        dashboard.sync_runtime();
        dashboard
    }

    /// Convenience constructor: load the layout from a JSON file (falling
    /// back to `fallback` when the file is empty or missing) and persist
    /// all changes back to the same file. An unreadable file also seeds the
    /// fallback layout, with the failure queued as a non-fatal notice; the
    /// file on disk is left alone until the user actually changes the
    /// layout.
    pub fn with_file_persistence(
        path: impl AsRef<Path>,
        registry: WidgetRegistry,
        fallback: impl Fn() -> Vec<WidgetConfig>,
    ) -> Self {
        let path = path.as_ref();
        let (widgets, load_error) = match DashboardConfig::load(path, &registry, &fallback) {
            Ok(config) => (config.widgets, None),
            Err(e) => {
                tracing::error!("failed to load dashboard layout: {e:#}");
                (
                    fallback(),
                    Some(format!("Saved layout could not be loaded: {e}")),
                )
            }
        };
        let store = LayoutStore::new(widgets)
            .with_sink(Box::new(FileLayoutSink::new(path.to_path_buf())));
        let mut dashboard = Self::new(store, registry);
        dashboard.load_error = load_error;
        dashboard
    }

    /// Failure from loading the persisted layout, if any. One-shot; the
    /// next render pass consumes it into a toast when the host does not.
    pub fn take_load_error(&mut self) -> Option<String> {
        self.load_error.take()
    }

    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// Widget kinds the add-widget selector may offer right now.
    pub fn available_widgets(&self) -> Vec<WidgetMetadata> {
        self.registry.selectable_kinds(&self.store.kinds())
    }

    /// Append a widget of the given kind with its catalog title and default
    /// settings.
    pub fn add_widget(&mut self, kind: &str) -> Result<WidgetConfig, LayoutError> {
        let title = self
            .registry
            .metadata_for(kind)
            .map(|m| m.title)
            .unwrap_or_else(|| kind.to_string());
        self.store.add_widget(kind, &title, None)
    }

    pub fn remove_widget(&mut self, id: &str) {
        self.store.remove_widget(id);
    }

    /// Reconcile runtime widget instances with the stored layout. Instances
    /// are keyed by widget id and reused across reorders; a settings change
    /// updates the live instance instead of rebuilding it. Configs whose
    /// kind is not registered get no runtime entry and render nothing.
    fn sync_runtime(&mut self) {
        let mut reusable: HashMap<String, WidgetRuntime> = self
            .runtime
            .drain(..)
            .map(|rt| (rt.id.clone(), rt))
            .collect();

        let mut runtime = Vec::with_capacity(self.store.widgets().len());
        for config in self.store.widgets() {
            let hash = settings_hash(&config.kind, &config.settings);
            if let Some(mut rt) = reusable.remove(&config.id) {
                if rt.hash != hash {
                    rt.widget.on_config_updated(&config.settings);
                    rt.hash = hash;
                }
                rt.title = config.title.clone();
                runtime.push(rt);
            } else if let Some(widget) = self.registry.create(&config.kind, &config.settings) {
                runtime.push(WidgetRuntime {
                    id: config.id.clone(),
                    title: config.title.clone(),
                    hash,
                    widget,
                });
            } else {
                tracing::debug!(kind = %config.kind, id = %config.id, "unknown widget type, rendering nothing");
            }
        }
        self.runtime = runtime;
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        self.sync_runtime();

        let mut action = None;
        let mut pending_remove: Option<String> = None;
        let mut drag_starts: Vec<String> = Vec::new();
        let mut rects: Vec<(String, egui::Rect)> = Vec::new();

        let offered = self.available_widgets();
        ui.horizontal(|ui| {
            ui.menu_button("Add widget", |ui| {
                if offered.is_empty() {
                    ui.weak("All widgets are on the dashboard.");
                }
                for meta in &offered {
                    if ui.button(&meta.title).clicked() {
                        if let Err(e) = self.store.add_widget(&meta.kind, &meta.title, None) {
                            tracing::warn!("add widget failed: {e}");
                        }
                        ui.close_menu();
                    }
                }
            });
        });

        for rt in &mut self.runtime {
            let is_dragged = self.drag.dragging_id() == Some(rt.id.as_str());
            let is_hover_target =
                !is_dragged && self.drag.hover_target() == Some(rt.id.as_str());

            let frame = egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        let handle = ui.add(
                            egui::Button::new("≡")
                                .frame(false)
                                .sense(egui::Sense::drag()),
                        );
                        if handle.hovered() {
                            ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::Grab);
                        }
                        if handle.drag_started() {
                            drag_starts.push(rt.id.clone());
                        }
                        ui.heading(&rt.title);
                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                // The shell never hides itself optimistically;
                                // the store update drives the next render pass.
                                if ui.small_button("✕").on_hover_text("Remove widget").clicked()
                                {
                                    pending_remove = Some(rt.id.clone());
                                }
                            },
                        );
                    });
                    ui.separator();
                    action = action.take().or(rt.widget.render(ui, ctx));
                });
            });

            let rect = frame.response.rect;
            if is_hover_target {
                ui.painter()
                    .rect_stroke(rect, 2.0, (2.0, ui.visuals().selection.stroke.color));
            } else if is_dragged {
                ui.painter()
                    .rect_stroke(rect, 2.0, (1.0, ui.visuals().weak_text_color()));
            }
            rects.push((rt.id.clone(), rect));
        }

        for id in drag_starts {
            self.drag.drag_start(&id, &self.store);
        }

        if self.drag.is_dragging() {
            ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::Grabbing);
            let pointer = ui.input(|i| i.pointer.interact_pos());
            if let Some(pos) = pointer {
                if let Some((target, _)) = rects.iter().find(|(_, r)| r.contains(pos)) {
                    self.drag.drag_over(target);
                }
            }
            if ui.input(|i| i.pointer.any_released()) {
                let target = pointer.and_then(|pos| {
                    rects
                        .iter()
                        .find(|(_, r)| r.contains(pos))
                        .map(|(id, _)| id.clone())
                });
                match target {
                    Some(target) => match self.drag.drop_on(&target, &mut self.store) {
                        Ok(DropOutcome::Moved) => {
                            tracing::debug!(target = %target, "dashboard reordered");
                        }
                        Ok(_) => {}
                        // Rejected reorders leave the stored order untouched,
                        // so the gesture visually snaps back on its own.
                        Err(e) => tracing::warn!("reorder rejected: {e}"),
                    },
                    None => self.drag.cancel(),
                }
            }
        }

        if let Some(id) = pending_remove {
            self.store.remove_widget(&id);
        }

        if let Some(msg) = self.load_error.take() {
            self.toasts.add(Toast {
                text: msg.into(),
                kind: ToastKind::Warning,
                options: ToastOptions::default().duration_in_seconds(5.0),
            });
        }
        if let Some(msg) = self.store.take_persist_error() {
            self.toasts.add(Toast {
                text: msg.into(),
                kind: ToastKind::Warning,
                options: ToastOptions::default().duration_in_seconds(5.0),
            });
        }
        self.toasts.show(ui.ctx());

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::widgets::{Widget, WidgetFactory};
    use once_cell::sync::Lazy;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default, Clone, Serialize, Deserialize)]
    struct RecordingConfig {
        label: String,
    }

    struct RecordingWidget {
        label: String,
    }

    static RENDERS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(Vec::new()));
    static CREATED: AtomicUsize = AtomicUsize::new(0);
    static UPDATED: AtomicUsize = AtomicUsize::new(0);

    impl Widget for RecordingWidget {
        fn render(
            &mut self,
            _ui: &mut egui::Ui,
            _ctx: &DashboardContext<'_>,
        ) -> Option<WidgetAction> {
            RENDERS.lock().unwrap().push(self.label.clone());
            None
        }

        fn on_config_updated(&mut self, settings: &serde_json::Value) {
            if let Ok(cfg) = serde_json::from_value::<RecordingConfig>(settings.clone()) {
                self.label = cfg.label;
                UPDATED.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn recording_registry() -> WidgetRegistry {
        let mut reg = WidgetRegistry::default();
        reg.register(
            "recording",
            WidgetFactory::new("Recording", |cfg: RecordingConfig| {
                CREATED.fetch_add(1, Ordering::SeqCst);
                RecordingWidget { label: cfg.label }
            }),
        );
        reg
    }

    fn take_renders() -> Vec<String> {
        std::mem::take(&mut *RENDERS.lock().unwrap())
    }

    fn run_frame(dashboard: &mut Dashboard, cache: &DashboardDataCache) {
        let ctx = DashboardContext { data_cache: cache };
        egui::__run_test_ui(|ui| {
            dashboard.ui(ui, &ctx);
        });
    }

    #[test]
    #[serial]
    fn reuses_widget_instance_when_settings_change() {
        CREATED.store(0, Ordering::SeqCst);
        UPDATED.store(0, Ordering::SeqCst);
        take_renders();

        let store = LayoutStore::from_seed(
            vec![WidgetConfig::new("a", "recording", "Recorder")
                .with_settings(json!({ "label": "first" }))],
            1,
        );
        let mut dashboard = Dashboard::new(store, recording_registry());
        let cache = DashboardDataCache::new();

        run_frame(&mut dashboard, &cache);
        assert_eq!(CREATED.load(Ordering::SeqCst), 1);
        assert_eq!(UPDATED.load(Ordering::SeqCst), 0);
        assert_eq!(take_renders(), vec!["first".to_string()]);

        dashboard
            .store
            .update_settings("a", json!({ "label": "second" }));
        run_frame(&mut dashboard, &cache);
        assert_eq!(CREATED.load(Ordering::SeqCst), 1);
        assert_eq!(UPDATED.load(Ordering::SeqCst), 1);
        assert_eq!(take_renders(), vec!["second".to_string()]);
    }

    #[test]
    #[serial]
    fn unknown_kind_renders_nothing_and_stays_in_layout() {
        take_renders();
        let store = LayoutStore::from_seed(
            vec![
                WidgetConfig::new("a", "recording", "Recorder")
                    .with_settings(json!({ "label": "only" })),
                WidgetConfig::new("b", "crystal_ball", "Future revenue"),
            ],
            1,
        );
        let mut dashboard = Dashboard::new(store, recording_registry());
        let cache = DashboardDataCache::new();
        run_frame(&mut dashboard, &cache);

        // Only the known widget rendered, but the unknown entry survives in
        // the layout (and would round-trip through persistence).
        assert_eq!(take_renders(), vec!["only".to_string()]);
        assert_eq!(dashboard.store().ids(), vec!["a", "b"]);
        assert_eq!(dashboard.runtime.len(), 1);
    }

    #[test]
    fn add_widget_appends_with_catalog_title() {
        let store = LayoutStore::from_seed(
            vec![
                WidgetConfig::new("A", "stat_products", "Products"),
                WidgetConfig::new("B", "stat_orders", "Orders"),
            ],
            5,
        );
        let mut dashboard = Dashboard::new(store, WidgetRegistry::with_defaults());
        let created = dashboard.add_widget("products_list").unwrap();
        let ids = dashboard.store().ids();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[2], created.id);
        assert_eq!(created.kind, "products_list");
        assert_eq!(created.title, "Inventory");
        assert!(!dashboard.drag().is_dragging());

        dashboard.remove_widget(&created.id);
        assert_eq!(dashboard.store().ids(), vec!["A", "B"]);
    }

    #[test]
    fn available_widgets_reflects_current_layout() {
        let store = LayoutStore::new(vec![WidgetConfig::new("A", "stat_products", "Products")]);
        let dashboard = Dashboard::new(store, WidgetRegistry::with_defaults());
        let offered = dashboard.available_widgets();
        assert!(!offered.iter().any(|m| m.kind == "stat_products"));
        assert!(offered.iter().any(|m| m.kind == "stat_orders"));
    }
}
