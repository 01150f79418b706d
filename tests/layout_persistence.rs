use serde_json::json;
use storedash::dashboard::{
    Dashboard, DashboardConfig, FileLayoutSink, LayoutStore, WidgetConfig, WidgetRegistry,
};

fn read_ids(path: &std::path::Path) -> Vec<String> {
    let cfg = DashboardConfig::load(path, &WidgetRegistry::with_defaults(), Vec::new).unwrap();
    cfg.widgets.into_iter().map(|w| w.id).collect()
}

#[test]
fn reorder_writes_new_order_to_disk() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    let mut store = LayoutStore::from_seed(
        vec![
            WidgetConfig::new("A", "stat_products", "Products"),
            WidgetConfig::new("B", "stat_orders", "Orders"),
            WidgetConfig::new("C", "recent_orders", "Recent orders"),
        ],
        2,
    )
    .with_sink(Box::new(FileLayoutSink::new(tmp.path().to_path_buf())));

    store
        .reorder(&["B".to_string(), "C".to_string(), "A".to_string()])
        .unwrap();

    assert_eq!(read_ids(tmp.path()), vec!["B", "C", "A"]);
    assert!(store.take_persist_error().is_none());
}

#[test]
fn membership_changes_round_trip_through_disk() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    let mut store = LayoutStore::from_seed(
        vec![WidgetConfig::new("A", "stat_products", "Products")],
        3,
    )
    .with_sink(Box::new(FileLayoutSink::new(tmp.path().to_path_buf())));

    let created = store
        .add_widget(
            "recent_orders",
            "Recent orders",
            Some(json!({ "limit": 3 })),
        )
        .unwrap();
    store.remove_widget("A");

    let cfg =
        DashboardConfig::load(tmp.path(), &WidgetRegistry::with_defaults(), Vec::new).unwrap();
    assert_eq!(cfg.widgets.len(), 1);
    assert_eq!(cfg.widgets[0].id, created.id);
    assert_eq!(cfg.widgets[0].kind, "recent_orders");
    assert_eq!(cfg.widgets[0].settings["limit"], json!(3));
}

#[test]
fn unknown_widget_kinds_survive_a_round_trip() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    let cfg = DashboardConfig::with_widgets(vec![
        WidgetConfig::new("a", "stat_products", "Products"),
        WidgetConfig::new("b", "sales_forecast", "Forecast")
            .with_settings(json!({ "horizon_days": 30 })),
    ]);
    cfg.save(tmp.path()).unwrap();

    let loaded =
        DashboardConfig::load(tmp.path(), &WidgetRegistry::with_defaults(), Vec::new).unwrap();
    assert_eq!(loaded.widgets.len(), 2);
    assert_eq!(loaded.widgets[1].kind, "sales_forecast");
    assert_eq!(loaded.widgets[1].settings["horizon_days"], json!(30));
}

#[test]
fn corrupt_layout_file_falls_back_and_surfaces_error() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(tmp.path(), "{ this is not json").unwrap();

    let mut dashboard = Dashboard::with_file_persistence(
        tmp.path(),
        WidgetRegistry::with_defaults(),
        storedash::starter_layout,
    );

    // Fallback layout instead of a silently empty dashboard.
    assert_eq!(dashboard.store().widgets().len(), 5);
    let notice = dashboard.take_load_error().unwrap();
    assert!(notice.contains("could not be loaded"));
    assert!(dashboard.take_load_error().is_none());

    // The corrupt file is untouched until the user changes the layout.
    let on_disk = std::fs::read_to_string(tmp.path()).unwrap();
    assert!(on_disk.contains("this is not json"));
}

#[test]
fn persist_failure_is_surfaced_not_fatal() {
    // Point the sink at a path whose parent directory does not exist.
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("missing").join("dashboard.json");
    let mut store = LayoutStore::from_seed(
        vec![
            WidgetConfig::new("A", "stat_products", "Products"),
            WidgetConfig::new("B", "stat_orders", "Orders"),
        ],
        4,
    )
    .with_sink(Box::new(FileLayoutSink::new(bogus)));

    store
        .reorder(&["B".to_string(), "A".to_string()])
        .unwrap();

    // Optimistic local state: the reorder stuck even though the save failed.
    assert_eq!(store.ids(), vec!["B", "A"]);
    assert!(store.take_persist_error().unwrap().contains("may not be saved"));
}
