pub mod dashboard;
pub mod data;
pub mod logging;

use dashboard::WidgetConfig;

/// Widget set a fresh dashboard starts with when the user has no saved
/// layout. Passed explicitly to [`dashboard::LayoutStore::new`] so hosts
/// and tests control the initial state.
pub fn starter_layout() -> Vec<WidgetConfig> {
    vec![
        WidgetConfig::new("stat-products", "stat_products", "Products"),
        WidgetConfig::new("stat-orders", "stat_orders", "Orders"),
        WidgetConfig::new("stat-users", "stat_users", "Customers"),
        WidgetConfig::new("recent-orders", "recent_orders", "Recent orders"),
        WidgetConfig::new("products-list", "products_list", "Inventory"),
    ]
}
