pub mod config;
pub mod data_cache;
pub mod drag;
pub mod store;
pub mod view;
pub mod widgets;

pub use config::{DashboardConfig, WidgetConfig};
pub use data_cache::{DashboardDataCache, DashboardDataSnapshot, RefreshTicket};
pub use drag::{DragController, DragState, DropOutcome};
pub use store::{FileLayoutSink, LayoutError, LayoutSink, LayoutStore};
pub use view::{Dashboard, DashboardContext};
pub use widgets::{WidgetAction, WidgetFactory, WidgetMetadata, WidgetRegistry};
