use super::{Widget, WidgetAction};
use crate::dashboard::view::DashboardContext;
use crate::data::{FetchState, StoreSummary};
use eframe::egui;
use serde::{Deserialize, Serialize};

/// Which aggregate count from the shared summary this stat displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatMetric {
    Products,
    Orders,
    Users,
    Reviews,
}

impl StatMetric {
    fn caption(&self) -> &'static str {
        match self {
            StatMetric::Products => "products in catalog",
            StatMetric::Orders => "orders placed",
            StatMetric::Users => "registered customers",
            StatMetric::Reviews => "reviews submitted",
        }
    }

    fn value(&self, summary: &StoreSummary) -> u64 {
        match self {
            StatMetric::Products => summary.products,
            StatMetric::Orders => summary.orders,
            StatMetric::Users => summary.users,
            StatMetric::Reviews => summary.reviews,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatConfig {
    /// Smaller rendering without the caption line.
    #[serde(default)]
    pub compact: bool,
}

/// Big-number widget backed by the dashboard summary. All stat widgets on
/// one render pass read the same snapshot, so their counts always agree.
pub struct StatWidget {
    metric: StatMetric,
    cfg: StatConfig,
}

impl StatWidget {
    pub fn new(metric: StatMetric, cfg: StatConfig) -> Self {
        Self { metric, cfg }
    }
}

impl Widget for StatWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        let snapshot = ctx.data_cache.snapshot();
        match &snapshot.summary {
            FetchState::Loading => {
                ui.weak("Loading…");
            }
            FetchState::Failed(msg) => {
                ui.colored_label(egui::Color32::RED, format!("Failed to load: {msg}"));
            }
            FetchState::Ready(summary) => {
                let value = self.metric.value(summary);
                if self.cfg.compact {
                    ui.label(value.to_string());
                } else {
                    ui.heading(value.to_string());
                    ui.weak(self.metric.caption());
                }
            }
        }
        None
    }

    fn on_config_updated(&mut self, settings: &serde_json::Value) {
        if let Ok(cfg) = serde_json::from_value::<StatConfig>(settings.clone()) {
            self.cfg = cfg;
        }
    }
}
