use super::{default_limit, show_list, Widget, WidgetAction};
use crate::dashboard::view::DashboardContext;
use crate::data::format_price;
use eframe::egui;
use serde::{Deserialize, Serialize};

fn default_low_stock_threshold() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductsListConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Highlight products whose stock fell below this threshold.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u32,
}

impl Default for ProductsListConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

/// Inventory list. Repeatable: several instances with different limits or
/// thresholds may coexist on one dashboard.
pub struct ProductsListWidget {
    cfg: ProductsListConfig,
}

impl ProductsListWidget {
    pub fn new(cfg: ProductsListConfig) -> Self {
        Self { cfg }
    }
}

impl Widget for ProductsListWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        let snapshot = ctx.data_cache.snapshot();
        let threshold = self.cfg.low_stock_threshold;
        show_list(ui, &snapshot.products, self.cfg.limit, |ui, product| {
            let mut clicked = None;
            ui.horizontal(|ui| {
                if ui.link(&product.name).clicked() {
                    clicked = Some(WidgetAction::open("products", &product.id));
                }
                ui.label(format_price(product.price_cents));
                if product.stock < threshold {
                    ui.colored_label(
                        egui::Color32::YELLOW,
                        format!("{} left", product.stock),
                    );
                } else {
                    ui.weak(format!("{} in stock", product.stock));
                }
            });
            clicked
        })
    }

    fn on_config_updated(&mut self, settings: &serde_json::Value) {
        if let Ok(cfg) = serde_json::from_value::<ProductsListConfig>(settings.clone()) {
            self.cfg = cfg;
        }
    }
}
