use super::{default_limit, list_body, ListBody, Widget, WidgetAction};
use crate::dashboard::view::DashboardContext;
use crate::data::format_price;
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentOrdersConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_true")]
    pub show_status: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RecentOrdersConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            show_status: true,
        }
    }
}

/// Table of the most recently placed orders. Row activation asks the host
/// to open the order detail page.
pub struct RecentOrdersWidget {
    cfg: RecentOrdersConfig,
}

impl RecentOrdersWidget {
    pub fn new(cfg: RecentOrdersConfig) -> Self {
        Self { cfg }
    }
}

impl Widget for RecentOrdersWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        let snapshot = ctx.data_cache.snapshot();
        let orders = match list_body(&snapshot.orders, self.cfg.limit) {
            ListBody::Loading => {
                ui.weak("Loading…");
                return None;
            }
            ListBody::Error(msg) => {
                ui.colored_label(egui::Color32::RED, format!("Failed to load: {msg}"));
                return None;
            }
            ListBody::Empty => {
                ui.weak("No orders yet.");
                return None;
            }
            ListBody::Populated(orders) => orders,
        };

        let mut clicked = None;
        let mut table = TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::remainder())
            .column(Column::auto());
        if self.cfg.show_status {
            table = table.column(Column::auto());
        }
        table
            .header(18.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Order");
                });
                header.col(|ui| {
                    ui.strong("Customer");
                });
                header.col(|ui| {
                    ui.strong("Total");
                });
                if self.cfg.show_status {
                    header.col(|ui| {
                        ui.strong("Status");
                    });
                }
            })
            .body(|mut body| {
                for order in orders {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            if ui.link(&order.id).clicked() {
                                clicked = Some(WidgetAction::open("orders", &order.id));
                            }
                        });
                        row.col(|ui| {
                            ui.label(&order.customer);
                        });
                        row.col(|ui| {
                            ui.label(format_price(order.total_cents));
                        });
                        if self.cfg.show_status {
                            row.col(|ui| {
                                ui.label(order.status.as_str());
                            });
                        }
                    });
                }
            });
        clicked
    }

    fn on_config_updated(&mut self, settings: &serde_json::Value) {
        if let Ok(cfg) = serde_json::from_value::<RecentOrdersConfig>(settings.clone()) {
            self.cfg = cfg;
        }
    }
}
