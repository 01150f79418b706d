use super::{default_limit, show_list, Widget, WidgetAction};
use crate::dashboard::view::DashboardContext;
use crate::data::TicketStatus;
use chrono::Utc;
use eframe::egui;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenTicketsConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for OpenTicketsConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}

pub struct OpenTicketsWidget {
    cfg: OpenTicketsConfig,
}

impl OpenTicketsWidget {
    pub fn new(cfg: OpenTicketsConfig) -> Self {
        Self { cfg }
    }

    fn age_label(opened_at: chrono::DateTime<Utc>) -> String {
        let age = Utc::now().signed_duration_since(opened_at);
        if age.num_days() > 0 {
            format!("{}d", age.num_days())
        } else if age.num_hours() > 0 {
            format!("{}h", age.num_hours())
        } else {
            format!("{}m", age.num_minutes().max(0))
        }
    }
}

impl Widget for OpenTicketsWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        let snapshot = ctx.data_cache.snapshot();
        show_list(ui, &snapshot.tickets, self.cfg.limit, |ui, ticket| {
            let mut clicked = None;
            ui.horizontal(|ui| {
                if ui.link(&ticket.subject).clicked() {
                    clicked = Some(WidgetAction::open("tickets", &ticket.id));
                }
                if ticket.status == TicketStatus::Open {
                    ui.colored_label(egui::Color32::LIGHT_RED, "open");
                }
                ui.weak(Self::age_label(ticket.opened_at));
            });
            clicked
        })
    }

    fn on_config_updated(&mut self, settings: &serde_json::Value) {
        if let Ok(cfg) = serde_json::from_value::<OpenTicketsConfig>(settings.clone()) {
            self.cfg = cfg;
        }
    }
}
