use super::{default_limit, show_list, Widget, WidgetAction};
use crate::dashboard::view::DashboardContext;
use eframe::egui;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentReviewsConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Hide reviews below this rating (1-5). Zero shows everything.
    #[serde(default)]
    pub min_rating: u8,
}

impl Default for RecentReviewsConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            min_rating: 0,
        }
    }
}

pub struct RecentReviewsWidget {
    cfg: RecentReviewsConfig,
}

impl RecentReviewsWidget {
    pub fn new(cfg: RecentReviewsConfig) -> Self {
        Self { cfg }
    }

    fn stars(rating: u8) -> String {
        let rating = rating.min(5) as usize;
        format!("{}{}", "★".repeat(rating), "☆".repeat(5 - rating))
    }
}

impl Widget for RecentReviewsWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        let snapshot = ctx.data_cache.snapshot();
        let min_rating = self.cfg.min_rating;
        show_list(ui, &snapshot.reviews, self.cfg.limit, |ui, review| {
            if review.rating < min_rating {
                return None;
            }
            let mut clicked = None;
            ui.horizontal(|ui| {
                ui.monospace(Self::stars(review.rating));
                if ui.link(&review.product).clicked() {
                    clicked = Some(WidgetAction::open("reviews", &review.id));
                }
            });
            ui.weak(&review.excerpt);
            clicked
        })
    }

    fn on_config_updated(&mut self, settings: &serde_json::Value) {
        if let Ok(cfg) = serde_json::from_value::<RecentReviewsConfig>(settings.clone()) {
            self.cfg = cfg;
        }
    }
}
