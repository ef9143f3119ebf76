use eframe::egui;

use crate::session::{DashboardSession, Tab};
use crate::ui::{insights, overview, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct StudentDashApp {
    pub session: DashboardSession,
}

impl StudentDashApp {
    pub fn new(session: DashboardSession) -> Self {
        Self { session }
    }
}

impl eframe::App for StudentDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.session.refresh();

        // ---- Top panel: menu bar + headline metrics ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.session);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.session);
            });

        // ---- Central panel: tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::tab_bar(ui, &mut self.session);
            let tab = self.session.active_tab;
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match tab {
                    Tab::Overview => overview::overview_tab(ui, &mut self.session),
                    Tab::Correlation => plot::correlation_tab(ui, &self.session),
                    Tab::Boxplots => plot::boxplot_tab(ui, &mut self.session),
                    Tab::Scatter => plot::scatter_tab(ui, &self.session),
                    Tab::Insights => insights::insights_tab(ui, &self.session),
                });
        });
    }
}
