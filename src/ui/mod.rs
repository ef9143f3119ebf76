/// Presentation layer: egui panels and charts bound to the session.

pub mod insights;
pub mod overview;
pub mod panels;
pub mod plot;
