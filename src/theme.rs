use egui::Color32;

// Color Palette
pub const WINDOW_BG: Color32 = Color32::from_rgb(44, 62, 80); // Slate window background
pub const INPUT_BG: Color32 = Color32::from_rgb(52, 73, 94); // Slightly lighter fields
pub const ACCENT: Color32 = Color32::from_rgb(26, 188, 156); // Teal buttons and progress fill
pub const ACCENT_HOVER: Color32 = Color32::from_rgb(22, 160, 133);
pub const PROGRESS_TRACK: Color32 = Color32::from_rgb(149, 165, 166);

// Text Colors
pub const MAIN_TEXT: Color32 = Color32::WHITE;
pub const SECONDARY_TEXT: Color32 = Color32::from_rgb(189, 195, 199);

// Sizing & Spacing
pub const ROUNDING_FIELD: f32 = 5.0;
pub const ROUNDING_BUTTON: f32 = 5.0;
pub const MIN_SIZE_BUTTON: egui::Vec2 = egui::Vec2::new(200.0, 40.0);
pub const FIELD_HEIGHT: f32 = 36.0;
pub const SPACING: f32 = 15.0;
pub const MARGIN: f32 = 20.0;

pub const LABEL_FONT_SIZE: f32 = 14.0;
pub const BUTTON_FONT_SIZE: f32 = 14.0;

pub fn visuals() -> egui::Visuals {
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = WINDOW_BG;
    visuals.window_fill = WINDOW_BG;
    visuals.extreme_bg_color = INPUT_BG;
    visuals.override_text_color = Some(MAIN_TEXT);
    visuals.selection.bg_fill = ACCENT;
    visuals.widgets.inactive.weak_bg_fill = ACCENT;
    visuals.widgets.inactive.bg_fill = INPUT_BG;
    visuals.widgets.hovered.weak_bg_fill = ACCENT_HOVER;
    visuals.widgets.active.weak_bg_fill = ACCENT_HOVER;
    visuals
}
