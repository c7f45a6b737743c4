use rfd::FileDialog;
use std::path::Path;

use yt_quality_downloader::format::Quality;
use yt_quality_downloader::localizations::Localizations;
use yt_quality_downloader::models::FormState;

use crate::theme::*;

fn label(ui: &mut egui::Ui, text: String) {
    ui.label(egui::RichText::new(text).size(LABEL_FONT_SIZE));
}

pub fn render_url_input(
    ui: &mut egui::Ui,
    form: &mut FormState,
    localizer: &Localizations,
) -> egui::Response {
    label(ui, localizer.text("url-label"));

    egui::Frame::none()
        .fill(INPUT_BG)
        .rounding(ROUNDING_FIELD)
        .inner_margin(egui::vec2(10.0, 0.0))
        .show(ui, |ui| {
            ui.add_sized(
                [ui.available_width(), FIELD_HEIGHT],
                egui::TextEdit::singleline(&mut form.url)
                    .hint_text(localizer.text("url-placeholder"))
                    .frame(false)
                    .font(egui::FontId::proportional(LABEL_FONT_SIZE)),
            )
        })
        .inner
}

pub fn render_quality_selector(ui: &mut egui::Ui, form: &mut FormState, localizer: &Localizations) {
    label(ui, localizer.text("quality-label"));

    egui::ComboBox::from_id_source("quality")
        .width(ui.available_width())
        .selected_text(form.quality.height().to_string())
        .show_ui(ui, |ui| {
            for quality in Quality::ALL {
                ui.selectable_value(&mut form.quality, quality, quality.height().to_string());
            }
        });
}

pub fn render_folder_selector(
    ui: &mut egui::Ui,
    form: &mut FormState,
    localizer: &Localizations,
    start_dir: &Path,
) {
    let button = egui::Button::new(
        egui::RichText::new(localizer.text("folder-button")).size(BUTTON_FONT_SIZE),
    )
    .min_size(egui::vec2(ui.available_width(), FIELD_HEIGHT))
    .rounding(ROUNDING_BUTTON);

    if ui.add(button).clicked() {
        let initial = form.destination.as_deref().unwrap_or(start_dir);
        if let Some(path) = FileDialog::new()
            .set_title(&localizer.text("folder-dialog-title"))
            .set_directory(initial)
            .pick_folder()
        {
            log::debug!("Destination folder: {}", path.display());
            form.destination = Some(path);
        }
    }

    let destination = match &form.destination {
        Some(path) => egui::RichText::new(path.display().to_string()),
        None => egui::RichText::new(localizer.text("no-folder")).color(SECONDARY_TEXT),
    };
    ui.label(destination.size(LABEL_FONT_SIZE));
}

pub fn render_progress(ui: &mut egui::Ui, percent: u8) {
    let previous = ui.visuals().extreme_bg_color;
    ui.visuals_mut().extreme_bg_color = PROGRESS_TRACK;
    ui.add(
        egui::ProgressBar::new(f32::from(percent) / 100.0)
            .show_percentage()
            .fill(ACCENT),
    );
    ui.visuals_mut().extreme_bg_color = previous;
}
