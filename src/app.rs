use rfd::{MessageButtons, MessageDialog, MessageLevel};

use yt_quality_downloader::config::AppConfig;
use yt_quality_downloader::controller::Controller;
use yt_quality_downloader::localizations::Localizations;
use yt_quality_downloader::models::{FormState, Outcome, ValidationError};

use crate::theme::*;
use crate::ui;

/// A modal message queued during the frame and shown once it is drawn.
struct Notice {
    level: MessageLevel,
    title: String,
    body: String,
}

pub struct YtdlApp {
    form: FormState,
    controller: Controller,
    localizer: Localizations,
    config: AppConfig,
    completed: bool,
    notices: Vec<Notice>,
}

impl YtdlApp {
    pub fn new(config: AppConfig, controller: Controller, localizer: Localizations) -> Self {
        let form = FormState {
            quality: config.default_quality,
            ..Default::default()
        };

        Self {
            form,
            controller,
            localizer,
            config,
            completed: false,
            notices: Vec::new(),
        }
    }

    fn start_download(&mut self) {
        match self.controller.start(&self.form) {
            Ok(id) => {
                log::info!("Started download {} for {}", id, self.form.url.trim());
                self.completed = false;
            }
            Err(e) => {
                log::debug!("Rejected start: {}", e);
                let body = self.validation_message(&e);
                self.notify(MessageLevel::Warning, "dialog-error-title", body);
            }
        }
    }

    fn validation_message(&self, error: &ValidationError) -> String {
        match error {
            ValidationError::NoDestination => self.localizer.text("error-no-folder"),
            ValidationError::EmptyUrl => self.localizer.text("error-no-url"),
            ValidationError::DestinationMissing(path) => format!(
                "{} {}",
                self.localizer.text("error-folder-missing"),
                path.display()
            ),
            ValidationError::Busy(_) => self.localizer.text("error-busy"),
        }
    }

    fn process_events(&mut self) {
        for outcome in self.controller.poll() {
            match outcome {
                Outcome::Success(_) => {
                    self.completed = true;
                    let body = self.localizer.text("download-success");
                    self.notify(MessageLevel::Info, "dialog-success-title", body);
                }
                Outcome::Failure(_, message) => {
                    self.completed = false;
                    let body = format!("{} {}", self.localizer.text("download-failed"), message);
                    self.notify(MessageLevel::Error, "dialog-error-title", body);
                }
            }
        }
    }

    fn notify(&mut self, level: MessageLevel, title_key: &str, body: String) {
        self.notices.push(Notice {
            level,
            title: self.localizer.text(title_key),
            body,
        });
    }

    fn show_notices(&mut self) {
        for notice in self.notices.drain(..) {
            let _ = MessageDialog::new()
                .set_level(notice.level)
                .set_title(&notice.title)
                .set_description(&notice.body)
                .set_buttons(MessageButtons::Ok)
                .show();
        }
    }

    fn render_download_button(&mut self, ui: &mut egui::Ui) {
        let key = if self.completed {
            "download-completed-button"
        } else {
            "download-button"
        };

        let button = egui::Button::new(
            egui::RichText::new(self.localizer.text(key))
                .size(BUTTON_FONT_SIZE)
                .color(MAIN_TEXT),
        )
        .min_size(egui::vec2(ui.available_width(), MIN_SIZE_BUTTON.y))
        .fill(ACCENT)
        .rounding(ROUNDING_BUTTON);

        let response = ui.add_enabled(!self.controller.is_busy(), button);
        if response.clicked() {
            self.start_download();
        }
        if self.controller.is_busy() {
            ui.label(
                egui::RichText::new(self.localizer.text("status-downloading"))
                    .color(SECONDARY_TEXT),
            );
        }
    }
}

impl eframe::App for YtdlApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_events();

        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).inner_margin(MARGIN))
            .show(ctx, |ui| {
                ui.spacing_mut().item_spacing.y = SPACING;

                ui.heading(self.localizer.text("app-title"));

                let url_response = ui::render_url_input(ui, &mut self.form, &self.localizer);
                if url_response.lost_focus()
                    && ui.input(|i| i.key_pressed(egui::Key::Enter))
                    && !self.controller.is_busy()
                {
                    self.start_download();
                }

                ui::render_quality_selector(ui, &mut self.form, &self.localizer);
                ui::render_folder_selector(
                    ui,
                    &mut self.form,
                    &self.localizer,
                    &self.config.start_dir,
                );

                self.render_download_button(ui);
                ui::render_progress(ui, self.controller.progress());
            });

        self.show_notices();
    }
}
