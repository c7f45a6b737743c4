use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use yt_quality_downloader::config::AppConfig;
use yt_quality_downloader::controller::Controller;
use yt_quality_downloader::download::YtDlp;
use yt_quality_downloader::localizations::Localizations;

mod app;
mod theme;
mod ui;

use app::YtdlApp;

fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides; `log` records are bridged into the subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    log::debug!("Configuration: {:?}", config);

    let downloader = Arc::new(YtDlp::new(config.ytdlp_path.clone()));
    let mut controller = Controller::new(&config, downloader);
    let localizer = Localizations::new();
    let title = localizer.text("app-title");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([500.0, 420.0])
            .with_min_inner_size([420.0, 380.0])
            .with_title(title.clone()),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(theme::visuals());
            let ctx = cc.egui_ctx.clone();
            controller.set_waker(move || ctx.request_repaint());
            Box::new(YtdlApp::new(config, controller, localizer))
        }),
    )
    .map_err(|e| anyhow::anyhow!("failed to run the window: {e}"))
}
