mod app;
mod assistant;
mod conversation;
mod editor;
mod event;
mod preview;
mod settings;
mod theme;

use app::WizardApp;
use assistant::backend::SimulatedBackend;
use assistant::AssistantClient;
use eframe::egui;
use std::sync::mpsc;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("webwizard=info")),
        )
        .init();

    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("webwizard-runtime")
        .build()?;

    let backend = Arc::new(SimulatedBackend);
    let assistant =
        runtime.block_on(async { AssistantClient::new(backend, tx.clone()) })?;

    let (stored_settings, warning) = settings::store::load();
    let startup_warnings = warning.into_iter().collect();

    let app = WizardApp::new(rx, assistant, stored_settings, startup_warnings);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1024.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Web Wizard",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(app))),
    )?;

    Ok(())
}
