//! `gatecheck` console harness
//!
//! Each stdin line is delivered as one camera frame. Commands:
//!
//! - `:reset` - manual reset
//! - `:stop` / `:start` - hide / show the camera surface
//! - `:quit` - exit

use anyhow::Context;
use gatecheck_core::environment::SystemClock;
use gatecheck_runtime::metrics::MetricsServer;
use gatecheck_scanner::feedback::FeedbackEmitter;
use gatecheck_scanner::loopback::{
    ChannelFrameSource, ConsolePresenter, GrantedPermission, LogHaptics, LogTonePlayer,
    StaticDeviceIdentity, Utf8Decoder,
};
use gatecheck_scanner::metrics::register_scanner_metrics;
use gatecheck_scanner::presenter::{spawn_render_loop, Presenter};
use gatecheck_scanner::session::Frame;
use gatecheck_scanner::types::ScannerIdentity;
use gatecheck_scanner::validation::{HttpTicketValidator, ValidationCoordinator};
use gatecheck_scanner::{
    ScannerAction, ScannerConfig, ScannerEnvironment, ScannerReducer, ScannerSession,
    ScannerState, ScannerStore,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gatecheck=info,gatecheck_scanner=info,gatecheck_runtime=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ScannerConfig::from_env();
    tracing::info!(api = %config.api_base_url, location = %config.location, "Starting gatecheck");

    if let Some(addr) = config.metrics_addr {
        gatecheck_runtime::metrics::register_metrics();
        register_scanner_metrics();
        MetricsServer::new(addr)
            .start()
            .context("failed to start metrics exporter")?;
    }

    let identity = ScannerIdentity::resolve(&config, &StaticDeviceIdentity::from_host());
    let validator = HttpTicketValidator::new(&config.api_base_url, config.request_timeout)
        .context("failed to build HTTP client")?;
    let presenter: Arc<dyn Presenter> = Arc::new(ConsolePresenter);

    let environment = ScannerEnvironment::new(
        ValidationCoordinator::new(Arc::new(validator)),
        FeedbackEmitter::new(Arc::new(LogTonePlayer), Arc::new(LogHaptics)),
        Arc::clone(&presenter),
        identity,
        Arc::new(SystemClock),
    );

    let store = ScannerStore::new(
        ScannerState::new(config.scan_cooldown),
        ScannerReducer::from_config(&config),
        environment,
    );
    let render = spawn_render_loop(store.watch_state(), presenter);

    let (frames, feeder) = ChannelFrameSource::new(8);
    let session = ScannerSession::new(
        store.clone(),
        Arc::new(frames),
        Arc::new(Utf8Decoder),
        Arc::new(GrantedPermission),
        config.stop_timeout,
    );

    if let Err(error) = session.on_surface_changed(true).await {
        tracing::warn!(%error, "Camera did not start");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match line.trim() {
            ":quit" => break,
            ":reset" => {
                store.send(ScannerAction::ResetRequested).await?;
            },
            ":stop" => {
                if let Err(error) = session.on_surface_changed(false).await {
                    tracing::warn!(%error, "Stop failed");
                }
            },
            ":start" => {
                if let Err(error) = session.on_surface_changed(true).await {
                    tracing::warn!(%error, "Start failed");
                }
            },
            "" => {},
            payload => {
                if !feeder.feed(Frame::new(payload)) {
                    tracing::debug!("Frame dropped: camera off or busy");
                }
            },
        }
    }

    session.stop().await?;
    if let Err(error) = store.shutdown(Duration::from_secs(1)).await {
        tracing::warn!(%error, "Shutdown incomplete");
    }
    render.abort();

    Ok(())
}
