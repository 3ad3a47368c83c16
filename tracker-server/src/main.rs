use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tracker_server::config::TrackerConfig;
use tracker_server::feed::{FeedClient, MockFeed};
use tracker_server::poller::{Poller, PollerHandle};
use tracker_server::view::{NotificationConfig, SharedView, TrackerView};
use tracker_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match TrackerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let view = TrackerView::new(config.default_center, &NotificationConfig::default()).shared();

    let poller = match start_poller(&config, view.clone()) {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Failed to start position feed");
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::new(view, config.default_center, config.poll_interval);
    let app = create_router(state, &config.static_dir);

    let listener = match tokio::net::TcpListener::bind(config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.listen_addr, error = %e, "Failed to bind");
            poller.stop().await;
            return ExitCode::FAILURE;
        }
    };
    info!(
        addr = %config.listen_addr,
        poll_secs = config.poll_interval.as_secs(),
        "Vehicle tracker listening on http://{}",
        config.listen_addr
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await;

    info!("Shutting down");
    poller.stop().await;

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

/// Start polling the mock snapshot file if one is configured, else the
/// live backend.
fn start_poller(
    config: &TrackerConfig,
    view: SharedView,
) -> Result<PollerHandle, tracker_server::feed::FeedError> {
    let poller_config = config.poller();
    match &config.mock_data {
        Some(path) => {
            let feed = MockFeed::new(path, config.categories.clone())?;
            info!(path = %path.display(), "Serving mock vehicle data");
            Ok(Poller::new(feed, view, poller_config).spawn())
        }
        None => {
            let client = FeedClient::new(config.feed())?;
            info!(url = %config.feed().snapshot_url(), "Polling live feed");
            Ok(Poller::new(client, view, poller_config).spawn())
        }
    }
}
