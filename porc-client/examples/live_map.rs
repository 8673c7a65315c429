//! Headless live map: connects to the simulation server and logs every
//! marker the map would draw.
//!
//! ```text
//! PORC_WS_URL=ws://localhost:8000/ws cargo run -p porc-client --example live_map
//! ```

use porc_client::cache::EntityKind;
use porc_client::view::{Marker, MarkerIcon, ViewHandle, ViewSurface};
use porc_client::{ChannelConfig, ClientConfig, LiveMapSession};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct LogSurface;

#[derive(Debug)]
struct LogHandle {
    kind: EntityKind,
    id: String,
    popup_open: bool,
}

impl ViewSurface for LogSurface {
    fn create_marker(&mut self, kind: EntityKind, id: &str, marker: &Marker) -> Box<dyn ViewHandle> {
        tracing::info!(%kind, id, icon = icon_name(marker.icon), "+ {}", marker.popup);
        Box::new(LogHandle {
            kind,
            id: id.to_string(),
            popup_open: false,
        })
    }
}

impl ViewHandle for LogHandle {
    fn update(&mut self, marker: &Marker) {
        tracing::debug!(
            kind = %self.kind,
            id = %self.id,
            lat = marker.position.lat,
            lon = marker.position.lon,
            "~ {}",
            marker.popup
        );
    }

    fn on_focus(&mut self) {
        self.popup_open = true;
    }

    fn on_blur(&mut self) {
        self.popup_open = false;
    }

    fn is_popup_open(&self) -> bool {
        self.popup_open
    }
}

fn icon_name(icon: MarkerIcon) -> &'static str {
    match icon {
        MarkerIcon::Truck => "truck",
        MarkerIcon::Farm => "farm",
        MarkerIcon::Slaughterhouse(tier) => tier.as_str(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "porc_client=info,live_map=info".into()),
        )
        .init();

    let config = ClientConfig::from_env().with_channel(ChannelConfig::lan());
    tracing::info!(ws = %config.ws_url, http = %config.http_url, "Starting live map");

    let mut session = LiveMapSession::start(config).await;
    session.attach_surface(Box::new(LogSurface));

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let stats = session.run(shutdown).await;
    let progress = session.dispatcher().progress();
    tracing::info!(
        applied = stats.applied,
        ignored = stats.ignored,
        phase = ?progress.phase,
        cumulative_profit = progress.cumulative_profit(),
        "Done"
    );
    Ok(())
}
