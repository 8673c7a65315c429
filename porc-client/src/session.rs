//! Live map session
//!
//! Wires the static dataset, the event channel and the dispatcher together.
//! The channel connects while the dataset loads; queued events are
//! dispatched one at a time once the static collections are in place.

use std::sync::Arc;

use shared::StaticDataset;
use tokio_util::sync::CancellationToken;

use crate::cache::EntityCache;
use crate::channel::{ChannelState, Connector, EventChannel, WsConnector};
use crate::config::ClientConfig;
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::error::{ClientError, ClientResult};
use crate::http::DatasetClient;
use crate::view::ViewSurface;

/// Counters reported when a session stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub applied: u64,
    pub ignored: u64,
}

#[derive(Debug)]
pub struct LiveMapSession {
    dispatcher: Dispatcher,
    channel: EventChannel,
    stats: SessionStats,
}

impl LiveMapSession {
    /// Connect to the server and load the static dataset concurrently
    ///
    /// A failed dataset load is logged; the session still runs, and updates
    /// for farms and slaughterhouses it never loaded are ignored.
    pub async fn start(config: ClientConfig) -> Self {
        let connector: Arc<dyn Connector> = Arc::new(WsConnector::new(config.ws_url.clone()));
        let channel = EventChannel::with_connector(connector, config.channel.clone());

        let dataset = match DatasetClient::new(&config) {
            Ok(client) => client.fetch_dataset().await,
            Err(e) => Err(e),
        };

        let mut dispatcher = Dispatcher::new(EntityCache::new(), &config);
        match dataset {
            Ok(dataset) => {
                dispatcher.load_static(&dataset);
            }
            Err(e) => {
                tracing::warn!(code = %e.code(), "Static dataset unavailable: {e}");
            }
        }

        Self::from_parts(dispatcher, channel)
    }

    /// Session over an already loaded dataset and any connector
    pub fn with_dataset(
        config: &ClientConfig,
        dataset: &StaticDataset,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let channel = EventChannel::with_connector(connector, config.channel.clone());
        let mut dispatcher = Dispatcher::new(EntityCache::new(), config);
        dispatcher.load_static(dataset);
        Self::from_parts(dispatcher, channel)
    }

    pub fn from_parts(dispatcher: Dispatcher, channel: EventChannel) -> Self {
        Self {
            dispatcher,
            channel,
            stats: SessionStats::default(),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn channel_state(&self) -> ChannelState {
        self.channel.state()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Attach the map surface; cached entities are drawn now
    pub fn attach_surface(&mut self, surface: Box<dyn ViewSurface>) -> usize {
        self.dispatcher.attach_surface(surface)
    }

    /// Wait for and dispatch the next event
    ///
    /// Fails with [`ClientError::ChannelClosed`] once the channel is done.
    pub async fn step(&mut self) -> ClientResult<DispatchOutcome> {
        let event = self
            .channel
            .next_event()
            .await
            .ok_or(ClientError::ChannelClosed)?;
        Ok(self.apply(&event))
    }

    /// Dispatch events until the channel ends or `shutdown` fires
    ///
    /// After cancellation no further event is dispatched; the channel is
    /// closed before returning.
    pub async fn run(&mut self, shutdown: CancellationToken) -> SessionStats {
        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                event = self.channel.next_event() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            if shutdown.is_cancelled() {
                break;
            }
            self.apply(&event);
        }

        self.channel.close().await;
        tracing::info!(
            applied = self.stats.applied,
            ignored = self.stats.ignored,
            state = %self.channel.state(),
            "Live map session stopped"
        );
        self.stats
    }

    /// Close the channel and hand back the dispatcher with its cache
    pub async fn teardown(mut self) -> Dispatcher {
        self.channel.close().await;
        self.dispatcher
    }

    fn apply(&mut self, event: &shared::live::LiveEvent) -> DispatchOutcome {
        let outcome = self.dispatcher.dispatch(event);
        if outcome.is_applied() {
            self.stats.applied += 1;
        } else {
            self.stats.ignored += 1;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{MemoryConnector, MemoryTransport};
    use crate::view::RecordingSurface;
    use shared::models::FarmRecord;
    use std::time::Duration;

    fn dataset() -> StaticDataset {
        StaticDataset::new(
            vec![FarmRecord {
                farm_id: "F1".into(),
                name: "Cal Roig".into(),
                lat: 41.61,
                lon: 0.62,
                total_pigs: 500,
                mean_weight_kg: 108.0,
                std_weight_kg: None,
            }],
            vec![],
            vec![],
        )
    }

    fn truck(id: &str, lat: f64) -> String {
        format!(r#"{{"type":"TRUCK_UPDATE","truck_id":"{id}","position":[{lat},0.6],"pigs_on_board":3}}"#)
    }

    #[tokio::test]
    async fn test_run_until_channel_closes() {
        let (tx, transport) = MemoryTransport::pair(16);
        let connector = Arc::new(MemoryConnector::new([transport]));
        let mut session =
            LiveMapSession::with_dataset(&ClientConfig::default(), &dataset(), connector);
        let surface = RecordingSurface::new();
        session.attach_surface(Box::new(surface.clone()));

        tx.send(truck("T1", 41.7)).await.unwrap();
        tx.send("garbage".into()).await.unwrap();
        tx.send(r#"{"type":"FARM_UPDATE","farm_id":"F1","new_inventory":400,"num_pigs_loaded":100}"#.into())
            .await
            .unwrap();
        tx.send(r#"{"type":"FARM_UPDATE","farm_id":"F2","new_inventory":1}"#.into())
            .await
            .unwrap();
        drop(tx);

        let stats = session.run(CancellationToken::new()).await;
        assert_eq!(stats, SessionStats { applied: 2, ignored: 1 });
        assert_eq!(session.channel_state(), ChannelState::Closed);
        assert_eq!(surface.created_count(crate::cache::EntityKind::Truck), 1);
        assert_eq!(
            session.dispatcher().cache().farms().get("F1").unwrap().total_pigs,
            500
        );
    }

    #[tokio::test]
    async fn test_no_dispatch_after_teardown() {
        let (tx, transport) = MemoryTransport::pair(16);
        let connector = Arc::new(MemoryConnector::new([transport]));
        let mut session =
            LiveMapSession::with_dataset(&ClientConfig::default(), &dataset(), connector);

        tx.send(truck("T1", 41.7)).await.unwrap();
        assert!(session.step().await.is_ok());

        let shutdown = CancellationToken::new();
        shutdown.cancel();
        // queued before the run starts, must never be applied
        tx.send(truck("T2", 41.8)).await.unwrap();
        let stats = session.run(shutdown).await;

        assert_eq!(stats.applied, 1);
        let _ = tx.send(truck("T3", 41.9)).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        let err = session.step().await.unwrap_err();
        assert!(matches!(err, ClientError::ChannelClosed));
        assert_eq!(err.code(), shared::ErrorCode::ChannelClosed);

        let dispatcher = session.teardown().await;
        assert_eq!(dispatcher.cache().trucks().len(), 1);
        assert!(dispatcher.cache().trucks().get("T2").is_none());
    }
}
