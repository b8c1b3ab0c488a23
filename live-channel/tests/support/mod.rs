use integration_test_utils::{
    station_items, EventLog, MockConnector, MockServer, RecordingListener, STATION_ENDPOINT,
    STATION_STREAM, STATION_TYPE,
};
use live_channel::{Channel, ChannelConfig, ChannelEvent, ChannelEventKind};
use std::sync::Arc;
use std::time::Duration;

pub(crate) const EVENT_TIMEOUT: Duration = Duration::from_secs(3);
#[allow(dead_code)]
pub(crate) const QUIET_PERIOD: Duration = Duration::from_millis(150);

pub(crate) fn station_config(endpoint: &str) -> ChannelConfig {
    ChannelConfig::new(endpoint, STATION_TYPE)
        .with_stream(STATION_STREAM)
        .with_max_retries(2)
        .with_retry_interval_ms(20)
}

#[allow(dead_code)]
pub(crate) struct StationHarness {
    pub(crate) channel: Channel,
    pub(crate) server: MockServer,
    pub(crate) connector: MockConnector,
    pub(crate) log: EventLog,
}

/// Channel wired to an in-memory station server at `config.endpoint`.
pub(crate) async fn station_harness(config: ChannelConfig) -> StationHarness {
    let server = MockServer::new(STATION_ENDPOINT, station_items());
    let connector = MockConnector::new();
    if config.endpoint == STATION_ENDPOINT {
        connector.register(&server).await;
    }
    let channel = Channel::new(config, Arc::new(connector.clone()));
    let log = RecordingListener::attach(&channel).await;

    StationHarness {
        channel,
        server,
        connector,
        log,
    }
}

pub(crate) async fn expect_event(log: &mut EventLog, kind: ChannelEventKind) -> ChannelEvent {
    match log.next_of_kind(kind, EVENT_TIMEOUT).await {
        Some(event) => event,
        None => panic!("no `{}` event within {EVENT_TIMEOUT:?}", kind.as_str()),
    }
}

#[allow(dead_code)]
pub(crate) async fn expect_items(log: &mut EventLog) -> usize {
    match expect_event(log, ChannelEventKind::NewItems).await {
        ChannelEvent::NewItems(batch) => batch.len(),
        other => panic!("expected new_items, got {other:?}"),
    }
}

#[allow(dead_code)]
pub(crate) async fn expect_error_retries(log: &mut EventLog) -> u32 {
    match expect_event(log, ChannelEventKind::Error).await {
        ChannelEvent::Error(err) => err.retries,
        other => panic!("expected error, got {other:?}"),
    }
}
