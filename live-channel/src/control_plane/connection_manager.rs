/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Connection lifecycle: open, reconnect on loss, and terminal shutdown.
//!
//! All mutable channel state sits behind one mutex. Work that has to wait (open attempts,
//! the per-handle signal pump, retry delays) runs in spawned tasks tagged with the
//! generation that was current when they started. A task whose generation is no longer
//! current finds the channel moved on and does nothing, which is how torn-down handles and
//! superseded retry timers are silenced without cancelling them.

use crate::config::ChannelConfig;
use crate::control_plane::connection_state::ConnectionState;
use crate::control_plane::retry_policy::{RetryDecision, RetryPolicy};
use crate::data_plane::codec::{ControlEnvelope, MessageCodec};
use crate::data_plane::event_dispatcher::EventSender;
use crate::data_plane::listener_registry::ChannelEvent;
use crate::error::{ChannelError, ConnectionError};
use crate::observability::{events, fields};
use crate::session::subscription_session::{SubscriptionScope, SubscriptionSession};
use crate::transport::{TransportConnector, TransportError, TransportHandle, TransportSignal};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

const COMPONENT: &str = "connection_manager";

struct ActiveLink {
    handle: Arc<dyn TransportHandle>,
    pump: JoinHandle<()>,
}

struct Core {
    state: ConnectionState,
    retries_done: u32,
    generation: u64,
    link: Option<ActiveLink>,
    session: SubscriptionSession,
}

struct Shared {
    channel_id: String,
    config: ChannelConfig,
    connector: Arc<dyn TransportConnector>,
    policy: RetryPolicy,
    codec: MessageCodec,
    aborted: AtomicBool,
    state_tx: watch::Sender<ConnectionState>,
    events: EventSender,
    core: Mutex<Core>,
}

#[derive(Clone)]
pub(crate) struct ConnectionManager {
    shared: Arc<Shared>,
}

impl ConnectionManager {
    pub(crate) fn new(
        channel_id: String,
        config: ChannelConfig,
        connector: Arc<dyn TransportConnector>,
        events: EventSender,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Idle);
        let core = Core {
            state: ConnectionState::Idle,
            retries_done: 0,
            generation: 0,
            link: None,
            session: SubscriptionSession::new(&config),
        };

        Self {
            shared: Arc::new(Shared {
                channel_id,
                policy: RetryPolicy::from_config(&config),
                config,
                connector,
                codec: MessageCodec,
                aborted: AtomicBool::new(false),
                state_tx,
                events,
                core: Mutex::new(core),
            }),
        }
    }

    fn channel_id(&self) -> &str {
        &self.shared.channel_id
    }

    fn endpoint(&self) -> &str {
        &self.shared.config.endpoint
    }

    pub(crate) fn state(&self) -> ConnectionState {
        *self.shared.state_tx.borrow()
    }

    pub(crate) fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    pub(crate) fn is_opened(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.shared.aborted.load(Ordering::SeqCst)
    }

    pub(crate) async fn retries_done(&self) -> u32 {
        self.shared.core.lock().await.retries_done
    }

    pub(crate) async fn scope(&self) -> SubscriptionScope {
        self.shared.core.lock().await.session.scope().clone()
    }

    fn transition(&self, core: &mut Core, next: ConnectionState) {
        trace!(
            component = COMPONENT,
            channel_id = self.channel_id(),
            from = core.state.as_str(),
            to = next.as_str(),
            "state transition"
        );
        core.state = next;
        self.shared.state_tx.send_replace(next);
    }

    pub(crate) async fn connect(&self) -> Result<(), ChannelError> {
        self.shared.aborted.store(false, Ordering::SeqCst);

        let mut core = self.shared.core.lock().await;
        if core.state.is_terminal() {
            warn!(
                event = events::CONNECT_REJECTED_TERMINAL,
                component = COMPONENT,
                channel_id = self.channel_id(),
                state = core.state.as_str(),
                "connect called on a terminated channel"
            );
            return Err(ChannelError::Terminated(core.state));
        }
        if core.state.is_active() {
            debug!(
                event = events::CONNECT_IGNORED_ACTIVE,
                component = COMPONENT,
                channel_id = self.channel_id(),
                state = core.state.as_str(),
                "channel already connecting or open"
            );
            return Ok(());
        }

        info!(
            event = events::CONNECT_START,
            component = COMPONENT,
            channel_id = self.channel_id(),
            endpoint = self.endpoint(),
            "connecting channel"
        );
        self.start_open_attempt(&mut core);
        Ok(())
    }

    pub(crate) fn abort(&self) {
        self.shared.aborted.store(true, Ordering::SeqCst);
        info!(
            event = events::ABORT_REQUESTED,
            component = COMPONENT,
            channel_id = self.channel_id(),
            "abort requested; next retry check will refuse"
        );
    }

    pub(crate) async fn close(&self) {
        let mut core = self.shared.core.lock().await;
        if core.state.is_terminal() {
            return;
        }

        info!(
            event = events::CLOSE_REQUESTED,
            component = COMPONENT,
            channel_id = self.channel_id(),
            state = core.state.as_str(),
            "closing channel"
        );

        core.generation += 1;
        if let Some(link) = core.link.take() {
            link.pump.abort();
            link.handle.close().await;
        }
        core.session.stop_listening();
        self.transition(&mut core, ConnectionState::Closed);
        self.shared.events.emit(ChannelEvent::Closed);
    }

    /// Teardown for a channel whose owner went away: stops reconnecting and releases the
    /// link from a spawned task. No event is emitted. Outside a runtime only the abort flag
    /// is set.
    pub(crate) fn discard(&self) {
        self.shared.aborted.store(true, Ordering::SeqCst);
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(
                event = events::CHANNEL_DROPPED,
                component = COMPONENT,
                channel_id = self.channel_id(),
                "channel dropped outside a runtime; link left to the transport"
            );
            return;
        };

        let manager = self.clone();
        runtime.spawn(async move { manager.release_link().await });
    }

    async fn release_link(&self) {
        let mut core = self.shared.core.lock().await;
        if core.state.is_terminal() {
            return;
        }

        info!(
            event = events::CHANNEL_DROPPED,
            component = COMPONENT,
            channel_id = self.channel_id(),
            state = core.state.as_str(),
            "channel dropped; releasing link"
        );

        // Pending open results and retry timers see a newer generation and back off.
        core.generation += 1;
        if let Some(link) = core.link.take() {
            link.pump.abort();
            link.handle.close().await;
        }
        core.session.stop_listening();
        self.transition(&mut core, ConnectionState::Closed);
    }

    pub(crate) async fn listen(&self) {
        let mut core = self.shared.core.lock().await;
        if let Some(envelope) = core.session.listen() {
            self.send_envelope(&core, envelope).await;
        }
    }

    pub(crate) async fn initialize_bounding_box(&self, bounds: &[f64]) -> Result<(), ChannelError> {
        let mut core = self.shared.core.lock().await;
        match core.session.initialize_bounding_box(bounds)? {
            Some(envelope) => self.send_envelope(&core, envelope).await,
            None => {
                debug!(
                    event = events::BOUNDING_BOX_ALREADY_SET,
                    component = COMPONENT,
                    channel_id = self.channel_id(),
                    bounding_box =
                        %fields::format_bounding_box(core.session.scope().bounding_box.as_ref()),
                    "bounding box already set; keeping the existing one"
                );
            }
        }
        Ok(())
    }

    pub(crate) async fn change_filter(&self, filter: Value) {
        let mut core = self.shared.core.lock().await;
        let envelope = core.session.change_filter(filter);
        self.send_envelope(&core, envelope).await;
    }

    fn start_open_attempt(&self, core: &mut Core) {
        core.generation += 1;
        let generation = core.generation;
        self.transition(core, ConnectionState::Connecting);

        debug!(
            event = events::OPEN_ATTEMPT,
            component = COMPONENT,
            channel_id = self.channel_id(),
            endpoint = self.endpoint(),
            generation,
            retries_done = core.retries_done,
            "opening transport"
        );

        let manager = self.clone();
        tokio::spawn(async move {
            let result = manager.shared.connector.open(manager.endpoint()).await;
            manager.handle_open_result(generation, result).await;
        });
    }

    async fn handle_open_result(
        &self,
        generation: u64,
        result: Result<Arc<dyn TransportHandle>, TransportError>,
    ) {
        let mut core = self.shared.core.lock().await;
        if core.generation != generation || core.state != ConnectionState::Connecting {
            debug!(
                event = events::OPEN_SUPERSEDED,
                component = COMPONENT,
                channel_id = self.channel_id(),
                generation,
                reason = fields::REASON_SUPERSEDED,
                "discarding result of a superseded open attempt"
            );
            if let Ok(handle) = result {
                handle.close().await;
            }
            return;
        }

        match result {
            Ok(handle) => {
                let pump = tokio::spawn(pump_signals(self.clone(), generation, handle.clone()));
                core.link = Some(ActiveLink { handle, pump });
                core.retries_done = 0;
                self.transition(&mut core, ConnectionState::Open);

                info!(
                    event = events::OPEN_OK,
                    component = COMPONENT,
                    channel_id = self.channel_id(),
                    endpoint = self.endpoint(),
                    generation,
                    "channel opened"
                );

                if let Some(envelope) = core.session.on_reconnect() {
                    debug!(
                        event = events::SCOPE_REPLAY,
                        component = COMPONENT,
                        channel_id = self.channel_id(),
                        control_event = envelope.event.as_str(),
                        "replaying subscription scope"
                    );
                    self.send_envelope(&core, envelope).await;
                }
                self.shared.events.emit(ChannelEvent::Opened);
            }
            Err(err) => {
                warn!(
                    event = events::OPEN_FAILED,
                    component = COMPONENT,
                    channel_id = self.channel_id(),
                    endpoint = self.endpoint(),
                    generation,
                    reason = fields::REASON_OPEN_FAILED,
                    err = %err,
                    "unable to open transport"
                );
                self.schedule_retry_or_fail(&mut core);
            }
        }
    }

    async fn handle_payload(&self, generation: u64, payload: String) {
        let core = self.shared.core.lock().await;
        if core.generation != generation || core.state != ConnectionState::Open {
            trace!(
                event = events::LINK_SIGNAL_STALE,
                component = COMPONENT,
                channel_id = self.channel_id(),
                generation,
                "ignoring message from a torn-down handle"
            );
            return;
        }
        if !core.session.is_listening() {
            debug!(
                event = events::ITEMS_DROPPED_NOT_LISTENING,
                component = COMPONENT,
                channel_id = self.channel_id(),
                "dropping inbound message; channel is not listening"
            );
            return;
        }

        match self.shared.codec.decode(&payload) {
            Ok(batch) => {
                debug!(
                    event = events::ITEMS_RECEIVED,
                    component = COMPONENT,
                    channel_id = self.channel_id(),
                    item_count = batch.len(),
                    "received item batch"
                );
                self.shared.events.emit(ChannelEvent::NewItems(batch));
            }
            Err(err) => {
                warn!(
                    event = events::ITEMS_DECODE_FAILED,
                    component = COMPONENT,
                    channel_id = self.channel_id(),
                    err = %err,
                    "dropping undecodable inbound message"
                );
            }
        }
    }

    async fn handle_link_lost(&self, generation: u64, cause: Option<TransportError>) {
        let mut core = self.shared.core.lock().await;
        if core.generation != generation || core.state != ConnectionState::Open {
            trace!(
                event = events::LINK_SIGNAL_STALE,
                component = COMPONENT,
                channel_id = self.channel_id(),
                generation,
                "ignoring close from a torn-down handle"
            );
            return;
        }

        warn!(
            event = events::LINK_LOST,
            component = COMPONENT,
            channel_id = self.channel_id(),
            endpoint = self.endpoint(),
            generation,
            reason = fields::REASON_SIGNAL_CLOSED,
            err = %cause.map(|err| err.to_string()).unwrap_or_else(|| fields::NONE.to_string()),
            "transport closed or errored"
        );

        // The pump is the caller here; dropping its JoinHandle detaches it.
        if let Some(link) = core.link.take() {
            link.handle.close().await;
        }
        self.schedule_retry_or_fail(&mut core);
    }

    fn schedule_retry_or_fail(&self, core: &mut Core) {
        let aborted = self.is_aborted();
        match self.shared.policy.decide(aborted, core.retries_done) {
            RetryDecision::RetryAfter(delay) => {
                core.retries_done += 1;
                self.transition(core, ConnectionState::Reconnecting);
                info!(
                    event = events::RETRY_SCHEDULED,
                    component = COMPONENT,
                    channel_id = self.channel_id(),
                    endpoint = self.endpoint(),
                    retries_done = core.retries_done,
                    delay_ms = self.shared.config.retry_interval_ms,
                    "reconnect scheduled"
                );
                self.spawn_retry_timer(core.generation, delay);
            }
            RetryDecision::GiveUp => {
                let terminal = if aborted {
                    ConnectionState::Aborted
                } else {
                    ConnectionState::Errored
                };
                self.fail(core, terminal);
            }
        }
    }

    fn spawn_retry_timer(&self, generation: u64, delay: Duration) {
        let manager = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            manager.handle_retry_due(generation).await;
        });
    }

    async fn handle_retry_due(&self, generation: u64) {
        let mut core = self.shared.core.lock().await;
        if core.generation != generation || core.state != ConnectionState::Reconnecting {
            trace!(
                event = events::RETRY_TIMER_STALE,
                component = COMPONENT,
                channel_id = self.channel_id(),
                generation,
                "retry timer fired for a superseded reconnect"
            );
            return;
        }
        if self.is_aborted() {
            info!(
                event = events::RETRY_REFUSED_ABORTED,
                component = COMPONENT,
                channel_id = self.channel_id(),
                retries_done = core.retries_done,
                "abort requested; refusing to reconnect"
            );
            self.fail(&mut core, ConnectionState::Aborted);
            return;
        }

        debug!(
            event = events::RETRY_FIRED,
            component = COMPONENT,
            channel_id = self.channel_id(),
            retries_done = core.retries_done,
            "retry delay elapsed"
        );
        self.start_open_attempt(&mut core);
    }

    /// Emits the terminal `error` event; the link is already gone on every path here.
    fn fail(&self, core: &mut Core, terminal: ConnectionState) {
        warn!(
            event = events::RETRY_BUDGET_EXHAUSTED,
            component = COMPONENT,
            channel_id = self.channel_id(),
            endpoint = self.endpoint(),
            retries_done = core.retries_done,
            state = terminal.as_str(),
            "giving up on reconnecting"
        );
        core.generation += 1;
        self.transition(core, terminal);
        self.shared
            .events
            .emit(ChannelEvent::Error(ConnectionError::new(
                self.endpoint(),
                core.retries_done,
            )));
    }

    async fn send_envelope(&self, core: &Core, envelope: ControlEnvelope) {
        let link = match core.link.as_ref() {
            Some(link) if core.state == ConnectionState::Open => link,
            _ => {
                debug!(
                    event = events::ENVELOPE_DEFERRED,
                    component = COMPONENT,
                    channel_id = self.channel_id(),
                    control_event = envelope.event.as_str(),
                    reason = fields::REASON_NOT_OPEN,
                    "not open; scope will be announced on the next open"
                );
                return;
            }
        };

        let payload = match self.shared.codec.encode(&envelope) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(
                    event = events::ENVELOPE_SEND_FAILED,
                    component = COMPONENT,
                    channel_id = self.channel_id(),
                    control_event = envelope.event.as_str(),
                    err = %err,
                    "unable to encode control envelope"
                );
                return;
            }
        };

        // A failed send surfaces as a close signal on the same handle.
        match link.handle.send(payload).await {
            Ok(()) => debug!(
                event = events::ENVELOPE_SEND_OK,
                component = COMPONENT,
                channel_id = self.channel_id(),
                control_event = envelope.event.as_str(),
                bounding_box = %fields::format_bounding_box(envelope.bounding_box.as_ref()),
                filter = %fields::format_filter(envelope.filter.as_ref()),
                "control envelope sent"
            ),
            Err(err) => warn!(
                event = events::ENVELOPE_SEND_FAILED,
                component = COMPONENT,
                channel_id = self.channel_id(),
                control_event = envelope.event.as_str(),
                err = %err,
                "unable to send control envelope"
            ),
        }
    }
}

async fn pump_signals(manager: ConnectionManager, generation: u64, handle: Arc<dyn TransportHandle>) {
    loop {
        match handle.recv().await {
            TransportSignal::Message(payload) => manager.handle_payload(generation, payload).await,
            TransportSignal::Closed(cause) => {
                manager.handle_link_lost(generation, cause).await;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectionManager;
    use crate::config::ChannelConfig;
    use crate::control_plane::connection_state::ConnectionState;
    use crate::data_plane::event_dispatcher::spawn_event_dispatcher;
    use crate::data_plane::listener_registry::ListenerRegistry;
    use crate::error::ChannelError;
    use crate::transport::{TransportConnector, TransportError, TransportHandle};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct RefusingConnector {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl TransportConnector for RefusingConnector {
        async fn open(&self, endpoint: &str) -> Result<Arc<dyn TransportHandle>, TransportError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(TransportError::Unreachable(endpoint.to_string()))
        }
    }

    fn manager(config: ChannelConfig, connector: Arc<RefusingConnector>) -> ConnectionManager {
        let (events, _) =
            spawn_event_dispatcher("unit".to_string(), Arc::new(ListenerRegistry::new()));
        ConnectionManager::new("unit".to_string(), config, connector, events)
    }

    async fn wait_for_state(manager: &ConnectionManager, expected: ConnectionState) {
        let mut states = manager.watch_state();
        tokio::time::timeout(Duration::from_secs(2), states.wait_for(|state| *state == expected))
            .await
            .expect("state should be reached in time")
            .expect("state sender alive");
    }

    #[tokio::test]
    async fn exhausted_budget_ends_in_errored() {
        let connector = Arc::new(RefusingConnector::default());
        let manager = manager(
            ChannelConfig::new("ws://unresolvable", "station")
                .with_max_retries(2)
                .with_retry_interval_ms(10),
            connector.clone(),
        );

        manager.connect().await.expect("connect");
        wait_for_state(&manager, ConnectionState::Errored).await;

        assert_eq!(connector.attempts.load(Ordering::SeqCst), 3);
        assert_eq!(manager.retries_done().await, 2);
        assert!(!manager.is_opened());
    }

    #[tokio::test]
    async fn close_during_reconnect_silences_pending_timer() {
        let connector = Arc::new(RefusingConnector::default());
        let manager = manager(
            ChannelConfig::new("ws://unresolvable", "station").with_retry_interval_ms(50),
            connector.clone(),
        );

        manager.connect().await.expect("connect");
        wait_for_state(&manager, ConnectionState::Reconnecting).await;
        manager.close().await;
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(manager.state(), ConnectionState::Closed);
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn longest_retry_interval_is_scheduled_and_cancellable() {
        let connector = Arc::new(RefusingConnector::default());
        let manager = manager(
            ChannelConfig::new("ws://unresolvable", "station").with_retry_interval_ms(u64::MAX),
            connector.clone(),
        );

        manager.connect().await.expect("connect");
        wait_for_state(&manager, ConnectionState::Reconnecting).await;
        assert_eq!(manager.retries_done().await, 1);

        manager.close().await;
        assert_eq!(manager.state(), ConnectionState::Closed);
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn connect_after_terminal_state_is_rejected() {
        let connector = Arc::new(RefusingConnector::default());
        let manager = manager(
            ChannelConfig::new("ws://unresolvable", "station"),
            connector,
        );

        manager.close().await;

        assert_eq!(
            manager.connect().await,
            Err(ChannelError::Terminated(ConnectionState::Closed))
        );
    }

    #[tokio::test]
    async fn abort_during_delay_ends_in_aborted() {
        let connector = Arc::new(RefusingConnector::default());
        let manager = manager(
            ChannelConfig::new("ws://unresolvable", "station").with_retry_interval_ms(50),
            connector.clone(),
        );

        manager.connect().await.expect("connect");
        wait_for_state(&manager, ConnectionState::Reconnecting).await;
        manager.abort();
        wait_for_state(&manager, ConnectionState::Aborted).await;

        assert_eq!(connector.attempts.load(Ordering::SeqCst), 1);
        assert!(manager.is_aborted());
    }
}
