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

//! Caller-facing events and the per-kind observer registry.

use crate::data_plane::codec::ItemBatch;
use crate::error::ConnectionError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Everything a channel reports to its listeners.
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelEvent {
    Opened,
    /// Client-initiated terminal shutdown.
    Closed,
    /// Terminal failure after the retry budget ran out or a retry was aborted.
    Error(ConnectionError),
    NewItems(ItemBatch),
}

impl ChannelEvent {
    pub fn kind(&self) -> ChannelEventKind {
        match self {
            ChannelEvent::Opened => ChannelEventKind::Opened,
            ChannelEvent::Closed => ChannelEventKind::Closed,
            ChannelEvent::Error(_) => ChannelEventKind::Error,
            ChannelEvent::NewItems(_) => ChannelEventKind::NewItems,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ChannelEventKind {
    Opened,
    Closed,
    Error,
    NewItems,
}

impl ChannelEventKind {
    pub const ALL: [ChannelEventKind; 4] = [
        ChannelEventKind::Opened,
        ChannelEventKind::Closed,
        ChannelEventKind::Error,
        ChannelEventKind::NewItems,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelEventKind::Opened => "opened",
            ChannelEventKind::Closed => "closed",
            ChannelEventKind::Error => "error",
            ChannelEventKind::NewItems => "new_items",
        }
    }
}

/// Receives channel events, one call per event, in emission order.
#[async_trait]
pub trait ChannelListener: Send + Sync {
    async fn on_event(&self, event: ChannelEvent);
}

fn same_listener(a: &Arc<dyn ChannelListener>, b: &Arc<dyn ChannelListener>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Listener sets keyed by event kind; a listener is identified by its `Arc` allocation.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    listeners: RwLock<HashMap<ChannelEventKind, Vec<Arc<dyn ChannelListener>>>>,
}

impl ListenerRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the listener was already registered for `kind`.
    pub(crate) async fn register(
        &self,
        kind: ChannelEventKind,
        listener: Arc<dyn ChannelListener>,
    ) -> bool {
        let mut listeners = self.listeners.write().await;
        let registered = listeners.entry(kind).or_default();
        if registered
            .iter()
            .any(|existing| same_listener(existing, &listener))
        {
            return false;
        }
        registered.push(listener);
        true
    }

    /// Returns `false` when the listener was not registered for `kind`.
    pub(crate) async fn unregister(
        &self,
        kind: ChannelEventKind,
        listener: &Arc<dyn ChannelListener>,
    ) -> bool {
        let mut listeners = self.listeners.write().await;
        let Some(registered) = listeners.get_mut(&kind) else {
            return false;
        };
        let before = registered.len();
        registered.retain(|existing| !same_listener(existing, listener));
        before != registered.len()
    }

    pub(crate) async fn listeners_for(
        &self,
        kind: ChannelEventKind,
    ) -> Vec<Arc<dyn ChannelListener>> {
        self.listeners
            .read()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelEvent, ChannelEventKind, ChannelListener, ListenerRegistry};
    use crate::data_plane::codec::ItemBatch;
    use crate::error::ConnectionError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    struct NoopListener;

    #[async_trait]
    impl ChannelListener for NoopListener {
        async fn on_event(&self, _event: ChannelEvent) {}
    }

    #[test]
    fn event_kind_matches_variant() {
        assert_eq!(ChannelEvent::Opened.kind(), ChannelEventKind::Opened);
        assert_eq!(ChannelEvent::Closed.kind(), ChannelEventKind::Closed);
        assert_eq!(
            ChannelEvent::Error(ConnectionError::new("ws://x", 1)).kind(),
            ChannelEventKind::Error
        );
        assert_eq!(
            ChannelEvent::NewItems(ItemBatch::new(json!([]))).kind().as_str(),
            "new_items"
        );
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let registry = ListenerRegistry::new();
        let listener: Arc<dyn ChannelListener> = Arc::new(NoopListener);

        assert!(
            registry
                .register(ChannelEventKind::Opened, listener.clone())
                .await
        );
        assert!(
            !registry
                .register(ChannelEventKind::Opened, listener.clone())
                .await
        );
        assert_eq!(
            registry.listeners_for(ChannelEventKind::Opened).await.len(),
            1
        );
    }

    #[tokio::test]
    async fn registration_is_per_kind() {
        let registry = ListenerRegistry::new();
        let listener: Arc<dyn ChannelListener> = Arc::new(NoopListener);

        registry
            .register(ChannelEventKind::NewItems, listener.clone())
            .await;

        assert!(registry
            .listeners_for(ChannelEventKind::Opened)
            .await
            .is_empty());
        assert_eq!(
            registry
                .listeners_for(ChannelEventKind::NewItems)
                .await
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn unregister_removes_only_that_listener() {
        let registry = ListenerRegistry::new();
        let first: Arc<dyn ChannelListener> = Arc::new(NoopListener);
        let second: Arc<dyn ChannelListener> = Arc::new(NoopListener);

        registry.register(ChannelEventKind::Closed, first.clone()).await;
        registry.register(ChannelEventKind::Closed, second.clone()).await;

        assert!(registry.unregister(ChannelEventKind::Closed, &first).await);
        assert!(!registry.unregister(ChannelEventKind::Closed, &first).await);
        assert!(!registry.unregister(ChannelEventKind::Error, &second).await);

        let remaining = registry.listeners_for(ChannelEventKind::Closed).await;
        assert_eq!(remaining.len(), 1);
        assert!(Arc::ptr_eq(&remaining[0], &second));
    }
}
