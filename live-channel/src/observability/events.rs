//! Canonical structured event names used across `live-channel`.

// Connection lifecycle events.
pub const CONNECT_START: &str = "connect_start";
pub const CONNECT_IGNORED_ACTIVE: &str = "connect_ignored_active";
pub const CONNECT_REJECTED_TERMINAL: &str = "connect_rejected_terminal";
pub const OPEN_ATTEMPT: &str = "open_attempt";
pub const OPEN_OK: &str = "open_ok";
pub const OPEN_FAILED: &str = "open_failed";
pub const OPEN_SUPERSEDED: &str = "open_superseded";
pub const LINK_LOST: &str = "link_lost";
pub const LINK_SIGNAL_STALE: &str = "link_signal_stale";
pub const CLOSE_REQUESTED: &str = "close_requested";
pub const CHANNEL_DROPPED: &str = "channel_dropped";
pub const ABORT_REQUESTED: &str = "abort_requested";

// Retry events.
pub const RETRY_SCHEDULED: &str = "retry_scheduled";
pub const RETRY_FIRED: &str = "retry_fired";
pub const RETRY_TIMER_STALE: &str = "retry_timer_stale";
pub const RETRY_REFUSED_ABORTED: &str = "retry_refused_aborted";
pub const RETRY_BUDGET_EXHAUSTED: &str = "retry_budget_exhausted";

// Session and data events.
pub const SCOPE_REPLAY: &str = "scope_replay";
pub const ENVELOPE_SEND_OK: &str = "envelope_send_ok";
pub const ENVELOPE_SEND_FAILED: &str = "envelope_send_failed";
pub const ENVELOPE_DEFERRED: &str = "envelope_deferred";
pub const BOUNDING_BOX_ALREADY_SET: &str = "bounding_box_already_set";
pub const ITEMS_RECEIVED: &str = "items_received";
pub const ITEMS_DROPPED_NOT_LISTENING: &str = "items_dropped_not_listening";
pub const ITEMS_DECODE_FAILED: &str = "items_decode_failed";

// Listener registry events.
pub const LISTENER_REGISTERED: &str = "listener_registered";
pub const LISTENER_UNREGISTERED: &str = "listener_unregistered";
pub const DISPATCHER_STOPPED: &str = "dispatcher_stopped";

// Transport-level events.
pub const TRANSPORT_OPEN_OK: &str = "transport_open_ok";
pub const TRANSPORT_CLOSED_BY_PEER: &str = "transport_closed_by_peer";
pub const TRANSPORT_CLOSE_FAILED: &str = "transport_close_failed";
pub const TRANSPORT_DROP_NON_UTF8: &str = "transport_drop_non_utf8";
