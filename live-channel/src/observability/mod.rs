//! Observability primitives shared by the crate's modules.
//!
//! Every log line carries an `event` name from [`events`] and a `component` label,
//! plus context fields keyed by the names in [`fields`].

pub mod events;
pub mod fields;
