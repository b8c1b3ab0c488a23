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

//! Canonical structured field keys and value-format helpers.

use crate::session::bounding_box::BoundingBox;
use serde_json::Value;

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const CHANNEL_ID: &str = "channel_id";
pub const ENDPOINT: &str = "endpoint";
pub const STATE: &str = "state";
pub const GENERATION: &str = "generation";
pub const RETRIES_DONE: &str = "retries_done";
pub const DELAY_MS: &str = "delay_ms";
pub const CONTROL_EVENT: &str = "control_event";
pub const ITEM_COUNT: &str = "item_count";
pub const EVENT_KIND: &str = "event_kind";
pub const REASON: &str = "reason";
pub const ERR: &str = "err";

pub const NONE: &str = "none";
pub const REASON_NOT_OPEN: &str = "not_open";
pub const REASON_SUPERSEDED: &str = "superseded";
pub const REASON_OPEN_FAILED: &str = "open_failed";
pub const REASON_SIGNAL_CLOSED: &str = "signal_closed";

pub fn format_bounding_box(bounding_box: Option<&BoundingBox>) -> String {
    bounding_box
        .map(|bbox| {
            let [west, south, east, north] = bbox.to_array();
            format!("[{west},{south},{east},{north}]")
        })
        .unwrap_or_else(|| NONE.to_string())
}

pub fn format_filter(filter: Option<&Value>) -> String {
    filter
        .map(Value::to_string)
        .unwrap_or_else(|| NONE.to_string())
}

#[cfg(test)]
mod tests {
    use super::{format_bounding_box, format_filter, NONE};
    use crate::session::bounding_box::BoundingBox;
    use serde_json::json;

    #[test]
    fn format_bounding_box_is_compact() {
        let bbox = BoundingBox::try_from_bounds(&[3.78, 43.55, 4.04, 43.65]).expect("bounds");

        assert_eq!(format_bounding_box(Some(&bbox)), "[3.78,43.55,4.04,43.65]");
        assert_eq!(format_bounding_box(None), NONE);
    }

    #[test]
    fn format_filter_falls_back_when_absent() {
        assert_eq!(
            format_filter(Some(&json!({ "linked_item": 48 }))),
            r#"{"linked_item":48}"#
        );
        assert_eq!(format_filter(None), NONE);
    }
}
