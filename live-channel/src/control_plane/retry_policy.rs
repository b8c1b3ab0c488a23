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

//! Reconnect budget decisions.

use crate::config::{ChannelConfig, INFINITE_RETRIES};
use std::time::Duration;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub(crate) fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub(crate) fn from_config(config: &ChannelConfig) -> Self {
        Self::new(config.max_retries, config.retry_interval())
    }

    pub(crate) fn can_retry(&self, aborted: bool, retries_done: u32) -> bool {
        !aborted && (self.max_retries == INFINITE_RETRIES || retries_done < self.max_retries)
    }

    pub(crate) fn decide(&self, aborted: bool, retries_done: u32) -> RetryDecision {
        if self.can_retry(aborted, retries_done) {
            RetryDecision::RetryAfter(self.delay)
        } else {
            RetryDecision::GiveUp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RetryDecision, RetryPolicy};
    use std::time::Duration;

    const DELAY: Duration = Duration::from_millis(50);

    #[test]
    fn bounded_budget_allows_exactly_max_retries() {
        let policy = RetryPolicy::new(2, DELAY);

        assert_eq!(policy.decide(false, 0), RetryDecision::RetryAfter(DELAY));
        assert_eq!(policy.decide(false, 1), RetryDecision::RetryAfter(DELAY));
        assert_eq!(policy.decide(false, 2), RetryDecision::GiveUp);
    }

    #[test]
    fn zero_budget_means_unlimited() {
        let policy = RetryPolicy::new(0, DELAY);

        assert!(policy.can_retry(false, 0));
        assert!(policy.can_retry(false, u32::MAX));
    }

    #[test]
    fn abort_dominates_remaining_budget() {
        assert!(!RetryPolicy::new(0, DELAY).can_retry(true, 0));
        assert_eq!(RetryPolicy::new(5, DELAY).decide(true, 1), RetryDecision::GiveUp);
    }
}
