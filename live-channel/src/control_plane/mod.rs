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

//! Control-plane layer.
//!
//! Owns the connection lifecycle: the state machine, the retry budget, and the
//! generation bookkeeping that keeps superseded handles and timers inert.

pub(crate) mod connection_manager;
pub(crate) mod connection_state;
pub(crate) mod retry_policy;
