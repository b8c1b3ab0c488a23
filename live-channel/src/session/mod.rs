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

//! Session layer.
//!
//! Owns the channel scope (bounding box, filter, listening mode) and decides which
//! control envelope re-establishes it after every successful open.

pub(crate) mod bounding_box;
pub(crate) mod subscription_session;
