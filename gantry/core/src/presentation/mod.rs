// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`gantry-core`)
//!
//! HTTP surface that translates external requests into pipeline calls.
//! **No business logic lives here** — all real work is delegated to the
//! pipelines in `crate::application`.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP (Axum) | Gated agent endpoints plus the ungated liveness probe |

pub mod api;

pub use api::{app, AppState};
