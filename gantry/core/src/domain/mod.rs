// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer (`gantry-core`)
//!
//! Pure types and collaborator interfaces: request/record schemas, the risk
//! and framework tables, fallback parsing, configuration, and the traits the
//! infrastructure adapters implement. No I/O here beyond config file loading.

pub mod config;
pub mod devops;
pub mod error;
pub mod extract;
pub mod frameworks;
pub mod llm;
pub mod record;
pub mod request;
pub mod risk;
pub mod sampling;
