// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # gantry-core
//!
//! Domain types, agent pipelines, collaborator adapters and the HTTP surface
//! of the Gantry gateway. The `cli` crate wires this into a runnable binary.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
