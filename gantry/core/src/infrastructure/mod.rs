// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod access_gate;
pub mod devops;
pub mod llm;
pub mod sampling;

pub use access_gate::{AccessGate, GateError, Identity};
pub use sampling::ThreadRngSource;
