// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Best-effort structured-data extraction from free-text LLM output.
//!
//! Models rarely return bare JSON: the object arrives fenced, wrapped in
//! prose, or not at all. Every pipeline that must tolerate that goes through
//! [`parse_or_else`] so the tolerance policy lives in one place. A failed
//! parse is ordinary input here, never an error.

use serde::de::DeserializeOwned;

/// Deserialize `T` from `text`, handing the raw text to `fallback` when no
/// parseable JSON object can be located. The fallback receives the full
/// original text so heuristics can run over it.
pub fn parse_or_else<T, F>(text: &str, fallback: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce(&str) -> T,
{
    match try_parse(text) {
        Some(value) => value,
        None => fallback(text),
    }
}

/// Deserialize `T` from `text` if a parseable JSON object can be located.
pub fn try_parse<T: DeserializeOwned>(text: &str) -> Option<T> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<T>(trimmed) {
        return Some(value);
    }
    let payload = json_payload(trimmed)?;
    serde_json::from_str::<T>(payload).ok()
}

/// Slice out the outermost JSON object: first `{` through last `}`. Handles
/// code fences and surrounding prose without parsing either.
pub fn json_payload(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
