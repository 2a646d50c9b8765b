// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Keyword risk classification over analysis text.
//!
//! The scans are deliberately crude substring checks biased toward caution:
//! a false positive costs a reviewer a second look, a false negative ships a
//! risky change. Any replacement must keep that bias.

use serde::{Deserialize, Serialize};

/// Risk tier attached to decision records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall review verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Approved,
    ChangesRequested,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Approved => "approved",
            ReviewStatus::ChangesRequested => "changes_requested",
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keywords that escalate a review to high risk.
const REVIEW_RISK_KEYWORDS: [&str; 5] =
    ["security", "vulnerability", "critical", "dangerous", "unsafe"];

/// Classify a review analysis: any case-insensitive occurrence of a risk
/// keyword yields high risk and a changes-requested verdict.
pub fn classify_review(analysis: &str) -> (RiskLevel, ReviewStatus) {
    let lowered = analysis.to_lowercase();
    let risky = REVIEW_RISK_KEYWORDS.iter().any(|kw| lowered.contains(kw));
    if risky {
        (RiskLevel::High, ReviewStatus::ChangesRequested)
    } else {
        (RiskLevel::Low, ReviewStatus::Approved)
    }
}

/// Grade free-text severity wording, used when a scan response carries no
/// parseable structure.
pub fn classify_severity_text(text: &str) -> RiskLevel {
    let lowered = text.to_lowercase();
    if lowered.contains("critical") || lowered.contains("high risk") {
        RiskLevel::High
    } else if lowered.contains("medium") || lowered.contains("moderate") {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
