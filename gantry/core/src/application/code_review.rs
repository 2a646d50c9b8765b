// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Code Review Pipeline
//!
//! Application service for automated pull-request review.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Orchestrate diff retrieval, analysis, risk
//!   classification and the posted decision
//! - **Collaborators:**
//!   - Domain: risk classifier, request/record schemas
//!   - Infrastructure: LlmAnalyst, DevOpsProvider

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::devops::{DevOpsProvider, DiffSource};
use crate::domain::error::{PipelineError, ValidationError};
use crate::domain::llm::{AnalysisOptions, LlmAnalyst};
use crate::domain::record::CodeReviewRecord;
use crate::domain::request::CodeReviewRequest;
use crate::domain::risk::{classify_review, ReviewStatus, RiskLevel};

/// Used in place of extracted suggestions whenever the extraction call fails
/// or yields nothing.
const GENERIC_SUGGESTION: &str =
    "Review the analysis and address the findings before merging.";

const MAX_SUGGESTIONS: usize = 5;

pub struct CodeReviewPipeline {
    analyst: Arc<dyn LlmAnalyst>,
    devops: Arc<dyn DevOpsProvider>,
}

impl CodeReviewPipeline {
    pub fn new(analyst: Arc<dyn LlmAnalyst>, devops: Arc<dyn DevOpsProvider>) -> Self {
        Self { analyst, devops }
    }

    /// Run the review stages in order. Every stage failure aborts the run
    /// except suggestion extraction, which degrades to a generic line.
    pub async fn run(&self, request: CodeReviewRequest) -> Result<CodeReviewRecord, PipelineError> {
        // Step 1: Request shape
        request.validate()?;
        let repository = request.repository.clone().unwrap_or_default();
        let pr_number = request.pr_number.unwrap_or_default();

        info!(repository, pr_number, depth = %request.depth, "Starting code review");

        // Step 2: Diff retrieval; an empty diff is a caller problem, not an
        // empty success
        let source = DiffSource {
            diff_url: request.diff_url.clone(),
            base_sha: request.base_sha.clone(),
            head_sha: request.head_sha.clone(),
        };
        let diff = self.devops.fetch_diff(&repository, pr_number, &source).await?;
        if diff.trim().is_empty() {
            return Err(ValidationError::invalid_field(
                "diff",
                format!("pull request #{pr_number} has an empty diff; nothing to review"),
                &CodeReviewRequest::REQUIRED,
            )
            .into());
        }

        // Step 3: Analysis
        let options = AnalysisOptions::with_model(request.model.clone());
        let analysis = self.analyst.analyze(&diff, request.depth, &options).await?;

        // Step 4: Risk classification over the analysis text
        let (risk_level, status) = classify_review(&analysis.text);

        // Step 5: Suggestion extraction, the only soft-fail stage
        let suggestions = match self
            .analyst
            .generate(&suggestions_prompt(&analysis.text), &options)
            .await
        {
            Ok(result) => {
                let lines = suggestion_lines(&result.text);
                if lines.is_empty() {
                    vec![GENERIC_SUGGESTION.to_string()]
                } else {
                    lines
                }
            }
            Err(err) => {
                warn!(error = %err, "Suggestion extraction failed; using the generic line");
                vec![GENERIC_SUGGESTION.to_string()]
            }
        };

        // Step 6: Post the decision back to the pull request (not retried)
        let comment = review_comment(status, risk_level, &analysis.text, &suggestions);
        self.devops
            .post_review_comment(&repository, pr_number, &comment)
            .await?;

        info!(repository, pr_number, status = status.as_str(), "Code review complete");

        // Step 7: Decision record
        Ok(CodeReviewRecord {
            status,
            analysis: analysis.text,
            risk_level,
            suggestions,
            model: analysis.model,
            provider: analysis.provider,
            timestamp: Utc::now(),
        })
    }
}

fn suggestions_prompt(analysis: &str) -> String {
    format!(
        "Extract three to five actionable suggestions from the following code \
         review analysis. Return one suggestion per line, no preamble.\n\n{analysis}"
    )
}

/// Non-empty trimmed lines, list markers removed, capped at five.
fn suggestion_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return rest.trim_start();
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest.trim_start();
        }
    }
    line
}

fn review_comment(
    status: ReviewStatus,
    risk_level: RiskLevel,
    analysis: &str,
    suggestions: &[String],
) -> String {
    let mut comment = format!(
        "## Automated Code Review\n\n**Status:** {}\n**Risk:** {}\n\n{}\n\n### Suggestions\n",
        status.as_str(),
        risk_level.as_str(),
        analysis
    );
    for suggestion in suggestions {
        comment.push_str("- ");
        comment.push_str(suggestion);
        comment.push('\n');
    }
    comment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::{FakeAnalyst, FakeDevOps};

    fn request() -> CodeReviewRequest {
        CodeReviewRequest {
            repository: Some("acme/widget".into()),
            pr_number: Some(7),
            ..Default::default()
        }
    }

    fn pipeline(analyst: FakeAnalyst, devops: FakeDevOps) -> (CodeReviewPipeline, Arc<FakeDevOps>) {
        let devops = Arc::new(devops);
        (
            CodeReviewPipeline::new(Arc::new(analyst), devops.clone()),
            devops,
        )
    }

    #[tokio::test]
    async fn test_clean_analysis_approves() {
        let analyst = FakeAnalyst {
            analysis: Some("Well factored change with tests.".into()),
            generation: Some("- Add a changelog entry\n- Rename the helper".into()),
            ..Default::default()
        };
        let devops = FakeDevOps {
            diff: Some("diff --git a/x b/x\n+line\n".into()),
            ..Default::default()
        };
        let (pipeline, devops) = pipeline(analyst, devops);

        let record = pipeline.run(request()).await.unwrap();

        assert_eq!(record.status, ReviewStatus::Approved);
        assert_eq!(record.risk_level, RiskLevel::Low);
        assert_eq!(record.suggestions, vec!["Add a changelog entry", "Rename the helper"]);
        assert_eq!(devops.comments.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_risky_analysis_requests_changes() {
        let analyst = FakeAnalyst {
            analysis: Some("This introduces unsafe deserialization of user input.".into()),
            generation: Some("Validate input before deserializing".into()),
            ..Default::default()
        };
        let devops = FakeDevOps {
            diff: Some("+serde_pickle::from_slice(body)".into()),
            ..Default::default()
        };
        let (pipeline, _) = pipeline(analyst, devops);

        let record = pipeline.run(request()).await.unwrap();

        assert_eq!(record.status, ReviewStatus::ChangesRequested);
        assert_eq!(record.risk_level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_missing_fields_fail_validation() {
        let (pipeline, _) = pipeline(FakeAnalyst::default(), FakeDevOps::default());
        let err = pipeline.run(CodeReviewRequest::default()).await.unwrap_err();

        match err {
            PipelineError::Validation(v) => {
                assert_eq!(v.missing, vec!["repository", "pr_number"]);
                assert_eq!(v.required, vec!["repository", "pr_number"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_whitespace_diff_is_a_validation_failure() {
        let devops = FakeDevOps {
            diff: Some("   \n\t\n".into()),
            ..Default::default()
        };
        let (pipeline, _) = pipeline(FakeAnalyst::default(), devops);

        let err = pipeline.run(request()).await.unwrap_err();
        match err {
            PipelineError::Validation(v) => assert_eq!(v.missing, vec!["diff"]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_suggestion_failure_degrades_to_generic_line() {
        let analyst = FakeAnalyst {
            analysis: Some("Fine.".into()),
            generation: None, // scripted failure
            ..Default::default()
        };
        let devops = FakeDevOps {
            diff: Some("+line".into()),
            ..Default::default()
        };
        let (pipeline, _) = pipeline(analyst, devops);

        let record = pipeline.run(request()).await.unwrap();
        assert_eq!(record.suggestions, vec![GENERIC_SUGGESTION]);
    }

    #[tokio::test]
    async fn test_suggestions_capped_at_five() {
        let analyst = FakeAnalyst {
            analysis: Some("Fine.".into()),
            generation: Some("1. a\n2. b\n3. c\n4. d\n5. e\n6. f\n7. g".into()),
            ..Default::default()
        };
        let devops = FakeDevOps {
            diff: Some("+line".into()),
            ..Default::default()
        };
        let (pipeline, _) = pipeline(analyst, devops);

        let record = pipeline.run(request()).await.unwrap();
        assert_eq!(record.suggestions.len(), 5);
        assert_eq!(record.suggestions[0], "a");
    }

    #[tokio::test]
    async fn test_missing_pull_request_maps_upstream() {
        let (pipeline, _) = pipeline(FakeAnalyst::default(), FakeDevOps::default());

        let err = pipeline.run(request()).await.unwrap_err();
        assert!(matches!(err, PipelineError::UpstreamNotFound(_)));
    }

    #[tokio::test]
    async fn test_comment_failure_aborts() {
        let analyst = FakeAnalyst {
            analysis: Some("Fine.".into()),
            generation: Some("Tighten the loop".into()),
            ..Default::default()
        };
        let devops = FakeDevOps {
            diff: Some("+line".into()),
            fail_comment: true,
            ..Default::default()
        };
        let (pipeline, _) = pipeline(analyst, devops);

        let err = pipeline.run(request()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_model_override_reaches_the_record() {
        let analyst = FakeAnalyst {
            analysis: Some("Fine.".into()),
            generation: Some("A suggestion".into()),
            ..Default::default()
        };
        let devops = FakeDevOps {
            diff: Some("+line".into()),
            ..Default::default()
        };
        let (pipeline, _) = pipeline(analyst, devops);

        let mut req = request();
        req.model = Some("gpt-4o".into());
        let record = pipeline.run(req).await.unwrap();
        assert_eq!(record.model, "gpt-4o");
    }

    #[test]
    fn test_list_markers_are_stripped() {
        let lines = suggestion_lines("- first\n* second\n3. third\n4) fourth\n\nplain");
        assert_eq!(lines, vec!["first", "second", "third", "fourth", "plain"]);
    }
}
