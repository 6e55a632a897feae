//! Readable, multi-line rendering of an issue list.
//!
//! ```text
//! Validation error: 2 issues
//!   - name: Required
//!   - display.type: Invalid discriminator value. Expected 'text' | ..., received 'textblabla'
//! ```

use crate::config::ReportConfig;
use crate::issue::{Issue, IssueCode};

/// Render `issues` for direct display to a column author.
pub fn render(issues: &[Issue], config: &ReportConfig) -> String {
    let shown: Vec<&Issue> = issues
        .iter()
        .filter(|issue| {
            config.include_variant_summaries
                || !matches!(issue.code, IssueCode::VariantShapeMismatch { .. })
        })
        .collect();

    let noun = if shown.len() == 1 { "issue" } else { "issues" };
    let mut out = format!("{}: {} {}", config.prefix, shown.len(), noun);

    let limit = config.max_issues.unwrap_or(usize::MAX);
    for issue in shown.iter().take(limit) {
        out.push_str("\n  - ");
        out.push_str(&issue.to_string());
    }
    if shown.len() > limit {
        out.push_str(&format!("\n  … and {} more", shown.len() - limit));
    }
    out
}
