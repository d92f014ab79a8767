use anyhow::Result;
use serde_json::json;
use std::path::Path;

use crate::acquire::{SourceGrade, Transcript};
use crate::cli::OutputFormat;
use crate::summarize::SummaryResult;

/// Render a summary with its transcript provenance
pub fn format_summary(
    result: &SummaryResult,
    transcript: &Transcript,
    format: &OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_as_text(result)),
        OutputFormat::Json => format_as_json(result, transcript),
    }
}

fn format_as_text(result: &SummaryResult) -> String {
    match result {
        SummaryResult::Single(summary) => summary.clone(),
        SummaryResult::Pair(fast, news) => {
            format!(
                "Fast model summary:\n{}\n\nNews model summary:\n{}",
                fast, news
            )
        }
    }
}

fn format_as_json(result: &SummaryResult, transcript: &Transcript) -> Result<String> {
    let mut summaries = serde_json::Map::new();
    for (label, text) in result.parts() {
        summaries.insert(label.to_string(), json!(text));
    }

    let grade = match transcript.source_grade {
        SourceGrade::Caption => "caption",
        SourceGrade::Speech => "speech",
    };

    let value = json!({
        "source_grade": grade,
        "language": transcript.language_code,
        "summaries": summaries,
    });

    Ok(serde_json::to_string_pretty(&value)?)
}

/// Save a rendered summary to file
pub fn save_to_file(content: &str, path: &Path) -> Result<()> {
    fs_err::write(path, content)?;
    Ok(())
}
