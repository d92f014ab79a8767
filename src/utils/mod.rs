/// Fold a caption-track language code down to its base language.
///
/// Regional English variants must compare equal to plain English before the
/// translate-if-non-English rule is applied, so "en-US" and "en-GB" both fold
/// to "en".
pub fn fold_language_code(code: &str) -> String {
    let lower = code.to_lowercase();
    match lower.as_str() {
        "en-us" | "en-gb" | "en-au" | "en-ca" | "en-in" => "en".to_string(),
        _ => lower,
    }
}

/// Check whether a caption-track language code denotes English
pub fn is_english(code: &str) -> bool {
    fold_language_code(code) == "en"
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Check if a command is available in PATH
pub async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
