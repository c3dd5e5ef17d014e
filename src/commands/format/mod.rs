//! Shared output helpers for commands

pub use crate::output_by_format_result;

use serde::Serialize;
use zettelflow_core::error::Result;

/// Print any serializable result as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a JSON status message with extra fields
///
/// ```ignore
/// print_json_status("ok", Some("Vault initialized"), &[("vault", json!(path))])?;
/// ```
pub fn print_json_status(
    status: &str,
    message: Option<&str>,
    extra_fields: &[(&str, serde_json::Value)],
) -> Result<()> {
    let mut output = serde_json::Map::new();
    output.insert("status".to_string(), status.into());
    if let Some(msg) = message {
        output.insert("message".to_string(), msg.into());
    }
    for (key, value) in extra_fields {
        output.insert(key.to_string(), value.clone());
    }
    print_json(&output)
}

/// Format a score for human output
pub fn score(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_formatting() {
        assert_eq!(score(Some(0.7)), "0.70");
        assert_eq!(score(Some(0.856)), "0.86");
        assert_eq!(score(None), "-");
    }
}
