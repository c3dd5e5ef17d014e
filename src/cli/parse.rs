use zettelflow_core::note::NoteType;

/// Parse note type from string
pub fn parse_note_type(s: &str) -> std::result::Result<NoteType, String> {
    s.parse::<NoteType>().map_err(|e| e.to_string())
}

/// Parse a quality threshold in [0.0, 1.0]
pub fn parse_threshold(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("{} is outside 0.0..=1.0", value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold_bounds() {
        assert_eq!(parse_threshold("0"), Ok(0.0));
        assert_eq!(parse_threshold("1.0"), Ok(1.0));
        assert_eq!(parse_threshold(" 0.7 "), Ok(0.7));
        assert!(parse_threshold("1.01").is_err());
        assert!(parse_threshold("-0.1").is_err());
        assert!(parse_threshold("high").is_err());
    }

    #[test]
    fn test_parse_note_type_is_case_sensitive() {
        assert_eq!(parse_note_type("permanent"), Ok(NoteType::Permanent));
        assert!(parse_note_type("Permanent").is_err());
    }
}
