/// Why an incoming frame was discarded.
///
/// Both variants are per-frame conditions: the session logs them, sends
/// nothing back, and keeps reading.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame is not valid JSON (includes invalid UTF-8 and empty lines).
    #[error("invalid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    /// Valid JSON, but not a usable command (missing `idx` or `state`, wrong types).
    #[error("malformed command: {0}")]
    MalformedCommand(String),
}

impl FrameError {
    /// Short classification string for log fields.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse_failure",
            Self::MalformedCommand(_) => "malformed_command",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_strings() {
        let parse = FrameError::Parse(serde_json::from_str::<serde_json::Value>("{").unwrap_err());
        assert_eq!(parse.error_kind(), "parse_failure");
        assert_eq!(
            FrameError::MalformedCommand("missing field `idx`".into()).error_kind(),
            "malformed_command"
        );
    }

    #[test]
    fn display_includes_detail() {
        let err = FrameError::MalformedCommand("missing field `state`".into());
        assert_eq!(err.to_string(), "malformed command: missing field `state`");
    }
}
