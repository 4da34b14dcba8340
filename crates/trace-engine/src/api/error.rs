use std::fmt::{self, Display};

/// Errors surfaced by the tracing engine.
///
/// None of these are fatal: callers log them and fall back to
/// "tracing feedback unavailable" while drawing keeps working.
#[derive(Debug)]
pub enum TraceError {
    /// Font bytes could not be parsed.
    FontLoad(String),
    /// Guide and stroke masks differ in size or device scale.
    MaskMismatch {
        guide: (u32, u32, f32),
        stroke: (u32, u32, f32),
    },
    /// Configuration JSON was malformed.
    Config(serde_json::Error),
}

impl Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::FontLoad(s) => write!(f, "font load error: {s}"),
            TraceError::MaskMismatch { guide, stroke } => write!(
                f,
                "mask mismatch: guide {}x{}@{} vs stroke {}x{}@{}",
                guide.0, guide.1, guide.2, stroke.0, stroke.1, stroke.2
            ),
            TraceError::Config(e) => write!(f, "config error: {e}"),
        }
    }
}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TraceError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TraceError {
    fn from(e: serde_json::Error) -> Self {
        TraceError::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_both_shapes() {
        let err = TraceError::MaskMismatch {
            guide: (10, 20, 1.0),
            stroke: (20, 40, 2.0),
        };
        let text = err.to_string();
        assert!(text.contains("10x20"));
        assert!(text.contains("20x40"));
    }

    #[test]
    fn config_error_has_source() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: TraceError = json_err.into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
