use crate::types::{ContentKind, Feeling};
use thiserror::Error;

/// Domain errors. I/O layers wrap these (and their own failures) in
/// `anyhow::Error` with context.
#[derive(Debug, Error)]
pub enum CalmaError {
    #[error("severity {0} out of range, expected 1..=10")]
    SeverityOutOfRange(u8),

    #[error("unknown feeling '{0}'")]
    UnknownFeeling(String),

    #[error("content catalog has no {kind:?} entry for {feeling:?}")]
    EmptyCatalog { feeling: Feeling, kind: ContentKind },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = CalmaError::SeverityOutOfRange(11);
        assert!(e.to_string().contains("11"));

        let e = CalmaError::UnknownFeeling("bored".into());
        assert!(e.to_string().contains("bored"));

        let e = CalmaError::EmptyCatalog {
            feeling: Feeling::Stress,
            kind: ContentKind::Music,
        };
        assert!(e.to_string().contains("Stress"));
        assert!(e.to_string().contains("Music"));
    }
}
