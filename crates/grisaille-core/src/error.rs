use thiserror::Error;

/// Failure of a staged pipeline run.
///
/// Only the first failure is reported. The run never yields a partial image.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("stage `{stage}` failed")]
    StageFailed {
        stage: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("stage `{stage}` closed its hand-off without producing an image")]
    HandoffClosed { stage: String },

    #[error("stage `{stage}` changed dimensions from {expected:?} to {actual:?}")]
    DimensionsChanged {
        stage: String,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("failed to spawn worker for stage `{stage}`")]
    Spawn {
        stage: String,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Name of the stage that produced the failure.
    pub fn stage(&self) -> &str {
        match self {
            Self::StageFailed { stage, .. }
            | Self::HandoffClosed { stage }
            | Self::DimensionsChanged { stage, .. }
            | Self::Spawn { stage, .. } => stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_stage() {
        let err = PipelineError::HandoffClosed {
            stage: "blur".into(),
        };
        assert_eq!(
            err.to_string(),
            "stage `blur` closed its hand-off without producing an image"
        );
        assert_eq!(err.stage(), "blur");
    }

    #[test]
    fn stage_failure_keeps_source() {
        let err = PipelineError::StageFailed {
            stage: "grayscale".into(),
            source: anyhow::anyhow!("bad input"),
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("bad input"));
    }

    #[test]
    fn dimension_change_reports_both_sizes() {
        let err = PipelineError::DimensionsChanged {
            stage: "crop".into(),
            expected: (4, 4),
            actual: (2, 2),
        };
        let msg = err.to_string();
        assert!(msg.contains("(4, 4)"));
        assert!(msg.contains("(2, 2)"));
    }
}
