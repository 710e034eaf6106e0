//! Pass-level errors.

use crate::types::ImageElement;

/// Errors that abort a whole gather pass.
///
/// Per-element lookup failures never surface here; they are absorbed by the
/// fetchers and show up only as unenriched elements.
#[derive(thiserror::Error, Debug)]
pub enum GatherError {
    #[error("Protocol transport failed: {0}")]
    Transport(String),

    #[error("DOM snapshot failed: {0}")]
    Snapshot(String),

    #[error("Network log unavailable: {0}")]
    NetworkLog(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The pass stopped after the snapshot was taken. `elements` holds every
    /// element in pass order with whatever enrichment was merged before
    /// `source` occurred.
    #[error("Gather pass interrupted: {source}")]
    Interrupted {
        source: Box<GatherError>,
        elements: Vec<ImageElement>,
    },
}

impl GatherError {
    /// The error that stopped the pass, looking through `Interrupted`.
    pub fn cause(&self) -> &GatherError {
        match self {
            GatherError::Interrupted { source, .. } => source.as_ref(),
            other => other,
        }
    }

    /// Elements enriched before the pass stopped, if a snapshot was taken.
    pub fn partial_elements(&self) -> Option<&[ImageElement]> {
        match self {
            GatherError::Interrupted { elements, .. } => Some(elements.as_slice()),
            _ => None,
        }
    }

    pub fn into_partial_elements(self) -> Option<Vec<ImageElement>> {
        match self {
            GatherError::Interrupted { elements, .. } => Some(elements),
            _ => None,
        }
    }
}

/// Convenience result type.
pub type GatherResult<T> = Result<T, GatherError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementNode;
    use std::error::Error;

    #[test]
    fn test_interrupted_keeps_cause_and_elements() {
        let err = GatherError::Interrupted {
            source: Box::new(GatherError::Transport("websocket closed".into())),
            elements: vec![ImageElement::new("a.png", ElementNode::default())],
        };

        assert!(matches!(err.cause(), GatherError::Transport(_)));
        assert!(err.source().is_some());
        assert_eq!(
            err.to_string(),
            "Gather pass interrupted: Protocol transport failed: websocket closed"
        );
        assert_eq!(err.partial_elements().map(<[_]>::len), Some(1));
        assert_eq!(err.into_partial_elements().unwrap()[0].src, "a.png");
    }

    #[test]
    fn test_early_errors_have_no_elements() {
        let err = GatherError::Config("empty success status range".into());
        assert!(err.partial_elements().is_none());
        assert!(matches!(err.cause(), GatherError::Config(_)));
    }
}
