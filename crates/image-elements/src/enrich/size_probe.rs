//! Intrinsic size probe for CSS-sized images.

use super::FetchOutcome;
use crate::error::GatherError;
use crate::protocol::ProtocolSession;
use crate::types::{ImageElement, NaturalSize};

/// Ask the page for the natural dimensions of `element`'s image.
///
/// Images that fail to load are reported as skipped. Transport failures are
/// returned as errors.
pub async fn fetch_natural_size(
    session: &dyn ProtocolSession,
    element: &ImageElement,
) -> Result<FetchOutcome<NaturalSize>, GatherError> {
    if element.src.is_empty() {
        return Ok(FetchOutcome::Skipped {
            reason: "element has no src".to_string(),
        });
    }

    match session.natural_size(&element.src).await {
        Ok(size) => Ok(FetchOutcome::Fetched(size)),
        Err(e) if e.is_fatal() => Err(GatherError::Transport(e.to_string())),
        Err(e) => Ok(FetchOutcome::Skipped {
            reason: e.to_string(),
        }),
    }
}
