// Copyright 2026 Image Elements Contributors
// SPDX-License-Identifier: Apache-2.0

//! Image element gathering for page audits.
//!
//! Indexes the successful network responses of a page load by URL and
//! enriches captured image elements with CSS sizing read over the DevTools
//! protocol, within a wall-clock budget.

pub mod clock;
pub mod config;
pub mod eligibility;
pub mod enrich;
pub mod error;
pub mod gather;
pub mod network;
pub mod protocol;
pub mod types;

pub use clock::{Clock, Deadline, ManualClock, SystemClock};
pub use config::GatherConfig;
pub use eligibility::{classify, Enrichment, EnrichmentPlan};
pub use enrich::{attribute_mime_types, enrich, EnrichReport, FetchOutcome};
pub use error::{GatherError, GatherResult};
pub use gather::{DomSnapshot, GatheredImages, ImageElementsGatherer};
pub use network::{index_responses, NetworkResponseRecord, ResponseIndex, SuccessStatus};
pub use protocol::{ProtocolError, ProtocolSession};
pub use types::{CssSizing, ElementNode, ImageElement, NaturalSize};

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("image_elements=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
