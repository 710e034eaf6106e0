//! Time-budgeted enrichment of image elements.
//!
//! Elements are visited one at a time in input order. Stylesheet sizing
//! lookups are gated by a [`Deadline`]: the deadline is checked before each
//! lookup starts, so a single slow lookup may overrun it, after which every
//! remaining lookup is skipped. Size probes are not gated.
//!
//! Per-element failures are absorbed and leave that element unenriched;
//! a transport failure aborts the pass.

pub mod size_probe;
pub mod source_rules;

pub use size_probe::fetch_natural_size;
pub use source_rules::{effective_sizing, effective_sizing_rule, fetch_source_rules};

use crate::clock::Deadline;
use crate::eligibility::{classify, Enrichment};
use crate::error::GatherError;
use crate::network::ResponseIndex;
use crate::protocol::ProtocolSession;
use crate::types::ImageElement;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Result of one per-element lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Fetched(T),
    /// The lookup produced nothing usable for this element.
    Skipped { reason: String },
}

/// Counters for one enrichment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichReport {
    pub elements: usize,
    /// Lookups that produced a sizing; isolated failures are not included.
    pub source_rules_fetched: usize,
    pub source_rules_over_budget: usize,
    pub size_probes: usize,
    pub isolated_failures: usize,
    pub mime_types_attributed: usize,
}

/// Copy the MIME type of the indexed response for each element's `src`.
///
/// Returns how many elements had a response.
pub fn attribute_mime_types(elements: &mut [ImageElement], index: &ResponseIndex) -> usize {
    let mut attributed = 0;
    for element in elements.iter_mut() {
        if let Some(record) = index.get(&element.src) {
            element.mime_type = Some(record.mime_type.clone());
            attributed += 1;
        }
    }
    attributed
}

/// Enrich `elements` in place.
///
/// Every element whose `src` was delivered by an indexed response first gets
/// that response's MIME type. Eligible elements then receive CSS sizing from
/// their matched rules (while `deadline` holds) and intrinsic size from a
/// probe. On a transport error the elements keep everything merged so far.
pub async fn enrich(
    session: &dyn ProtocolSession,
    elements: &mut [ImageElement],
    index: &ResponseIndex,
    deadline: &Deadline,
) -> Result<EnrichReport, GatherError> {
    let mut report = EnrichReport {
        elements: elements.len(),
        mime_types_attributed: attribute_mime_types(elements, index),
        ..Default::default()
    };

    for (i, element) in elements.iter_mut().enumerate() {
        let plan = classify(element);

        if plan.contains(Enrichment::SourceRules) {
            if deadline.is_exceeded() {
                if report.source_rules_over_budget == 0 {
                    warn!(
                        "source rule budget of {}ms exhausted after {}ms",
                        deadline.budget().as_millis(),
                        deadline.elapsed().as_millis()
                    );
                }
                report.source_rules_over_budget += 1;
            } else {
                match fetch_source_rules(session, element).await? {
                    FetchOutcome::Fetched(sizing) => {
                        element.apply_css_sizing(sizing);
                        report.source_rules_fetched += 1;
                    }
                    FetchOutcome::Skipped { reason } => {
                        debug!("element {i}: no source rules ({reason})");
                        report.isolated_failures += 1;
                    }
                }
            }
        }

        if plan.contains(Enrichment::SizeProbe) {
            report.size_probes += 1;
            match fetch_natural_size(session, element).await? {
                FetchOutcome::Fetched(size) => element.apply_natural_size(size),
                FetchOutcome::Skipped { reason } => {
                    debug!("element {i}: no natural size ({reason})");
                    report.isolated_failures += 1;
                }
            }
        }
    }

    info!(
        "enriched {} image elements: {} with rule sizing, {} over budget, {} size probes, {} isolated failures",
        report.elements,
        report.source_rules_fetched,
        report.source_rules_over_budget,
        report.size_probes,
        report.isolated_failures
    );

    Ok(report)
}
