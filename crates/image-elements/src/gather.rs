//! The full image element gather pass.
//!
//! Reads the network log, snapshots the document's image elements, then
//! runs enrichment with the DOM and CSS domains enabled on the session.

use crate::clock::{Clock, Deadline, SystemClock};
use crate::config::GatherConfig;
use crate::enrich::{attribute_mime_types, enrich, EnrichReport};
use crate::error::{GatherError, GatherResult};
use crate::network::{index_responses, NetworkLog};
use crate::protocol::{Domain, ProtocolSession};
use crate::types::ImageElement;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Source of the unenriched image elements of a live document.
#[async_trait]
pub trait DomSnapshot: Send + Sync {
    async fn image_elements(&self) -> GatherResult<Vec<ImageElement>>;
}

#[async_trait]
impl DomSnapshot for Vec<ImageElement> {
    async fn image_elements(&self) -> GatherResult<Vec<ImageElement>> {
        Ok(self.clone())
    }
}

/// Output of a gather pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatheredImages {
    pub elements: Vec<ImageElement>,
    pub report: EnrichReport,
}

/// Runs gather passes with one configuration.
pub struct ImageElementsGatherer {
    config: GatherConfig,
    clock: Arc<dyn Clock>,
}

impl ImageElementsGatherer {
    pub fn new(config: GatherConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Use `clock` to measure the lookup budget.
    pub fn with_clock(config: GatherConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &GatherConfig {
        &self.config
    }

    /// Gather and enrich the image elements of the document behind `session`.
    ///
    /// The session is only borrowed for this pass. The DOM and CSS domains
    /// are disabled again before returning, even when enrichment fails.
    ///
    /// A failure after the snapshot is returned as
    /// [`GatherError::Interrupted`], carrying the elements with every MIME
    /// type and whatever sizing was merged before the failure.
    pub async fn gather(
        &self,
        session: &dyn ProtocolSession,
        snapshot: &dyn DomSnapshot,
        network_log: &dyn NetworkLog,
    ) -> GatherResult<GatheredImages> {
        self.config.validate()?;

        let index = index_responses(network_log.records()?, self.config.success_status);
        debug!("indexed {} successful responses", index.len());

        let mut elements = snapshot.image_elements().await?;
        if self.config.largest_first {
            elements.sort_by(|a, b| b.displayed_area().total_cmp(&a.displayed_area()));
        }

        let result: GatherResult<EnrichReport> = async {
            enable_domains(session).await?;
            let deadline = Deadline::start(Arc::clone(&self.clock), self.config.source_rules_budget());
            enrich(session, &mut elements, &index, &deadline).await
        }
        .await;

        disable_domains(session).await;

        match result {
            Ok(report) => {
                info!("gathered {} image elements", elements.len());
                Ok(GatheredImages { elements, report })
            }
            Err(e) => {
                // Enable failures stop the pass before enrichment attributes MIME types.
                attribute_mime_types(&mut elements, &index);
                warn!("gather pass interrupted with {} image elements: {e}", elements.len());
                Err(GatherError::Interrupted {
                    source: Box::new(e),
                    elements,
                })
            }
        }
    }
}

async fn enable_domains(session: &dyn ProtocolSession) -> GatherResult<()> {
    for domain in [Domain::Dom, Domain::Css] {
        session
            .enable(domain)
            .await
            .map_err(|e| GatherError::Transport(format!("{domain}.enable: {e}")))?;
    }
    session
        .load_document()
        .await
        .map_err(|e| GatherError::Transport(format!("DOM.getDocument: {e}")))
}

async fn disable_domains(session: &dyn ProtocolSession) {
    for domain in [Domain::Css, Domain::Dom] {
        if let Err(e) = session.disable(domain).await {
            warn!("failed to disable {domain} domain: {e}");
        }
    }
}
