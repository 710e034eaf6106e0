//! Per-element enrichment eligibility.

use crate::types::ImageElement;

/// An extra lookup that can be run for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Enrichment {
    /// Resolve the node by path and read sizing from its matched CSS rules.
    SourceRules,
    /// Ask the page for the intrinsic size of the element's image.
    SizeProbe,
}

/// The set of enrichments that apply to one element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentPlan {
    source_rules: bool,
    size_probe: bool,
}

impl EnrichmentPlan {
    pub fn contains(&self, action: Enrichment) -> bool {
        match action {
            Enrichment::SourceRules => self.source_rules,
            Enrichment::SizeProbe => self.size_probe,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.source_rules && !self.size_probe
    }

    /// Actions in the order the enricher runs them.
    pub fn actions(&self) -> impl Iterator<Item = Enrichment> + '_ {
        [Enrichment::SourceRules, Enrichment::SizeProbe]
            .into_iter()
            .filter(move |a| self.contains(*a))
    }
}

/// Decide which enrichments apply to `element`.
///
/// Shadow DOM nodes cannot be reached by path resolution, and CSS
/// background images have no matched `<img>` rules worth looking up.
/// `<picture>` images size through their `<source>` children, so only
/// non-picture CSS images get a size probe.
pub fn classify(element: &ImageElement) -> EnrichmentPlan {
    EnrichmentPlan {
        source_rules: !element.is_in_shadow_dom && !element.is_css,
        size_probe: !element.is_picture && element.is_css,
    }
}
