//! Remote instrumentation protocol session abstraction.
//!
//! Defines the `ProtocolSession` trait the enricher issues its DOM and CSS
//! queries through, together with the response shapes it reads. The
//! production implementation drives Chromium over the DevTools protocol via
//! chromiumoxide.

pub mod chromium;

use crate::types::NaturalSize;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Protocol domains the gather pass toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Dom,
    Css,
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Dom => f.write_str("DOM"),
            Domain::Css => f.write_str("CSS"),
        }
    }
}

/// Session-scoped handle of a node pushed to the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub i64);

/// One `name: value` declaration of a style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssProperty {
    pub name: String,
    pub value: String,
}

/// A declaration block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssStyle {
    #[serde(default)]
    pub css_properties: Vec<CssProperty>,
}

impl CssStyle {
    /// Value of the first non-empty declaration of `property`.
    pub fn declared(&self, property: &str) -> Option<&str> {
        self.css_properties
            .iter()
            .find(|p| p.name == property && !p.value.trim().is_empty())
            .map(|p| p.value.as_str())
    }
}

/// A stylesheet rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssRule {
    #[serde(default)]
    pub selector_text: String,
    pub style: CssStyle,
}

/// A stylesheet rule that matched the node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMatch {
    pub rule: CssRule,
}

/// Styles applying directly to a node.
///
/// `matched_css_rules` is in ascending cascade priority, as the protocol
/// reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedStyles {
    #[serde(default)]
    pub inline_style: Option<CssStyle>,
    #[serde(default)]
    pub attributes_style: Option<CssStyle>,
    #[serde(default, rename = "matchedCSSRules")]
    pub matched_css_rules: Vec<RuleMatch>,
}

/// Failure of a single protocol command.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("No usable data: {0}")]
    NoData(String),

    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ProtocolError {
    /// Whether the session is unusable after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProtocolError::Transport(_))
    }

    /// Classify the message of an error reply from the browser.
    ///
    /// A reply means the session is still answering, so it never yields
    /// `Transport`. Unresolved or stale nodes (`No node with given path
    /// found`, `Could not find node with given id`) map to `NodeNotFound`;
    /// any other rejected command maps to `NoData`.
    pub fn from_reply(message: impl Into<String>) -> Self {
        static MISSING_NODE: OnceLock<Regex> = OnceLock::new();
        let message = message.into();
        let re = MISSING_NODE.get_or_init(|| {
            Regex::new(r"No node.*found|Could not find node").expect("static regex")
        });
        if re.is_match(&message) {
            ProtocolError::NodeNotFound(message)
        } else {
            ProtocolError::NoData(message)
        }
    }
}

/// A request/response channel to one live document.
///
/// Commands on one session are assumed to be delivered in order. The session
/// is not safe to multiplex, so callers issue one command at a time.
#[async_trait]
pub trait ProtocolSession: Send + Sync {
    /// Enable an inspection domain.
    async fn enable(&self, domain: Domain) -> Result<(), ProtocolError>;
    /// Disable an inspection domain.
    async fn disable(&self, domain: Domain) -> Result<(), ProtocolError>;
    /// Request the full document tree so later path lookups resolve.
    async fn load_document(&self) -> Result<(), ProtocolError>;
    /// Resolve a node by its ancestor-chain path.
    async fn push_node_by_path(&self, path: &str) -> Result<NodeId, ProtocolError>;
    /// Inline, attribute and matched rule styles for a node.
    async fn matched_styles(&self, node: NodeId) -> Result<MatchedStyles, ProtocolError>;
    /// Load `src` in the page and report its intrinsic size.
    async fn natural_size(&self, src: &str) -> Result<NaturalSize, ProtocolError>;
}
