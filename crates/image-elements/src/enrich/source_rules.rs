//! CSS sizing from the style rules that match an element's node.

use super::FetchOutcome;
use crate::error::GatherError;
use crate::protocol::{MatchedStyles, ProtocolError, ProtocolSession};
use crate::types::{CssSizing, ImageElement};

/// Resolve the effective declared value of one sizing property.
///
/// Sizing is not inherited, so only styles applying to the node itself are
/// consulted: inline style first, then presentational attributes, then the
/// matched rules from highest cascade priority down.
pub fn effective_sizing_rule(styles: &MatchedStyles, property: &str) -> Option<String> {
    if let Some(value) = styles.inline_style.as_ref().and_then(|s| s.declared(property)) {
        return Some(value.to_string());
    }
    if let Some(value) = styles
        .attributes_style
        .as_ref()
        .and_then(|s| s.declared(property))
    {
        return Some(value.to_string());
    }
    styles
        .matched_css_rules
        .iter()
        .rev()
        .find_map(|m| m.rule.style.declared(property))
        .map(str::to_string)
}

/// Width, height and aspect ratio declared for a node.
pub fn effective_sizing(styles: &MatchedStyles) -> CssSizing {
    CssSizing {
        width: effective_sizing_rule(styles, "width"),
        height: effective_sizing_rule(styles, "height"),
        aspect_ratio: effective_sizing_rule(styles, "aspect-ratio"),
    }
}

fn isolate<T>(err: ProtocolError) -> Result<FetchOutcome<T>, GatherError> {
    if err.is_fatal() {
        return Err(GatherError::Transport(err.to_string()));
    }
    Ok(FetchOutcome::Skipped {
        reason: err.to_string(),
    })
}

/// Look up the stylesheet sizing of `element`.
///
/// Resolves the node by its path, then reads its matched styles. A node that
/// cannot be resolved, or whose styles the browser refuses to report, is
/// skipped; only transport failures are returned as errors.
pub async fn fetch_source_rules(
    session: &dyn ProtocolSession,
    element: &ImageElement,
) -> Result<FetchOutcome<CssSizing>, GatherError> {
    let path = element.node.devtools_node_path.as_str();
    if path.is_empty() {
        return Ok(FetchOutcome::Skipped {
            reason: "element has no node path".to_string(),
        });
    }

    let node = match session.push_node_by_path(path).await {
        Ok(node) if node.0 != 0 => node,
        Ok(_) => {
            return Ok(FetchOutcome::Skipped {
                reason: format!("no node resolved for path {path}"),
            })
        }
        Err(e) => return isolate(e),
    };

    match session.matched_styles(node).await {
        Ok(styles) => Ok(FetchOutcome::Fetched(effective_sizing(&styles))),
        Err(e) => isolate(e),
    }
}
