//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use image_elements::protocol::{
    CssProperty, CssStyle, Domain, MatchedStyles, NodeId, ProtocolError, ProtocolSession,
};
use image_elements::types::{BoundingRect, ClientRect, ElementNode, ImageElement, NaturalSize};
use image_elements::ManualClock;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

/// Node id handed out for paths whose node goes stale before its styles are read.
const STALE_NODE: NodeId = NodeId(404);

// ─────────────────────── elements ───────────────────────

/// A 200x200 `<img>` at a fixed path, not yet enriched.
pub fn mock_element() -> ImageElement {
    let node = ElementNode {
        id: "__nodeid__".into(),
        devtools_node_path: "1,HTML,1,BODY,1,DIV,1,IMG".into(),
        selector: "body > img".into(),
        node_label: "img".into(),
        snippet: r#"<img src="https://www.example.com/avatar150.jpg">"#.into(),
        bounding_rect: BoundingRect {
            top: 50.0,
            bottom: 250.0,
            left: 50.0,
            right: 250.0,
            width: 200.0,
            height: 200.0,
        },
    };
    let mut el = ImageElement::new("https://www.example.com/avatar150.jpg", node);
    el.displayed_width = 200.0;
    el.displayed_height = 200.0;
    el.client_rect = ClientRect {
        top: 50.0,
        bottom: 250.0,
        left: 50.0,
        right: 250.0,
    };
    el.css_computed_position = "absolute".into();
    el
}

/// `mock_element` with its own src/path and the given flags.
pub fn element(n: usize, is_css: bool, is_picture: bool, is_in_shadow_dom: bool) -> ImageElement {
    let mut el = mock_element();
    el.src = format!("https://example.com/{n}.png");
    el.node.devtools_node_path = format!("1,HTML,1,BODY,{n},IMG");
    el.is_css = is_css;
    el.is_picture = is_picture;
    el.is_in_shadow_dom = is_in_shadow_dom;
    el
}

pub fn style(decls: &[(&str, &str)]) -> CssStyle {
    CssStyle {
        css_properties: decls
            .iter()
            .map(|(name, value)| CssProperty {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect(),
    }
}

/// Attribute sizing of 200px by 200px.
pub fn attribute_sized_200() -> MatchedStyles {
    MatchedStyles {
        attributes_style: Some(style(&[("width", "200px"), ("height", "200px")])),
        ..Default::default()
    }
}

// ─────────────────────── session ───────────────────────

/// A scripted protocol session that records every command it receives.
pub struct MockSession {
    calls: Mutex<Vec<String>>,
    styles: MatchedStyles,
    size: NaturalSize,
    missing_paths: HashSet<String>,
    fatal_paths: HashSet<String>,
    stale_paths: HashSet<String>,
    broken_srcs: HashSet<String>,
    slow_lookup: Option<(ManualClock, Duration)>,
    fail_enable: bool,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            styles: MatchedStyles::default(),
            size: NaturalSize {
                natural_width: 150,
                natural_height: 150,
            },
            missing_paths: HashSet::new(),
            fatal_paths: HashSet::new(),
            stale_paths: HashSet::new(),
            broken_srcs: HashSet::new(),
            slow_lookup: None,
            fail_enable: false,
        }
    }

    pub fn with_styles(mut self, styles: MatchedStyles) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_missing_path(mut self, path: &str) -> Self {
        self.missing_paths.insert(path.to_string());
        self
    }

    pub fn with_fatal_path(mut self, path: &str) -> Self {
        self.fatal_paths.insert(path.to_string());
        self
    }

    /// The path resolves, but the browser rejects the styles lookup for it.
    pub fn with_stale_path(mut self, path: &str) -> Self {
        self.stale_paths.insert(path.to_string());
        self
    }

    pub fn with_broken_src(mut self, src: &str) -> Self {
        self.broken_srcs.insert(src.to_string());
        self
    }

    /// Every matched-styles lookup advances `clock` by `cost`.
    pub fn with_slow_lookups(mut self, clock: ManualClock, cost: Duration) -> Self {
        self.slow_lookup = Some((clock, cost));
        self
    }

    pub fn failing_enable(mut self) -> Self {
        self.fail_enable = true;
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose command name is `method`.
    pub fn calls_to(&self, method: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split(' ').next() == Some(method))
            .collect()
    }

    /// Command names only, in order.
    pub fn methods(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|c| c.split(' ').next().unwrap_or_default().to_string())
            .collect()
    }
}

#[async_trait]
impl ProtocolSession for MockSession {
    async fn enable(&self, domain: Domain) -> Result<(), ProtocolError> {
        self.record(format!("{domain}.enable"));
        if self.fail_enable {
            return Err(ProtocolError::Transport("Target closed".into()));
        }
        Ok(())
    }

    async fn disable(&self, domain: Domain) -> Result<(), ProtocolError> {
        self.record(format!("{domain}.disable"));
        Ok(())
    }

    async fn load_document(&self) -> Result<(), ProtocolError> {
        self.record("DOM.getDocument".into());
        Ok(())
    }

    async fn push_node_by_path(&self, path: &str) -> Result<NodeId, ProtocolError> {
        self.record(format!("DOM.pushNodeByPathToFrontend {path}"));
        if self.fatal_paths.contains(path) {
            return Err(ProtocolError::Transport("websocket closed".into()));
        }
        if self.missing_paths.contains(path) {
            return Err(ProtocolError::from_reply("No node with given path found"));
        }
        if self.stale_paths.contains(path) {
            return Ok(STALE_NODE);
        }
        Ok(NodeId(1))
    }

    async fn matched_styles(&self, node: NodeId) -> Result<MatchedStyles, ProtocolError> {
        self.record(format!("CSS.getMatchedStylesForNode {}", node.0));
        if let Some((clock, cost)) = &self.slow_lookup {
            clock.advance(*cost);
        }
        if node == STALE_NODE {
            return Err(ProtocolError::from_reply("Could not find node with given id"));
        }
        Ok(self.styles.clone())
    }

    async fn natural_size(&self, src: &str) -> Result<NaturalSize, ProtocolError> {
        self.record(format!("Runtime.evaluate {src}"));
        if self.broken_srcs.contains(src) {
            return Err(ProtocolError::Evaluation("Invalid image".into()));
        }
        Ok(self.size)
    }
}
