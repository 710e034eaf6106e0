//! Chromium-backed protocol session using chromiumoxide.

use super::{
    CssProperty, CssRule, CssStyle, Domain, MatchedStyles, NodeId, ProtocolError,
    ProtocolSession, RuleMatch,
};
use crate::types::NaturalSize;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::css;
use chromiumoxide::cdp::browser_protocol::dom;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. IMAGE_ELEMENTS_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("IMAGE_ELEMENTS_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.image-elements/chromium/
    if let Some(home) = dirs::home_dir() {
        let base = home.join(".image-elements/chromium");
        let candidates = if cfg!(target_os = "macos") {
            vec![
                base.join("chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                base.join("chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                base.join("chrome"),
            ]
        } else {
            vec![base.join("chrome-linux64/chrome"), base.join("chrome")]
        };
        if let Some(found) = candidates.into_iter().find(|c| c.exists()) {
            return Some(found);
        }
    }

    // 3. System PATH
    ["google-chrome", "chromium", "chromium-browser"]
        .into_iter()
        .find_map(|name| which::which(name).ok())
}

/// A headless Chromium instance that hands out protocol sessions.
pub struct HeadlessChromium {
    browser: Browser,
}

impl HeadlessChromium {
    /// Launch a headless Chromium instance.
    pub async fn launch() -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Set IMAGE_ELEMENTS_CHROMIUM_PATH.")?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self { browser })
    }

    /// Open `url` in a new tab and wrap it in a session.
    pub async fn open(&self, url: &str) -> Result<ChromiumSession> {
        let page = self
            .browser
            .new_page(url)
            .await
            .with_context(|| format!("failed to open {url}"))?;
        page.wait_for_navigation()
            .await
            .context("navigation did not complete")?;
        Ok(ChromiumSession::new(page))
    }
}

/// Protocol session over one chromiumoxide page.
pub struct ChromiumSession {
    page: Page,
}

impl ChromiumSession {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }
}

/// Error replies from the browser are per-command; everything else
/// (websocket, channel, timeout) leaves the session unusable.
fn map_cdp(err: CdpError) -> ProtocolError {
    match err {
        CdpError::JavascriptException(details) => ProtocolError::Evaluation(details.text.clone()),
        reply @ CdpError::Chrome(_) => ProtocolError::from_reply(reply.to_string()),
        other => ProtocolError::Transport(other.to_string()),
    }
}

fn convert_style(style: css::CssStyle) -> CssStyle {
    CssStyle {
        css_properties: style
            .css_properties
            .into_iter()
            .map(|p| CssProperty {
                name: p.name,
                value: p.value,
            })
            .collect(),
    }
}

/// Script that loads `src` off-document and resolves with its natural size.
fn natural_size_script(src: &str) -> Result<String, ProtocolError> {
    let src = serde_json::to_string(src).map_err(|e| ProtocolError::Evaluation(e.to_string()))?;
    Ok(format!(
        r#"new Promise((resolve, reject) => {{
  const img = new Image();
  img.addEventListener('error', () => reject(new Error('Invalid image')));
  img.addEventListener('load', () => resolve({{
    naturalWidth: img.naturalWidth,
    naturalHeight: img.naturalHeight,
  }}));
  img.src = {src};
}})"#
    ))
}

#[async_trait]
impl ProtocolSession for ChromiumSession {
    async fn enable(&self, domain: Domain) -> Result<(), ProtocolError> {
        match domain {
            Domain::Dom => self.page.execute(dom::EnableParams::default()).await.map(|_| ()),
            Domain::Css => self.page.execute(css::EnableParams::default()).await.map(|_| ()),
        }
        .map_err(map_cdp)
    }

    async fn disable(&self, domain: Domain) -> Result<(), ProtocolError> {
        match domain {
            Domain::Dom => self.page.execute(dom::DisableParams::default()).await.map(|_| ()),
            Domain::Css => self.page.execute(css::DisableParams::default()).await.map(|_| ()),
        }
        .map_err(map_cdp)
    }

    async fn load_document(&self) -> Result<(), ProtocolError> {
        let params = dom::GetDocumentParams::builder().depth(-1).pierce(true).build();
        self.page.execute(params).await.map_err(map_cdp)?;
        Ok(())
    }

    async fn push_node_by_path(&self, path: &str) -> Result<NodeId, ProtocolError> {
        let resp = self
            .page
            .execute(dom::PushNodeByPathToFrontendParams::new(path))
            .await
            .map_err(map_cdp)?;
        Ok(NodeId(*resp.result.node_id.inner()))
    }

    async fn matched_styles(&self, node: NodeId) -> Result<MatchedStyles, ProtocolError> {
        let resp = self
            .page
            .execute(css::GetMatchedStylesForNodeParams::new(dom::NodeId::new(node.0)))
            .await
            .map_err(map_cdp)?;
        let result = resp.result;

        Ok(MatchedStyles {
            inline_style: result.inline_style.map(convert_style),
            attributes_style: result.attributes_style.map(convert_style),
            matched_css_rules: result
                .matched_css_rules
                .unwrap_or_default()
                .into_iter()
                .map(|m| RuleMatch {
                    rule: CssRule {
                        selector_text: m.rule.selector_list.text,
                        style: convert_style(m.rule.style),
                    },
                })
                .collect(),
        })
    }

    async fn natural_size(&self, src: &str) -> Result<NaturalSize, ProtocolError> {
        let params = EvaluateParams::builder()
            .expression(natural_size_script(src)?)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(ProtocolError::Evaluation)?;

        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(map_cdp)?;

        result
            .into_value::<NaturalSize>()
            .map_err(|e| ProtocolError::NoData(format!("unexpected size payload: {e}")))
    }
}
