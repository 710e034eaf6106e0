//! Image element records gathered from a rendered document.
//!
//! An [`ImageElement`] is produced by the DOM snapshot provider and then
//! enriched in place. The three CSS sizing fields (`cssWidth`, `cssHeight`,
//! `_privateCssSizing`) can only be written together through
//! [`ImageElement::apply_css_sizing`], so a record is either fully enriched
//! or left exactly as captured.

use serde::{Deserialize, Serialize};

/// Viewport-relative rectangle of a rendered element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientRect {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

/// Bounding box of a node, including its dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingRect {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    pub width: f64,
    pub height: f64,
}

/// Identity and location of the DOM node backing an image element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    /// Snapshot-local identifier.
    pub id: String,
    /// Ancestor-chain path used for structural node resolution,
    /// e.g. `1,HTML,1,BODY,1,DIV,1,IMG`.
    pub devtools_node_path: String,
    pub selector: String,
    pub node_label: String,
    pub snippet: String,
    pub bounding_rect: BoundingRect,
}

/// Sizing declared by the stylesheet rules matching one node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssSizing {
    pub width: Option<String>,
    pub height: Option<String>,
    pub aspect_ratio: Option<String>,
}

/// Intrinsic dimensions of the resource an image element displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaturalSize {
    pub natural_width: u32,
    pub natural_height: u32,
}

/// One image-bearing element of the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    pub src: String,
    pub srcset: String,
    pub displayed_width: f64,
    pub displayed_height: f64,
    pub client_rect: ClientRect,
    pub attribute_width: String,
    pub attribute_height: String,
    #[serde(default)]
    css_width: Option<String>,
    #[serde(default)]
    css_height: Option<String>,
    #[serde(rename = "_privateCssSizing", default)]
    private_css_sizing: Option<CssSizing>,
    pub css_computed_position: String,
    pub css_computed_object_fit: String,
    pub css_computed_image_rendering: String,
    /// The image is a CSS background rather than an `<img>`.
    pub is_css: bool,
    /// The image is the `<img>` of a `<picture>` element.
    pub is_picture: bool,
    #[serde(rename = "isInShadowDOM")]
    pub is_in_shadow_dom: bool,
    /// MIME type of the response that delivered `src`, when one was indexed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_height: Option<u32>,
    pub node: ElementNode,
}

impl ImageElement {
    /// Create an unenriched element for `src` backed by `node`.
    pub fn new(src: impl Into<String>, node: ElementNode) -> Self {
        Self {
            src: src.into(),
            node,
            ..Default::default()
        }
    }

    /// Width declared by CSS, once enriched.
    pub fn css_width(&self) -> Option<&str> {
        self.css_width.as_deref()
    }

    /// Height declared by CSS, once enriched.
    pub fn css_height(&self) -> Option<&str> {
        self.css_height.as_deref()
    }

    /// Full sizing triple from matched rules, once enriched.
    pub fn css_sizing(&self) -> Option<&CssSizing> {
        self.private_css_sizing.as_ref()
    }

    /// Whether the CSS sizing fields have been populated.
    pub fn has_css_sizing(&self) -> bool {
        self.private_css_sizing.is_some()
    }

    /// Fold a resolved sizing into this element, setting all three fields.
    pub fn apply_css_sizing(&mut self, sizing: CssSizing) {
        self.css_width = sizing.width.clone();
        self.css_height = sizing.height.clone();
        self.private_css_sizing = Some(sizing);
    }

    /// Fold probed intrinsic dimensions into this element.
    pub fn apply_natural_size(&mut self, size: NaturalSize) {
        self.natural_width = Some(size.natural_width);
        self.natural_height = Some(size.natural_height);
    }

    /// Displayed area in CSS pixels.
    pub fn displayed_area(&self) -> f64 {
        self.displayed_width * self.displayed_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_css_sizing_sets_all_three_fields() {
        let mut el = ImageElement::new("https://example.com/a.png", ElementNode::default());
        assert!(!el.has_css_sizing());
        assert_eq!(el.css_width(), None);

        el.apply_css_sizing(CssSizing {
            width: Some("200px".into()),
            height: None,
            aspect_ratio: Some("1 / 1".into()),
        });

        assert!(el.has_css_sizing());
        assert_eq!(el.css_width(), Some("200px"));
        assert_eq!(el.css_height(), None);
        assert_eq!(
            el.css_sizing().and_then(|s| s.aspect_ratio.as_deref()),
            Some("1 / 1")
        );
    }

    #[test]
    fn test_serialized_field_names() {
        let mut el = ImageElement::new("a.png", ElementNode::default());
        el.is_in_shadow_dom = true;
        el.apply_css_sizing(CssSizing {
            width: Some("10px".into()),
            height: Some("20px".into()),
            aspect_ratio: None,
        });

        let value = serde_json::to_value(&el).unwrap();
        assert_eq!(value["isInShadowDOM"], json!(true));
        assert_eq!(value["cssWidth"], json!("10px"));
        assert_eq!(
            value["_privateCssSizing"],
            json!({"width": "10px", "height": "20px", "aspectRatio": null})
        );
        assert!(value.get("mimeType").is_none());
        assert!(value["node"].get("devtoolsNodePath").is_some());
    }

    #[test]
    fn test_unenriched_element_deserializes_without_css_fields() {
        let el: ImageElement = serde_json::from_value(json!({
            "src": "a.png",
            "srcset": "",
            "displayedWidth": 200.0,
            "displayedHeight": 100.0,
            "clientRect": {"top": 0.0, "bottom": 100.0, "left": 0.0, "right": 200.0},
            "attributeWidth": "",
            "attributeHeight": "",
            "cssComputedPosition": "static",
            "cssComputedObjectFit": "",
            "cssComputedImageRendering": "",
            "isCss": false,
            "isPicture": false,
            "isInShadowDOM": false,
            "node": {
                "id": "n1",
                "devtoolsNodePath": "1,HTML,1,BODY,0,IMG",
                "selector": "body > img",
                "nodeLabel": "img",
                "snippet": "<img src=\"a.png\">",
                "boundingRect": {"top": 0.0, "bottom": 100.0, "left": 0.0, "right": 200.0, "width": 200.0, "height": 100.0}
            }
        }))
        .unwrap();

        assert!(!el.has_css_sizing());
        assert_eq!(el.displayed_area(), 20_000.0);
    }
}
