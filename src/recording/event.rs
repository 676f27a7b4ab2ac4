// src/recording/event.rs
//! Interaction event records
//!
//! Records are snapshots: everything is copied out of the page at capture
//! time and no node reference survives the builder.

use crate::dom::{ElementView, NavigationTrigger};
use crate::selector::{self, SemanticRole};
use crate::utils::errors::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Kind of captured interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Click,
    Input,
    KeypressEnter,
    Scroll,
    Navigation,
    PageVisit,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Input => "input",
            EventKind::KeypressEnter => "keypress_enter",
            EventKind::Scroll => "scroll",
            EventKind::Navigation => "navigation",
            EventKind::PageVisit => "page_visit",
        }
    }

    /// Page-level kinds never carry a target
    pub fn is_page_level(&self) -> bool {
        matches!(
            self,
            EventKind::Scroll | EventKind::Navigation | EventKind::PageVisit
        )
    }
}

/// Page URL and title at capture time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub url: String,
    pub title: String,
}

/// Snapshot of the interaction target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDescriptor {
    /// Uppercase tag name
    pub tag_name: String,

    /// Ranked CSS selector, absent when no rule applied
    pub selector: Option<String>,

    /// Positional XPath, always present
    pub xpath: String,

    /// `type` attribute of form controls
    pub input_type: Option<String>,

    pub semantic_role: SemanticRole,
}

const FORM_CONTROL_TAGS: [&str; 4] = ["INPUT", "TEXTAREA", "SELECT", "BUTTON"];

impl ElementDescriptor {
    /// Capture a descriptor from a live element
    pub fn capture<E: ElementView>(element: &E) -> Self {
        let tag_name = element.tag_name().to_ascii_uppercase();
        let locator = selector::synthesize(element);

        let input_type = if FORM_CONTROL_TAGS.contains(&tag_name.as_str()) {
            element.non_empty_attribute("type")
        } else {
            None
        };

        Self {
            tag_name,
            selector: locator.selector,
            xpath: locator.xpath,
            input_type,
            semantic_role: selector::classify(element),
        }
    }

    /// Preferred locator: the CSS selector, else the XPath
    pub fn best_locator(&self) -> &str {
        self.selector.as_deref().unwrap_or(&self.xpath)
    }
}

/// One captured interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionEvent {
    /// Unique event ID (ULID)
    pub id: String,

    pub kind: EventKind,

    /// Milliseconds since the Unix epoch
    pub timestamp: i64,

    pub page_context: PageContext,

    #[serde(
        rename = "targetDescriptor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target: Option<ElementDescriptor>,

    /// Kind-specific data, see the `*Payload` types
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl InteractionEvent {
    /// Decode the payload into its typed form
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

/// Payload of `click`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickPayload {
    pub text: Option<String>,
}

/// Payload of `input` and `keypress_enter`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuePayload {
    /// Truncated value; omitted when value capture is disabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Full length of the value in characters
    pub length: usize,
}

/// Vertical scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Down,
    Up,
}

/// Payload of `scroll`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollPayload {
    pub y: i64,
    pub direction: ScrollDirection,
}

/// Payload of `navigation`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationPayload {
    pub url: String,
    pub from: String,
    pub trigger: NavigationTrigger,
}

/// Payload of `page_visit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageVisitPayload {
    pub referrer: Option<String>,
}

/// Wall-clock milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{NodeBuilder, Page};

    #[test]
    fn test_descriptor_for_form_control() {
        let page = Page::new("https://example.com", "Example");
        let node = page.append(
            page.body(),
            NodeBuilder::new("input").attr("type", "email").attr("name", "email"),
        );

        let descriptor = ElementDescriptor::capture(&page.element(node).unwrap());
        assert_eq!(descriptor.tag_name, "INPUT");
        assert_eq!(descriptor.selector.as_deref(), Some("[name=\"email\"]"));
        assert_eq!(descriptor.input_type.as_deref(), Some("email"));
        assert_eq!(descriptor.semantic_role, SemanticRole::EmailField);
        assert_eq!(descriptor.best_locator(), "[name=\"email\"]");
    }

    #[test]
    fn test_descriptor_ignores_type_on_non_controls() {
        let page = Page::new("https://example.com", "Example");
        let node = page.append(page.body(), NodeBuilder::new("a").attr("type", "text/html"));

        let descriptor = ElementDescriptor::capture(&page.element(node).unwrap());
        assert!(descriptor.input_type.is_none());
        assert!(descriptor.selector.is_none());
        assert_eq!(descriptor.best_locator(), "/html[1]/body[1]/a[1]");
    }

    #[test]
    fn test_event_wire_shape() {
        let event = InteractionEvent {
            id: "01HX".to_string(),
            kind: EventKind::KeypressEnter,
            timestamp: 1_700_000_000_000,
            page_context: PageContext {
                url: "https://example.com".to_string(),
                title: "Example".to_string(),
            },
            target: None,
            payload: serde_json::json!({ "value": "rust", "length": 4 }),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "keypress_enter");
        assert_eq!(json["pageContext"]["url"], "https://example.com");
        assert!(json.get("targetDescriptor").is_none());

        let payload: ValuePayload = event.payload_as().unwrap();
        assert_eq!(payload.value.as_deref(), Some("rust"));
        assert_eq!(payload.length, 4);
    }

    #[test]
    fn test_page_level_kinds() {
        assert!(EventKind::Scroll.is_page_level());
        assert!(EventKind::PageVisit.is_page_level());
        assert!(!EventKind::Click.is_page_level());
        assert_eq!(EventKind::PageVisit.as_str(), "page_visit");
    }
}
