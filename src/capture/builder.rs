// src/capture/builder.rs
//! Assembles normalized interaction records

use crate::capture::CaptureConfig;
use crate::dom::{ElementView, NavigationTrigger, Page};
use crate::recording::event::{
    now_millis, ClickPayload, ElementDescriptor, EventKind, InteractionEvent, NavigationPayload,
    PageContext, PageVisitPayload, ScrollDirection, ScrollPayload, ValuePayload,
};
use crate::selector::css::truncate_chars;
use serde::Serialize;
use tracing::warn;
use ulid::Ulid;

/// Builds `InteractionEvent`s from the live page
///
/// Everything is read synchronously at build time; the returned record holds
/// no reference into the page.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    config: CaptureConfig,
}

impl EventBuilder {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    /// `click` with the element's visible text
    pub fn click<E: ElementView>(&self, page: &Page, element: &E) -> InteractionEvent {
        let text = element.text();
        let text = text.trim();
        let payload = ClickPayload {
            text: (!text.is_empty())
                .then(|| truncate_chars(text, self.config.max_click_text_chars).to_string()),
        };

        self.build(EventKind::Click, page, Some(ElementDescriptor::capture(element)), &payload)
    }

    /// `input` or `keypress_enter` with the control's current value
    pub fn value<E: ElementView>(
        &self,
        kind: EventKind,
        page: &Page,
        element: &E,
    ) -> InteractionEvent {
        let value = element.value().unwrap_or_default();
        let payload = ValuePayload {
            value: self
                .config
                .capture_input_values
                .then(|| truncate_chars(&value, self.config.max_value_chars).to_string()),
            length: value.chars().count(),
        };

        self.build(kind, page, Some(ElementDescriptor::capture(element)), &payload)
    }

    pub fn scroll(&self, page: &Page, y: f64, direction: ScrollDirection) -> InteractionEvent {
        let payload = ScrollPayload {
            y: y.round() as i64,
            direction,
        };

        self.build(EventKind::Scroll, page, None, &payload)
    }

    /// `navigation` to the page's current URL
    pub fn navigation(
        &self,
        page: &Page,
        from: &str,
        trigger: NavigationTrigger,
    ) -> InteractionEvent {
        let payload = NavigationPayload {
            url: page.url(),
            from: from.to_string(),
            trigger,
        };

        self.build(EventKind::Navigation, page, None, &payload)
    }

    pub fn page_visit(&self, page: &Page) -> InteractionEvent {
        let referrer = page.referrer();
        let payload = PageVisitPayload {
            referrer: (!referrer.is_empty()).then_some(referrer),
        };

        self.build(EventKind::PageVisit, page, None, &payload)
    }

    fn build<P: Serialize>(
        &self,
        kind: EventKind,
        page: &Page,
        target: Option<ElementDescriptor>,
        payload: &P,
    ) -> InteractionEvent {
        let payload = serde_json::to_value(payload).unwrap_or_else(|e| {
            warn!("Failed to encode {} payload: {}", kind.as_str(), e);
            serde_json::Value::Null
        });

        InteractionEvent {
            id: Ulid::new().to_string(),
            kind,
            timestamp: now_millis(),
            page_context: PageContext {
                url: page.url(),
                title: page.title(),
            },
            target,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeBuilder;

    fn builder() -> EventBuilder {
        EventBuilder::new(CaptureConfig::default())
    }

    #[test]
    fn test_click_record() {
        let page = Page::new("https://shop.example/cart", "Cart");
        let node = page.append(
            page.body(),
            NodeBuilder::new("button").attr("id", "checkout").text("  Checkout  "),
        );

        let event = builder().click(&page, &page.element(node).unwrap());
        assert_eq!(event.kind, EventKind::Click);
        assert_eq!(event.page_context.title, "Cart");
        assert_eq!(event.target.as_ref().unwrap().selector.as_deref(), Some("#checkout"));

        let payload: ClickPayload = event.payload_as().unwrap();
        assert_eq!(payload.text.as_deref(), Some("Checkout"));
    }

    #[test]
    fn test_click_text_truncated_and_empty() {
        let page = Page::new("https://example.com", "Example");
        let long = page.append(page.body(), NodeBuilder::new("a").text("x".repeat(120)));
        let empty = page.append(page.body(), NodeBuilder::new("img"));

        let payload: ClickPayload = builder()
            .click(&page, &page.element(long).unwrap())
            .payload_as()
            .unwrap();
        assert_eq!(payload.text.unwrap().chars().count(), 80);

        let event = builder().click(&page, &page.element(empty).unwrap());
        assert_eq!(event.payload["text"], serde_json::Value::Null);
    }

    #[test]
    fn test_value_record() {
        let page = Page::new("https://example.com", "Example");
        let node = page.append(page.body(), NodeBuilder::new("input").value("é".repeat(250)));

        let event = builder().value(EventKind::Input, &page, &page.element(node).unwrap());
        let payload: ValuePayload = event.payload_as().unwrap();
        assert_eq!(payload.length, 250);
        assert_eq!(payload.value.unwrap().chars().count(), 200);
    }

    #[test]
    fn test_value_capture_disabled() {
        let page = Page::new("https://example.com", "Example");
        let node = page.append(page.body(), NodeBuilder::new("input").value("secret"));

        let builder = EventBuilder::new(CaptureConfig {
            capture_input_values: false,
            ..Default::default()
        });
        let event = builder.value(EventKind::KeypressEnter, &page, &page.element(node).unwrap());

        assert!(event.payload.get("value").is_none());
        assert_eq!(event.payload["length"], 6);
    }

    #[test]
    fn test_page_level_records() {
        let page = Page::new("https://example.com/b", "B");
        page.set_referrer("https://search.example");

        let scroll = builder().scroll(&page, 412.6, ScrollDirection::Down);
        assert!(scroll.target.is_none());
        assert_eq!(scroll.payload, serde_json::json!({ "y": 413, "direction": "down" }));

        let nav = builder().navigation(&page, "https://example.com/a", NavigationTrigger::PushState);
        let payload: NavigationPayload = nav.payload_as().unwrap();
        assert_eq!(payload.url, "https://example.com/b");
        assert_eq!(payload.from, "https://example.com/a");

        let visit = builder().page_visit(&page);
        assert_eq!(visit.payload["referrer"], "https://search.example");
        assert_ne!(visit.id, nav.id);
    }
}
