// src/dom/mod.rs
//! Page model the capture pipeline runs against
//!
//! - **ElementView**: read-only element accessors (tag, attributes, parent,
//!   previous sibling, text). Selector synthesis is written against this
//!   trait only, never against a concrete node type.
//! - **Page**: in-memory document with page context, scroll position,
//!   readiness and a listener registry that receives dispatched DOM events.
//!
//! # Architecture
//!
//! ```text
//! user action ─► Page::click / input / scroll_to / push_state ...
//!                     │ (mutate document, release locks)
//!                     ▼
//!               Page::dispatch(DomEvent)
//!                     │ (registration order, same thread)
//!                     ▼
//!               PageListener::on_event(&Page, &DomEvent)
//! ```

pub mod element;
pub mod page;

// Re-export commonly used types
pub use element::ElementView;
pub use page::{
    DomEvent, Element, ListenerId, NavigationTrigger, NodeBuilder, NodeId, Page, PageId,
    PageListener, ReadyState, WeakPage,
};
