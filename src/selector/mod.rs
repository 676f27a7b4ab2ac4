// src/selector/mod.rs
//! Stable element locators
//!
//! - **Dynamic ID**: rejects machine-generated ids
//! - **CSS**: ranked attribute / text selector policy
//! - **XPath**: positional path, always derivable
//! - **Semantic**: coarse role of the element
//!
//! Every function here is pure over an `ElementView`: no I/O, no retained
//! node references.

pub mod css;
pub mod dynamic_id;
pub mod semantic;
pub mod xpath;

// Re-export commonly used types
pub use css::css_selector;
pub use dynamic_id::is_dynamic_id;
pub use semantic::{classify, SemanticRole};
pub use xpath::xpath;

use crate::dom::ElementView;

/// Locator pair for one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    /// Ranked CSS selector, if any rule applied
    pub selector: Option<String>,

    /// Positional XPath, never empty
    pub xpath: String,
}

/// Derive the selector and XPath for an element
pub fn synthesize<E: ElementView>(element: &E) -> Locator {
    Locator {
        selector: css_selector(element),
        xpath: xpath(element),
    }
}
