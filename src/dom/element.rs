// src/dom/element.rs
//! Abstract element view

/// Read-only view of a DOM element
///
/// Handles are cheap values; `parent` and `previous_sibling` return new
/// handles rather than references so implementations can sit on top of a
/// locked or remote document.
pub trait ElementView: Clone {
    /// Tag name, uppercase by convention (`BUTTON`, `INPUT`)
    fn tag_name(&self) -> String;

    /// Raw attribute value, `None` when the attribute is absent
    fn attribute(&self, name: &str) -> Option<String>;

    /// Parent element, `None` at the root or when detached
    fn parent(&self) -> Option<Self>;

    /// Closest preceding element sibling
    fn previous_sibling(&self) -> Option<Self>;

    /// Rendered text of the element and its descendants
    fn text(&self) -> String;

    /// Current value of a form control
    fn value(&self) -> Option<String> {
        None
    }

    /// Whether an inline click handler is installed
    fn has_click_handler(&self) -> bool {
        false
    }

    /// Attribute value, treating an empty string as absent
    fn non_empty_attribute(&self, name: &str) -> Option<String> {
        self.attribute(name).filter(|v| !v.is_empty())
    }

    /// Case-insensitive tag comparison
    fn is_tag(&self, tag: &str) -> bool {
        self.tag_name().eq_ignore_ascii_case(tag)
    }
}
