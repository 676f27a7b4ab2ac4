// src/capture/filter.rs
//! Noise filters applied before any record is built

use crate::dom::ElementView;

/// Layout containers that are only clickable when explicitly marked
const CONTAINER_TAGS: [&str; 7] = ["HTML", "BODY", "DIV", "SPAN", "SECTION", "ARTICLE", "MAIN"];

/// Whether a click on `element` is worth recording
///
/// Containers count only with an inline click handler, `role="button"` or a
/// non-empty `tabindex`. Every other tag is actionable.
pub fn is_actionable<E: ElementView>(element: &E) -> bool {
    let tag = element.tag_name().to_ascii_uppercase();
    if !CONTAINER_TAGS.contains(&tag.as_str()) {
        return true;
    }

    element.has_click_handler()
        || element.attribute("role").as_deref() == Some("button")
        || element.non_empty_attribute("tabindex").is_some()
}

/// Whether an Enter keydown on `element` submits text
pub fn is_enter_target<E: ElementView>(element: &E) -> bool {
    element.is_tag("INPUT") || element.is_tag("TEXTAREA")
}

/// Whether `element` carries a user-editable value
pub fn is_form_control<E: ElementView>(element: &E) -> bool {
    is_enter_target(element) || element.is_tag("SELECT")
}
