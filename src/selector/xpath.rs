// src/selector/xpath.rs
//! Positional XPath derivation

use crate::dom::ElementView;

/// Absolute positional XPath (`/html[1]/body[1]/div[2]`)
///
/// Each segment carries the 1-based index among same-tag siblings. The walk
/// stops where the parent chain ends, so a detached subtree yields the path
/// from its detached root down to the element.
pub fn xpath<E: ElementView>(element: &E) -> String {
    let mut segments = Vec::new();
    let mut current = Some(element.clone());

    while let Some(el) = current {
        let tag = el.tag_name();
        segments.push(format!(
            "/{}[{}]",
            tag.to_ascii_lowercase(),
            same_tag_index(&el, &tag)
        ));
        current = el.parent();
    }

    segments.reverse();
    segments.concat()
}

/// 1-based position among preceding siblings sharing the tag name
pub fn same_tag_index<E: ElementView>(element: &E, tag: &str) -> usize {
    let mut index = 1;
    let mut sibling = element.previous_sibling();
    while let Some(sib) = sibling {
        if sib.tag_name().eq_ignore_ascii_case(tag) {
            index += 1;
        }
        sibling = sib.previous_sibling();
    }
    index
}
