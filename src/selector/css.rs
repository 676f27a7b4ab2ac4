// src/selector/css.rs
//! Ranked CSS selector policy
//!
//! Evaluated in strict priority order, first match wins:
//!
//! 1. stable `id` → `#id`
//! 2. `data-testid` → `[data-testid="…"]`
//! 3. `name` → `[name="…"]`
//! 4. `aria-label` → `[aria-label="…"]`
//! 5. links, buttons, headings with text → `button:text("…")`
//! 6. `role` → `[role="…"]`
//! 7. nothing (caller falls back to XPath)

use crate::dom::ElementView;
use crate::selector::dynamic_id::is_dynamic_id;

/// Maximum characters of visible text used in a text selector
pub const TEXT_SELECTOR_MAX_CHARS: usize = 50;

/// Attributes tried, in order, after the id
const ATTRIBUTE_RULES: [&str; 3] = ["data-testid", "name", "aria-label"];

/// Tags that get a text selector
const TEXT_SELECTOR_TAGS: [&str; 8] = ["a", "button", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Best-effort CSS selector, `None` when no rule applies
pub fn css_selector<E: ElementView>(element: &E) -> Option<String> {
    if let Some(id) = element.non_empty_attribute("id") {
        if !is_dynamic_id(&id) {
            return Some(format!("#{}", id));
        }
    }

    for name in ATTRIBUTE_RULES {
        if let Some(value) = element.non_empty_attribute(name) {
            return Some(attribute_selector(name, &value));
        }
    }

    if let Some(selector) = text_selector(element) {
        return Some(selector);
    }

    element
        .non_empty_attribute("role")
        .map(|role| attribute_selector("role", &role))
}

/// `[name="value"]` with the value escaped for a double-quoted CSS string
pub fn attribute_selector(name: &str, value: &str) -> String {
    format!("[{}=\"{}\"]", name, escape_css_string(value))
}

fn text_selector<E: ElementView>(element: &E) -> Option<String> {
    let tag = element.tag_name().to_ascii_lowercase();
    if !TEXT_SELECTOR_TAGS.contains(&tag.as_str()) {
        return None;
    }

    let full = element.text();
    let text = truncate_chars(full.trim(), TEXT_SELECTOR_MAX_CHARS);
    if text.is_empty() {
        return None;
    }

    Some(format!("{}:text(\"{}\")", tag, escape_css_string(text)))
}

fn escape_css_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' | '\r' => escaped.push(' '),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// First `max` characters of `s`, on a char boundary
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
