// src/selector/semantic.rs
//! Coarse semantic role of an interaction target

use crate::dom::ElementView;
use serde::{Deserialize, Serialize};

/// What an element is for, from the user's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticRole {
    LoginButton,
    SubmitButton,
    PasswordField,
    EmailField,
    SearchBox,
    Link,
    Button,
    TextField,
    GenericElement,
}

impl SemanticRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticRole::LoginButton => "login_button",
            SemanticRole::SubmitButton => "submit_button",
            SemanticRole::PasswordField => "password_field",
            SemanticRole::EmailField => "email_field",
            SemanticRole::SearchBox => "search_box",
            SemanticRole::Link => "link",
            SemanticRole::Button => "button",
            SemanticRole::TextField => "text_field",
            SemanticRole::GenericElement => "generic_element",
        }
    }
}

/// Classify an element; first matching rule wins
pub fn classify<E: ElementView>(element: &E) -> SemanticRole {
    let text = element.text().to_lowercase();
    let id = element.attribute("id").unwrap_or_default().to_lowercase();
    let class = element.attribute("class").unwrap_or_default().to_lowercase();
    let placeholder = element
        .attribute("placeholder")
        .unwrap_or_default()
        .to_lowercase();
    let input_type = element.attribute("type").unwrap_or_default().to_lowercase();

    if text.contains("login") || id.contains("login") {
        return SemanticRole::LoginButton;
    }
    if text.contains("submit") || id.contains("submit") {
        return SemanticRole::SubmitButton;
    }

    if element.is_tag("input") {
        match input_type.as_str() {
            "password" => return SemanticRole::PasswordField,
            "email" => return SemanticRole::EmailField,
            _ => {}
        }
        if placeholder.contains("search") || id.contains("search") {
            return SemanticRole::SearchBox;
        }
    }

    if element.is_tag("a") {
        return SemanticRole::Link;
    }

    if element.is_tag("button")
        || element.attribute("role").as_deref() == Some("button")
        || class.contains("btn")
        || class.contains("button")
    {
        return SemanticRole::Button;
    }

    if element.is_tag("input") || element.is_tag("textarea") || element.is_tag("select") {
        return SemanticRole::TextField;
    }

    SemanticRole::GenericElement
}
