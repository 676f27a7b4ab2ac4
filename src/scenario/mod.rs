// src/scenario/mod.rs
//! Scripted page sessions
//!
//! A scenario describes a page, its DOM and a list of user steps in YAML:
//!
//! ```yaml
//! name: Search
//! page:
//!   url: https://example.com/
//!   title: Example
//! dom:
//!   - tag: input
//!     key: q
//!     attrs: { name: q }
//! steps:
//!   - type: { target: q, text: rust }
//!   - enter: q
//! ```
//!
//! Steps run against an in-memory `Page` in real (tokio) time, so debouncing
//! behaves exactly as it would for a user.

use crate::capture::Recorder;
use crate::dom::{ElementView, NodeBuilder, NodeId, Page};
use crate::utils::errors::{RecorderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Grace period after the last debounce window before detaching
const SETTLE_MARGIN: Duration = Duration::from_millis(50);

/// Parsed scenario document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,

    pub page: PageSpec,

    #[serde(default)]
    pub dom: Vec<NodeSpec>,

    /// Steps are written as single-key maps (`- click: go`) or bare names (`- load`)
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

/// Initial page state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageSpec {
    pub url: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub referrer: Option<String>,

    /// Whether the page has finished loading when recording starts
    #[serde(default = "default_loaded")]
    pub loaded: bool,
}

fn default_loaded() -> bool {
    true
}

/// Element in the scenario DOM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    pub tag: String,

    /// Name steps use to refer to this node
    #[serde(default)]
    pub key: Option<String>,

    #[serde(default)]
    pub attrs: BTreeMap<String, String>,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub value: Option<String>,

    /// Inline click handler present
    #[serde(default)]
    pub onclick: bool,

    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

/// One user or page action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Finish loading the page
    Load,
    Click(String),
    /// Type text one character at a time
    Type(TypeStep),
    Enter(String),
    /// Scroll to an absolute offset
    Scroll(f64),
    Wheel(f64),
    PushState(String),
    PopState(String),
    HashChange(String),
    SetTitle(String),
    /// Remove a node from the document
    Detach(String),
    /// Pause, in milliseconds
    Wait(u64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeStep {
    pub target: String,
    pub text: String,

    /// Pause after each character
    #[serde(default = "default_type_delay")]
    pub delay_ms: u64,
}

fn default_type_delay() -> u64 {
    50
}

/// Page built from a scenario, with its keyed nodes
#[derive(Debug, Clone)]
pub struct ScenarioPage {
    pub page: Page,
    keys: HashMap<String, NodeId>,
}

impl ScenarioPage {
    /// Node registered under `key`
    pub fn node(&self, key: &str) -> Result<NodeId> {
        self.keys
            .get(key)
            .copied()
            .ok_or_else(|| RecorderError::ScenarioFailed(format!("unknown node key: {}", key)))
    }
}

impl Scenario {
    /// Parse a YAML scenario
    pub fn parse(source: &str) -> Result<Self> {
        serde_yaml::from_str(source)
            .map_err(|e| RecorderError::ScenarioFailed(format!("Invalid scenario: {}", e)))
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        let source = tokio::fs::read_to_string(path).await.map_err(|e| {
            RecorderError::ScenarioFailed(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&source)
    }

    /// Display name, falling back to the page title
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.page.title.clone())
    }

    /// Build the initial page and its DOM
    pub fn build_page(&self) -> Result<ScenarioPage> {
        let page = if self.page.loaded {
            Page::new(&self.page.url, &self.page.title)
        } else {
            Page::loading(&self.page.url, &self.page.title)
        };
        if let Some(referrer) = &self.page.referrer {
            page.set_referrer(referrer);
        }

        let mut keys = HashMap::new();
        for node in &self.dom {
            append_node(&page, page.body(), node, &mut keys)?;
        }

        Ok(ScenarioPage { page, keys })
    }

    /// Execute the steps against `target`
    pub async fn run_steps(&self, target: &ScenarioPage) -> Result<()> {
        let page = &target.page;

        for (index, step) in self.steps.iter().enumerate() {
            debug!("Step {}: {:?}", index + 1, step);

            match step {
                Step::Load => page.finish_loading(),
                Step::Click(key) => page.click(target.node(key)?),
                Step::Type(typing) => {
                    let node = target.node(&typing.target)?;
                    let mut value = page
                        .element(node)
                        .and_then(|e| e.value())
                        .unwrap_or_default();
                    for ch in typing.text.chars() {
                        value.push(ch);
                        page.input(node, value.clone());
                        tokio::time::sleep(Duration::from_millis(typing.delay_ms)).await;
                    }
                }
                Step::Enter(key) => page.key_down(target.node(key)?, "Enter"),
                Step::Scroll(y) => page.scroll_to(*y),
                Step::Wheel(delta_y) => page.wheel(*delta_y),
                Step::PushState(url) => page.push_state(url),
                Step::PopState(url) => page.pop_state(url),
                Step::HashChange(url) => page.hash_change(url),
                Step::SetTitle(title) => page.set_title(title),
                Step::Detach(key) => page.detach(target.node(key)?),
                Step::Wait(ms) => tokio::time::sleep(Duration::from_millis(*ms)).await,
            }
        }

        Ok(())
    }

    /// Build the page, record every step with `recorder`, and let pending
    /// debounced events flush before detaching
    pub async fn record(&self, recorder: &Recorder) -> Result<ScenarioPage> {
        let target = self.build_page()?;
        info!(
            "Running scenario \"{}\" ({} steps) on {}",
            self.display_name(),
            self.steps.len(),
            self.page.url
        );

        let subscription = recorder.attach(&target.page);
        self.run_steps(&target).await?;

        let config = recorder.config();
        let settle = config.input_debounce().max(config.scroll_debounce()) + SETTLE_MARGIN;
        tokio::time::sleep(settle).await;
        subscription.detach();

        Ok(target)
    }
}

fn append_node(
    page: &Page,
    parent: NodeId,
    node: &NodeSpec,
    keys: &mut HashMap<String, NodeId>,
) -> Result<()> {
    let mut builder = NodeBuilder::new(&node.tag).text(&node.text);
    for (name, value) in &node.attrs {
        builder = builder.attr(name, value);
    }
    if let Some(value) = &node.value {
        builder = builder.value(value);
    }
    if node.onclick {
        builder = builder.onclick();
    }

    let id = page.append(parent, builder);

    if let Some(key) = &node.key {
        if keys.insert(key.clone(), id).is_some() {
            return Err(RecorderError::ScenarioFailed(format!(
                "duplicate node key: {}",
                key
            )));
        }
    }

    for child in &node.children {
        append_node(page, id, child, keys)?;
    }

    Ok(())
}
