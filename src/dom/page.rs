// src/dom/page.rs
//! In-memory page: document arena, page context and event dispatch

use crate::dom::element::ElementView;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;
use ulid::Ulid;

/// Index of a node in the page's document arena
///
/// Nodes are never freed; a removed node is only detached from its parent,
/// so a `NodeId` stays valid for the life of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Identity of one page lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(Ulid);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle returned by `Page::add_listener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Document readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// What caused a same-document URL change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationTrigger {
    PushState,
    PopState,
    HashChange,
}

/// Events dispatched to page listeners
#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    Click { target: NodeId },
    Input { target: NodeId },
    KeyDown { target: NodeId, key: String },
    Scroll,
    Wheel { delta_y: f64 },
    /// URL already updated when dispatched; `from` is the previous URL
    HistoryChange { trigger: NavigationTrigger, from: String },
    Load,
}

/// Receives dispatched DOM events
pub trait PageListener: Send + Sync {
    fn on_event(&self, page: &Page, event: &DomEvent);
}

/// Description of a node to insert
#[derive(Debug, Clone, Default)]
pub struct NodeBuilder {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    value: Option<String>,
    onclick: bool,
}

impl NodeBuilder {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn onclick(mut self) -> Self {
        self.onclick = true;
        self
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    value: Option<String>,
    onclick: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn from_builder(builder: NodeBuilder) -> Self {
        Self {
            tag: builder.tag.to_ascii_uppercase(),
            attributes: builder.attributes,
            text: builder.text,
            value: builder.value,
            onclick: builder.onclick,
            parent: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    url: String,
    title: String,
    referrer: String,
    ready_state: ReadyState,
    scroll_y: f64,
}

impl Document {
    fn new(url: String, title: String, ready_state: ReadyState) -> Self {
        let mut doc = Self {
            nodes: vec![NodeData::from_builder(NodeBuilder::new("html"))],
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            url,
            title,
            referrer: String::new(),
            ready_state,
            scroll_y: 0.0,
        };
        doc.head = doc.append(doc.root, NodeBuilder::new("head"));
        doc.body = doc.append(doc.root, NodeBuilder::new("body"));
        doc
    }

    fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    fn append(&mut self, parent: NodeId, builder: NodeBuilder) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut data = NodeData::from_builder(builder);
        if let Some(parent_node) = self.nodes.get_mut(parent.0) {
            parent_node.children.push(id);
            data.parent = Some(parent);
        }
        self.nodes.push(data);
        id
    }

    fn detach(&mut self, id: NodeId) {
        let parent = match self.nodes.get_mut(id.0) {
            Some(node) => node.parent.take(),
            None => return,
        };
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p.0)) {
            parent.children.retain(|child| *child != id);
        }
    }

    fn text(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };

        let mut parts = Vec::new();
        if !node.text.trim().is_empty() {
            parts.push(node.text.trim().to_string());
        }
        for child in &node.children {
            let child_text = self.text(*child);
            if !child_text.is_empty() {
                parts.push(child_text);
            }
        }
        parts.join(" ")
    }
}

struct PageInner {
    id: PageId,
    document: RwLock<Document>,
    listeners: Mutex<Vec<(ListenerId, Arc<dyn PageListener>)>>,
    next_listener: AtomicU64,
}

/// Shared handle to an in-memory page
///
/// Cloning yields another handle to the same page. User-action helpers
/// mutate the document first and then dispatch the matching event with no
/// lock held, so listeners can freely read the page.
#[derive(Clone)]
pub struct Page {
    inner: Arc<PageInner>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("id", &self.inner.id)
            .field("url", &self.url())
            .finish()
    }
}

impl Page {
    /// Create a fully loaded page
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_state(url, title, ReadyState::Complete)
    }

    /// Create a page that has not finished loading yet
    pub fn loading(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_state(url, title, ReadyState::Loading)
    }

    fn with_state(url: impl Into<String>, title: impl Into<String>, state: ReadyState) -> Self {
        Self {
            inner: Arc::new(PageInner {
                id: PageId(Ulid::new()),
                document: RwLock::new(Document::new(url.into(), title.into(), state)),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
            }),
        }
    }

    pub fn id(&self) -> PageId {
        self.inner.id
    }

    /// Handle that does not keep the page alive
    pub fn downgrade(&self) -> WeakPage {
        WeakPage {
            id: self.inner.id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn url(&self) -> String {
        self.inner.document.read().url.clone()
    }

    pub fn title(&self) -> String {
        self.inner.document.read().title.clone()
    }

    pub fn referrer(&self) -> String {
        self.inner.document.read().referrer.clone()
    }

    pub fn ready_state(&self) -> ReadyState {
        self.inner.document.read().ready_state
    }

    pub fn scroll_y(&self) -> f64 {
        self.inner.document.read().scroll_y
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.inner.document.write().title = title.into();
    }

    pub fn set_referrer(&self, referrer: impl Into<String>) {
        self.inner.document.write().referrer = referrer.into();
    }

    pub fn root(&self) -> NodeId {
        self.inner.document.read().root
    }

    pub fn head(&self) -> NodeId {
        self.inner.document.read().head
    }

    pub fn body(&self) -> NodeId {
        self.inner.document.read().body
    }

    /// Append a new node under `parent`
    ///
    /// An unknown parent leaves the node detached.
    pub fn append(&self, parent: NodeId, builder: NodeBuilder) -> NodeId {
        self.inner.document.write().append(parent, builder)
    }

    /// Remove a node (and its subtree) from its parent
    pub fn detach(&self, node: NodeId) {
        self.inner.document.write().detach(node);
    }

    pub fn set_attribute(&self, node: NodeId, name: impl Into<String>, value: impl Into<String>) {
        if let Some(data) = self.inner.document.write().nodes.get_mut(node.0) {
            data.attributes.insert(name.into(), value.into());
        }
    }

    pub fn set_value(&self, node: NodeId, value: impl Into<String>) {
        if let Some(data) = self.inner.document.write().nodes.get_mut(node.0) {
            data.value = Some(value.into());
        }
    }

    /// Element handle, `None` for an id this page never issued
    pub fn element(&self, node: NodeId) -> Option<Element> {
        let exists = self.inner.document.read().node(node).is_some();
        exists.then(|| Element {
            page: self.clone(),
            id: node,
        })
    }

    /// First node, in document order, whose attribute equals `value`
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        let doc = self.inner.document.read();
        let mut stack = vec![doc.root];
        while let Some(id) = stack.pop() {
            let node = doc.node(id)?;
            if node.attributes.get(name).map(String::as_str) == Some(value) {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Register a listener; events are delivered in registration order
    pub fn add_listener(&self, listener: Arc<dyn PageListener>) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        self.inner.listeners.lock().push((id, listener));
        id
    }

    /// Unregister a listener; returns whether it was registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// Deliver an event to every registered listener
    pub fn dispatch(&self, event: DomEvent) {
        let listeners: Vec<Arc<dyn PageListener>> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        trace!("Dispatching {:?} to {} listeners", event, listeners.len());

        for listener in listeners {
            listener.on_event(self, &event);
        }
    }

    pub fn click(&self, node: NodeId) {
        self.dispatch(DomEvent::Click { target: node });
    }

    /// Replace a control's value and fire `input`
    pub fn input(&self, node: NodeId, value: impl Into<String>) {
        self.set_value(node, value);
        self.dispatch(DomEvent::Input { target: node });
    }

    pub fn key_down(&self, node: NodeId, key: impl Into<String>) {
        self.dispatch(DomEvent::KeyDown {
            target: node,
            key: key.into(),
        });
    }

    /// Scroll to an absolute vertical offset (clamped at 0) and fire `scroll`
    pub fn scroll_to(&self, y: f64) {
        self.inner.document.write().scroll_y = y.max(0.0);
        self.dispatch(DomEvent::Scroll);
    }

    pub fn wheel(&self, delta_y: f64) {
        self.dispatch(DomEvent::Wheel { delta_y });
    }

    pub fn push_state(&self, url: impl Into<String>) {
        self.change_url(url.into(), NavigationTrigger::PushState);
    }

    pub fn pop_state(&self, url: impl Into<String>) {
        self.change_url(url.into(), NavigationTrigger::PopState);
    }

    pub fn hash_change(&self, url: impl Into<String>) {
        self.change_url(url.into(), NavigationTrigger::HashChange);
    }

    fn change_url(&self, url: String, trigger: NavigationTrigger) {
        let from = std::mem::replace(&mut self.inner.document.write().url, url);
        self.dispatch(DomEvent::HistoryChange { trigger, from });
    }

    /// Mark the document complete and fire `load`
    ///
    /// Does nothing when the page already finished loading.
    pub fn finish_loading(&self) {
        {
            let mut doc = self.inner.document.write();
            if doc.ready_state == ReadyState::Complete {
                return;
            }
            doc.ready_state = ReadyState::Complete;
        }
        self.dispatch(DomEvent::Load);
    }
}

/// Non-owning page handle, see `Page::downgrade`
#[derive(Clone)]
pub struct WeakPage {
    id: PageId,
    inner: Weak<PageInner>,
}

impl WeakPage {
    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn upgrade(&self) -> Option<Page> {
        self.inner.upgrade().map(|inner| Page { inner })
    }

    /// Whether any `Page` handle still exists
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl fmt::Debug for WeakPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakPage")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Element handle into a `Page`
#[derive(Clone, Debug)]
pub struct Element {
    page: Page,
    id: NodeId,
}

impl Element {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    fn read<T>(&self, f: impl FnOnce(&NodeData) -> T) -> Option<T> {
        self.page.inner.document.read().node(self.id).map(f)
    }

    fn sibling_handle(&self, id: NodeId) -> Self {
        Self {
            page: self.page.clone(),
            id,
        }
    }
}

impl ElementView for Element {
    fn tag_name(&self) -> String {
        self.read(|n| n.tag.clone()).unwrap_or_default()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.read(|n| n.attributes.get(name).cloned()).flatten()
    }

    fn parent(&self) -> Option<Self> {
        self.read(|n| n.parent)
            .flatten()
            .map(|id| self.sibling_handle(id))
    }

    fn previous_sibling(&self) -> Option<Self> {
        let doc = self.page.inner.document.read();
        let parent = doc.node(self.id)?.parent?;
        let siblings = &doc.node(parent)?.children;
        let position = siblings.iter().position(|child| *child == self.id)?;
        let previous = position.checked_sub(1).map(|p| siblings[p])?;
        drop(doc);
        Some(self.sibling_handle(previous))
    }

    fn text(&self) -> String {
        self.page.inner.document.read().text(self.id)
    }

    fn value(&self) -> Option<String> {
        self.read(|n| n.value.clone()).flatten()
    }

    fn has_click_handler(&self) -> bool {
        self.read(|n| n.onclick).unwrap_or(false)
    }
}
