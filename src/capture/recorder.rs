// src/capture/recorder.rs
//! Page listener driving the capture pipeline
//!
//! `Recorder::attach` installs one listener per page. The listener filters
//! raw events, debounces input and scroll bursts, builds records and hands
//! them to the emitter.
//!
//! Per-page state lives on the `Recorder`: whether `page_visit` is still
//! pending or already recorded, and the live listener shared by every
//! subscription to that page. Entries for pages that no longer exist are
//! pruned on the next attach or detach.

use crate::capture::builder::EventBuilder;
use crate::capture::debounce::Debouncer;
use crate::capture::filter::{is_actionable, is_enter_target, is_form_control};
use crate::capture::CaptureConfig;
use crate::dom::{
    DomEvent, Element, ListenerId, NodeId, Page, PageId, PageListener, ReadyState, WeakPage,
};
use crate::observability::CLICKS_FILTERED;
use crate::recording::emitter::{EmitterStats, EventEmitter, RecordingSink};
use crate::recording::event::{EventKind, InteractionEvent, ScrollDirection};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, trace};

const ENTER_KEY: &str = "Enter";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    /// Waiting for the page's `load` event
    Pending,
    Recorded,
}

/// Listener shared by all subscriptions to one page
struct Attachment {
    listener_id: ListenerId,
    listener: Arc<CaptureListener>,
    subscribers: usize,
}

struct PageEntry {
    page: WeakPage,
    visit: VisitState,
    attachment: Option<Attachment>,
}

struct RecorderInner {
    config: CaptureConfig,
    builder: EventBuilder,
    emitter: EventEmitter,
    pages: Mutex<HashMap<PageId, PageEntry>>,
}

impl RecorderInner {
    fn emit(&self, event: InteractionEvent) {
        self.emitter.emit(event);
    }

    /// Flip a pending visit to recorded; true when the caller must emit it
    fn take_pending_visit(&self, page: PageId) -> bool {
        let mut pages = self.pages.lock();
        match pages.get_mut(&page) {
            Some(entry) if entry.visit == VisitState::Pending => {
                entry.visit = VisitState::Recorded;
                true
            }
            _ => false,
        }
    }
}

/// Drop entries whose page is gone; page ids are never reused
fn prune(pages: &mut HashMap<PageId, PageEntry>) {
    let before = pages.len();
    pages.retain(|_, entry| entry.attachment.is_some() || entry.page.is_alive());
    if pages.len() < before {
        trace!("Pruned {} dropped pages", before - pages.len());
    }
}

/// Captures interactions from attached pages into one sink
#[derive(Clone)]
pub struct Recorder {
    inner: Arc<RecorderInner>,
}

impl Recorder {
    pub fn new(config: CaptureConfig, sink: Arc<dyn RecordingSink>) -> Self {
        Self {
            inner: Arc::new(RecorderInner {
                builder: EventBuilder::new(config.clone()),
                config,
                emitter: EventEmitter::new(sink),
                pages: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.inner.config
    }

    /// Delivery counters of the underlying emitter
    pub fn stats(&self) -> EmitterStats {
        self.inner.emitter.stats()
    }

    /// Whether `page_visit` has been recorded (or scheduled) for this page
    pub fn has_visited(&self, page: &Page) -> bool {
        self.inner.pages.lock().contains_key(&page.id())
    }

    /// Number of pages the recorder still tracks
    pub fn tracked_pages(&self) -> usize {
        let mut pages = self.inner.pages.lock();
        prune(&mut pages);
        pages.len()
    }

    /// Start capturing on `page`
    ///
    /// `page_visit` is recorded once per page: on attach when the page is
    /// complete, otherwise on its `load` event (or on a later attach if the
    /// page finished loading while nothing was attached). Further attaches to
    /// the same page share its listener, so every action is still recorded
    /// once.
    pub fn attach(&self, page: &Page) -> Subscription {
        let record_visit = {
            let mut pages = self.inner.pages.lock();
            prune(&mut pages);

            let entry = pages.entry(page.id()).or_insert_with(|| PageEntry {
                page: page.downgrade(),
                visit: VisitState::Pending,
                attachment: None,
            });

            match entry.attachment.as_mut() {
                Some(attachment) => {
                    attachment.subscribers += 1;
                    debug!(
                        "Page {} already captured, sharing listener ({} subscriptions)",
                        page.id(),
                        attachment.subscribers
                    );
                }
                None => {
                    let listener = Arc::new(CaptureListener::new(Arc::clone(&self.inner), page));
                    let listener_id = page.add_listener(listener.clone());
                    entry.attachment = Some(Attachment {
                        listener_id,
                        listener,
                        subscribers: 1,
                    });
                    info!("Recorder attached to page {} ({})", page.id(), page.url());
                }
            }

            // Checked after the listener is installed so a concurrent load
            // is seen either here or by the listener, never by both.
            if entry.visit == VisitState::Pending {
                if page.ready_state() == ReadyState::Complete {
                    entry.visit = VisitState::Recorded;
                    true
                } else {
                    debug!("Page {} still loading, deferring page_visit", page.id());
                    false
                }
            } else {
                false
            }
        };

        if record_visit {
            self.inner.emit(self.inner.builder.page_visit(page));
        }

        Subscription {
            recorder: Arc::clone(&self.inner),
            page: page.clone(),
            released: false,
        }
    }
}

/// Live attachment of a recorder to a page
///
/// Releasing the last subscription to a page (by `detach` or drop)
/// unregisters the listener and cancels pending debounced events.
pub struct Subscription {
    recorder: Arc<RecorderInner>,
    page: Page,
    released: bool,
}

impl Subscription {
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn detach(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let last = {
            let mut pages = self.recorder.pages.lock();
            let last = pages
                .get_mut(&self.page.id())
                .and_then(|entry| {
                    let attachment = entry.attachment.as_mut()?;
                    attachment.subscribers -= 1;
                    if attachment.subscribers == 0 {
                        entry.attachment.take()
                    } else {
                        None
                    }
                });
            prune(&mut pages);
            last
        };

        if let Some(attachment) = last {
            self.page.remove_listener(attachment.listener_id);
            attachment.listener.input.cancel();
            attachment.listener.scroll.cancel();
            debug!("Recorder detached from page {}", self.page.id());
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

struct CaptureListener {
    recorder: Arc<RecorderInner>,
    input: Debouncer,
    scroll: Debouncer,

    /// Offset of the last emitted scroll
    scroll_anchor: Arc<Mutex<f64>>,
}

impl CaptureListener {
    fn new(recorder: Arc<RecorderInner>, page: &Page) -> Self {
        Self {
            input: Debouncer::new(recorder.config.input_debounce()),
            scroll: Debouncer::new(recorder.config.scroll_debounce()),
            scroll_anchor: Arc::new(Mutex::new(page.scroll_y())),
            recorder,
        }
    }

    fn on_click(&self, page: &Page, target: NodeId) {
        let Some(element) = page.element(target) else {
            return;
        };

        if !is_actionable(&element) {
            trace!("Ignoring click on non-actionable {:?}", target);
            metrics::counter!(CLICKS_FILTERED).increment(1);
            return;
        }

        self.recorder.emit(self.recorder.builder.click(page, &element));
    }

    fn on_input(&self, page: &Page, target: NodeId) {
        let Some(element) = page.element(target) else {
            return;
        };

        if !is_form_control(&element) {
            trace!("Ignoring input on non-form element {:?}", target);
            return;
        }

        let recorder = Arc::clone(&self.recorder);
        self.input.call(move || emit_value(&recorder, EventKind::Input, &element));
    }

    fn on_key_down(&self, page: &Page, target: NodeId, key: &str) {
        if key != ENTER_KEY {
            return;
        }

        let Some(element) = page.element(target) else {
            return;
        };

        if is_enter_target(&element) {
            emit_value(&self.recorder, EventKind::KeypressEnter, &element);
        }
    }

    /// (Re)start the scroll window; the offset is read when it elapses
    fn schedule_scroll(&self, page: &Page) {
        let recorder = Arc::clone(&self.recorder);
        let anchor = Arc::clone(&self.scroll_anchor);
        let page = page.clone();

        self.scroll.call(move || {
            let y = page.scroll_y();
            let direction = {
                let mut anchor = anchor.lock();
                if (y - *anchor).abs() <= recorder.config.scroll_threshold_px {
                    return;
                }
                let direction = if y > *anchor {
                    ScrollDirection::Down
                } else {
                    ScrollDirection::Up
                };
                *anchor = y;
                direction
            };

            recorder.emit(recorder.builder.scroll(&page, y, direction));
        });
    }
}

fn emit_value(recorder: &RecorderInner, kind: EventKind, element: &Element) {
    recorder.emit(recorder.builder.value(kind, element.page(), element));
}

impl PageListener for CaptureListener {
    fn on_event(&self, page: &Page, event: &DomEvent) {
        match event {
            DomEvent::Click { target } => self.on_click(page, *target),
            DomEvent::Input { target } => self.on_input(page, *target),
            DomEvent::KeyDown { target, key } => self.on_key_down(page, *target, key),
            DomEvent::Scroll | DomEvent::Wheel { .. } => self.schedule_scroll(page),
            DomEvent::HistoryChange { trigger, from } => {
                self.recorder
                    .emit(self.recorder.builder.navigation(page, from, *trigger));
            }
            DomEvent::Load => {
                if self.recorder.take_pending_visit(page.id()) {
                    self.recorder.emit(self.recorder.builder.page_visit(page));
                }
            }
        }
    }
}
