//! Page UI state: header scroll-spy, mobile menu, theme, expandable experience.
//!
//! The generated page implements these behaviours in `static/site.js`; this
//! module is the typed model of the same rules. The generator reads it for
//! section ids, labels and thresholds, and the tests pin the behaviour down.
//! The `folio` binary never drives a page through [`Header`], [`HeaderState`],
//! [`ExperienceList`] or [`Listeners`]: they are a library surface for
//! embedders and for checking the script's rules in Rust.
//!
//! Document-level listeners (scroll, click-outside) are registered through
//! [`Listeners`]. Every registration returns a [`Subscription`] that removes
//! the handler when dropped, so a component that owns its subscriptions
//! releases them on teardown.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::{Rc, Weak};

/// Header turns opaque past this scroll offset (px).
pub const SCROLLED_THRESHOLD: f64 = 50.0;
/// Scroll-spy probe line, measured from the top of the viewport (px).
pub const SPY_PROBE_OFFSET: f64 = 100.0;
/// Nav clicks leave this much room for the fixed header (px).
pub const NAV_SCROLL_OFFSET: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionId {
    Hero,
    Experience,
    Projects,
    Contact,
}

impl SectionId {
    /// Page order. Also the navigation order.
    pub const ALL: [SectionId; 4] = [
        SectionId::Hero,
        SectionId::Experience,
        SectionId::Projects,
        SectionId::Contact,
    ];

    /// Element id / URL fragment.
    pub fn anchor(self) -> &'static str {
        match self {
            SectionId::Hero => "hero",
            SectionId::Experience => "experience",
            SectionId::Projects => "projects",
            SectionId::Contact => "contact",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SectionId::Hero => "Home",
            SectionId::Experience => "Experience",
            SectionId::Projects => "Projects",
            SectionId::Contact => "Contact",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.anchor())
    }
}

/// A section's bounding box relative to the viewport top, as reported by
/// `getBoundingClientRect()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionBounds {
    pub section: SectionId,
    pub top: f64,
    pub bottom: f64,
}

/// Where a nav click scrolls to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTarget {
    pub section: SectionId,
    pub offset: f64,
}

// =============================================================================
// Header
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderState {
    pub scrolled: bool,
    pub active: SectionId,
    pub menu_open: bool,
}

impl Default for HeaderState {
    fn default() -> Self {
        Self {
            scrolled: false,
            active: SectionId::Hero,
            menu_open: false,
        }
    }
}

impl HeaderState {
    /// Update the scrolled flag and the active section.
    ///
    /// The active section is the first one straddling the probe line. When
    /// none does (e.g. between sections) the previous one stays active.
    pub fn on_scroll(&mut self, scroll_y: f64, sections: &[SectionBounds]) {
        self.scrolled = scroll_y > SCROLLED_THRESHOLD;
        if let Some(hit) = sections
            .iter()
            .find(|b| b.top <= SPY_PROBE_OFFSET && b.bottom >= SPY_PROBE_OFFSET)
        {
            self.active = hit.section;
        }
    }

    /// Close the mobile menu on a click that landed outside it.
    pub fn on_document_click(&mut self, inside_menu: bool) {
        if self.menu_open && !inside_menu {
            self.menu_open = false;
        }
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    /// Nav item clicked: close the menu and report where to scroll.
    pub fn navigate(&mut self, section: SectionId) -> ScrollTarget {
        self.menu_open = false;
        ScrollTarget {
            section,
            offset: NAV_SCROLL_OFFSET,
        }
    }

    /// The page body must not scroll behind an open mobile menu.
    pub fn body_scroll_locked(&self) -> bool {
        self.menu_open
    }
}

// =============================================================================
// Document listeners
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    Scroll {
        y: f64,
        sections: Vec<SectionBounds>,
    },
    Click {
        inside_menu: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Scroll,
    Click,
}

impl DocumentEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DocumentEvent::Scroll { .. } => EventKind::Scroll,
            DocumentEvent::Click { .. } => EventKind::Click,
        }
    }
}

type Handler = Box<dyn FnMut(&DocumentEvent)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: BTreeMap<u64, (EventKind, Handler)>,
}

/// Single-threaded listener registry standing in for `document`.
///
/// Handlers must not subscribe or drop subscriptions while being dispatched.
#[derive(Default, Clone)]
pub struct Listeners {
    registry: Rc<RefCell<Registry>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: FnMut(&DocumentEvent) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.handlers.insert(id, (kind, Box::new(handler)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn dispatch(&self, event: &DocumentEvent) {
        let kind = event.kind();
        let mut registry = self.registry.borrow_mut();
        for (handler_kind, handler) in registry.handlers.values_mut() {
            if *handler_kind == kind {
                handler(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Removes its handler from the registry when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().handlers.remove(&self.id);
        }
    }
}

/// A mounted header: shared state plus the listeners feeding it.
pub struct Header {
    state: Rc<RefCell<HeaderState>>,
    _scroll: Subscription,
    _click: Subscription,
}

impl Header {
    pub fn mount(listeners: &Listeners) -> Self {
        let state = Rc::new(RefCell::new(HeaderState::default()));

        let on_scroll = Rc::clone(&state);
        let scroll = listeners.subscribe(EventKind::Scroll, move |event| {
            if let DocumentEvent::Scroll { y, sections } = event {
                on_scroll.borrow_mut().on_scroll(*y, sections);
            }
        });

        let on_click = Rc::clone(&state);
        let click = listeners.subscribe(EventKind::Click, move |event| {
            if let DocumentEvent::Click { inside_menu } = event {
                on_click.borrow_mut().on_document_click(*inside_menu);
            }
        });

        Self {
            state,
            _scroll: scroll,
            _click: click,
        }
    }

    pub fn state(&self) -> HeaderState {
        self.state.borrow().clone()
    }

    pub fn toggle_menu(&self) {
        self.state.borrow_mut().toggle_menu();
    }

    pub fn navigate(&self, section: SectionId) -> ScrollTarget {
        self.state.borrow_mut().navigate(section)
    }
}

// =============================================================================
// Theme
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Theme on first paint: a stored choice wins, then the system
    /// preference, then the site default.
    pub fn resolve(stored: Option<&str>, system_dark: Option<bool>, site_default: Theme) -> Self {
        match stored {
            Some("light") => Theme::Light,
            Some("dark") => Theme::Dark,
            _ => match system_dark {
                Some(true) => Theme::Dark,
                Some(false) => Theme::Light,
                None => site_default,
            },
        }
    }
}

// =============================================================================
// Experience list
// =============================================================================

/// Which experience cards have their details expanded.
#[derive(Debug, Clone, Default)]
pub struct ExperienceList {
    expanded: BTreeSet<String>,
}

impl ExperienceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one card. Returns whether it is now expanded.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }
}
