//! DomDriver - the DOM contract consumed by the interaction layer
//!
//! Every operation in this crate reaches the page through this trait, so the
//! same locator, detector and strategies run against a live Chromium page
//! (`browser` feature) or the in-process [`MemoryDom`](crate::memory::MemoryDom).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Widgets / ScenarioRunner                                        │
//! │      │ locate → classify → apply                                 │
//! │      ▼                                                           │
//! │  DomDriver (async trait)                                         │
//! │      ├── CdpDriver   (chromiumoxide, page-side node registry)    │
//! │      └── MemoryDom   (simulated controlled-input model)          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The trait exposes primitives only. Nothing here knows about labels,
//! variants or strategies.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::ProbeResult;

/// Opaque handle to an element owned by a driver
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeRef(pub u64);

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A point in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Attribute predicate inside an [`ElementQuery`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrFilter {
    /// Attribute is present with any value
    Present(String),
    /// Attribute equals the given value
    Equals(String, String),
}

/// Structural element query, translated to CSS by browser backends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementQuery {
    /// Tag name (lowercase); `None` matches any element
    pub tag: Option<String>,
    /// Attribute predicates, all of which must hold
    pub attrs: Vec<AttrFilter>,
    /// Only return rendered, visible elements
    pub visible_only: bool,
}

impl ElementQuery {
    /// Match any element
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Match a tag name
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into().to_ascii_lowercase()),
            ..Self::default()
        }
    }

    /// `input[type=<kind>]`
    #[must_use]
    pub fn input_type(kind: &str) -> Self {
        Self::tag("input").with_attr("type", kind)
    }

    /// `[role=<role>]`
    #[must_use]
    pub fn role(role: &str) -> Self {
        Self::any().with_attr("role", role)
    }

    /// Require an attribute value
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push(AttrFilter::Equals(name.into(), value.into()));
        self
    }

    /// Require an attribute to be present
    #[must_use]
    pub fn with_attr_present(mut self, name: impl Into<String>) -> Self {
        self.attrs.push(AttrFilter::Present(name.into()));
        self
    }

    /// Only match visible elements
    #[must_use]
    pub const fn visible(mut self) -> Self {
        self.visible_only = true;
        self
    }

    /// Render as a CSS selector
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut css = self.tag.clone().unwrap_or_else(|| "*".to_string());
        for attr in &self.attrs {
            match attr {
                AttrFilter::Present(name) => css.push_str(&format!("[{name}]")),
                AttrFilter::Equals(name, value) => {
                    css.push_str(&format!("[{name}={}]", css_string(value)));
                }
            }
        }
        css
    }

    /// Check a described node against this query
    #[must_use]
    pub fn matches(&self, node: &NodeInfo) -> bool {
        if let Some(tag) = &self.tag {
            if !node.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if self.visible_only && !node.visible {
            return false;
        }
        self.attrs.iter().all(|attr| match attr {
            AttrFilter::Present(name) => node.attributes.contains_key(name),
            AttrFilter::Equals(name, value) => node.attr(name) == Some(value.as_str()),
        })
    }
}

fn css_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Snapshot of a single element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Handle of the described element
    pub node: NodeRef,
    /// Lowercase tag name
    pub tag: String,
    /// Attributes as rendered
    pub attributes: BTreeMap<String, String>,
    /// Whitespace-normalised text content
    pub text: String,
    /// Current `value` property (empty for non-form elements)
    pub value: String,
    /// Current `checked` property
    pub checked: bool,
    /// Rendered and not hidden
    pub visible: bool,
}

impl NodeInfo {
    /// Attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Tag check (case-insensitive)
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// `type` attribute of an input, defaulting to `text`
    #[must_use]
    pub fn input_type(&self) -> Option<&str> {
        if self.is("input") {
            Some(self.attr("type").unwrap_or("text"))
        } else {
            None
        }
    }

    /// Element accepts typed text
    #[must_use]
    pub fn is_text_entry(&self) -> bool {
        if self.is("textarea") {
            return true;
        }
        matches!(
            self.input_type(),
            Some("text" | "email" | "tel" | "url" | "search" | "date" | "number" | "password")
        )
    }

    /// `role` attribute
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.attr("role")
    }
}

/// Where a pointer press lands on an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClickPosition {
    /// Centre of the bounding box
    #[default]
    Center,
    /// Top-left corner of the bounding box
    TopLeft,
}

/// Options for a simulated pointer press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClickOptions {
    /// Landing point
    pub position: ClickPosition,
    /// Deliver the press to the element even if something is drawn on top of it
    pub force: bool,
}

impl ClickOptions {
    /// Ordinary press at the centre
    #[must_use]
    pub const fn new() -> Self {
        Self {
            position: ClickPosition::Center,
            force: false,
        }
    }

    /// Press that ignores overlays
    #[must_use]
    pub const fn forced() -> Self {
        Self {
            position: ClickPosition::Center,
            force: true,
        }
    }

    /// Set the landing point
    #[must_use]
    pub const fn at(mut self, position: ClickPosition) -> Self {
        self.position = position;
        self
    }
}

/// Notification type dispatched by the event synthesizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// `input`
    Input,
    /// `change`
    Change,
}

impl EventKind {
    /// DOM event name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Change => "change",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A synthetic DOM event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticEvent {
    /// Event type
    pub kind: EventKind,
    /// Propagates to ancestors
    pub bubbles: bool,
}

impl SyntheticEvent {
    /// Bubbling event of the given kind
    #[must_use]
    pub const fn bubbling(kind: EventKind) -> Self {
        Self {
            kind,
            bubbles: true,
        }
    }
}

/// Text matching mode for [`DomDriver::find_by_text`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextMatch {
    /// Normalised text equals the needle
    Exact,
    /// Normalised text contains the needle
    Contains,
}

impl TextMatch {
    /// Apply this mode to normalised text
    #[must_use]
    pub fn test(self, haystack: &str, needle: &str) -> bool {
        let haystack = normalize_text(haystack);
        let needle = normalize_text(needle);
        match self {
            Self::Exact => haystack == needle,
            Self::Contains => !needle.is_empty() && haystack.contains(&needle),
        }
    }
}

/// Collapse runs of whitespace and trim
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Abstract DOM access used by every interaction
///
/// Implementations must be strictly sequential: each call observes the
/// effects of every call that completed before it.
#[async_trait]
pub trait DomDriver: Send + Sync {
    /// Deepest elements under `scope` (document when `None`) whose text
    /// matches `text`, in document order
    async fn find_by_text(
        &self,
        scope: Option<NodeRef>,
        text: &str,
        mode: TextMatch,
    ) -> ProbeResult<Vec<NodeRef>>;

    /// Descendants of `scope` (document when `None`) matching `query`, in
    /// document order
    async fn query_all(
        &self,
        scope: Option<NodeRef>,
        query: &ElementQuery,
    ) -> ProbeResult<Vec<NodeRef>>;

    /// Describe an element
    async fn describe(&self, node: NodeRef) -> ProbeResult<NodeInfo>;

    /// Parent element
    async fn parent(&self, node: NodeRef) -> ProbeResult<Option<NodeRef>>;

    /// Next element sibling
    async fn next_sibling(&self, node: NodeRef) -> ProbeResult<Option<NodeRef>>;

    /// Previous element sibling
    async fn previous_sibling(&self, node: NodeRef) -> ProbeResult<Option<NodeRef>>;

    /// Simulated pointer press on an element
    async fn click(&self, node: NodeRef, options: ClickOptions) -> ProbeResult<()>;

    /// Simulated pointer press at a viewport point
    async fn click_at(&self, point: Point) -> ProbeResult<()>;

    /// Focus the element and type text as a user would
    async fn type_text(&self, node: NodeRef, text: &str) -> ProbeResult<()>;

    /// Clear a text-entry element the way a user would (select all, delete)
    async fn clear_text(&self, node: NodeRef) -> ProbeResult<()>;

    /// Invoke the prototype's native `value` setter, bypassing any
    /// instance-level override installed by a UI framework
    async fn native_set_value(&self, node: NodeRef, value: &str) -> ProbeResult<()>;

    /// Dispatch a synthetic event on the element
    async fn dispatch_event(&self, node: NodeRef, event: SyntheticEvent) -> ProbeResult<()>;
}
