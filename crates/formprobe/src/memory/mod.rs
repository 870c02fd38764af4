//! In-process DOM with a simulated controlled-input model
//!
//! `MemoryDom` implements [`DomDriver`] without a browser. It models the
//! parts of a reactive form that the interaction layer depends on:
//!
//! - a value tracker per element, so a write through the intercepted
//!   `value` property is invisible to the framework while a write through
//!   the native setter followed by a bubbling event is committed;
//! - a field model updated only from bubbling `input`/`change` events and
//!   pointer activation;
//! - controlled elements without a change handler ([`Binding::Mirror`]) that
//!   snap back to the field model after any event;
//! - widget behaviours: popup listboxes, typeahead lists, token selects,
//!   slider tracks, rating symbols and a submit button revealing an alert;
//! - a logical clock so option surfaces and alerts can render a few driver
//!   calls after the press that caused them.
//!
//! The integration tests build Material, Chakra and Bootstrap shaped forms on
//! top of it.

mod tree;

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::driver::{
    ClickOptions, DomDriver, ElementQuery, EventKind, NodeInfo, NodeRef, Point, SyntheticEvent,
    TextMatch,
};
use crate::result::{ProbeError, ProbeResult};

use tree::{DomTree, ROOT};

// =============================================================================
// FIXTURE TYPES
// =============================================================================

/// How an element's value is tied to the field model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Binding {
    /// Not controlled
    #[default]
    None,
    /// Controlled with a change handler: changes commit to the field
    Field(String),
    /// Controlled without a change handler: renders the field and reverts
    /// any external change
    Mirror(String),
}

/// Widget behaviour attached to an element
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    /// Pressing opens `listbox` after `delay_ticks` driver calls
    PopupTrigger {
        /// Option surface
        listbox: NodeRef,
        /// Render delay
        delay_ticks: u32,
    },
    /// Option inside a popup listbox
    PopupOption {
        /// Element displaying the current selection
        trigger: NodeRef,
        /// Field updated on selection
        field: String,
        /// Value committed for this option
        value: String,
        /// Multi-value popup: toggles and stays open
        multi: bool,
        /// Picks become removable tokens here and leave the list
        tokens: Option<NodeRef>,
    },
    /// Text entry that filters `choices` into `listbox`
    Typeahead {
        /// Filtered option list
        listbox: NodeRef,
        /// Container receiving removable tokens
        tokens: NodeRef,
        /// Comma-separated list field
        field: String,
        /// Known choices
        choices: Vec<String>,
        /// Render delay after each keystroke batch
        delay_ticks: u32,
    },
    /// Option generated by a [`Behavior::Typeahead`]
    TypeaheadOption {
        /// Owning filter input
        input: NodeRef,
    },
    /// Native select that moves each pick into a token list and resets
    TokenSelect {
        /// Container receiving removable tokens
        tokens: NodeRef,
        /// Comma-separated list field
        field: String,
    },
    /// Continuous track; a press sets the value from its landing point
    SliderTrack {
        /// Field updated
        field: String,
        /// Minimum
        min: f64,
        /// Maximum
        max: f64,
        /// Step
        step: f64,
    },
    /// One symbol of a graphical rating
    RatingSymbol {
        /// Field updated
        field: String,
        /// 1-based ordinal
        ordinal: u32,
    },
    /// Submit button that reveals `alert` when every required field is set
    Submit {
        /// Alert element (initially hidden)
        alert: NodeRef,
        /// Fields that must be non-empty
        required: Vec<String>,
        /// Render delay
        delay_ticks: u32,
    },
}

/// Element description used to build a [`MemoryDom`]
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    value: String,
    checked: bool,
    hidden: bool,
    obscured: bool,
    binding: Binding,
    behavior: Option<Behavior>,
}

impl ElementSpec {
    /// New element with a tag name
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Own text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Initial value property
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Initially checked
    #[must_use]
    pub const fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    /// Not rendered (`display: none`)
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Covered by a styled overlay; only forced presses reach it
    #[must_use]
    pub const fn obscured(mut self) -> Self {
        self.obscured = true;
        self
    }

    /// Controlled with a change handler
    #[must_use]
    pub fn bind(mut self, field: impl Into<String>) -> Self {
        self.binding = Binding::Field(field.into());
        self
    }

    /// Controlled without a change handler
    #[must_use]
    pub fn mirror(mut self, field: impl Into<String>) -> Self {
        self.binding = Binding::Mirror(field.into());
        self
    }

    /// Attach a behaviour
    #[must_use]
    pub fn behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = Some(behavior);
        self
    }
}

/// Event observed by a listener registered with [`MemoryDom::listen`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Event type
    pub kind: EventKind,
    /// Element the event was dispatched on
    pub target: NodeRef,
    /// Element whose listener observed it
    pub listener: NodeRef,
    /// Target value at dispatch time
    pub value: String,
}

// =============================================================================
// MEMORY DOM
// =============================================================================

/// In-process [`DomDriver`] backend
#[derive(Debug)]
pub struct MemoryDom {
    tree: Mutex<DomTree>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Empty document with a `body` root
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Mutex::new(DomTree::new()),
        }
    }

    fn tree(&self) -> MutexGuard<'_, DomTree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Document root
    #[must_use]
    pub const fn body(&self) -> NodeRef {
        NodeRef(ROOT as u64)
    }

    /// Append an element as the last child of `parent`
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Driver`] if `parent` is unknown
    pub fn append(&self, parent: NodeRef, spec: ElementSpec) -> ProbeResult<NodeRef> {
        let mut tree = self.tree();
        let parent = tree.index(parent)?;
        Ok(NodeRef(tree.append(parent, spec) as u64))
    }

    /// Attach or replace a behaviour after construction
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Driver`] if `node` is unknown
    pub fn set_behavior(&self, node: NodeRef, behavior: Behavior) -> ProbeResult<()> {
        let mut tree = self.tree();
        let i = tree.index(node)?;
        tree.nodes[i].behavior = Some(behavior);
        Ok(())
    }

    /// Record events reaching `node`
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Driver`] if `node` is unknown
    pub fn listen(&self, node: NodeRef) -> ProbeResult<()> {
        let mut tree = self.tree();
        let i = tree.index(node)?;
        if !tree.listeners.contains(&i) {
            tree.listeners.push(i);
        }
        Ok(())
    }

    /// Events recorded so far, in dispatch order
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.tree().events.clone()
    }

    /// Presses that reached `node`
    #[must_use]
    pub fn presses(&self, node: NodeRef) -> usize {
        let tree = self.tree();
        tree.index(node)
            .map_or(0, |i| tree.presses.get(&i).copied().unwrap_or_default())
    }

    /// Presses outside every surface
    #[must_use]
    pub fn dismissals(&self) -> usize {
        self.tree().dismissals
    }

    /// Current value of a field in the model
    #[must_use]
    pub fn field(&self, name: &str) -> Option<String> {
        self.tree().fields.get(name).cloned()
    }

    /// Snapshot of the whole field model
    #[must_use]
    pub fn fields(&self) -> BTreeMap<String, String> {
        self.tree().fields.clone()
    }

    /// Write through the framework's intercepted `value` property.
    ///
    /// The tracker follows the write, so later events see no change.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Driver`] if `node` is unknown
    pub fn assign_value_property(&self, node: NodeRef, value: &str) -> ProbeResult<()> {
        let mut tree = self.tree();
        let i = tree.index(node)?;
        tree.nodes[i].value = value.to_string();
        tree.nodes[i].tracker = value.to_string();
        Ok(())
    }

    fn info(tree: &DomTree, i: usize) -> NodeInfo {
        let el = &tree.nodes[i];
        NodeInfo {
            node: NodeRef(i as u64),
            tag: el.tag.clone(),
            attributes: el.attrs.clone(),
            text: tree.text(i),
            value: el.value.clone(),
            checked: el.checked,
            visible: tree.is_visible(i),
        }
    }

    fn scope(tree: &DomTree, scope: Option<NodeRef>) -> ProbeResult<usize> {
        scope.map_or(Ok(ROOT), |s| tree.index(s))
    }
}

#[async_trait]
impl DomDriver for MemoryDom {
    async fn find_by_text(
        &self,
        scope: Option<NodeRef>,
        text: &str,
        mode: TextMatch,
    ) -> ProbeResult<Vec<NodeRef>> {
        let mut tree = self.tree();
        tree.advance();
        let scope = Self::scope(&tree, scope)?;
        Ok(tree
            .find_by_text(scope, text, mode)
            .into_iter()
            .map(|i| NodeRef(i as u64))
            .collect())
    }

    async fn query_all(
        &self,
        scope: Option<NodeRef>,
        query: &ElementQuery,
    ) -> ProbeResult<Vec<NodeRef>> {
        let mut tree = self.tree();
        tree.advance();
        let scope = Self::scope(&tree, scope)?;
        Ok(tree
            .descendants(scope)
            .into_iter()
            .filter(|&i| query.matches(&Self::info(&tree, i)))
            .map(|i| NodeRef(i as u64))
            .collect())
    }

    async fn describe(&self, node: NodeRef) -> ProbeResult<NodeInfo> {
        let mut tree = self.tree();
        tree.advance();
        let i = tree.index(node)?;
        Ok(Self::info(&tree, i))
    }

    async fn parent(&self, node: NodeRef) -> ProbeResult<Option<NodeRef>> {
        let tree = self.tree();
        let i = tree.index(node)?;
        Ok(tree.nodes[i].parent.map(|p| NodeRef(p as u64)))
    }

    async fn next_sibling(&self, node: NodeRef) -> ProbeResult<Option<NodeRef>> {
        let tree = self.tree();
        let i = tree.index(node)?;
        Ok(tree.sibling(i, 1).map(|s| NodeRef(s as u64)))
    }

    async fn previous_sibling(&self, node: NodeRef) -> ProbeResult<Option<NodeRef>> {
        let tree = self.tree();
        let i = tree.index(node)?;
        Ok(tree.sibling(i, -1).map(|s| NodeRef(s as u64)))
    }

    async fn click(&self, node: NodeRef, options: ClickOptions) -> ProbeResult<()> {
        let mut tree = self.tree();
        tree.advance();
        let i = tree.index(node)?;
        tree.click(i, options)
    }

    async fn click_at(&self, _point: Point) -> ProbeResult<()> {
        let mut tree = self.tree();
        tree.advance();
        tree.dismiss();
        Ok(())
    }

    async fn type_text(&self, node: NodeRef, text: &str) -> ProbeResult<()> {
        let mut tree = self.tree();
        tree.advance();
        let i = tree.index(node)?;
        let info = Self::info(&tree, i);
        if !info.is_text_entry() {
            return Err(ProbeError::NotActionable {
                reason: format!("<{}> {node} does not accept text", info.tag),
            });
        }
        if !info.visible {
            return Err(ProbeError::NotActionable {
                reason: format!("<{}> {node} is not visible", info.tag),
            });
        }
        tree.nodes[i].value.push_str(text);
        tree.dispatch(i, EventKind::Input, true);
        Ok(())
    }

    async fn clear_text(&self, node: NodeRef) -> ProbeResult<()> {
        let mut tree = self.tree();
        tree.advance();
        let i = tree.index(node)?;
        if tree.nodes[i].value.is_empty() {
            return Ok(());
        }
        tree.nodes[i].value.clear();
        tree.dispatch(i, EventKind::Input, true);
        Ok(())
    }

    async fn native_set_value(&self, node: NodeRef, value: &str) -> ProbeResult<()> {
        let mut tree = self.tree();
        let i = tree.index(node)?;
        let is_select = tree.nodes[i].tag == "select";
        let accepted = if is_select {
            let children = tree.nodes[i].children.clone();
            if children.iter().any(|&o| tree.option_value(o) == value) {
                value.to_string()
            } else {
                String::new()
            }
        } else {
            value.to_string()
        };
        tree.nodes[i].value = accepted;
        Ok(())
    }

    async fn dispatch_event(&self, node: NodeRef, event: SyntheticEvent) -> ProbeResult<()> {
        let mut tree = self.tree();
        let i = tree.index(node)?;
        tree.dispatch(i, event.kind, event.bubbles);
        Ok(())
    }
}
