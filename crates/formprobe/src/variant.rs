//! VariantDetector - structural classification of a located control
//!
//! Classification only reads the DOM: the same subtree always yields the
//! same [`VariantKind`]. Library class names are never consulted; every rule
//! looks at tags, input types and ARIA attributes.
//!
//! Priority order for a control root:
//!
//! 1. native `select` → [`VariantKind::NativeChoiceList`]
//! 2. popup trigger (`aria-haspopup`, non-text `combobox`) →
//!    [`VariantKind::PopupListbox`] / [`VariantKind::MultiValuePopup`]
//!    (removable tokens, or an `aria-multiselectable` listbox either in the
//!    subtree or named by the trigger's `aria-controls`);
//!    a text-entry `combobox` → [`VariantKind::TypeaheadMultiSelect`]
//! 3. hidden value input → [`VariantKind::HiddenValueRating`], or
//!    [`VariantKind::CompositeRangeContainer`] next to a `role=slider` thumb
//! 4. exclusive choices → [`VariantKind::ExclusiveChoiceRating`]
//! 5. vector symbols → [`VariantKind::GraphicalRating`]
//! 6. range input → [`VariantKind::NativeRangeSlider`]; a bare slider track
//!    → [`VariantKind::CompositeRangeContainer`]
//!
//! Switches are classified from their text anchor instead (rule 7), see
//! [`VariantDetector::classify_switch`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::driver::{DomDriver, ElementQuery, NodeInfo, NodeRef};
use crate::locator::ControlRoot;
use crate::result::{ProbeError, ProbeResult};

/// How a switch's checkbox is reached from its text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwitchBinding {
    /// The text sits inside the label that wraps the checkbox
    WrapsLabel,
    /// The label holding the checkbox is the text's previous sibling
    AdjacentLabel,
    /// Checkbox found by searching the text's parent
    FallbackSearch,
}

impl SwitchBinding {
    const fn as_str(self) -> &'static str {
        match self {
            Self::WrapsLabel => "wraps-label",
            Self::AdjacentLabel => "adjacent-label",
            Self::FallbackSearch => "fallback-search",
        }
    }
}

/// Closed set of structural control shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantKind {
    /// Native `select`
    NativeChoiceList,
    /// Trigger opening a single-choice option surface
    PopupListbox,
    /// Trigger opening a multi-choice option surface
    MultiValuePopup,
    /// Filter input with a live option list
    TypeaheadMultiSelect,
    /// Rating backed by a hidden value input
    HiddenValueRating,
    /// Rating drawn as vector symbols without a backing input
    GraphicalRating,
    /// Rating as a group of mutually exclusive choices
    ExclusiveChoiceRating,
    /// Native `input[type=range]`
    NativeRangeSlider,
    /// Slider drawn as a track and thumb without a native range input
    CompositeRangeContainer,
    /// Checkbox-backed switch
    CheckboxSwitch(SwitchBinding),
}

impl VariantKind {
    /// Discrete-selection variants, where applying twice must not duplicate
    #[must_use]
    pub const fn is_choice(&self) -> bool {
        matches!(
            self,
            Self::NativeChoiceList
                | Self::PopupListbox
                | Self::MultiValuePopup
                | Self::TypeaheadMultiSelect
        )
    }

    /// Rating variants
    #[must_use]
    pub const fn is_rating(&self) -> bool {
        matches!(
            self,
            Self::HiddenValueRating | Self::GraphicalRating | Self::ExclusiveChoiceRating
        )
    }

    /// Range variants
    #[must_use]
    pub const fn is_range(&self) -> bool {
        matches!(self, Self::NativeRangeSlider | Self::CompositeRangeContainer)
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckboxSwitch(binding) => write!(f, "CheckboxSwitch({})", binding.as_str()),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

/// The resolved subject of one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlDescriptor {
    /// Root element of the control
    pub root: NodeRef,
    /// Label text or field key the control was resolved from
    pub label: String,
    /// Detected shape
    pub variant: VariantKind,
}

impl ControlDescriptor {
    /// Create a descriptor
    #[must_use]
    pub fn new(root: NodeRef, label: impl Into<String>, variant: VariantKind) -> Self {
        Self {
            root,
            label: label.into(),
            variant,
        }
    }
}

/// Structural classifier over a driver
#[derive(Debug)]
pub struct VariantDetector<'a, D: DomDriver + ?Sized> {
    driver: &'a D,
}

impl<'a, D: DomDriver + ?Sized> VariantDetector<'a, D> {
    /// Create a detector
    #[must_use]
    pub const fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// Classify a located control by rules 1-6
    pub async fn classify(&self, control: &ControlRoot) -> ProbeResult<VariantKind> {
        let root = self.driver.describe(control.root).await?;
        let subtree = self.subtree(control.root).await?;
        let mut shape = classify_shape(&root, &subtree);
        if shape == Some(VariantKind::PopupListbox)
            && self.controls_multiselect(&root, &subtree).await?
        {
            shape = Some(VariantKind::MultiValuePopup);
        }
        let kind = shape
            .ok_or_else(|| ProbeError::unresolved(&control.label, describe_shape(&root, &subtree)));
        match &kind {
            Ok(kind) => tracing::debug!(label = %control.label, %kind, "classified control"),
            Err(_) => tracing::debug!(label = %control.label, tag = %root.tag, "control shape unresolved"),
        }
        kind
    }

    /// Classify a control that a caller drives by typed filter text
    ///
    /// Any text-entry root or descendant qualifies, because a typeahead's
    /// input carries no reliable marker before its list first renders.
    pub async fn classify_typeahead(&self, control: &ControlRoot) -> ProbeResult<NodeRef> {
        let root = self.driver.describe(control.root).await?;
        if root.is_text_entry() {
            return Ok(root.node);
        }
        self.subtree(control.root)
            .await?
            .into_iter()
            .find(NodeInfo::is_text_entry)
            .map(|n| n.node)
            .ok_or_else(|| {
                ProbeError::unresolved(&control.label, "no text entry for a typeahead filter")
            })
    }

    /// Rule 7: find the checkbox belonging to a switch's text
    pub async fn classify_switch(
        &self,
        anchor: NodeRef,
        label: &str,
    ) -> ProbeResult<(VariantKind, NodeRef)> {
        let parent = self.driver.parent(anchor).await?;

        if let Some(parent) = parent {
            if self.driver.describe(parent).await?.is("label") {
                if let Some(checkbox) = self.first_checkbox(parent).await? {
                    return Ok(self.switch(label, SwitchBinding::WrapsLabel, checkbox));
                }
            }
        }

        if let Some(prev) = self.driver.previous_sibling(anchor).await? {
            if self.driver.describe(prev).await?.is("label") {
                if let Some(checkbox) = self.first_checkbox(prev).await? {
                    return Ok(self.switch(label, SwitchBinding::AdjacentLabel, checkbox));
                }
            }
        }

        if let Some(parent) = parent {
            if let Some(checkbox) = self.first_checkbox(parent).await? {
                return Ok(self.switch(label, SwitchBinding::FallbackSearch, checkbox));
            }
        }

        Err(ProbeError::unresolved(label, "no checkbox reachable from switch text"))
    }

    fn switch(
        &self,
        label: &str,
        binding: SwitchBinding,
        checkbox: NodeRef,
    ) -> (VariantKind, NodeRef) {
        let kind = VariantKind::CheckboxSwitch(binding);
        tracing::debug!(label, %kind, %checkbox, "classified switch");
        (kind, checkbox)
    }

    /// Whether a popup trigger's `aria-controls` names a multi-select listbox
    ///
    /// Option surfaces are often portalled outside the control, so the
    /// subtree alone cannot show `aria-multiselectable`.
    async fn controls_multiselect(&self, root: &NodeInfo, subtree: &[NodeInfo]) -> ProbeResult<bool> {
        let controlled = std::iter::once(root)
            .chain(subtree.iter())
            .filter(|n| has_popup(n) || n.role() == Some("combobox"))
            .filter_map(|n| n.attr("aria-controls"));
        for id in controlled {
            let query = ElementQuery::any().with_attr("id", id);
            for node in self.driver.query_all(None, &query).await? {
                if self.driver.describe(node).await?.attr("aria-multiselectable") == Some("true") {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    async fn first_checkbox(&self, scope: NodeRef) -> ProbeResult<Option<NodeRef>> {
        Ok(self
            .driver
            .query_all(Some(scope), &ElementQuery::input_type("checkbox"))
            .await?
            .into_iter()
            .next())
    }

    async fn subtree(&self, root: NodeRef) -> ProbeResult<Vec<NodeInfo>> {
        let nodes = self.driver.query_all(Some(root), &ElementQuery::any()).await?;
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            out.push(self.driver.describe(node).await?);
        }
        Ok(out)
    }
}

/// Pure rule evaluation over a root and its described descendants
#[must_use]
pub fn classify_shape(root: &NodeInfo, subtree: &[NodeInfo]) -> Option<VariantKind> {
    let all = || std::iter::once(root).chain(subtree.iter());

    // 1
    if root.is("select") {
        return Some(VariantKind::NativeChoiceList);
    }

    // 2
    if all().any(|n| n.is_text_entry() && is_combobox(n)) {
        return Some(VariantKind::TypeaheadMultiSelect);
    }
    if all().any(|n| !n.is_text_entry() && (has_popup(n) || n.role() == Some("combobox"))) {
        let multi = all().any(|n| n.attr("aria-multiselectable") == Some("true"))
            || subtree.iter().any(is_remove_marker);
        return Some(if multi {
            VariantKind::MultiValuePopup
        } else {
            VariantKind::PopupListbox
        });
    }

    let has_slider_thumb = all().any(|n| n.role() == Some("slider"));

    // 3
    if all().any(|n| n.input_type() == Some("hidden")) {
        return Some(if has_slider_thumb {
            VariantKind::CompositeRangeContainer
        } else {
            VariantKind::HiddenValueRating
        });
    }

    // 4
    if all().any(is_exclusive_choice) {
        return Some(VariantKind::ExclusiveChoiceRating);
    }

    // 5
    if all().any(|n| n.is("svg")) {
        return Some(VariantKind::GraphicalRating);
    }

    // 6
    if all().any(|n| n.input_type() == Some("range")) {
        return Some(VariantKind::NativeRangeSlider);
    }
    if has_slider_thumb {
        return Some(VariantKind::CompositeRangeContainer);
    }

    None
}

fn has_popup(node: &NodeInfo) -> bool {
    matches!(node.attr("aria-haspopup"), Some("listbox" | "true"))
}

fn is_combobox(node: &NodeInfo) -> bool {
    node.role() == Some("combobox") || node.attr("aria-autocomplete").is_some()
}

/// `input[type=radio]` or an ARIA radio
pub(crate) fn is_exclusive_choice(node: &NodeInfo) -> bool {
    node.input_type() == Some("radio") || node.role() == Some("radio")
}

/// Close button of a removable selection token
pub(crate) fn is_remove_marker(node: &NodeInfo) -> bool {
    node.attr("aria-label")
        .is_some_and(|l| l.eq_ignore_ascii_case("remove"))
}

fn describe_shape(root: &NodeInfo, subtree: &[NodeInfo]) -> String {
    let mut tags: Vec<&str> = subtree.iter().map(|n| n.tag.as_str()).collect();
    tags.sort_unstable();
    tags.dedup();
    if tags.is_empty() {
        format!("<{}> without descendants matches no known shape", root.tag)
    } else {
        format!(
            "<{}> containing [{}] matches no known shape",
            root.tag,
            tags.join(", ")
        )
    }
}
