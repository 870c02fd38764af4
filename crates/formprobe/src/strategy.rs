//! ValueSetter - apply a target value with priority-ordered strategies
//!
//! Each [`VariantKind`] maps to a fixed list of [`Strategy`] values. They
//! are tried in order; the first one whose effect is observable in the DOM
//! wins. A strategy never reports success on the strength of having acted:
//! it re-reads the control and compares against the target, so a value
//! that a framework silently reverted is a failure and the next strategy
//! runs. When every strategy fails the operation fails with
//! [`ProbeError::StrategyExhausted`], listing each attempt.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ProbeConfig;
use crate::driver::{
    normalize_text, ClickOptions, ClickPosition, DomDriver, ElementQuery, NodeInfo, NodeRef,
};
use crate::event::EventSynthesizer;
use crate::result::{ProbeError, ProbeResult};
use crate::variant::{is_exclusive_choice, is_remove_marker, ControlDescriptor, VariantKind};
use crate::wait::{poll_until, settle};

/// Ancestor levels searched for removable selection tokens
const TOKEN_SCOPE_DEPTH: usize = 3;

// =============================================================================
// TARGETS AND OUTCOMES
// =============================================================================

/// Value an operation drives a control towards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetValue {
    /// Option whose visible text matches
    Choice(String),
    /// 1-based rating ordinal
    Ordinal(u32),
    /// Numeric slider value
    Number(f64),
    /// Flip a switch
    Toggle,
}

impl fmt::Display for TargetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Choice(text) => write!(f, "'{text}'"),
            Self::Ordinal(n) => write!(f, "{n}"),
            Self::Number(v) => f.write_str(&format_number(*v)),
            Self::Toggle => f.write_str("toggle"),
        }
    }
}

/// One concrete way of applying a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Pick the native option by text and announce the change
    SelectNativeOption,
    /// Press the trigger, then press the matching option
    ActivatePopupOption,
    /// Type filter text, press the matching option, clear the filter
    FilterAndPick,
    /// Native-setter injection into the hidden value input
    InjectHiddenValue,
    /// Press the Nth exclusive choice (through its label when it has one)
    ActivateChoice,
    /// Press the Nth vector symbol
    ActivateSymbol,
    /// Native-setter injection into the range input
    InjectRangeValue,
    /// Press the track at its centre
    PressTrackCenter,
    /// Forced press on the checkbox
    PressCheckbox,
}

impl Strategy {
    /// Short name used in logs and reports
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SelectNativeOption => "select-native-option",
            Self::ActivatePopupOption => "activate-popup-option",
            Self::FilterAndPick => "filter-and-pick",
            Self::InjectHiddenValue => "inject-hidden-value",
            Self::ActivateChoice => "activate-choice",
            Self::ActivateSymbol => "activate-symbol",
            Self::InjectRangeValue => "inject-range-value",
            Self::PressTrackCenter => "press-track-center",
            Self::PressCheckbox => "press-checkbox",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strategies for a variant, highest priority first
#[must_use]
pub const fn priority(variant: VariantKind) -> &'static [Strategy] {
    match variant {
        VariantKind::NativeChoiceList => &[Strategy::SelectNativeOption],
        VariantKind::PopupListbox | VariantKind::MultiValuePopup => {
            &[Strategy::ActivatePopupOption]
        }
        VariantKind::TypeaheadMultiSelect => &[Strategy::FilterAndPick],
        VariantKind::HiddenValueRating => &[
            Strategy::InjectHiddenValue,
            Strategy::ActivateChoice,
            Strategy::ActivateSymbol,
        ],
        VariantKind::ExclusiveChoiceRating => &[Strategy::ActivateChoice],
        VariantKind::GraphicalRating => &[Strategy::ActivateSymbol],
        VariantKind::NativeRangeSlider => &[Strategy::InjectRangeValue],
        VariantKind::CompositeRangeContainer => &[Strategy::PressTrackCenter],
        VariantKind::CheckboxSwitch(_) => &[Strategy::PressCheckbox],
    }
}

/// A failed strategy and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    /// Strategy tried
    pub strategy: Strategy,
    /// Failure reason
    pub reason: String,
}

impl StrategyAttempt {
    /// Create an attempt record
    #[must_use]
    pub fn new(strategy: Strategy, reason: impl Into<String>) -> Self {
        Self {
            strategy,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for StrategyAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

/// Result of one strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyOutcome {
    /// The control now shows `observed`
    Applied {
        /// Strategy that took effect
        strategy: Strategy,
        /// Value or selection read back from the DOM
        observed: String,
    },
    /// The strategy did not produce the target
    Failed(StrategyAttempt),
}

impl StrategyOutcome {
    /// Whether the value took effect
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Read-back value of an applied outcome
    #[must_use]
    pub fn observed(&self) -> Option<&str> {
        match self {
            Self::Applied { observed, .. } => Some(observed),
            Self::Failed(_) => None,
        }
    }

    fn from_verdict(strategy: Strategy, verdict: Result<String, String>) -> Self {
        match verdict {
            Ok(observed) => Self::Applied { strategy, observed },
            Err(reason) => Self::Failed(StrategyAttempt::new(strategy, reason)),
        }
    }

    fn failed(strategy: Strategy, reason: impl Into<String>) -> Self {
        Self::Failed(StrategyAttempt::new(strategy, reason))
    }
}

// =============================================================================
// VALUE SETTER
// =============================================================================

/// Runs strategies against a classified control
#[derive(Debug)]
pub struct ValueSetter<'a, D: DomDriver + ?Sized> {
    driver: &'a D,
    config: &'a ProbeConfig,
}

impl<'a, D: DomDriver + ?Sized> ValueSetter<'a, D> {
    /// Create a setter
    #[must_use]
    pub const fn new(driver: &'a D, config: &'a ProbeConfig) -> Self {
        Self { driver, config }
    }

    /// Try each strategy for the control's variant until one takes effect
    ///
    /// # Errors
    ///
    /// [`ProbeError::StrategyExhausted`] when every strategy fails;
    /// [`ProbeError::Timeout`] propagates with the label, variant and
    /// strategy prepended to what was awaited; driver errors propagate
    /// unchanged.
    pub async fn apply(
        &self,
        control: &ControlDescriptor,
        target: &TargetValue,
    ) -> ProbeResult<StrategyOutcome> {
        let mut attempts = Vec::new();
        for &strategy in priority(control.variant) {
            tracing::debug!(label = %control.label, %strategy, value = %target, "trying strategy");
            let outcome = self
                .run(strategy, control, target)
                .await
                .map_err(|err| with_context(err, control, strategy))?;
            match outcome {
                StrategyOutcome::Failed(attempt) => {
                    tracing::warn!(
                        label = %control.label,
                        %strategy,
                        reason = %attempt.reason,
                        "strategy failed"
                    );
                    attempts.push(attempt);
                }
                applied => {
                    tracing::info!(
                        label = %control.label,
                        variant = %control.variant,
                        %strategy,
                        observed = applied.observed().unwrap_or_default(),
                        "value applied"
                    );
                    return Ok(applied);
                }
            }
        }
        Err(ProbeError::StrategyExhausted {
            label: control.label.clone(),
            variant: control.variant,
            attempts,
        })
    }

    /// Apply several choices to one control
    ///
    /// A [`VariantKind::MultiValuePopup`] is opened once, every missing
    /// option is pressed while the surface stays open, and the surface is
    /// dismissed once at the end. Other variants apply each choice in turn.
    ///
    /// # Errors
    ///
    /// As [`Self::apply`]; for a multi-value popup any choice that does not
    /// show up afterwards fails the whole call.
    pub async fn apply_many(
        &self,
        control: &ControlDescriptor,
        targets: &[&str],
    ) -> ProbeResult<Vec<StrategyOutcome>> {
        if control.variant != VariantKind::MultiValuePopup {
            let mut outcomes = Vec::with_capacity(targets.len());
            for target in targets {
                let target = TargetValue::Choice((*target).to_string());
                outcomes.push(self.apply(control, &target).await?);
            }
            return Ok(outcomes);
        }

        const S: Strategy = Strategy::ActivatePopupOption;
        tracing::debug!(label = %control.label, strategy = %S, ?targets, "trying strategy");
        let outcomes = match self.activate_popup_options(control.root, targets).await {
            Ok(outcomes) => outcomes,
            Err(ProbeError::NotActionable { reason }) => vec![StrategyOutcome::failed(S, reason)],
            Err(err) => return Err(with_context(err, control, S)),
        };
        let attempts: Vec<StrategyAttempt> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                StrategyOutcome::Failed(attempt) => Some(attempt.clone()),
                StrategyOutcome::Applied { .. } => None,
            })
            .collect();
        if !attempts.is_empty() {
            tracing::warn!(label = %control.label, strategy = %S, failed = attempts.len(), "strategy failed");
            return Err(ProbeError::StrategyExhausted {
                label: control.label.clone(),
                variant: control.variant,
                attempts,
            });
        }
        tracing::info!(
            label = %control.label,
            variant = %control.variant,
            strategy = %S,
            count = outcomes.len(),
            "values applied"
        );
        Ok(outcomes)
    }

    /// Run one strategy; a refused press counts as a failed attempt
    pub async fn run(
        &self,
        strategy: Strategy,
        control: &ControlDescriptor,
        target: &TargetValue,
    ) -> ProbeResult<StrategyOutcome> {
        match self.dispatch(strategy, control.root, target).await {
            Err(ProbeError::NotActionable { reason }) => {
                Ok(StrategyOutcome::failed(strategy, reason))
            }
            other => other,
        }
    }

    async fn dispatch(
        &self,
        strategy: Strategy,
        root: NodeRef,
        target: &TargetValue,
    ) -> ProbeResult<StrategyOutcome> {
        use Strategy as S;
        use TargetValue as T;

        match (strategy, target) {
            (S::SelectNativeOption, T::Choice(text)) => self.select_native_option(root, text).await,
            (S::ActivatePopupOption, T::Choice(text)) => {
                self.activate_popup_option(root, text).await
            }
            (S::FilterAndPick, T::Choice(text)) => self.filter_and_pick(root, text).await,
            (S::InjectHiddenValue, T::Ordinal(n)) => self.inject_hidden_value(root, *n).await,
            (S::ActivateChoice, T::Ordinal(n)) => self.activate_choice(root, *n).await,
            (S::ActivateSymbol, T::Ordinal(n)) => self.activate_symbol(root, *n).await,
            (S::InjectRangeValue, T::Number(v)) => self.inject_range_value(root, *v).await,
            (S::PressTrackCenter, T::Number(v)) => self.press_track_center(root, *v).await,
            (S::PressCheckbox, T::Toggle) => self.press_checkbox(root).await,
            _ => Ok(StrategyOutcome::failed(
                strategy,
                format!("target {target} does not apply"),
            )),
        }
    }

    // =========================================================================
    // Choice strategies
    // =========================================================================

    async fn select_native_option(&self, root: NodeRef, target: &str) -> ProbeResult<StrategyOutcome> {
        const S: Strategy = Strategy::SelectNativeOption;
        if self.has_token(root, target).await? {
            return Ok(self.already_selected(S, target));
        }
        let options = self.describe_all(Some(root), &ElementQuery::tag("option")).await?;
        let Some(option) = best_match(&options, target) else {
            return Ok(StrategyOutcome::failed(
                S,
                format!("no option matching '{target}' among {}", options.len()),
            ));
        };
        let value = option
            .attr("value")
            .map_or_else(|| option.text.clone(), str::to_string);
        let text = option.text.clone();

        EventSynthesizer::new(self.driver)
            .inject_value(root, &value)
            .await?;

        let (value, text) = (value.as_str(), text.as_str());
        let verdict = settle(&self.config.settle, move || {
            self.check_select(root, value, text, target)
        })
        .await?;
        Ok(StrategyOutcome::from_verdict(S, verdict))
    }

    async fn check_select(
        &self,
        root: NodeRef,
        value: &str,
        text: &str,
        target: &str,
    ) -> ProbeResult<Result<String, String>> {
        let current = self.driver.describe(root).await?.value;
        if current == value || self.has_token(root, target).await? {
            Ok(Ok(text.to_string()))
        } else {
            Ok(Err(format!("select holds '{current}'")))
        }
    }

    async fn activate_popup_option(&self, root: NodeRef, target: &str) -> ProbeResult<StrategyOutcome> {
        const S: Strategy = Strategy::ActivatePopupOption;
        if self.has_token(root, target).await? {
            return Ok(self.already_selected(S, target));
        }
        let Some(trigger) = self.popup_trigger(root).await? else {
            return Ok(StrategyOutcome::failed(S, "no popup trigger"));
        };

        self.driver.click(trigger, ClickOptions::new()).await?;
        let option = self.wait_for_option(target).await?;
        if option.attr("aria-selected") == Some("true") {
            tracing::debug!(option = target, "option already selected");
        } else {
            self.driver.click(option.node, ClickOptions::new()).await?;
        }
        self.dismiss_open_options().await?;

        let verdict = settle(&self.config.settle, move || {
            self.check_popup(root, trigger, target)
        })
        .await?;
        Ok(StrategyOutcome::from_verdict(S, verdict))
    }

    async fn activate_popup_options(
        &self,
        root: NodeRef,
        targets: &[&str],
    ) -> ProbeResult<Vec<StrategyOutcome>> {
        const S: Strategy = Strategy::ActivatePopupOption;
        let Some(trigger) = self.popup_trigger(root).await? else {
            return Ok(vec![StrategyOutcome::failed(S, "no popup trigger")]);
        };

        let mut opened = false;
        for &target in targets {
            if self.has_token(root, target).await? {
                tracing::debug!(selection = target, "selection already present");
                continue;
            }
            if !opened {
                self.driver.click(trigger, ClickOptions::new()).await?;
                opened = true;
            }
            let option = self.wait_for_option(target).await?;
            if option.attr("aria-selected") == Some("true") {
                tracing::debug!(option = target, "option already selected");
            } else {
                self.driver.click(option.node, ClickOptions::new()).await?;
            }
        }
        if opened {
            self.dismiss_open_options().await?;
        }

        let mut outcomes = Vec::with_capacity(targets.len());
        for &target in targets {
            let verdict = settle(&self.config.settle, move || {
                self.check_popup(root, trigger, target)
            })
            .await?;
            outcomes.push(StrategyOutcome::from_verdict(S, verdict));
        }
        Ok(outcomes)
    }

    async fn check_popup(
        &self,
        root: NodeRef,
        trigger: NodeRef,
        target: &str,
    ) -> ProbeResult<Result<String, String>> {
        let shown = self.driver.describe(trigger).await?.text;
        if text_matches(&shown, target) || self.has_token(root, target).await? {
            Ok(Ok(target.to_string()))
        } else {
            Ok(Err(format!("control shows '{shown}'")))
        }
    }

    async fn filter_and_pick(&self, input: NodeRef, target: &str) -> ProbeResult<StrategyOutcome> {
        const S: Strategy = Strategy::FilterAndPick;
        if self.has_token(input, target).await? {
            return Ok(self.already_selected(S, target));
        }
        self.driver.clear_text(input).await?;
        self.driver.type_text(input, target).await?;
        let option = self.wait_for_option(target).await?;
        self.driver.click(option.node, ClickOptions::new()).await?;
        self.driver.clear_text(input).await?;
        self.dismiss_open_options().await?;

        let verdict = settle(&self.config.settle, move || self.check_token(input, target)).await?;
        Ok(StrategyOutcome::from_verdict(S, verdict))
    }

    async fn check_token(&self, input: NodeRef, target: &str) -> ProbeResult<Result<String, String>> {
        if self.has_token(input, target).await? {
            Ok(Ok(target.to_string()))
        } else {
            Ok(Err(format!("no token for '{target}' after pick")))
        }
    }

    async fn popup_trigger(&self, root: NodeRef) -> ProbeResult<Option<NodeRef>> {
        let root_info = self.driver.describe(root).await?;
        if is_trigger(&root_info) {
            return Ok(Some(root));
        }
        Ok(self
            .describe_all(Some(root), &ElementQuery::any())
            .await?
            .into_iter()
            .find(is_trigger)
            .map(|n| n.node))
    }

    async fn wait_for_option(&self, target: &str) -> ProbeResult<NodeInfo> {
        let what = format!("option '{target}'");
        poll_until(&self.config.wait, &what, move || self.find_option(target)).await
    }

    async fn find_option(&self, target: &str) -> ProbeResult<Option<NodeInfo>> {
        let options = self
            .describe_all(None, &ElementQuery::role("option").visible())
            .await?;
        Ok(best_match(&options, target).cloned())
    }

    /// Press the dismissal point while any option surface is still open
    async fn dismiss_open_options(&self) -> ProbeResult<()> {
        let open = !self
            .driver
            .query_all(None, &ElementQuery::role("option").visible())
            .await?
            .is_empty()
            || !self
                .driver
                .query_all(None, &ElementQuery::role("listbox").visible())
                .await?
                .is_empty();
        if open {
            tracing::debug!("dismissing option surface");
            self.driver.click_at(self.config.dismiss_point).await?;
        }
        Ok(())
    }

    /// Text of removable tokens near `root`
    async fn tokens_near(&self, root: NodeRef) -> ProbeResult<Vec<String>> {
        let mut scope = self.driver.parent(root).await?;
        for _ in 0..TOKEN_SCOPE_DEPTH {
            let Some(current) = scope else {
                break;
            };
            let mut tokens = Vec::new();
            let labelled = ElementQuery::any().with_attr_present("aria-label");
            for marker in self.describe_all(Some(current), &labelled).await? {
                if !is_remove_marker(&marker) {
                    continue;
                }
                if let Some(chip) = self.driver.parent(marker.node).await? {
                    tokens.push(self.driver.describe(chip).await?.text);
                }
            }
            if !tokens.is_empty() {
                return Ok(tokens);
            }
            scope = self.driver.parent(current).await?;
        }
        Ok(Vec::new())
    }

    async fn has_token(&self, root: NodeRef, target: &str) -> ProbeResult<bool> {
        let target = normalize_text(target);
        Ok(self
            .tokens_near(root)
            .await?
            .iter()
            .any(|t| normalize_text(t) == target))
    }

    fn already_selected(&self, strategy: Strategy, target: &str) -> StrategyOutcome {
        tracing::debug!(selection = target, "selection already present");
        StrategyOutcome::Applied {
            strategy,
            observed: target.to_string(),
        }
    }

    // =========================================================================
    // Rating strategies
    // =========================================================================

    async fn inject_hidden_value(&self, root: NodeRef, n: u32) -> ProbeResult<StrategyOutcome> {
        const S: Strategy = Strategy::InjectHiddenValue;
        let root_info = self.driver.describe(root).await?;
        let hidden = if root_info.input_type() == Some("hidden") {
            Some(root)
        } else {
            self.driver
                .query_all(Some(root), &ElementQuery::input_type("hidden"))
                .await?
                .into_iter()
                .next()
        };
        let Some(hidden) = hidden else {
            return Ok(StrategyOutcome::failed(S, "no hidden value input"));
        };
        EventSynthesizer::new(self.driver)
            .inject_value(hidden, &n.to_string())
            .await?;
        self.confirm_rating(S, root, n).await
    }

    async fn activate_choice(&self, root: NodeRef, n: u32) -> ProbeResult<StrategyOutcome> {
        const S: Strategy = Strategy::ActivateChoice;
        let choices: Vec<NodeInfo> = self
            .describe_all(Some(root), &ElementQuery::any())
            .await?
            .into_iter()
            .filter(is_exclusive_choice)
            .collect();
        if choices.is_empty() {
            return Ok(StrategyOutcome::failed(S, "no exclusive choice inputs"));
        }
        let wanted = n.to_string();
        let prefix = format!("{n} ");
        let pick = choices
            .iter()
            .find(|c| c.attr("value") == Some(wanted.as_str()))
            .or_else(|| {
                choices
                    .iter()
                    .find(|c| c.attr("aria-label").is_some_and(|l| l.starts_with(&prefix)))
            })
            .or_else(|| ordinal_index(n).and_then(|i| choices.get(i)));
        let Some(pick) = pick else {
            return Ok(StrategyOutcome::failed(
                S,
                format!("no choice for {n} among {}", choices.len()),
            ));
        };

        match self.label_for(pick).await? {
            Some(label) => self.driver.click(label, ClickOptions::new()).await?,
            None => self.driver.click(pick.node, ClickOptions::forced()).await?,
        }
        self.confirm_rating(S, root, n).await
    }

    async fn activate_symbol(&self, root: NodeRef, n: u32) -> ProbeResult<StrategyOutcome> {
        const S: Strategy = Strategy::ActivateSymbol;
        let symbols = self.driver.query_all(Some(root), &ElementQuery::tag("svg")).await?;
        let Some(&symbol) = ordinal_index(n).and_then(|i| symbols.get(i)) else {
            return Ok(StrategyOutcome::failed(
                S,
                format!("no symbol {n} among {}", symbols.len()),
            ));
        };
        self.driver.click(symbol, ClickOptions::forced()).await?;
        self.confirm_rating(S, root, n).await
    }

    async fn label_for(&self, choice: &NodeInfo) -> ProbeResult<Option<NodeRef>> {
        let Some(id) = choice.attr("id").filter(|_| choice.is("input")) else {
            return Ok(None);
        };
        let query = ElementQuery::tag("label").with_attr("for", id);
        Ok(self.driver.query_all(None, &query).await?.into_iter().next())
    }

    async fn confirm_rating(&self, strategy: Strategy, root: NodeRef, n: u32) -> ProbeResult<StrategyOutcome> {
        let verdict = settle(&self.config.settle, move || self.check_rating(root, n)).await?;
        Ok(StrategyOutcome::from_verdict(strategy, verdict))
    }

    async fn check_rating(&self, root: NodeRef, n: u32) -> ProbeResult<Result<String, String>> {
        Ok(match self.read_rating(root).await? {
            Some(r) if r == n => Ok(r.to_string()),
            Some(r) => Err(format!("rating reads {r}")),
            None => Err("no observable rating state".to_string()),
        })
    }

    /// Current rating: hidden value, then checked choice, then filled symbols
    async fn read_rating(&self, root: NodeRef) -> ProbeResult<Option<u32>> {
        let mut nodes = vec![self.driver.describe(root).await?];
        nodes.extend(self.describe_all(Some(root), &ElementQuery::any()).await?);

        if let Some(v) = nodes
            .iter()
            .filter(|n| n.input_type() == Some("hidden"))
            .find_map(|n| n.value.trim().parse::<u32>().ok().filter(|v| *v > 0))
        {
            return Ok(Some(v));
        }

        let choices: Vec<&NodeInfo> = nodes.iter().filter(|n| is_exclusive_choice(n)).collect();
        for (i, choice) in choices.iter().enumerate() {
            if choice.checked || choice.attr("aria-checked") == Some("true") {
                let ordinal = choice
                    .attr("value")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(i as u32 + 1);
                return Ok(Some(ordinal));
            }
        }

        let marked: Vec<&NodeInfo> = nodes
            .iter()
            .filter(|n| n.attr("data-filled").is_some())
            .collect();
        if !marked.is_empty() {
            let filled = marked
                .iter()
                .filter(|n| n.attr("data-filled") == Some("true"))
                .count();
            return Ok(Some(filled as u32));
        }
        Ok(None)
    }

    // =========================================================================
    // Range and switch strategies
    // =========================================================================

    async fn inject_range_value(&self, root: NodeRef, v: f64) -> ProbeResult<StrategyOutcome> {
        const S: Strategy = Strategy::InjectRangeValue;
        let root_info = self.driver.describe(root).await?;
        let range = if root_info.is("input") {
            Some(root)
        } else {
            let ranges = self
                .driver
                .query_all(Some(root), &ElementQuery::input_type("range"))
                .await?;
            match ranges.first() {
                Some(&r) => Some(r),
                None => self
                    .driver
                    .query_all(Some(root), &ElementQuery::tag("input"))
                    .await?
                    .into_iter()
                    .next(),
            }
        };
        let Some(range) = range else {
            return Ok(StrategyOutcome::failed(S, "no range input"));
        };
        let text = format_number(v);
        EventSynthesizer::new(self.driver).inject_value(range, &text).await?;

        let verdict = settle(&self.config.settle, move || self.check_range(range, v)).await?;
        Ok(StrategyOutcome::from_verdict(S, verdict))
    }

    async fn check_range(&self, range: NodeRef, v: f64) -> ProbeResult<Result<String, String>> {
        let current = self.driver.describe(range).await?.value;
        Ok(match current.trim().parse::<f64>() {
            Ok(read) if (read - v).abs() < f64::EPSILON => Ok(format_number(read)),
            _ => Err(format!("slider reads '{current}'")),
        })
    }

    async fn press_track_center(&self, root: NodeRef, v: f64) -> ProbeResult<StrategyOutcome> {
        const S: Strategy = Strategy::PressTrackCenter;
        let before = self.read_slider(root).await?;
        self.driver
            .click(root, ClickOptions::forced().at(ClickPosition::Center))
            .await?;

        let verdict = settle(&self.config.settle, move || {
            self.check_track(root, before, v)
        })
        .await?;
        if let Ok(observed) = &verdict {
            if *observed != format_number(v) {
                tracing::info!(wanted = v, %observed, "centre press approximates target");
            }
        }
        Ok(StrategyOutcome::from_verdict(S, verdict))
    }

    async fn check_track(
        &self,
        root: NodeRef,
        before: Option<f64>,
        v: f64,
    ) -> ProbeResult<Result<String, String>> {
        Ok(match self.read_slider(root).await? {
            None => Err("no observable slider value".to_string()),
            Some(after) if Some(after) == before && (after - v).abs() >= f64::EPSILON => {
                Err(format!("press left slider at {}", format_number(after)))
            }
            Some(after) => Ok(format_number(after)),
        })
    }

    /// Thumb `aria-valuenow`, then hidden input, then any input value
    async fn read_slider(&self, root: NodeRef) -> ProbeResult<Option<f64>> {
        let mut nodes = vec![self.driver.describe(root).await?];
        nodes.extend(self.describe_all(Some(root), &ElementQuery::any()).await?);
        let thumb = nodes
            .iter()
            .filter(|n| n.role() == Some("slider"))
            .find_map(|n| n.attr("aria-valuenow").and_then(|v| v.parse().ok()));
        Ok(thumb.or_else(|| {
            nodes
                .iter()
                .filter(|n| n.is("input"))
                .find_map(|n| n.value.trim().parse().ok())
        }))
    }

    async fn press_checkbox(&self, checkbox: NodeRef) -> ProbeResult<StrategyOutcome> {
        const S: Strategy = Strategy::PressCheckbox;
        let before = self.driver.describe(checkbox).await?.checked;
        self.driver.click(checkbox, ClickOptions::forced()).await?;
        let verdict = settle(&self.config.settle, move || {
            self.check_checkbox(checkbox, before)
        })
        .await?;
        Ok(StrategyOutcome::from_verdict(S, verdict))
    }

    async fn check_checkbox(&self, checkbox: NodeRef, before: bool) -> ProbeResult<Result<String, String>> {
        let after = self.driver.describe(checkbox).await?.checked;
        Ok(if after == before {
            Err(format!("checkbox stayed {}", on_off(after)))
        } else {
            Ok(on_off(after).to_string())
        })
    }

    async fn describe_all(
        &self,
        scope: Option<NodeRef>,
        query: &ElementQuery,
    ) -> ProbeResult<Vec<NodeInfo>> {
        let nodes = self.driver.query_all(scope, query).await?;
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            out.push(self.driver.describe(node).await?);
        }
        Ok(out)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Exact normalised text match first, then substring
pub(crate) fn best_match<'n>(nodes: &'n [NodeInfo], target: &str) -> Option<&'n NodeInfo> {
    let target = normalize_text(target);
    nodes
        .iter()
        .find(|n| normalize_text(&n.text) == target)
        .or_else(|| nodes.iter().find(|n| text_matches(&n.text, &target)))
}

/// Name the control and strategy in a timeout raised mid-strategy
fn with_context(err: ProbeError, control: &ControlDescriptor, strategy: Strategy) -> ProbeError {
    match err {
        ProbeError::Timeout { what, ms } => ProbeError::Timeout {
            what: format!("'{}' ({}) {strategy}: {what}", control.label, control.variant),
            ms,
        },
        other => other,
    }
}

fn text_matches(shown: &str, target: &str) -> bool {
    let target = normalize_text(target);
    !target.is_empty() && normalize_text(shown).contains(&target)
}

fn is_trigger(info: &NodeInfo) -> bool {
    !info.is_text_entry()
        && (matches!(info.attr("aria-haspopup"), Some("listbox" | "true"))
            || info.role() == Some("combobox"))
}

fn ordinal_index(n: u32) -> Option<usize> {
    usize::try_from(n).ok()?.checked_sub(1)
}

const fn on_off(checked: bool) -> &'static str {
    if checked {
        "on"
    } else {
        "off"
    }
}

/// Render a number without a trailing `.0`
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
