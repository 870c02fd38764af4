//! Generic form operations
//!
//! Every operation runs locate → classify → apply against whatever
//! [`DomDriver`] it is given, so the same call fills a Material, Chakra or
//! Bootstrap rendering of a field.
//!
//! ```ignore
//! let widgets = Widgets::new(&driver);
//! widgets.select("Department", "Engineering").await?;
//! widgets.set_rating("Rate Your Overall Technical Proficiency", 5).await?;
//! widgets.toggle_switch("Available for Immediate Start").await?;
//! ```

use crate::config::ProbeConfig;
use crate::driver::{ClickOptions, DomDriver, ElementQuery, NodeInfo, NodeRef};
use crate::locator::WidgetLocator;
use crate::result::{ProbeError, ProbeResult};
use crate::strategy::{best_match, StrategyOutcome, TargetValue, ValueSetter};
use crate::variant::{ControlDescriptor, VariantDetector, VariantKind};
use crate::wait::poll_until;

/// Ancestor levels searched for the label wrapping a text anchor
const LABEL_SEARCH_DEPTH: usize = 2;

/// Generic operations over a driver
#[derive(Debug)]
pub struct Widgets<'a, D: DomDriver + ?Sized> {
    driver: &'a D,
    config: ProbeConfig,
}

impl<'a, D: DomDriver + ?Sized> Widgets<'a, D> {
    /// Create with default configuration
    #[must_use]
    pub fn new(driver: &'a D) -> Self {
        Self {
            driver,
            config: ProbeConfig::default(),
        }
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: ProbeConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &'a D {
        self.driver
    }

    fn locator(&self) -> WidgetLocator<'a, D> {
        WidgetLocator::new(self.driver).with_exact_first(self.config.exact_label_first)
    }

    fn setter(&self) -> ValueSetter<'_, D> {
        ValueSetter::new(self.driver, &self.config)
    }

    /// Locate and classify the control under `label`
    pub async fn describe_control(&self, label: &str) -> ProbeResult<ControlDescriptor> {
        let located = self.locator().locate(label).await?;
        let variant = VariantDetector::new(self.driver).classify(&located).await?;
        Ok(ControlDescriptor::new(located.root, label, variant))
    }

    async fn expect_kind(
        &self,
        label: &str,
        accepts: fn(&VariantKind) -> bool,
        family: &str,
    ) -> ProbeResult<ControlDescriptor> {
        let control = self.describe_control(label).await?;
        if accepts(&control.variant) {
            Ok(control)
        } else {
            Err(ProbeError::unresolved(
                label,
                format!("{} is not a {family} control", control.variant),
            ))
        }
    }

    // =========================================================================
    // Text entry
    // =========================================================================

    /// Type into the text entry under `label` (or named `label`)
    pub async fn type_into(&self, label: &str, text: &str) -> ProbeResult<()> {
        let located = self.locator().locate(label).await?;
        let entry = self
            .text_entry(located.root)
            .await?
            .ok_or_else(|| ProbeError::not_found(format!("text entry for '{label}'")))?;
        self.driver.type_text(entry, text).await?;
        let value = self.driver.describe(entry).await?.value;
        if !value.contains(text) {
            return Err(ProbeError::assertion(format!(
                "'{label}' holds '{value}' after typing '{text}'"
            )));
        }
        tracing::info!(label, "typed text");
        Ok(())
    }

    async fn text_entry(&self, root: NodeRef) -> ProbeResult<Option<NodeRef>> {
        let info = self.driver.describe(root).await?;
        if info.is_text_entry() {
            return Ok(Some(root));
        }
        for node in self.driver.query_all(Some(root), &ElementQuery::any()).await? {
            let info = self.driver.describe(node).await?;
            if info.is_text_entry() && info.visible {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    // =========================================================================
    // Choices
    // =========================================================================

    /// Select the option whose text matches `option`
    pub async fn select(&self, label: &str, option: &str) -> ProbeResult<StrategyOutcome> {
        let control = self.expect_kind(label, VariantKind::is_choice, "choice").await?;
        self.setter()
            .apply(&control, &TargetValue::Choice(option.to_string()))
            .await
    }

    /// Select several options
    ///
    /// A multi-value popup stays open across the picks; other choice
    /// controls take them one after another.
    pub async fn select_many(&self, label: &str, options: &[&str]) -> ProbeResult<Vec<StrategyOutcome>> {
        let control = self.expect_kind(label, VariantKind::is_choice, "choice").await?;
        self.setter().apply_many(&control, options).await
    }

    /// Add entries to a typeahead multi-select by typing each one
    pub async fn pick_options(&self, field: &str, options: &[&str]) -> ProbeResult<Vec<StrategyOutcome>> {
        let located = self.locator().locate(field).await?;
        let input = VariantDetector::new(self.driver)
            .classify_typeahead(&located)
            .await?;
        let control = ControlDescriptor::new(input, field, VariantKind::TypeaheadMultiSelect);
        tracing::debug!(field, variant = %control.variant, "classified typeahead");
        let mut outcomes = Vec::with_capacity(options.len());
        for option in options {
            outcomes.push(
                self.setter()
                    .apply(&control, &TargetValue::Choice((*option).to_string()))
                    .await?,
            );
        }
        Ok(outcomes)
    }

    // =========================================================================
    // Ratings, ranges, switches
    // =========================================================================

    /// Set a rating to the 1-based `value`
    pub async fn set_rating(&self, label: &str, value: u32) -> ProbeResult<StrategyOutcome> {
        let control = self.expect_kind(label, VariantKind::is_rating, "rating").await?;
        self.setter().apply(&control, &TargetValue::Ordinal(value)).await
    }

    /// Set a slider value
    pub async fn set_range(&self, label: &str, value: f64) -> ProbeResult<StrategyOutcome> {
        let control = self.expect_kind(label, VariantKind::is_range, "range").await?;
        self.setter().apply(&control, &TargetValue::Number(value)).await
    }

    /// Flip the switch described by `text`
    pub async fn toggle_switch(&self, text: &str) -> ProbeResult<StrategyOutcome> {
        let anchor = self.locator().anchor(text).await?;
        let (variant, checkbox) = VariantDetector::new(self.driver)
            .classify_switch(anchor, text)
            .await?;
        let control = ControlDescriptor::new(checkbox, text, variant);
        self.setter().apply(&control, &TargetValue::Toggle).await
    }

    // =========================================================================
    // Labels, submission, alerts
    // =========================================================================

    /// Press the label carrying `text` (radio and checkbox groups)
    ///
    /// When the label's control can be found, the press must check a radio
    /// or flip a checkbox.
    pub async fn click_label(&self, text: &str) -> ProbeResult<()> {
        let anchor = self.locator().anchor(text).await?;
        let control = self.labelled_control(anchor).await?;
        let before = match control {
            Some(node) => Some(self.driver.describe(node).await?),
            None => None,
        };
        self.driver.click(anchor, ClickOptions::new()).await?;
        if let Some(before) = before {
            let after = self.driver.describe(before.node).await?;
            let took = if before.input_type() == Some("radio") {
                after.checked
            } else {
                after.checked != before.checked
            };
            if !took {
                return Err(ProbeError::assertion(format!(
                    "pressing '{text}' left its control {}",
                    if after.checked { "checked" } else { "unchecked" }
                )));
            }
        }
        tracing::info!(label = text, "clicked label");
        Ok(())
    }

    /// Radio or checkbox tied to the label around `anchor`
    async fn labelled_control(&self, anchor: NodeRef) -> ProbeResult<Option<NodeRef>> {
        let mut current = Some(anchor);
        for _ in 0..=LABEL_SEARCH_DEPTH {
            let Some(node) = current else {
                break;
            };
            let info = self.driver.describe(node).await?;
            if info.is("label") {
                if let Some(id) = info.attr("for") {
                    let query = ElementQuery::any().with_attr("id", id);
                    return Ok(self.driver.query_all(None, &query).await?.into_iter().next());
                }
                for candidate in self.driver.query_all(Some(node), &ElementQuery::tag("input")).await? {
                    let candidate_info = self.driver.describe(candidate).await?;
                    if matches!(candidate_info.input_type(), Some("radio" | "checkbox")) {
                        return Ok(Some(candidate));
                    }
                }
                return Ok(None);
            }
            current = self.driver.parent(node).await?;
        }
        Ok(None)
    }

    /// Press the button whose text matches `text`
    pub async fn submit(&self, text: &str) -> ProbeResult<()> {
        let buttons = self.describe_all(&ElementQuery::tag("button")).await?;
        let button = best_match(&buttons, text)
            .ok_or_else(|| ProbeError::not_found(format!("button '{text}'")))?;
        self.driver.click(button.node, ClickOptions::new()).await?;
        tracing::info!(button = text, "submitted");
        Ok(())
    }

    /// Wait for a visible `role="alert"` element containing `text`
    pub async fn expect_alert(&self, text: &str) -> ProbeResult<NodeInfo> {
        let what = format!("alert containing '{text}'");
        let found = poll_until(&self.config.wait, &what, move || self.find_alert(text)).await;
        match found {
            Ok(alert) => {
                tracing::info!(alert = %alert.text, "alert visible");
                Ok(alert)
            }
            Err(ProbeError::Timeout { what, ms }) => {
                let shown: Vec<String> = self
                    .describe_all(&ElementQuery::role("alert").visible())
                    .await?
                    .into_iter()
                    .map(|a| a.text)
                    .collect();
                if shown.is_empty() {
                    Err(ProbeError::Timeout { what, ms })
                } else {
                    Err(ProbeError::assertion(format!(
                        "expected alert containing '{text}', found {shown:?}"
                    )))
                }
            }
            Err(other) => Err(other),
        }
    }

    async fn find_alert(&self, text: &str) -> ProbeResult<Option<NodeInfo>> {
        Ok(self
            .describe_all(&ElementQuery::role("alert").visible())
            .await?
            .into_iter()
            .find(|a| a.text.contains(text)))
    }

    async fn describe_all(&self, query: &ElementQuery) -> ProbeResult<Vec<NodeInfo>> {
        let nodes = self.driver.query_all(None, query).await?;
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            out.push(self.driver.describe(node).await?);
        }
        Ok(out)
    }
}
