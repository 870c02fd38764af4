//! WidgetLocator - resolve human-readable label text to a control
//!
//! Three DOM conventions are supported, tried in order:
//!
//! 1. label text, control as the immediately following sibling
//! 2. label text, control as the immediately preceding sibling
//! 3. `input`/`textarea`/`select` with `name` equal to a field key
//!
//! Label text is matched the way a user reads it: an exact (whitespace
//! normalised) match is preferred, and a substring match is accepted so that
//! labels rendering live values ("Years of Experience: 5") still resolve.

use crate::driver::{DomDriver, ElementQuery, NodeInfo, NodeRef, TextMatch};
use crate::result::{ProbeError, ProbeResult};

/// Roles that mark an element as interactive
const INTERACTIVE_ROLES: &[&str] = &[
    "button",
    "checkbox",
    "combobox",
    "listbox",
    "radio",
    "radiogroup",
    "slider",
    "switch",
    "textbox",
];

/// How a control was reached from its label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacency {
    /// Control follows the label
    FollowingSibling,
    /// Control precedes the label
    PrecedingSibling,
    /// Control addressed by `name`
    NamedField,
}

/// A located control, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRoot {
    /// Root element of the control
    pub root: NodeRef,
    /// Label text (or field key) it was resolved from
    pub label: String,
    /// Element carrying the label text, absent for `name` lookups
    pub anchor: Option<NodeRef>,
    /// Convention that matched
    pub adjacency: Adjacency,
}

/// Label-to-control resolver
#[derive(Debug)]
pub struct WidgetLocator<'a, D: DomDriver + ?Sized> {
    driver: &'a D,
    exact_first: bool,
}

impl<'a, D: DomDriver + ?Sized> WidgetLocator<'a, D> {
    /// Create a locator that prefers exact label matches
    #[must_use]
    pub const fn new(driver: &'a D) -> Self {
        Self {
            driver,
            exact_first: true,
        }
    }

    /// Whether exact matches are tried before substring matches
    #[must_use]
    pub const fn with_exact_first(mut self, exact_first: bool) -> Self {
        self.exact_first = exact_first;
        self
    }

    /// Resolve `label`, using it as the field key for rule 3
    pub async fn locate(&self, label: &str) -> ProbeResult<ControlRoot> {
        self.locate_field(label, Some(label)).await
    }

    /// Resolve `label` by adjacency, then `key` by `name`
    ///
    /// Within each match tier (exact, then substring) every candidate is
    /// tried for a following control before any is tried for a preceding
    /// one.
    pub async fn locate_field(&self, label: &str, key: Option<&str>) -> ProbeResult<ControlRoot> {
        for tier in self.text_tiers(label).await? {
            for anchor in &tier {
                if let Some(root) = self.interactive_sibling(*anchor, 1).await? {
                    return Ok(self.resolved(label, root, Some(*anchor), Adjacency::FollowingSibling));
                }
            }
            for anchor in &tier {
                if let Some(root) = self.interactive_sibling(*anchor, -1).await? {
                    return Ok(self.resolved(label, root, Some(*anchor), Adjacency::PrecedingSibling));
                }
            }
        }
        if let Some(key) = key {
            if let Some(root) = self.named_field(key).await? {
                return Ok(self.resolved(key, root, None, Adjacency::NamedField));
            }
        }
        tracing::debug!(label, ?key, "label resolution failed");
        Err(ProbeError::not_found(match key {
            Some(key) if key != label => format!("label '{label}' or field '{key}'"),
            _ => format!("label '{label}'"),
        }))
    }

    /// Resolve a `name` attribute only (rule 3)
    pub async fn locate_by_name(&self, key: &str) -> ProbeResult<ControlRoot> {
        match self.named_field(key).await? {
            Some(root) => Ok(self.resolved(key, root, None, Adjacency::NamedField)),
            None => Err(ProbeError::not_found(format!("field '{key}'"))),
        }
    }

    /// Best element carrying `text`, for operations that act on the text
    /// itself (switch labels, radio and checkbox labels)
    pub async fn anchor(&self, text: &str) -> ProbeResult<NodeRef> {
        self.text_tiers(text)
            .await?
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| ProbeError::not_found(format!("text '{text}'")))
    }

    fn resolved(
        &self,
        label: &str,
        root: NodeRef,
        anchor: Option<NodeRef>,
        adjacency: Adjacency,
    ) -> ControlRoot {
        tracing::debug!(label, %root, ?adjacency, "located control");
        ControlRoot {
            root,
            label: label.to_string(),
            anchor,
            adjacency,
        }
    }

    /// Deepest elements carrying `text`, one tier per match mode (exact
    /// before substring); each tier ranks visible before hidden and
    /// `label`/`legend` before other tags
    async fn text_tiers(&self, text: &str) -> ProbeResult<Vec<Vec<NodeRef>>> {
        let modes: &[TextMatch] = if self.exact_first {
            &[TextMatch::Exact, TextMatch::Contains]
        } else {
            &[TextMatch::Contains]
        };
        let mut seen: Vec<NodeRef> = Vec::new();
        let mut tiers = Vec::with_capacity(modes.len());
        for &mode in modes {
            let mut ranked = Vec::new();
            for node in self.driver.find_by_text(None, text, mode).await? {
                if seen.contains(&node) {
                    continue;
                }
                let info = self.driver.describe(node).await?;
                ranked.push((rank(&info), node));
            }
            ranked.sort_by_key(|(r, _)| *r);
            let tier: Vec<NodeRef> = ranked.into_iter().map(|(_, n)| n).collect();
            seen.extend_from_slice(&tier);
            tiers.push(tier);
        }
        Ok(tiers)
    }

    async fn interactive_sibling(&self, anchor: NodeRef, offset: i8) -> ProbeResult<Option<NodeRef>> {
        let sibling = if offset > 0 {
            self.driver.next_sibling(anchor).await?
        } else {
            self.driver.previous_sibling(anchor).await?
        };
        match sibling {
            Some(node) if self.is_interactive(node).await? => Ok(Some(node)),
            _ => Ok(None),
        }
    }

    async fn is_interactive(&self, node: NodeRef) -> ProbeResult<bool> {
        if is_interactive_node(&self.driver.describe(node).await?) {
            return Ok(true);
        }
        for child in self.driver.query_all(Some(node), &ElementQuery::any()).await? {
            if is_interactive_node(&self.driver.describe(child).await?) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn named_field(&self, key: &str) -> ProbeResult<Option<NodeRef>> {
        for tag in ["input", "textarea", "select"] {
            let query = ElementQuery::tag(tag).with_attr("name", key);
            if let Some(node) = self.driver.query_all(None, &query).await?.into_iter().next() {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }
}

fn rank(info: &NodeInfo) -> (u8, u8) {
    let visibility = u8::from(!info.visible);
    let tag = if info.is("label") {
        0
    } else if info.is("legend") {
        1
    } else {
        2
    };
    (visibility, tag)
}

/// Element a user can operate, or that draws an operable symbol
pub(crate) fn is_interactive_node(info: &NodeInfo) -> bool {
    info.is("input")
        || info.is("select")
        || info.is("textarea")
        || info.is("button")
        || info.is("svg")
        || info.attr("aria-haspopup").is_some()
        || info.role().is_some_and(|r| INTERACTIVE_ROLES.contains(&r))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::memory::{ElementSpec, MemoryDom};

    fn text_field(dom: &MemoryDom, label: &str, name: &str) -> NodeRef {
        let group = dom.append(dom.body(), ElementSpec::new("div")).unwrap();
        dom.append(group, ElementSpec::new("label").text(label)).unwrap();
        let wrapper = dom.append(group, ElementSpec::new("div")).unwrap();
        dom.append(wrapper, ElementSpec::new("input").attr("name", name))
            .unwrap();
        wrapper
    }

    mod sibling_tests {
        use super::*;

        #[tokio::test]
        async fn test_following_sibling() {
            let dom = MemoryDom::new();
            text_field(&dom, "Email Address", "email");
            let wrapper = text_field(&dom, "Full Name", "fullname");
            let located = WidgetLocator::new(&dom).locate("Full Name").await.unwrap();
            assert_eq!(located.root, wrapper);
            assert_eq!(located.adjacency, Adjacency::FollowingSibling);
        }

        #[tokio::test]
        async fn test_preceding_sibling() {
            let dom = MemoryDom::new();
            let group = dom.append(dom.body(), ElementSpec::new("div")).unwrap();
            let input = dom
                .append(group, ElementSpec::new("input").attr("type", "checkbox"))
                .unwrap();
            dom.append(group, ElementSpec::new("label").text("Immediate Start"))
                .unwrap();
            let located = WidgetLocator::new(&dom)
                .locate("Immediate Start")
                .await
                .unwrap();
            assert_eq!(located.root, input);
            assert_eq!(located.adjacency, Adjacency::PrecedingSibling);
        }

        #[tokio::test]
        async fn test_following_control_beats_earlier_preceding_one() {
            let dom = MemoryDom::new();
            let switch_row = dom.append(dom.body(), ElementSpec::new("div")).unwrap();
            dom.append(switch_row, ElementSpec::new("input").attr("type", "checkbox"))
                .unwrap();
            dom.append(switch_row, ElementSpec::new("label").text("Status"))
                .unwrap();
            let select_row = dom.append(dom.body(), ElementSpec::new("div")).unwrap();
            dom.append(select_row, ElementSpec::new("label").text("Status"))
                .unwrap();
            let select = dom.append(select_row, ElementSpec::new("select")).unwrap();

            let located = WidgetLocator::new(&dom).locate("Status").await.unwrap();
            assert_eq!(located.root, select);
            assert_eq!(located.adjacency, Adjacency::FollowingSibling);
        }

        #[tokio::test]
        async fn test_substring_label_with_live_value() {
            let dom = MemoryDom::new();
            let group = dom.append(dom.body(), ElementSpec::new("div")).unwrap();
            dom.append(group, ElementSpec::new("label").text("Years of Experience: 5"))
                .unwrap();
            let range = dom
                .append(group, ElementSpec::new("input").attr("type", "range"))
                .unwrap();
            let located = WidgetLocator::new(&dom)
                .locate("Years of Experience")
                .await
                .unwrap();
            assert_eq!(located.root, range);
        }

        #[tokio::test]
        async fn test_label_without_control_skipped() {
            let dom = MemoryDom::new();
            dom.append(dom.body(), ElementSpec::new("h2").text("Department"))
                .unwrap();
            dom.append(dom.body(), ElementSpec::new("p").text("intro"))
                .unwrap();
            let group = dom.append(dom.body(), ElementSpec::new("div")).unwrap();
            dom.append(group, ElementSpec::new("label").text("Department"))
                .unwrap();
            let select = dom.append(group, ElementSpec::new("select")).unwrap();
            let located = WidgetLocator::new(&dom).locate("Department").await.unwrap();
            assert_eq!(located.root, select);
        }
    }

    mod name_tests {
        use super::*;

        #[tokio::test]
        async fn test_named_field_fallback() {
            let dom = MemoryDom::new();
            let input = dom
                .append(
                    dom.body(),
                    ElementSpec::new("input").attr("name", "preferredLocations"),
                )
                .unwrap();
            let located = WidgetLocator::new(&dom)
                .locate_field("Preferred Work Locations", Some("preferredLocations"))
                .await
                .unwrap();
            assert_eq!(located.root, input);
            assert_eq!(located.adjacency, Adjacency::NamedField);
            assert!(located.anchor.is_none());
        }

        #[tokio::test]
        async fn test_not_found_names_target() {
            let dom = MemoryDom::new();
            text_field(&dom, "Full Name", "fullname");
            let err = WidgetLocator::new(&dom)
                .locate("Nickname")
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::NotFound { .. }));
            assert!(err.to_string().contains("Nickname"));
        }

        #[tokio::test]
        async fn test_locate_by_name_missing() {
            let dom = MemoryDom::new();
            let err = WidgetLocator::new(&dom)
                .locate_by_name("salaryExpectation")
                .await
                .unwrap_err();
            assert!(err.to_string().contains("field 'salaryExpectation'"));
        }
    }

    #[tokio::test]
    async fn test_anchor_prefers_visible_label() {
        let dom = MemoryDom::new();
        dom.append(dom.body(), ElementSpec::new("span").text("Hybrid").hidden())
            .unwrap();
        let label = dom
            .append(dom.body(), ElementSpec::new("label").text("Hybrid"))
            .unwrap();
        let anchor = WidgetLocator::new(&dom).anchor("Hybrid").await.unwrap();
        assert_eq!(anchor, label);
    }

    #[test]
    fn test_interactive_roles() {
        let mut info = NodeInfo {
            tag: "span".to_string(),
            ..NodeInfo::default()
        };
        assert!(!is_interactive_node(&info));
        info.attributes
            .insert("role".to_string(), "slider".to_string());
        assert!(is_interactive_node(&info));
    }
}
