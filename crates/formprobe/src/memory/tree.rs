//! Element tree, reactive field model and widget behaviours behind [`MemoryDom`](super::MemoryDom).

use std::collections::BTreeMap;

use crate::driver::{normalize_text, ClickOptions, ClickPosition, EventKind, NodeRef, TextMatch};
use crate::result::{ProbeError, ProbeResult};
use crate::strategy::format_number;

use super::{Behavior, Binding, ElementSpec, RecordedEvent};

pub(super) const ROOT: usize = 0;

#[derive(Debug, Clone)]
pub(super) struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub text: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub value: String,
    /// Last value the framework observed; an event only counts as a change
    /// when `value` differs from it
    pub tracker: String,
    pub checked: bool,
    pub hidden: bool,
    pub obscured: bool,
    pub binding: Binding,
    pub behavior: Option<Behavior>,
}

impl Element {
    fn from_spec(spec: ElementSpec, parent: Option<usize>) -> Self {
        Self {
            tag: spec.tag,
            attrs: spec.attrs,
            text: spec.text,
            parent,
            children: Vec::new(),
            tracker: spec.value.clone(),
            value: spec.value,
            checked: spec.checked,
            hidden: spec.hidden,
            obscured: spec.obscured,
            binding: spec.binding,
            behavior: spec.behavior,
        }
    }

    fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    fn input_type(&self) -> Option<&str> {
        if self.is("input") {
            Some(self.attrs.get("type").map_or("text", String::as_str))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Reveal {
    due: u64,
    node: usize,
}

#[derive(Debug)]
pub(super) struct DomTree {
    pub nodes: Vec<Element>,
    pub fields: BTreeMap<String, String>,
    pub listeners: Vec<usize>,
    pub events: Vec<RecordedEvent>,
    pub presses: BTreeMap<usize, usize>,
    pub dismissals: usize,
    pending: Vec<Reveal>,
    tick: u64,
}

impl DomTree {
    pub fn new() -> Self {
        let body = ElementSpec::new("body");
        Self {
            nodes: vec![Element::from_spec(body, None)],
            fields: BTreeMap::new(),
            listeners: Vec::new(),
            events: Vec::new(),
            presses: BTreeMap::new(),
            dismissals: 0,
            pending: Vec::new(),
            tick: 0,
        }
    }

    // =========================================================================
    // Construction
    // =========================================================================

    pub fn append(&mut self, parent: usize, spec: ElementSpec) -> usize {
        let id = self.nodes.len();
        let field = match &spec.binding {
            Binding::Field(field) | Binding::Mirror(field) if !spec.value.is_empty() => {
                Some((field.clone(), spec.value.clone()))
            }
            _ => None,
        };
        self.nodes.push(Element::from_spec(spec, Some(parent)));
        self.nodes[parent].children.push(id);
        if let Some((field, value)) = field {
            self.fields.entry(field).or_insert(value);
        }
        id
    }

    fn detach_children(&mut self, node: usize) {
        for child in std::mem::take(&mut self.nodes[node].children) {
            self.nodes[child].parent = None;
        }
    }

    pub fn index(&self, node: NodeRef) -> ProbeResult<usize> {
        usize::try_from(node.0)
            .ok()
            .filter(|&i| i < self.nodes.len())
            .ok_or_else(|| ProbeError::driver(format!("stale node {node}")))
    }

    // =========================================================================
    // Clock
    // =========================================================================

    /// Advance one tick and render anything that became due
    pub fn advance(&mut self) {
        self.tick += 1;
        let now = self.tick;
        let (due, later): (Vec<Reveal>, Vec<Reveal>) =
            self.pending.iter().partition(|r| r.due <= now);
        self.pending = later;
        for reveal in due {
            self.nodes[reveal.node].hidden = false;
        }
    }

    fn reveal_after(&mut self, node: usize, delay_ticks: u32) {
        self.pending.retain(|r| r.node != node);
        if delay_ticks == 0 {
            self.nodes[node].hidden = false;
        } else {
            self.nodes[node].hidden = true;
            self.pending.push(Reveal {
                due: self.tick + u64::from(delay_ticks),
                node,
            });
        }
    }

    fn conceal(&mut self, node: usize) {
        self.pending.retain(|r| r.node != node);
        self.nodes[node].hidden = true;
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn is_connected(&self, node: usize) -> bool {
        let mut current = node;
        loop {
            if current == ROOT {
                return true;
            }
            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn is_visible(&self, node: usize) -> bool {
        if !self.is_connected(node) {
            return false;
        }
        let el = &self.nodes[node];
        if el.input_type() == Some("hidden") {
            return false;
        }
        let mut current = Some(node);
        while let Some(i) = current {
            let el = &self.nodes[i];
            if el.hidden || el.attrs.contains_key("hidden") {
                return false;
            }
            current = el.parent;
        }
        true
    }

    pub fn raw_text(&self, node: usize) -> String {
        let el = &self.nodes[node];
        let mut out = el.text.clone();
        for &child in &el.children {
            out.push(' ');
            out.push_str(&self.raw_text(child));
        }
        out
    }

    pub fn text(&self, node: usize) -> String {
        normalize_text(&self.raw_text(node))
    }

    /// Connected descendants of `scope` in document order (scope excluded)
    pub fn descendants(&self, scope: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[scope].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node].children.iter().rev().copied());
        }
        out
    }

    pub fn find_by_text(&self, scope: usize, needle: &str, mode: TextMatch) -> Vec<usize> {
        self.descendants(scope)
            .into_iter()
            .filter(|&node| mode.test(&self.raw_text(node), needle))
            .filter(|&node| {
                !self.nodes[node]
                    .children
                    .iter()
                    .any(|&child| mode.test(&self.raw_text(child), needle))
            })
            .collect()
    }

    pub fn sibling(&self, node: usize, offset: isize) -> Option<usize> {
        let parent = self.nodes[node].parent?;
        let siblings = &self.nodes[parent].children;
        let pos = siblings.iter().position(|&c| c == node)?;
        let target = pos.checked_add_signed(offset)?;
        siblings.get(target).copied()
    }

    fn find_by_id(&self, id: &str) -> Option<usize> {
        self.descendants(ROOT)
            .into_iter()
            .find(|&n| self.nodes[n].attrs.get("id").map(String::as_str) == Some(id))
    }

    fn closest(&self, node: usize, pred: impl Fn(&Element) -> bool) -> Option<usize> {
        let mut current = Some(node);
        while let Some(i) = current {
            if pred(&self.nodes[i]) {
                return Some(i);
            }
            current = self.nodes[i].parent;
        }
        None
    }

    // =========================================================================
    // Field model
    // =========================================================================

    fn commit(&mut self, field: &str, value: String) {
        tracing::trace!(field, value = %value, "memory dom commit");
        self.fields.insert(field.to_string(), value.clone());
        for node in 0..self.nodes.len() {
            if matches!(&self.nodes[node].binding, Binding::Mirror(f) if f == field) {
                let el = &mut self.nodes[node];
                el.value = value.clone();
                el.tracker = value.clone();
            }
        }
    }

    fn field_list(&self, field: &str) -> Vec<String> {
        self.fields
            .get(field)
            .map(|v| {
                v.split(',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn toggle_in_list(&mut self, field: &str, item: &str) -> bool {
        let mut items = self.field_list(field);
        let added = if let Some(pos) = items.iter().position(|i| i == item) {
            items.remove(pos);
            false
        } else {
            items.push(item.to_string());
            true
        };
        self.commit(field, items.join(","));
        added
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn dispatch(&mut self, target: usize, kind: EventKind, bubbles: bool) {
        let value = self.nodes[target].value.clone();
        let mut current = Some(target);
        while let Some(node) = current {
            if self.listeners.contains(&node) {
                self.events.push(RecordedEvent {
                    kind,
                    target: NodeRef(target as u64),
                    listener: NodeRef(node as u64),
                    value: value.clone(),
                });
            }
            if !bubbles {
                break;
            }
            current = self.nodes[node].parent;
        }
        // The framework delegates from the document root, so only bubbling
        // events reach it.
        if bubbles && self.is_connected(target) {
            self.react(target);
        }
    }

    fn react(&mut self, target: usize) {
        let el = &self.nodes[target];
        if el.value == el.tracker {
            if let Binding::Mirror(field) = el.binding.clone() {
                self.restore_mirror(target, &field);
            }
            return;
        }
        let value = el.value.clone();
        match el.binding.clone() {
            Binding::Field(field) => {
                self.nodes[target].tracker = value.clone();
                if let Some(Behavior::TokenSelect { tokens, field: list }) =
                    self.nodes[target].behavior.clone()
                {
                    self.add_select_token(target, tokens, &list, &value);
                } else {
                    self.commit(&field, value);
                }
            }
            Binding::Mirror(field) => self.restore_mirror(target, &field),
            Binding::None => {
                self.nodes[target].tracker = value.clone();
                if let Some(Behavior::Typeahead {
                    listbox,
                    field,
                    choices,
                    delay_ticks,
                    ..
                }) = self.nodes[target].behavior.clone()
                {
                    self.refilter(target, listbox, &field, &choices, &value, delay_ticks);
                }
            }
        }
    }

    /// Controlled element without a change handler snaps back to state
    fn restore_mirror(&mut self, node: usize, field: &str) {
        let value = self.fields.get(field).cloned().unwrap_or_default();
        let el = &mut self.nodes[node];
        el.value = value.clone();
        el.tracker = value;
    }

    fn add_select_token(&mut self, select: usize, tokens: NodeRef, field: &str, value: &str) {
        let Some(option) = self.nodes[select]
            .children
            .iter()
            .copied()
            .find(|&o| self.option_value(o) == value)
        else {
            return;
        };
        let label = self.text(option);
        self.toggle_in_list(field, value);
        self.nodes[option].parent = None;
        self.nodes[select].children.retain(|&c| c != option);
        self.append_token(tokens, &label);
        let el = &mut self.nodes[select];
        el.value.clear();
        el.tracker.clear();
    }

    fn append_token(&mut self, tokens: NodeRef, label: &str) {
        let Ok(container) = self.index(tokens) else {
            return;
        };
        let chip = self.append(container, ElementSpec::new("span").text(label));
        self.append(
            chip,
            ElementSpec::new("button")
                .attr("type", "button")
                .attr("aria-label", "Remove"),
        );
    }

    pub fn option_value(&self, option: usize) -> String {
        self.nodes[option]
            .attrs
            .get("value")
            .cloned()
            .unwrap_or_else(|| self.text(option))
    }

    fn refilter(
        &mut self,
        input: usize,
        listbox: NodeRef,
        field: &str,
        choices: &[String],
        query: &str,
        delay_ticks: u32,
    ) {
        let Ok(list) = self.index(listbox) else {
            return;
        };
        self.detach_children(list);
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            self.conceal(list);
            return;
        }
        let picked = self.field_list(field);
        for choice in choices {
            if choice.to_lowercase().contains(&needle) && !picked.contains(choice) {
                self.append(
                    list,
                    ElementSpec::new("div")
                        .attr("role", "option")
                        .text(choice)
                        .behavior(Behavior::TypeaheadOption {
                            input: NodeRef(input as u64),
                        }),
                );
            }
        }
        self.reveal_after(list, delay_ticks);
    }

    // =========================================================================
    // Pointer activation
    // =========================================================================

    pub fn click(&mut self, node: usize, options: ClickOptions) -> ProbeResult<()> {
        if !self.is_connected(node) {
            return Err(ProbeError::driver(format!("node #{node} is detached")));
        }
        if !options.force {
            if !self.is_visible(node) {
                return Err(ProbeError::NotActionable {
                    reason: format!("<{}> #{node} is not visible", self.nodes[node].tag),
                });
            }
            if self.closest(node, |el| el.obscured).is_some() {
                return Err(ProbeError::NotActionable {
                    reason: format!(
                        "<{}> #{node} is covered by another element",
                        self.nodes[node].tag
                    ),
                });
            }
        }
        *self.presses.entry(node).or_default() += 1;
        self.activate(node, options.position);
        Ok(())
    }

    fn activate(&mut self, node: usize, position: ClickPosition) {
        let Some(target) = self.closest(node, |el| {
            el.behavior.is_some()
                || el.is("label")
                || matches!(el.input_type(), Some("checkbox" | "radio"))
        }) else {
            return;
        };
        if let Some(behavior) = self.nodes[target].behavior.clone() {
            self.run_behavior(target, behavior, position);
            return;
        }
        match self.nodes[target].input_type() {
            Some("checkbox") => self.toggle_checkbox(target),
            Some("radio") => self.check_radio(target),
            _ => self.activate_label(target),
        }
    }

    fn activate_label(&mut self, label: usize) {
        let control = match self.nodes[label].attrs.get("for").cloned() {
            Some(id) => self.find_by_id(&id),
            None => self.descendants(label).into_iter().find(|&n| {
                let el = &self.nodes[n];
                el.is("select")
                    || el.is("textarea")
                    || matches!(el.input_type(), Some(t) if t != "hidden")
            }),
        };
        let Some(control) = control else {
            return;
        };
        if let Some(behavior) = self.nodes[control].behavior.clone() {
            self.run_behavior(control, behavior, ClickPosition::Center);
            return;
        }
        match self.nodes[control].input_type() {
            Some("checkbox") => self.toggle_checkbox(control),
            Some("radio") => self.check_radio(control),
            _ => {}
        }
    }

    fn toggle_checkbox(&mut self, node: usize) {
        let el = &mut self.nodes[node];
        el.checked = !el.checked;
        el.tracker = el.value.clone();
        let checked = el.checked;
        let value = el.attrs.get("value").cloned();
        if let Binding::Field(field) = el.binding.clone() {
            match value {
                Some(item) => {
                    let present = self.field_list(&field).contains(&item);
                    if present != checked {
                        self.toggle_in_list(&field, &item);
                    }
                }
                None => self.commit(&field, checked.to_string()),
            }
        }
    }

    fn check_radio(&mut self, node: usize) {
        let name = self.nodes[node].attrs.get("name").cloned();
        if let Some(name) = &name {
            for other in self.descendants(ROOT) {
                if self.nodes[other].input_type() == Some("radio")
                    && self.nodes[other].attrs.get("name") == Some(name)
                {
                    self.nodes[other].checked = false;
                }
            }
        }
        self.nodes[node].checked = true;
        let value = self.nodes[node].attrs.get("value").cloned().unwrap_or_default();
        if let Binding::Field(field) = self.nodes[node].binding.clone() {
            self.commit(&field, value);
        }
    }

    fn run_behavior(&mut self, node: usize, behavior: Behavior, position: ClickPosition) {
        match behavior {
            Behavior::PopupTrigger {
                listbox,
                delay_ticks,
            } => {
                let Ok(list) = self.index(listbox) else {
                    return;
                };
                if self.nodes[list].hidden && !self.pending.iter().any(|r| r.node == list) {
                    self.nodes[node]
                        .attrs
                        .insert("aria-expanded".to_string(), "true".to_string());
                    self.reveal_after(list, delay_ticks);
                }
            }
            Behavior::PopupOption {
                trigger,
                field,
                value,
                multi,
                tokens,
            } => match tokens {
                Some(tokens) => self.pick_token_option(node, trigger, tokens, &field, &value),
                None => self.pick_popup_option(node, trigger, &field, &value, multi),
            },
            Behavior::TypeaheadOption { input } => self.pick_typeahead_option(node, input),
            Behavior::SliderTrack {
                field,
                min,
                max,
                step,
            } => {
                let ratio = match position {
                    ClickPosition::Center => 0.5,
                    ClickPosition::TopLeft => 0.0,
                };
                let raw = (max - min).mul_add(ratio, min);
                let snapped = if step > 0.0 {
                    ((raw - min) / step).round().mul_add(step, min)
                } else {
                    raw
                };
                let text = format_number(snapped.clamp(min, max));
                for thumb in self.descendants(node) {
                    if self.nodes[thumb].attrs.get("role").map(String::as_str) == Some("slider") {
                        self.nodes[thumb]
                            .attrs
                            .insert("aria-valuenow".to_string(), text.clone());
                    }
                }
                self.commit(&field, text);
            }
            Behavior::RatingSymbol { field, ordinal } => {
                self.commit(&field, ordinal.to_string());
                for other in self.descendants(ROOT) {
                    if let Some(Behavior::RatingSymbol {
                        field: f,
                        ordinal: o,
                    }) = &self.nodes[other].behavior
                    {
                        if *f != field {
                            continue;
                        }
                        let o = *o;
                        let attrs = &mut self.nodes[other].attrs;
                        if attrs.contains_key("aria-checked") {
                            attrs.insert("aria-checked".to_string(), (o == ordinal).to_string());
                        }
                        if attrs.contains_key("data-filled") {
                            attrs.insert("data-filled".to_string(), (o <= ordinal).to_string());
                        }
                    }
                }
            }
            Behavior::Submit {
                alert,
                required,
                delay_ticks,
            } => {
                let missing: Vec<&String> = required
                    .iter()
                    .filter(|f| self.fields.get(*f).map_or(true, String::is_empty))
                    .collect();
                if missing.is_empty() {
                    if let Ok(alert) = self.index(alert) {
                        self.reveal_after(alert, delay_ticks);
                    }
                } else {
                    tracing::debug!(?missing, "memory dom submit blocked");
                }
            }
            Behavior::Typeahead { .. } | Behavior::TokenSelect { .. } => {}
        }
    }

    fn pick_popup_option(
        &mut self,
        option: usize,
        trigger: NodeRef,
        field: &str,
        value: &str,
        multi: bool,
    ) {
        let Ok(trigger) = self.index(trigger) else {
            return;
        };
        let label = self.text(option);
        if multi {
            let added = self.toggle_in_list(field, value);
            self.nodes[option]
                .attrs
                .insert("aria-selected".to_string(), added.to_string());
            let display = self.field_list(field).join(", ");
            self.nodes[trigger].text = display;
        } else {
            self.commit(field, value.to_string());
            self.nodes[trigger].text = label;
            if let Some(list) = self.nodes[option].parent {
                self.conceal(list);
            }
            self.nodes[trigger]
                .attrs
                .insert("aria-expanded".to_string(), "false".to_string());
        }
    }

    fn pick_token_option(
        &mut self,
        option: usize,
        trigger: NodeRef,
        tokens: NodeRef,
        field: &str,
        value: &str,
    ) {
        let label = self.text(option);
        if !self.field_list(field).iter().any(|v| v == value) {
            self.toggle_in_list(field, value);
            self.append_token(tokens, &label);
        }
        let list = self.nodes[option].parent;
        self.nodes[option].parent = None;
        if let Some(list) = list {
            self.nodes[list].children.retain(|&c| c != option);
            self.conceal(list);
        }
        if let Ok(trigger) = self.index(trigger) {
            self.nodes[trigger]
                .attrs
                .insert("aria-expanded".to_string(), "false".to_string());
        }
    }

    fn pick_typeahead_option(&mut self, option: usize, input: NodeRef) {
        let Ok(input) = self.index(input) else {
            return;
        };
        let Some(Behavior::Typeahead {
            listbox,
            tokens,
            field,
            ..
        }) = self.nodes[input].behavior.clone()
        else {
            return;
        };
        let choice = self.text(option);
        if !self.field_list(&field).contains(&choice) {
            self.toggle_in_list(&field, &choice);
            self.append_token(tokens, &choice);
        }
        let el = &mut self.nodes[input];
        el.value.clear();
        el.tracker.clear();
        if let Ok(list) = self.index(listbox) {
            self.detach_children(list);
            self.conceal(list);
        }
    }

    /// Press outside every surface: open popups and typeahead lists close
    pub fn dismiss(&mut self) {
        self.dismissals += 1;
        for node in 0..self.nodes.len() {
            match self.nodes[node].behavior.clone() {
                Some(Behavior::PopupTrigger { listbox, .. }) => {
                    if let Ok(list) = self.index(listbox) {
                        self.conceal(list);
                    }
                    self.nodes[node]
                        .attrs
                        .insert("aria-expanded".to_string(), "false".to_string());
                }
                Some(Behavior::Typeahead { listbox, .. }) => {
                    if let Ok(list) = self.index(listbox) {
                        self.conceal(list);
                    }
                }
                _ => {}
            }
        }
    }
}
