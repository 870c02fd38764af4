//! Memory-backed replicas of the three job application forms.
//!
//! Each builder reproduces the DOM shape its component library renders:
//! where labels sit relative to controls, how popups and typeaheads render
//! their options, and which elements are controlled without a change
//! handler.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use formprobe::prelude::*;

pub const POSITIONS: &[&str] = &[
    "Frontend Engineer",
    "Backend Engineer",
    "Full Stack Engineer",
    "DevOps Engineer",
];
pub const DEPARTMENTS: &[&str] = &["Engineering", "Product", "Design", "Marketing"];
pub const LEVELS: &[&str] = &[
    "Junior (0-2 years)",
    "Mid-level (3-5 years)",
    "Senior (6+ years)",
];
pub const SKILLS: &[&str] = &["JavaScript", "TypeScript", "React", "Node.js", "Python"];
pub const LOCATIONS: &[&str] = &["New York", "Los Angeles", "San Francisco", "Chicago", "Austin"];
pub const EMPLOYMENT: &[(&str, &str)] = &[
    ("full-time", "Full-Time"),
    ("part-time", "Part-Time"),
    ("contract", "Contract"),
];
pub const RELOCATION: &[(&str, &str)] = &[
    ("yes", "Yes"),
    ("no", "No"),
    ("maybe", "Maybe, depends on location"),
];
pub const ALERT_TEXT: &str = "Application submitted successfully! We will be in touch soon.";

/// Fields every variant must have filled before its submit reveals the alert
pub const REQUIRED: &[&str] = &[
    "fullname",
    "email",
    "phone",
    "position",
    "department",
    "experienceLevel",
    "skills",
    "preferredLocations",
    "yearsExperience",
    "rate",
    "employmentType",
    "benefits",
    "willingToRelocate",
    "immediateStart",
    "referral",
    "availableFrom",
    "salaryExpectation",
    "coverLetter",
    "achievements",
];

/// A rendered form
pub struct Form {
    pub dom: MemoryDom,
    pub form: NodeRef,
    pub alert: NodeRef,
}

impl Form {
    pub fn widgets(&self) -> Widgets<'_, MemoryDom> {
        Widgets::new(&self.dom).with_config(fast_config())
    }

    pub fn field(&self, name: &str) -> String {
        self.dom.field(name).unwrap_or_default()
    }
}

/// Short windows so fallback strategies fail quickly
pub fn fast_config() -> ProbeConfig {
    ProbeConfig::new()
        .with_wait(WaitOptions::new().with_timeout(500).with_poll_interval(1))
        .with_settle(WaitOptions::new().with_timeout(20).with_poll_interval(1))
}

fn el(dom: &MemoryDom, parent: NodeRef, spec: ElementSpec) -> NodeRef {
    dom.append(parent, spec).unwrap()
}

fn div(dom: &MemoryDom, parent: NodeRef, class: &str) -> NodeRef {
    el(dom, parent, ElementSpec::new("div").attr("class", class))
}

fn shell(dom: &MemoryDom) -> NodeRef {
    el(dom, dom.body(), ElementSpec::new("form").attr("novalidate", ""))
}

fn submit_and_alert(dom: &MemoryDom, form: NodeRef, extra_required: &[&str]) -> NodeRef {
    let alert = el(
        dom,
        dom.body(),
        ElementSpec::new("div").attr("role", "alert").text(ALERT_TEXT).hidden(),
    );
    let mut required: Vec<String> = REQUIRED.iter().map(|s| (*s).to_string()).collect();
    required.extend(extra_required.iter().map(|s| (*s).to_string()));
    el(
        dom,
        form,
        ElementSpec::new("button")
            .attr("type", "submit")
            .text("Submit Application")
            .behavior(Behavior::Submit {
                alert,
                required,
                delay_ticks: 3,
            }),
    );
    alert
}

// =============================================================================
// MATERIAL UI
// =============================================================================

pub fn material() -> Form {
    let dom = MemoryDom::new();
    let form = shell(&dom);

    for (label, name, kind) in [
        ("Full Name", "fullname", "text"),
        ("Email Address", "email", "email"),
        ("Phone Number", "phone", "tel"),
        ("LinkedIn Profile", "linkedin", "url"),
        ("Portfolio Website", "portfolio", "url"),
    ] {
        mui_text(&dom, form, label, name, kind);
    }
    mui_select(&dom, form, "Position Applying For", "position", POSITIONS, false);
    mui_select(&dom, form, "Department", "department", DEPARTMENTS, false);
    mui_select(&dom, form, "Experience Level", "experienceLevel", LEVELS, false);
    mui_select(&dom, form, "Technical Skills", "skills", SKILLS, true);
    mui_autocomplete(&dom, form);
    mui_slider(&dom, form, "Years of Experience: 5", "yearsExperience", (0.0, 20.0, 1.0), "5");
    mui_rating(&dom, form);
    mui_radio_group(&dom, form, "Employment Type", "employmentType", EMPLOYMENT);

    let prefs = div(&dom, form, "MuiFormGroup-root");
    for (name, text) in [("remote", "Remote Work"), ("hybrid", "Hybrid"), ("onsite", "On-site")] {
        mui_checkbox(&dom, prefs, name, None, text);
    }
    let benefits = div(&dom, form, "MuiFormGroup-root");
    for (value, text) in [
        ("health", "Health Insurance"),
        ("dental", "Dental Insurance"),
        ("vision", "Vision Insurance"),
    ] {
        mui_checkbox(&dom, benefits, "benefits", Some(value), text);
    }
    mui_radio_group(&dom, form, "Willing to Relocate?", "willingToRelocate", RELOCATION);
    mui_switch(&dom, form, "immediateStart", "Available for Immediate Start");
    mui_switch(&dom, form, "referral", "Were you referred by an employee?");
    mui_text(&dom, form, "Available Start Date", "availableFrom", "date");
    mui_slider(
        &dom,
        form,
        "Salary Expectation: $80,000",
        "salaryExpectation",
        (30_000.0, 250_000.0, 5_000.0),
        "80000",
    );
    mui_textarea(&dom, form, "Cover Letter", "coverLetter");
    mui_textarea(&dom, form, "Key Achievements", "achievements");

    let alert = submit_and_alert(&dom, form, &["remote", "hybrid"]);
    Form { dom, form, alert }
}

fn mui_text(dom: &MemoryDom, form: NodeRef, label: &str, name: &str, kind: &str) {
    let control = div(dom, form, "MuiFormControl-root MuiTextField-root");
    el(dom, control, ElementSpec::new("label").text(label));
    let base = div(dom, control, "MuiInputBase-root");
    el(
        dom,
        base,
        ElementSpec::new("input").attr("type", kind).attr("name", name).bind(name),
    );
    el(dom, base, ElementSpec::new("fieldset").attr("aria-hidden", "true"));
}

fn mui_textarea(dom: &MemoryDom, form: NodeRef, label: &str, name: &str) {
    let control = div(dom, form, "MuiFormControl-root MuiTextField-root");
    el(dom, control, ElementSpec::new("label").text(label));
    let base = div(dom, control, "MuiInputBase-root MuiInputBase-multiline");
    el(dom, base, ElementSpec::new("textarea").attr("name", name).bind(name));
    el(
        dom,
        base,
        ElementSpec::new("textarea")
            .attr("aria-hidden", "true")
            .attr("readonly", "")
            .hidden(),
    );
}

fn mui_select(dom: &MemoryDom, form: NodeRef, label: &str, name: &str, options: &[&str], multi: bool) {
    let control = div(dom, form, "MuiFormControl-root");
    el(dom, control, ElementSpec::new("label").text(label));
    let base = div(dom, control, "MuiInputBase-root MuiSelect-root");
    let trigger = el(
        dom,
        base,
        ElementSpec::new("div")
            .attr("role", "combobox")
            .attr("aria-haspopup", "listbox")
            .attr("aria-expanded", "false")
            .attr("aria-controls", format!("{name}-listbox"))
            .attr("tabindex", "0"),
    );
    el(
        dom,
        base,
        ElementSpec::new("input")
            .attr("aria-hidden", "true")
            .attr("tabindex", "-1")
            .attr("name", name)
            .hidden()
            .mirror(name),
    );
    el(dom, base, ElementSpec::new("svg").attr("aria-hidden", "true"));

    let popover = el(dom, dom.body(), ElementSpec::new("div").attr("role", "presentation"));
    let mut list = ElementSpec::new("ul")
        .attr("role", "listbox")
        .attr("id", format!("{name}-listbox"))
        .hidden();
    if multi {
        list = list.attr("aria-multiselectable", "true");
    }
    let listbox = el(dom, popover, list);
    for option in options {
        el(
            dom,
            listbox,
            ElementSpec::new("li")
                .attr("role", "option")
                .text(*option)
                .behavior(Behavior::PopupOption {
                    trigger,
                    field: name.to_string(),
                    value: (*option).to_string(),
                    multi,
                    tokens: None,
                }),
        );
    }
    dom.set_behavior(
        trigger,
        Behavior::PopupTrigger {
            listbox,
            delay_ticks: 2,
        },
    )
    .unwrap();
}

fn mui_autocomplete(dom: &MemoryDom, form: NodeRef) {
    let root = div(dom, form, "MuiAutocomplete-root");
    let control = div(dom, root, "MuiFormControl-root");
    el(dom, control, ElementSpec::new("label").text("Preferred Work Locations"));
    let input_root = div(dom, control, "MuiInputBase-root MuiAutocomplete-inputRoot");
    let popper = el(dom, dom.body(), ElementSpec::new("div").attr("role", "presentation"));
    let listbox = el(dom, popper, ElementSpec::new("ul").attr("role", "listbox").hidden());
    el(
        dom,
        input_root,
        ElementSpec::new("input")
            .attr("role", "combobox")
            .attr("aria-autocomplete", "list")
            .attr("name", "preferredLocations")
            .behavior(Behavior::Typeahead {
                listbox,
                tokens: input_root,
                field: "preferredLocations".to_string(),
                choices: LOCATIONS.iter().map(|s| (*s).to_string()).collect(),
                delay_ticks: 1,
            }),
    );
}

fn mui_slider(dom: &MemoryDom, form: NodeRef, label: &str, name: &str, range: (f64, f64, f64), initial: &str) {
    let (min, max, step) = range;
    let group = div(dom, form, "MuiBox-root");
    el(dom, group, ElementSpec::new("p").text(label));
    let root = el(
        dom,
        group,
        ElementSpec::new("span")
            .attr("class", "MuiSlider-root")
            .behavior(Behavior::SliderTrack {
                field: name.to_string(),
                min,
                max,
                step,
            }),
    );
    el(dom, root, ElementSpec::new("span").attr("class", "MuiSlider-rail"));
    el(dom, root, ElementSpec::new("span").attr("class", "MuiSlider-track"));
    el(
        dom,
        root,
        ElementSpec::new("span")
            .attr("role", "slider")
            .attr("aria-valuenow", initial)
            .attr("aria-valuemin", formprobe::format_number(min))
            .attr("aria-valuemax", formprobe::format_number(max)),
    );
    el(
        dom,
        root,
        ElementSpec::new("input")
            .attr("type", "hidden")
            .attr("name", name)
            .value(initial)
            .mirror(name),
    );
}

fn mui_rating(dom: &MemoryDom, form: NodeRef) {
    let group = div(dom, form, "MuiBox-root");
    el(dom, group, ElementSpec::new("p").text("Rate Your Overall Technical Proficiency"));
    let root = el(dom, group, ElementSpec::new("span").attr("class", "MuiRating-root"));
    for i in 1..=5 {
        let id = format!("rate-{i}");
        let label = el(dom, root, ElementSpec::new("label").attr("for", id.as_str()));
        let icon = el(dom, label, ElementSpec::new("span").attr("class", "MuiRating-icon"));
        el(dom, icon, ElementSpec::new("svg"));
        let stars = if i == 1 { "Star" } else { "Stars" };
        el(dom, label, ElementSpec::new("span").text(format!("{i} {stars}")));
        el(
            dom,
            root,
            ElementSpec::new("input")
                .attr("type", "radio")
                .attr("name", "rate")
                .attr("value", i.to_string())
                .attr("id", id)
                .obscured()
                .bind("rate"),
        );
    }
}

fn mui_radio_group(dom: &MemoryDom, form: NodeRef, legend: &str, name: &str, options: &[(&str, &str)]) {
    let control = el(dom, form, ElementSpec::new("fieldset"));
    el(dom, control, ElementSpec::new("legend").text(legend));
    let group = el(dom, control, ElementSpec::new("div").attr("role", "radiogroup"));
    for (value, text) in options {
        let label = el(dom, group, ElementSpec::new("label"));
        let control = el(dom, label, ElementSpec::new("span").attr("class", "MuiRadio-root"));
        el(
            dom,
            control,
            ElementSpec::new("input")
                .attr("type", "radio")
                .attr("name", name)
                .attr("value", *value)
                .bind(name),
        );
        el(dom, label, ElementSpec::new("span").text(*text));
    }
}

fn mui_checkbox(dom: &MemoryDom, group: NodeRef, name: &str, value: Option<&str>, text: &str) {
    let label = el(dom, group, ElementSpec::new("label"));
    let control = el(dom, label, ElementSpec::new("span").attr("class", "MuiCheckbox-root"));
    let mut input = ElementSpec::new("input")
        .attr("type", "checkbox")
        .attr("name", name)
        .bind(name);
    if let Some(value) = value {
        input = input.attr("value", value);
    }
    el(dom, control, input);
    el(dom, label, ElementSpec::new("span").text(text));
}

fn mui_switch(dom: &MemoryDom, form: NodeRef, name: &str, text: &str) {
    let label = el(dom, form, ElementSpec::new("label"));
    let root = el(dom, label, ElementSpec::new("span").attr("class", "MuiSwitch-root"));
    let base = el(dom, root, ElementSpec::new("span").attr("class", "MuiSwitch-switchBase"));
    el(
        dom,
        base,
        ElementSpec::new("input")
            .attr("type", "checkbox")
            .attr("name", name)
            .obscured()
            .bind(name),
    );
    el(dom, root, ElementSpec::new("span").attr("class", "MuiSwitch-track"));
    el(dom, label, ElementSpec::new("span").text(text));
}

// =============================================================================
// CHAKRA UI
// =============================================================================

pub fn chakra() -> Form {
    let dom = MemoryDom::new();
    let form = shell(&dom);

    for (label, name, kind) in [
        ("Full Name", "fullname", "text"),
        ("Email Address", "email", "email"),
        ("Phone Number", "phone", "tel"),
        ("LinkedIn Profile", "linkedin", "url"),
        ("Portfolio Website", "portfolio", "url"),
        ("Available Start Date", "availableFrom", "date"),
    ] {
        let field = div(&dom, form, "chakra-field__root");
        el(&dom, field, ElementSpec::new("label").text(label));
        el(
            &dom,
            field,
            ElementSpec::new("input").attr("type", kind).attr("name", name).bind(name),
        );
    }
    chakra_select(&dom, form, "Position Applying For", "position", POSITIONS, false);
    chakra_select(&dom, form, "Department", "department", DEPARTMENTS, false);
    chakra_select(&dom, form, "Experience Level", "experienceLevel", LEVELS, false);
    chakra_select(&dom, form, "Technical Skills", "skills", SKILLS, true);
    chakra_combobox(&dom, form);
    chakra_slider(&dom, form, "Years of Experience", "yearsExperience", (0.0, 20.0, 1.0), "5");
    chakra_rating(&dom, form);
    chakra_radio_group(&dom, form, "Employment Type", "employmentType", EMPLOYMENT);

    let prefs = div(&dom, form, "chakra-checkbox-group");
    for (value, text) in [("remote", "Remote Work"), ("hybrid", "Hybrid"), ("onsite", "On-site")] {
        chakra_checkbox(&dom, prefs, "workPreferences", value, text);
    }
    let benefits = div(&dom, form, "chakra-checkbox-group");
    for (value, text) in [
        ("health", "Health Insurance"),
        ("dental", "Dental Insurance"),
        ("vision", "Vision Insurance"),
    ] {
        chakra_checkbox(&dom, benefits, "benefits", value, text);
    }
    chakra_radio_group(&dom, form, "Willing to Relocate?", "willingToRelocate", RELOCATION);
    chakra_switch(&dom, form, "immediateStart", "Available for Immediate Start");
    chakra_switch(&dom, form, "referral", "Were you referred by an employee?");
    chakra_slider(
        &dom,
        form,
        "Salary Expectation",
        "salaryExpectation",
        (30_000.0, 250_000.0, 5_000.0),
        "80000",
    );
    for (label, name) in [("Cover Letter", "coverLetter"), ("Key Achievements", "achievements")] {
        let field = div(&dom, form, "chakra-field__root");
        el(&dom, field, ElementSpec::new("label").text(label));
        el(&dom, field, ElementSpec::new("textarea").attr("name", name).bind(name));
    }

    let alert = submit_and_alert(&dom, form, &["workPreferences"]);
    Form { dom, form, alert }
}

fn chakra_select(dom: &MemoryDom, form: NodeRef, label: &str, name: &str, options: &[&str], tokens: bool) {
    let field = div(dom, form, "chakra-field__root");
    el(dom, field, ElementSpec::new("label").text(label));
    let root = div(dom, field, "chakra-select__root");
    let control = div(dom, root, "chakra-select__control");
    let trigger = el(
        dom,
        control,
        ElementSpec::new("button")
            .attr("type", "button")
            .attr("role", "combobox")
            .attr("aria-haspopup", "listbox")
            .text(format!("Select {}", label.to_lowercase())),
    );
    let positioner = div(dom, root, "chakra-select__positioner");
    let listbox = el(dom, positioner, ElementSpec::new("div").attr("role", "listbox").hidden());
    let token_list = tokens.then(|| div(dom, field, "chakra-wrap"));
    for option in options {
        el(
            dom,
            listbox,
            ElementSpec::new("div")
                .attr("role", "option")
                .text(*option)
                .behavior(Behavior::PopupOption {
                    trigger,
                    field: name.to_string(),
                    value: (*option).to_string(),
                    multi: tokens,
                    tokens: token_list,
                }),
        );
    }
    dom.set_behavior(
        trigger,
        Behavior::PopupTrigger {
            listbox,
            delay_ticks: 1,
        },
    )
    .unwrap();
}

fn chakra_combobox(dom: &MemoryDom, form: NodeRef) {
    let field = div(dom, form, "chakra-field__root");
    el(dom, field, ElementSpec::new("label").text("Preferred Work Locations"));
    let root = div(dom, field, "chakra-combobox__root");
    let control = div(dom, root, "chakra-combobox__control");
    let tags = div(dom, root, "chakra-wrap");
    let listbox = el(dom, dom.body(), ElementSpec::new("div").attr("role", "listbox").hidden());
    el(
        dom,
        control,
        ElementSpec::new("input")
            .attr("role", "combobox")
            .attr("name", "preferredLocations")
            .behavior(Behavior::Typeahead {
                listbox,
                tokens: tags,
                field: "preferredLocations".to_string(),
                choices: LOCATIONS.iter().map(|s| (*s).to_string()).collect(),
                delay_ticks: 2,
            }),
    );
}

fn chakra_slider(dom: &MemoryDom, form: NodeRef, label: &str, name: &str, range: (f64, f64, f64), initial: &str) {
    let (min, max, step) = range;
    let field = div(dom, form, "chakra-stack");
    el(dom, field, ElementSpec::new("label").text(label));
    let root = el(
        dom,
        field,
        ElementSpec::new("div")
            .attr("class", "chakra-slider__root")
            .behavior(Behavior::SliderTrack {
                field: name.to_string(),
                min,
                max,
                step,
            }),
    );
    let track = div(dom, root, "chakra-slider__track");
    div(dom, track, "chakra-slider__range");
    el(
        dom,
        root,
        ElementSpec::new("div")
            .attr("role", "slider")
            .attr("aria-valuenow", initial),
    );
    el(
        dom,
        root,
        ElementSpec::new("input")
            .attr("type", "hidden")
            .attr("name", name)
            .value(initial)
            .mirror(name),
    );
    el(dom, field, ElementSpec::new("p").text(format!("Current: {initial}")));
}

fn chakra_rating(dom: &MemoryDom, form: NodeRef) {
    let field = div(dom, form, "chakra-field__root");
    el(dom, field, ElementSpec::new("label").text("Rate Your Overall Technical Proficiency"));
    let root = el(dom, field, ElementSpec::new("div").attr("role", "radiogroup"));
    for i in 1..=5u32 {
        let item = el(
            dom,
            root,
            ElementSpec::new("span")
                .attr("role", "radio")
                .attr("aria-label", format!("{i} stars"))
                .attr("aria-checked", "false")
                .behavior(Behavior::RatingSymbol {
                    field: "rate".to_string(),
                    ordinal: i,
                }),
        );
        el(dom, item, ElementSpec::new("svg"));
    }
    el(
        dom,
        root,
        ElementSpec::new("input")
            .attr("type", "hidden")
            .attr("name", "rate")
            .mirror("rate"),
    );
}

fn chakra_radio_group(dom: &MemoryDom, form: NodeRef, legend: &str, name: &str, options: &[(&str, &str)]) {
    let field = el(dom, form, ElementSpec::new("fieldset"));
    el(dom, field, ElementSpec::new("legend").text(legend));
    let group = el(dom, field, ElementSpec::new("div").attr("role", "radiogroup"));
    for (value, text) in options {
        let label = el(dom, group, ElementSpec::new("label").attr("class", "chakra-radio__root"));
        el(
            dom,
            label,
            ElementSpec::new("input")
                .attr("type", "radio")
                .attr("name", name)
                .attr("value", *value)
                .obscured()
                .bind(name),
        );
        div(dom, label, "chakra-radio__control");
        el(dom, label, ElementSpec::new("span").text(*text));
    }
}

fn chakra_checkbox(dom: &MemoryDom, group: NodeRef, name: &str, value: &str, text: &str) {
    let label = el(dom, group, ElementSpec::new("label").attr("class", "chakra-checkbox__root"));
    el(
        dom,
        label,
        ElementSpec::new("input")
            .attr("type", "checkbox")
            .attr("name", name)
            .attr("value", value)
            .obscured()
            .bind(name),
    );
    div(dom, label, "chakra-checkbox__control");
    el(dom, label, ElementSpec::new("span").text(text));
}

fn chakra_switch(dom: &MemoryDom, form: NodeRef, name: &str, text: &str) {
    let row = div(dom, form, "chakra-stack");
    let label = el(dom, row, ElementSpec::new("label").attr("class", "chakra-switch__root"));
    el(
        dom,
        label,
        ElementSpec::new("input")
            .attr("type", "checkbox")
            .attr("name", name)
            .obscured()
            .bind(name),
    );
    let control = div(dom, label, "chakra-switch__control");
    div(dom, control, "chakra-switch__thumb");
    el(dom, row, ElementSpec::new("p").text(text));
}

// =============================================================================
// REACT-BOOTSTRAP
// =============================================================================

pub fn bootstrap() -> Form {
    let dom = MemoryDom::new();
    let form = shell(&dom);

    for (label, name, kind) in [
        ("Full Name", "fullname", "text"),
        ("Email Address", "email", "email"),
        ("Phone Number", "phone", "tel"),
        ("LinkedIn Profile", "linkedin", "url"),
        ("Portfolio Website", "portfolio", "url"),
        ("Available Start Date", "availableFrom", "date"),
    ] {
        let group = div(&dom, form, "mb-3");
        el(&dom, group, ElementSpec::new("label").attr("for", name).text(label));
        el(
            &dom,
            group,
            ElementSpec::new("input")
                .attr("type", kind)
                .attr("id", name)
                .attr("name", name)
                .attr("class", "form-control")
                .bind(name),
        );
    }
    for (label, name, options) in [
        ("Position Applying For", "position", POSITIONS),
        ("Department", "department", DEPARTMENTS),
        ("Experience Level", "experienceLevel", LEVELS),
    ] {
        let group = div(&dom, form, "mb-3");
        el(&dom, group, ElementSpec::new("label").text(label));
        bs_select(&dom, group, name, options);
    }
    bs_skills(&dom, form);
    bs_typeahead(&dom, form);
    bs_range(&dom, form, "Years of Experience: 5", "yearsExperience", (0, 20, 1), "5");
    bs_rating(&dom, form);
    bs_checks(&dom, form, "radio", "employmentType", EMPLOYMENT);
    bs_checks(
        &dom,
        form,
        "checkbox",
        "workPreferences",
        &[("remote", "Remote Work"), ("hybrid", "Hybrid"), ("onsite", "On-site")],
    );
    bs_checks(
        &dom,
        form,
        "checkbox",
        "benefits",
        &[
            ("health", "Health Insurance"),
            ("dental", "Dental Insurance"),
            ("vision", "Vision Insurance"),
        ],
    );
    bs_checks(&dom, form, "radio", "willingToRelocate", RELOCATION);
    bs_switch(&dom, form, "immediateStart", "Available for Immediate Start");
    bs_switch(&dom, form, "referral", "Were you referred by an employee?");
    bs_range(
        &dom,
        form,
        "Salary Expectation: $80,000",
        "salaryExpectation",
        (30_000, 250_000, 5_000),
        "80000",
    );
    for (label, name) in [("Cover Letter", "coverLetter"), ("Key Achievements", "achievements")] {
        let group = div(&dom, form, "mb-3");
        el(&dom, group, ElementSpec::new("label").text(label));
        el(
            &dom,
            group,
            ElementSpec::new("textarea")
                .attr("name", name)
                .attr("class", "form-control")
                .bind(name),
        );
    }

    let alert = submit_and_alert(&dom, form, &["workPreferences"]);
    Form { dom, form, alert }
}

fn bs_select(dom: &MemoryDom, group: NodeRef, name: &str, options: &[&str]) -> NodeRef {
    let select = el(
        dom,
        group,
        ElementSpec::new("select")
            .attr("name", name)
            .attr("class", "form-select")
            .bind(name),
    );
    el(dom, select, ElementSpec::new("option").attr("value", "").text("Select..."));
    for option in options {
        el(
            dom,
            select,
            ElementSpec::new("option").attr("value", *option).text(*option),
        );
    }
    select
}

fn bs_skills(dom: &MemoryDom, form: NodeRef) {
    let group = div(dom, form, "mb-3");
    el(dom, group, ElementSpec::new("label").text("Technical Skills"));
    let select = bs_select(dom, group, "skills", SKILLS);
    let badges = div(dom, group, "d-flex flex-wrap gap-2 mt-2");
    dom.set_behavior(
        select,
        Behavior::TokenSelect {
            tokens: badges,
            field: "skills".to_string(),
        },
    )
    .unwrap();
}

fn bs_typeahead(dom: &MemoryDom, form: NodeRef) {
    let group = div(dom, form, "mb-3");
    el(dom, group, ElementSpec::new("label").text("Preferred Work Locations"));
    let wrapper = div(dom, group, "rbt");
    let listbox = el(dom, wrapper, ElementSpec::new("div").attr("role", "listbox").hidden());
    let tokens = div(dom, group, "rbt-token-list");
    el(
        dom,
        wrapper,
        ElementSpec::new("input")
            .attr("role", "combobox")
            .attr("aria-autocomplete", "both")
            .attr("name", "preferredLocations")
            .attr("class", "rbt-input-main form-control")
            .behavior(Behavior::Typeahead {
                listbox,
                tokens,
                field: "preferredLocations".to_string(),
                choices: LOCATIONS.iter().map(|s| (*s).to_string()).collect(),
                delay_ticks: 1,
            }),
    );
}

fn bs_range(dom: &MemoryDom, form: NodeRef, label: &str, name: &str, range: (u32, u32, u32), initial: &str) {
    let (min, max, step) = range;
    let group = div(dom, form, "mb-3");
    el(dom, group, ElementSpec::new("label").text(label));
    el(
        dom,
        group,
        ElementSpec::new("input")
            .attr("type", "range")
            .attr("name", name)
            .attr("min", min.to_string())
            .attr("max", max.to_string())
            .attr("step", step.to_string())
            .attr("class", "form-range")
            .value(initial)
            .bind(name),
    );
}

/// Synthetic star row: bare symbols exposing `data-filled`.
///
/// The real widget also renders a hidden `rate` input beside the stars,
/// which would make the row a hidden-value rating; see
/// `bootstrap_form::variant_tests::test_rating_with_hidden_rate_input` for
/// that shape.
fn bs_rating(dom: &MemoryDom, form: NodeRef) {
    let group = div(dom, form, "mb-3");
    el(dom, group, ElementSpec::new("label").text("Rate Your Overall Technical Proficiency"));
    let stars = div(dom, group, "d-flex gap-1");
    for i in 1..=5u32 {
        el(
            dom,
            stars,
            ElementSpec::new("svg")
                .attr("data-filled", "false")
                .behavior(Behavior::RatingSymbol {
                    field: "rate".to_string(),
                    ordinal: i,
                }),
        );
    }
}

fn bs_checks(dom: &MemoryDom, form: NodeRef, kind: &str, name: &str, options: &[(&str, &str)]) {
    let group = div(dom, form, "mb-3");
    for (value, text) in options {
        let check = div(dom, group, "form-check");
        let id = format!("{name}-{value}");
        el(
            dom,
            check,
            ElementSpec::new("input")
                .attr("type", kind)
                .attr("id", id.as_str())
                .attr("name", name)
                .attr("value", *value)
                .attr("class", "form-check-input")
                .bind(name),
        );
        el(
            dom,
            check,
            ElementSpec::new("label")
                .attr("for", id)
                .attr("class", "form-check-label")
                .text(*text),
        );
    }
}

fn bs_switch(dom: &MemoryDom, form: NodeRef, name: &str, text: &str) {
    let check = div(dom, form, "form-check form-switch");
    el(
        dom,
        check,
        ElementSpec::new("input")
            .attr("type", "checkbox")
            .attr("role", "switch")
            .attr("id", name)
            .attr("name", name)
            .attr("class", "form-check-input")
            .bind(name),
    );
    el(
        dom,
        check,
        ElementSpec::new("label")
            .attr("for", name)
            .attr("class", "form-check-label")
            .text(text),
    );
}
