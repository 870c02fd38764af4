//! Job application form rendered with Chakra UI shapes

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::chakra;
use formprobe::prelude::*;

#[tokio::test]
async fn test_fill_and_submit() {
    let form = chakra();
    let mut seen = Vec::new();
    let report = ScenarioRunner::new(form.widgets())
        .run_with(&Scenario::job_application(), |step| seen.push(step.index))
        .await
        .unwrap();

    assert_eq!(seen, (1..=report.step_count()).collect::<Vec<_>>());
    assert!(form.dom.describe(form.alert).await.unwrap().visible);
    assert_eq!(form.field("skills"), "JavaScript,React");
    assert_eq!(form.field("preferredLocations"), "New York,Los Angeles");
    assert_eq!(form.field("workPreferences"), "remote,hybrid");
    assert_eq!(form.field("rate"), "5");
    assert_eq!(form.field("salaryExpectation"), "140000");
    assert_eq!(form.field("coverLetter"), "Nothing to say");
}

mod variant_tests {
    use super::*;

    #[tokio::test]
    async fn test_rating_falls_back_to_choice() {
        let form = chakra();
        let widgets = form.widgets();
        let label = "Rate Your Overall Technical Proficiency";
        let control = widgets.describe_control(label).await.unwrap();
        assert_eq!(control.variant, VariantKind::HiddenValueRating);

        let outcome = widgets.set_rating(label, 5).await.unwrap();
        assert_eq!(
            outcome,
            StrategyOutcome::Applied {
                strategy: Strategy::ActivateChoice,
                observed: "5".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_hidden_injection_alone_is_reverted() {
        let form = chakra();
        let widgets = form.widgets();
        let control = widgets
            .describe_control("Rate Your Overall Technical Proficiency")
            .await
            .unwrap();
        let outcome = ValueSetter::new(&form.dom, widgets.config())
            .run(Strategy::InjectHiddenValue, &control, &TargetValue::Ordinal(4))
            .await
            .unwrap();
        assert!(!outcome.is_applied());
        assert!(form.field("rate").is_empty());
    }

    #[tokio::test]
    async fn test_switch_adjacent_label() {
        let form = chakra();
        let anchor = WidgetLocator::new(&form.dom)
            .anchor("Were you referred by an employee?")
            .await
            .unwrap();
        let (kind, _) = VariantDetector::new(&form.dom)
            .classify_switch(anchor, "Were you referred by an employee?")
            .await
            .unwrap();
        assert_eq!(kind, VariantKind::CheckboxSwitch(SwitchBinding::AdjacentLabel));

        form.widgets()
            .toggle_switch("Were you referred by an employee?")
            .await
            .unwrap();
        assert_eq!(form.field("referral"), "true");
    }

    #[tokio::test]
    async fn test_skills_tokens_confirm_selection() {
        let form = chakra();
        let widgets = form.widgets();
        let outcomes = widgets
            .select_many("Technical Skills", &["JavaScript", "React"])
            .await
            .unwrap();
        assert!(outcomes.iter().all(StrategyOutcome::is_applied));

        // The picked option leaves the list; a repeat is confirmed from its token
        let again = widgets.select("Technical Skills", "React").await.unwrap();
        assert_eq!(again.observed(), Some("React"));
        assert_eq!(form.field("skills"), "JavaScript,React");
    }

    #[tokio::test]
    async fn test_obscured_radio_through_label() {
        let form = chakra();
        form.widgets().click_label("Full-Time").await.unwrap();
        assert_eq!(form.field("employmentType"), "full-time");
        form.widgets().click_label("Contract").await.unwrap();
        assert_eq!(form.field("employmentType"), "contract");
    }
}
