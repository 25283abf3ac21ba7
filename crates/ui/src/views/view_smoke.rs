use form_core::model::{FieldChange, FieldName, FieldValues, PersistedState};
use form_core::time::fixed_now;
use services::sequencer::RejectReason;
use services::{FormEvent, Outcome};
use storage::repository::{FormStateRepository, InMemoryRepository};

use super::test_harness::{setup_view_harness, setup_view_harness_with_repo};

const SIGNUP: &str = r#"{
    "config": { "timing": { "fade_out_ms": 0, "fade_in_ms": 0 } },
    "steps": [
        {
            "heading": "Contact",
            "fields": [
                { "name": "email", "label": "Email", "kind": { "type": "text" }, "required": true }
            ]
        },
        {
            "heading": "Details",
            "fields": [{ "name": "notes", "label": "Notes", "kind": { "type": "textarea" } }]
        }
    ]
}"#;

fn email(value: &str) -> FormEvent {
    FormEvent::FieldChanged(FieldChange::Text {
        name: FieldName::new("email").unwrap(),
        value: value.to_string(),
    })
}

#[tokio::test(flavor = "current_thread")]
async fn first_step_renders_counter_progress_and_next() {
    let mut harness = setup_view_harness(SIGNUP).await;
    harness.rebuild();
    let html = harness.render();

    for expected in [
        "Step 1 of 2",
        r#"role="progressbar""#,
        r#"aria-valuenow="50""#,
        r#"data-multistep-form="step""#,
        r#"id="step-1""#,
        r#"class="step active""#,
        r#"data-multistep-form="next""#,
        r#"aria-required="true""#,
    ] {
        assert!(html.contains(expected), "missing {expected} in {html}");
    }
    assert!(html.contains("novalidate"), "browser validation not disabled in {html}");
    assert!(!html.contains(r#"data-multistep-form="prev""#), "unexpected Back in {html}");
    assert!(!html.contains(r#"data-multistep-form="submit""#), "unexpected Submit in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn rejected_next_shows_field_error() {
    let mut harness = setup_view_harness(SIGNUP).await;
    harness.rebuild();

    let outcome = harness.handle.request(FormEvent::Next).await.expect("request");
    assert_eq!(outcome, Outcome::Rejected(RejectReason::Invalid));
    harness.drive_async().await;
    let html = harness.render();

    assert!(html.contains("Email is required."), "missing error in {html}");
    assert!(html.contains(r#"aria-invalid="true""#), "missing aria-invalid in {html}");
    assert!(html.contains(r#"data-multistep-form="field-error""#), "missing marker in {html}");
    assert!(html.contains("Step 1 of 2"), "counter moved in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn valid_next_moves_to_last_step() {
    let mut harness = setup_view_harness(SIGNUP).await;
    harness.rebuild();

    harness.handle.request(email("a@b.c")).await.expect("request");
    let outcome = harness.handle.request(FormEvent::Next).await.expect("request");
    assert_eq!(outcome, Outcome::Applied);
    harness.drive_async().await;
    let html = harness.render();

    for expected in [
        "Step 2 of 2",
        "Details. 2 of 2 steps.",
        r#"aria-valuenow="100""#,
        r#"data-multistep-form="prev""#,
        r#"data-multistep-form="submit""#,
    ] {
        assert!(html.contains(expected), "missing {expected} in {html}");
    }
    assert!(!html.contains(r#"data-multistep-form="next""#), "unexpected Next in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn stored_state_is_restored_on_start() {
    let repo = InMemoryRepository::new();
    let data = FieldValues::from([("email".to_string(), "saved@example.com".to_string())]);
    repo.save_state("form-state", &PersistedState::new(data, 1, fixed_now()))
        .await
        .expect("seed state");

    let mut harness = setup_view_harness_with_repo(SIGNUP, repo).await;
    harness.rebuild();
    let html = harness.render();

    assert!(html.contains("Step 2 of 2"), "missing restored step in {html}");
    assert!(html.contains("saved@example.com"), "missing restored value in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn submit_shows_completion_and_clears_storage() {
    let mut harness = setup_view_harness(SIGNUP).await;
    harness.rebuild();

    harness.handle.request(email("a@b.c")).await.expect("request");
    harness.handle.request(FormEvent::Next).await.expect("request");
    let outcome = harness.handle.request(FormEvent::Submit).await.expect("request");
    assert!(matches!(outcome, Outcome::Submitted(_)), "unexpected {outcome:?}");
    harness.drive_async().await;
    let html = harness.render();

    assert!(html.contains("Your answers have been sent."), "missing completion in {html}");
    assert!(!html.contains(r#"data-multistep-form="submit""#), "submit still shown in {html}");
    assert_eq!(harness.repo.raw("form-state").unwrap(), None);
}
