//! End-to-end pipeline runs against scripted model and email doubles.

use sdr::core::campaign::{CampaignInput, DEFAULT_RECIPIENT_EMAIL};
use sdr::core::types::DraftStyle;
use sdr::io::config::SdrConfig;
use sdr::io::credentials::{OPENAI_API_KEY, Settings};
use sdr::pipeline::{Selection, Session, run_campaign};
use sdr::report::{render_error, render_report};
use sdr::test_support::{
    RecordingSender, ScriptedModel, full_settings, sample_input, scripted_campaign,
};

fn session(input: &CampaignInput) -> Session {
    Session::prepare(input, &full_settings(), SdrConfig::default()).expect("session")
}

#[tokio::test]
async fn full_run_drafts_three_times_then_sends_once() {
    let session = session(&sample_input());
    let model = scripted_campaign(2);
    let sender = RecordingSender::accepting(202);

    let outcome = run_campaign(&session, &model, &sender, Selection::ModelJudge)
        .await
        .expect("run");

    let agents: Vec<String> = model.requests().into_iter().map(|r| r.agent).collect();
    assert_eq!(agents.len(), 6);
    let first_formatter_call = agents
        .iter()
        .position(|a| a == "Subject Writer")
        .expect("subject call");
    let draft_calls = agents[..first_formatter_call]
        .iter()
        .filter(|a| a.ends_with(" Style"))
        .count();
    assert_eq!(draft_calls, 3);
    assert_eq!(agents[3], "Sales Manager Agent");
    assert_eq!(agents[5], "HTML Converter");

    let sent = sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to_address, "x@y.com");
    assert!(!sent[0].subject.is_empty());
    assert!(!sent[0].html_body.is_empty());
    assert_eq!(outcome.selected.style, DraftStyle::Witty);
    assert_eq!(outcome.receipt.status_code, 202);
    assert_eq!(outcome.context, session.ctx);

    let report = render_report("sales@acme.com", &outcome);
    assert!(report.contains("To: x@y.com"));
    assert!(report.contains("Subject: Congrats on the Series A"));
}

#[tokio::test]
async fn missing_recipient_falls_back_to_placeholder() {
    let input = CampaignInput {
        recipient_email: None,
        ..sample_input()
    };
    let session = session(&input);
    let model = scripted_campaign(1);
    let sender = RecordingSender::accepting(202);

    let outcome = run_campaign(&session, &model, &sender, Selection::ModelJudge)
        .await
        .expect("run");

    assert_eq!(sender.sent()[0].to_address, DEFAULT_RECIPIENT_EMAIL);
    let report = render_report("sales@acme.com", &outcome);
    assert!(report.contains(&format!("To: {DEFAULT_RECIPIENT_EMAIL}")));
}

#[tokio::test]
async fn delivery_failure_becomes_one_error_line_without_retry() {
    let session = session(&sample_input());
    let model = scripted_campaign(1);
    let sender = RecordingSender::failing("connection reset by peer");

    let err = run_campaign(&session, &model, &sender, Selection::ModelJudge)
        .await
        .unwrap_err();

    let shown = render_error(&err);
    assert!(shown.starts_with("❌ Error: "));
    assert!(shown.contains("connection reset by peer"));
    assert!(!shown.contains("a witty email from Jo"));
    assert_eq!(sender.attempts(), 1);
}

#[tokio::test]
async fn missing_credential_stops_before_any_model_call() {
    let settings = Settings::from_pairs([(OPENAI_API_KEY, "sk-test")]);
    let model = ScriptedModel::new();

    let err = Session::prepare(&sample_input(), &settings, SdrConfig::default()).unwrap_err();

    assert!(render_error(&err).contains("SENDGRID_API_KEY, SENDGRID_FROM_EMAIL"));
    assert!(model.requests().is_empty());
}

#[tokio::test]
async fn signer_title_reaches_drafts_and_signature() {
    let input = CampaignInput {
        signer_title: Some("Head of Growth".to_string()),
        ..sample_input()
    };
    let session = session(&input);
    let model = scripted_campaign(1);
    let sender = RecordingSender::accepting(202);

    let outcome = run_campaign(&session, &model, &sender, Selection::ModelJudge)
        .await
        .expect("run");

    for request in model.requests().iter().filter(|r| r.agent.ends_with(" Style")) {
        assert!(request.instructions.contains("Head of Growth"), "{}", request.agent);
    }
    assert!(outcome.email.html_body.contains("Head of Growth"));
    assert_eq!(outcome.receipt.signer, "Jo, Head of Growth");
}

#[tokio::test]
async fn untitled_signer_leaves_no_title_trace() {
    let session = session(&sample_input());
    let model = scripted_campaign(1);
    let sender = RecordingSender::accepting(202);

    let outcome = run_campaign(&session, &model, &sender, Selection::ModelJudge)
        .await
        .expect("run");

    for request in model.requests() {
        assert!(!request.instructions.contains("and title"), "{}", request.agent);
        assert!(!request.instructions.contains("Jo,"), "{}", request.agent);
    }
    assert_eq!(outcome.receipt.signer, "Jo");
}

#[tokio::test]
async fn style_preference_skips_the_judge() {
    let session = session(&sample_input());
    let model = scripted_campaign(1);
    let sender = RecordingSender::accepting(202);

    let outcome = run_campaign(
        &session,
        &model,
        &sender,
        Selection::PreferStyle(DraftStyle::Concise),
    )
    .await
    .expect("run");

    assert_eq!(outcome.selected.style, DraftStyle::Concise);
    assert!(
        model
            .requests()
            .iter()
            .all(|r| r.agent != "Sales Manager Agent")
    );
    assert_eq!(sender.attempts(), 1);
}

#[tokio::test]
async fn invalid_verdict_aborts_before_formatting() {
    let session = session(&sample_input());
    let model = ScriptedModel::new()
        .reply("Style", "a draft")
        .reply("Sales Manager", r#"{"choice": 7, "rationale": "x"}"#)
        .reply("Subject Writer", "s")
        .reply("HTML Converter", "<p>b</p>");
    let sender = RecordingSender::accepting(202);

    let err = run_campaign(&session, &model, &sender, Selection::ModelJudge)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("schema validation"));
    assert!(model.requests().iter().all(|r| r.agent != "Subject Writer"));
    assert!(sender.sent().is_empty());
}
