//! End-to-end assist flows: reducer, provider over HTTP, reply merged back.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cvai::core::action::{Action, Effect, Gate, update};
use cvai::core::assist::{self, AssistJob, AssistTask, AssistOptions, Panel};
use cvai::core::record::InterviewQuestion;
use cvai::core::state::App;
use cvai::core::tools::{self, UpdateCvTool};
use cvai::export::ExportOptions;
use cvai::inference::{FunctionCall, GeminiProvider};
use cvai::render::TemplateKind;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GEMINI_PATH: &str = "/models/test-model:generateContent";

fn app_for(server: &MockServer) -> App {
    app_with_base_url(Some(server.uri()))
}

fn app_with_base_url(base_url: Option<String>) -> App {
    let provider = GeminiProvider::new("test-key".into(), base_url, Duration::from_secs(5));
    App::new(
        Arc::new(provider),
        AssistOptions {
            model: "test-model".into(),
            max_output_tokens: 2000,
        },
        ExportOptions {
            output_dir: PathBuf::from("out"),
            font_dir: PathBuf::from("fonts"),
            font_family: "NotoSans".into(),
        },
        TemplateKind::English,
    )
}

fn text_answer(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] }, "finishReason": "STOP" }]
    })
}

async fn mount(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Submits a task and drives the spawned job to completion.
async fn submit_and_finish(app: &mut App, task: AssistTask) {
    let panel = task.panel();
    let Effect::SpawnAssist(job) = update(app, Action::Submit(task)) else {
        panic!("submit did not spawn: {:?}", app.error);
    };
    assert!(app.is_busy(panel));

    let result = assist::run(app.provider.as_ref(), &app.options, job).await;
    assert_eq!(update(app, Action::AssistFinished { panel, result }), Effect::None);
    assert!(!app.is_busy(panel));
}

#[tokio::test]
async fn test_summary_round_trip_updates_about_me() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(text_answer(
            "```json\n{\"aboutMe\": \"  Chartered accountant with eight years in audit.  \"}\n```",
        )),
    )
    .await;

    let mut app = app_for(&server);
    submit_and_finish(&mut app, AssistTask::Summary).await;

    assert_eq!(app.error, None);
    assert_eq!(app.record.about_me, "Chartered accountant with eight years in audit.");
    assert!(app.document().sections.iter().any(|s| s.heading == "Profile Summary"));
}

#[tokio::test]
async fn test_truncated_cover_letter_is_repaired() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"coverLetter\": \"Dear hiring team, I am applying" }] },
                "finishReason": "MAX_TOKENS"
            }]
        })),
    )
    .await;

    let mut app = app_for(&server);
    submit_and_finish(&mut app, AssistTask::CoverLetter).await;

    assert_eq!(app.error, None);
    assert_eq!(app.record.cover_letter, "Dear hiring team, I am applying");
}

#[tokio::test]
async fn test_chat_function_call_updates_record() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Added your target role." },
                    { "functionCall": { "name": "update_cv_data", "args": { "jobTarget": "Internal Auditor" } } }
                ]},
                "finishReason": "STOP"
            }]
        })),
    )
    .await;

    let mut app = app_for(&server);
    update(&mut app, Action::SetText {
        field: cvai::core::action::TextField::AboutMe,
        value: "Existing summary".into(),
    });
    submit_and_finish(
        &mut app,
        AssistTask::Chat {
            message: "I want to be an internal auditor".into(),
        },
    )
    .await;

    assert_eq!(app.record.job_target, "Internal Auditor");
    assert_eq!(app.record.about_me, "Existing summary");
    let texts: Vec<&str> = app.transcript.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["I want to be an internal auditor", "Added your target role."]);
}

#[tokio::test]
async fn test_interview_reply_keeps_unlock_state() {
    let server = MockServer::start().await;
    let answer = json!({
        "questions": [
            { "type": "General", "question": "Tell us about yourself", "answer": "Start with audit.", "isPremium": false },
            { "type": "Technical", "question": "What is IFRS 16?", "answer": "Leases standard.", "isPremium": true }
        ],
        "tips": ["Arrive early"]
    });
    mount(&server, ResponseTemplate::new(200).set_body_json(text_answer(&answer.to_string()))).await;

    let mut app = app_for(&server);
    update(&mut app, Action::Unlock(Gate::Interview));
    submit_and_finish(&mut app, AssistTask::InterviewPrep).await;

    let prep = &app.record.interview_prep;
    assert!(prep.is_unlocked);
    assert_eq!(prep.questions.len(), 2);
    assert!(prep.questions.iter().any(|q: &InterviewQuestion| q.is_premium));
    assert_eq!(prep.tips, vec!["Arrive early".to_string()]);
}

#[tokio::test]
async fn test_provider_failure_leaves_record_untouched() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(500).set_body_string("backend down")).await;

    let mut app = app_for(&server);
    update(&mut app, Action::SetTargetCompany("Aramco".into()));
    let before = app.record.clone();

    submit_and_finish(&mut app, AssistTask::Summary).await;

    assert_eq!(app.record, before);
    let error = app.error.as_deref().unwrap();
    assert!(error.contains("summary failed"));
    assert!(error.contains("500"));
}

#[tokio::test]
async fn test_edits_during_request_survive_the_merge() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(text_answer("{\"aboutMe\": \"New summary\"}")),
    )
    .await;

    let mut app = app_for(&server);
    let Effect::SpawnAssist(job) = update(&mut app, Action::Submit(AssistTask::Summary)) else {
        panic!("submit did not spawn");
    };
    update(&mut app, Action::SetPersonalField {
        field: "fullName".into(),
        value: "Sara Ali".into(),
    });

    let result = assist::run(app.provider.as_ref(), &app.options, job).await;
    update(&mut app, Action::AssistFinished { panel: Panel::Summary, result });

    assert_eq!(app.record.personal_info.full_name, "Sara Ali");
    assert_eq!(app.record.about_me, "New summary");
}

#[test]
fn test_job_snapshot_is_detached_from_state() {
    let mut app = app_with_base_url(None);
    update(&mut app, Action::SetText {
        field: cvai::core::action::TextField::JobTarget,
        value: "Chemist".into(),
    });
    let Effect::SpawnAssist(AssistJob { snapshot, .. }) = update(&mut app, Action::Submit(AssistTask::Presentation)) else {
        panic!("submit did not spawn");
    };
    update(&mut app, Action::SetText {
        field: cvai::core::action::TextField::JobTarget,
        value: "Lab Manager".into(),
    });
    assert_eq!(snapshot.job_target, "Chemist");
}

#[test]
fn test_update_tool_normalizes_arguments() {
    let call = FunctionCall {
        name: "update_cv_data".into(),
        arguments: json!({ "aboutMe": "  Analyst  ", "softSkills": ["العمل الجماعي", " "] }),
    };
    let update = tokio_test::block_on(tools::invoke(&UpdateCvTool, &call)).unwrap();
    assert_eq!(update.about_me.as_deref(), Some("Analyst"));
    assert_eq!(update.soft_skills, Some(vec!["العمل الجماعي".to_string()]));
}
