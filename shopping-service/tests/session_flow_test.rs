//! End-to-end tests of the question/answer session API with mock providers.

mod common;

use common::{TestApp, LAPTOP_QUESTIONS};
use serde_json::{json, Value};
use shopping_service::services::providers::mock::{MockTextProvider, MockVideoProvider};

#[tokio::test]
async fn laptop_session_runs_to_completion() {
    let app = TestApp::spawn().await;

    let response = app
        .start(json!({"query": "I want a laptop", "session_id": "s1"}))
        .await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["session_id"], "s1");
    assert_eq!(body["user_query"], "I want a laptop");
    assert_eq!(body["message"], "Session started successfully");
    assert_eq!(body["degraded"], false);
    assert_eq!(body["follow_up_questions"], json!(LAPTOP_QUESTIONS));

    let answers = ["1 lakh", "15.6 inch", "Work", "", "16GB"];
    for (i, answer) in answers.iter().enumerate().take(4) {
        let response = app
            .answer(json!({"session_id": "s1", "question_index": i, "answer": answer}))
            .await;
        assert_eq!(response.status(), 200);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["step"], "questions");
        assert_eq!(body["next_question_index"], i + 1);
        assert_eq!(body["next_question"], LAPTOP_QUESTIONS[i + 1]);
        assert_eq!(body["questions_answered"], i + 1);
        assert_eq!(body["total_questions"], 5);
        assert_eq!(body["message"], format!("Question {} of 5", i + 2));
    }

    let response = app
        .answer(json!({"session_id": "s1", "question_index": 4, "answer": answers[4]}))
        .await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["step"], "complete");
    assert_eq!(body["message"], "All questions answered. Here are your results!");
    assert_eq!(body["degraded"], false);
    assert_eq!(
        body["summary"],
        "Laptop for work, budget 1 lakh, 15.6 inch screen."
    );
    assert_eq!(body["search_query"], "laptop under 1 lakh");
    assert_eq!(body["videos"].as_array().unwrap().len(), 10);
    let report = body["recommendations"].as_str().unwrap();
    assert!(report.starts_with("🎥 YouTube Video Recommendations:"));
    assert!(report.contains("10. 📺 Sample video 10"));

    let status: Value = app.status("s1").await.json().await.unwrap();
    assert_eq!(status["step"], "complete");
    assert_eq!(status["questions_answered"], 5);
    assert_eq!(status["total_questions"], 5);
    assert_eq!(
        status["summary"],
        "Laptop for work, budget 1 lakh, 15.6 inch screen."
    );
}

#[tokio::test]
async fn status_reports_collecting_session() {
    let app = TestApp::spawn().await;
    app.start(json!({"query": "I want a laptop", "session_id": "s2"}))
        .await;

    let response = app.status("s2").await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["step"], "questions");
    assert_eq!(body["user_query"], "I want a laptop");
    assert_eq!(body["questions_answered"], 0);
    assert_eq!(body["summary"], "");
    assert_eq!(body["follow_up_questions"], json!(LAPTOP_QUESTIONS));
}

#[tokio::test]
async fn unknown_session_status_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app.status("unknown_id").await;
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Session not found");
}

#[tokio::test]
async fn empty_query_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app.start(json!({"query": "   ", "session_id": "s1"})).await;
    assert_eq!(response.status(), 400);

    let response = app.start(json!({"session_id": "s1"})).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn session_id_defaults_when_omitted() {
    let app = TestApp::spawn().await;

    let body: Value = app
        .start(json!({"query": "I want a laptop"}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["session_id"], "default");

    let response = app.answer(json!({"question_index": 0, "answer": "1 lakh"})).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn answer_validation_errors() {
    let app = TestApp::spawn().await;

    let response = app
        .answer(json!({"session_id": "ghost", "question_index": 0, "answer": "x"}))
        .await;
    assert_eq!(response.status(), 404);

    app.start(json!({"query": "I want a laptop", "session_id": "s1"}))
        .await;

    let response = app.answer(json!({"session_id": "s1", "answer": "x"})).await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Question index is required");

    let response = app
        .answer(json!({"session_id": "s1", "question_index": 5, "answer": "x"}))
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid question index");

    // Answer 2 before answer 1.
    let response = app
        .answer(json!({"session_id": "s1", "question_index": 1, "answer": "x"}))
        .await;
    assert_eq!(response.status(), 400);

    let status: Value = app.status("s1").await.json().await.unwrap();
    assert_eq!(status["questions_answered"], 0);
}

#[tokio::test]
async fn completed_session_rejects_answers() {
    let app = TestApp::spawn().await;
    app.start(json!({"query": "I want a laptop", "session_id": "s1"}))
        .await;

    for i in 0..5 {
        app.answer(json!({"session_id": "s1", "question_index": i, "answer": "ok"}))
            .await;
    }

    let response = app
        .answer(json!({"session_id": "s1", "question_index": 0, "answer": "again"}))
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn provider_outage_degrades_but_completes() {
    let app =
        TestApp::spawn_with(MockTextProvider::failing(), MockVideoProvider::failing()).await;

    let body: Value = app
        .start(json!({"query": "I want shoes", "session_id": "s1"}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["degraded"], true);
    assert_eq!(body["follow_up_questions"][0], "What's your budget range?");
    assert_eq!(body["follow_up_questions"][4], "Do you have any brand preferences?");

    let mut last = Value::Null;
    for i in 0..5 {
        last = app
            .answer(json!({"session_id": "s1", "question_index": i, "answer": "any"}))
            .await
            .json()
            .await
            .unwrap();
    }

    assert_eq!(last["step"], "complete");
    assert_eq!(last["degraded"], true);
    assert!(last["summary"]
        .as_str()
        .unwrap()
        .starts_with("Shopping Summary:"));
    assert_eq!(last["search_query"], "I want shoes review unboxing");
    assert_eq!(
        last["recommendations"],
        "No videos found for your search query."
    );
}

#[tokio::test]
async fn delete_session_removes_it() {
    let app = TestApp::spawn().await;
    app.start(json!({"query": "I want a laptop", "session_id": "s1"}))
        .await;

    let response = app.delete("s1").await;
    assert_eq!(response.status(), 204);
    assert_eq!(app.status("s1").await.status(), 404);
    assert_eq!(app.delete("s1").await.status(), 404);
}

#[tokio::test]
async fn captions_endpoint_returns_notice() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/api/captions/video1", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["video_id"], "video1");
    assert_eq!(body["captions"], "No captions available for this video");
}
