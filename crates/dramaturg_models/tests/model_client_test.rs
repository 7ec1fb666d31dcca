//! Model client behaviour against the scripted backend.

use dramaturg_error::{DramaturgErrorKind, ModelErrorKind};
use dramaturg_models::scripted::ScriptedGenerator;
use dramaturg_models::{ModelClient, ModelRequest, ModelSettings, Payload};
use dramaturg_rate_limit::NoopThrottle;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

fn client(generator: Arc<ScriptedGenerator>, primary: &str, fallback: Option<&str>) -> ModelClient {
    ModelClient::new(
        generator,
        Arc::new(NoopThrottle),
        ModelSettings::new(primary, fallback.map(str::to_string)),
    )
}

#[derive(Debug, Deserialize, PartialEq)]
struct Characters {
    characters: Vec<String>,
}

#[tokio::test]
async fn test_primary_success_uses_no_fallback() -> anyhow::Result<()> {
    let generator = Arc::new(ScriptedGenerator::new().with_default("hello"));
    let client = client(generator.clone(), "primary", Some("backup"));

    let response = client.generate_text(&ModelRequest::new("Say hi")).await?;

    assert_eq!(response.content(), "hello");
    assert_eq!(response.model(), "primary");
    assert!(!response.metadata().fallback_used());
    assert_eq!(generator.models_called(), vec!["primary"]);
    Ok(())
}

#[tokio::test]
async fn test_failure_retries_once_with_fallback() -> anyhow::Result<()> {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .with_default("from backup")
            .failing_for("primary"),
    );
    let client = client(generator.clone(), "primary", Some("backup"));

    let response = client.generate_text(&ModelRequest::new("Say hi")).await?;

    assert_eq!(response.content(), "from backup");
    assert_eq!(response.model(), "backup");
    assert!(*response.metadata().fallback_used());
    assert_eq!(generator.models_called(), vec!["primary", "backup"]);
    Ok(())
}

#[tokio::test]
async fn test_both_failing_returns_fallback_error_after_two_calls() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .failing_for("primary")
            .failing_for("backup"),
    );
    let client = client(generator.clone(), "primary", Some("backup"));

    let err = client
        .generate_text(&ModelRequest::new("Say hi"))
        .await
        .unwrap_err();

    assert_eq!(generator.call_count(), 2);
    assert!(err.to_string().contains("backup"));
}

#[tokio::test]
async fn test_identical_fallback_does_not_retry() {
    let generator = Arc::new(ScriptedGenerator::new().failing_for("same"));
    let client = client(generator.clone(), "same", Some("same"));

    let result = client.generate_text(&ModelRequest::new("Say hi")).await;

    assert!(result.is_err());
    assert_eq!(generator.call_count(), 1);
}

#[tokio::test]
async fn test_request_overrides_models() -> anyhow::Result<()> {
    let generator = Arc::new(ScriptedGenerator::new().with_default("ok").failing_for("custom"));
    let client = client(generator.clone(), "primary", None);

    let request = ModelRequest::new("Say hi")
        .with_model("custom")
        .with_fallback_model("custom-backup");
    let response = client.generate_text(&request).await?;

    assert_eq!(response.model(), "custom-backup");
    assert_eq!(generator.models_called(), vec!["custom", "custom-backup"]);
    Ok(())
}

#[tokio::test]
async fn test_timeout_is_an_ordinary_failure() -> anyhow::Result<()> {
    let slow = Arc::new(ScriptedGenerator::new().with_latency(Duration::from_millis(200)));
    let settings =
        ModelSettings::new("slow", None).with_request_timeout(Duration::from_millis(20));
    let client = ModelClient::new(slow, Arc::new(NoopThrottle), settings);

    let err = client
        .generate_text(&ModelRequest::new("Say hi"))
        .await
        .unwrap_err();

    match err.kind() {
        DramaturgErrorKind::Model(model_err) => {
            assert!(matches!(model_err.kind, ModelErrorKind::Timeout { .. }));
        }
        other => panic!("unexpected error kind: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_empty_reply_triggers_fallback() -> anyhow::Result<()> {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .with_rule("Say hi", "   ")
            .with_default("unused"),
    );
    let client = client(generator.clone(), "primary", Some("backup"));

    // Both models receive the same prompt, so both reply blank.
    let result = client.generate_text(&ModelRequest::new("Say hi")).await;

    assert!(result.is_err());
    assert_eq!(generator.call_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_generate_json_recovers_fenced_reply() -> anyhow::Result<()> {
    let generator = Arc::new(ScriptedGenerator::new().with_default(
        "Here are the characters:\n```json\n{\"characters\": [\"Layla\", \"Omar\"]}\n```",
    ));
    let client = client(generator, "primary", None);

    let response = client
        .generate_json::<Characters>(&ModelRequest::new("List characters"))
        .await?;

    assert_eq!(
        response.content().structured(),
        Some(&Characters {
            characters: vec!["Layla".into(), "Omar".into()]
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_generate_json_keeps_prose_unstructured() -> anyhow::Result<()> {
    let generator = Arc::new(ScriptedGenerator::new().with_default("No JSON today."));
    let client = client(generator, "primary", None);

    let response = client
        .generate_json::<Characters>(&ModelRequest::new("List characters"))
        .await?;

    assert_eq!(
        response.content(),
        &Payload::Unstructured("No JSON today.".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_guarded_respects_allow_partial() -> anyhow::Result<()> {
    let generator = Arc::new(ScriptedGenerator::new().with_default("{\"score\": 3}"));
    let client = client(generator, "primary", None);
    let request = ModelRequest::new("Score it");
    let needs_summary = |value: &serde_json::Value| value.get("summary").is_some();

    let strict = client.generate_guarded(&request, needs_summary, false).await?;
    assert!(!strict.content().is_structured());

    let lenient = client.generate_guarded(&request, needs_summary, true).await?;
    assert_eq!(
        lenient.content().structured(),
        Some(&serde_json::json!({"score": 3}))
    );
    Ok(())
}

#[tokio::test]
async fn test_usage_is_estimated_from_lengths() -> anyhow::Result<()> {
    let generator = Arc::new(ScriptedGenerator::new().with_default("abcdefgh"));
    let client = client(generator, "primary", None);

    let response = client.generate_text(&ModelRequest::new("1234")).await?;

    assert_eq!(*response.usage().prompt_tokens(), 1);
    assert_eq!(*response.usage().completion_tokens(), 2);
    assert_eq!(*response.usage().total_tokens(), 3);
    Ok(())
}

#[tokio::test]
async fn test_prompt_assembly_reaches_backend() -> anyhow::Result<()> {
    let generator = Arc::new(ScriptedGenerator::new().with_default("ok"));
    let client = client(generator.clone(), "primary", None);

    let request = ModelRequest::builder()
        .prompt("Task")
        .context("Scene 1")
        .system_instruction("Be brief")
        .temperature(0.1)
        .max_tokens(64u32)
        .build()?;
    client.generate_text(&request).await?;

    let calls = generator.calls();
    assert_eq!(calls[0].prompt(), "Be brief\n\nScene 1\n\nTask");
    assert_eq!(*calls[0].temperature(), Some(0.1));
    assert_eq!(*calls[0].max_output_tokens(), Some(64));
    Ok(())
}
