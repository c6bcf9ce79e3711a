//! End-to-end scheduling tests.
//!
//! The controller runs against the file-backed stores, the in-memory
//! dispatcher and a mockito chat-completions backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{FixedOffset, TimeZone, Utc};
use getodone_core::dispatch::RegistryCall;
use getodone_core::storage::GenerationConfig;
use getodone_core::{
    CycleResult, FrequencyMode, HttpMessageGenerator, JsonStore, MemoryDispatcher,
    NotificationDispatcher, PreferenceStore, Preferences, Presenter, ScheduleController,
    ScheduleOutcome, ScheduledNotification, Task, TaskStore, Tone, TriggerHost, TriggerRegistry,
    WallClockTime, BACKGROUND_TASK_NAME,
};
use mockito::Matcher;
use serde_json::json;
use tempfile::TempDir;

struct Harness {
    _dir: TempDir,
    store: Arc<JsonStore>,
    dispatcher: Arc<MemoryDispatcher>,
    controller: Arc<ScheduleController>,
}

fn harness(endpoint: String) -> Harness {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonStore::new(dir.path()));
    let dispatcher = Arc::new(MemoryDispatcher::default());
    let generator = Arc::new(
        HttpMessageGenerator::from_config(&GenerationConfig {
            endpoint,
            timeout_secs: 5,
            max_tokens: 100,
        })
        .unwrap(),
    );
    let controller = Arc::new(ScheduleController::new(
        store.clone(),
        store.clone(),
        generator,
        dispatcher.clone(),
        dispatcher.clone(),
    ));
    Harness {
        _dir: dir,
        store,
        dispatcher,
        controller,
    }
}

fn enabled(mode: FrequencyMode, api_key: &str) -> Preferences {
    Preferences {
        frequency_mode: mode,
        tone: Tone::Soft,
        api_key: api_key.to_string(),
        notifications_enabled: true,
        ..Preferences::default()
    }
}

fn success_body(text: &str) -> String {
    json!({ "choices": [{ "message": { "role": "assistant", "content": text } }] }).to_string()
}

#[tokio::test]
async fn test_daily_cycle_generates_and_schedules() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("authorization", "Bearer gsk_live")
        .match_body(Matcher::PartialJson(json!({
            "model": "meta-llama/llama-4-scout-17b-16e-instruct",
            "max_tokens": 100,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(success_body("You've got this, start with the report!"))
        .create_async()
        .await;

    let h = harness(server.url());
    h.store.add_task(Task::new("Write report").unwrap()).unwrap();
    let prefs = enabled(FrequencyMode::Daily, "gsk_live");
    h.store.set_preferences(&prefs).unwrap();

    let outcome = h.controller.apply_preferences(&prefs).await.unwrap();
    assert_eq!(outcome, ScheduleOutcome::Recurring { interval_secs: 86400 });
    assert!(h
        .dispatcher
        .is_recurring_registered(BACKGROUND_TASK_NAME)
        .await
        .unwrap());

    let before = Utc::now();
    assert_eq!(h.controller.run_cycle().await, CycleResult::NewData);
    mock.assert_async().await;

    let scheduled = h.dispatcher.list_scheduled().await.unwrap();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].body, "You've got this, start with the report!");
    let fires_at = scheduled[0].fires_at.unwrap();
    assert!(fires_at > before);
    assert!(fires_at <= Utc::now() + chrono::Duration::seconds(2));
}

#[tokio::test]
async fn test_invalid_api_key_fails_cycle_without_notification() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"invalid_api_key","type":"invalid_request_error"}}"#)
        .create_async()
        .await;

    let h = harness(server.url());
    h.store.add_task(Task::new("Write report").unwrap()).unwrap();
    h.store
        .set_preferences(&enabled(FrequencyMode::Hourly, "bad"))
        .unwrap();

    assert_eq!(h.controller.run_cycle().await, CycleResult::Failed);
    assert!(h.dispatcher.list_scheduled().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_custom_time_schedules_single_one_shot_at_local_wall_clock() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(success_body("Time to tackle it."))
        .expect(2)
        .create_async()
        .await;

    let h = harness(server.url());
    h.store.add_task(Task::new("Call mom").unwrap()).unwrap();
    let prefs = Preferences {
        custom_time: WallClockTime::new(9, 30),
        ..enabled(FrequencyMode::OneShotAtTime, "gsk_live")
    };

    let zone = FixedOffset::east_opt(2 * 3600).unwrap();
    let now = zone.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap();

    h.controller.apply_preferences_at(&prefs, &now).await.unwrap();
    let outcome = h.controller.apply_preferences_at(&prefs, &now).await.unwrap();
    mock.assert_async().await;

    let expected = zone.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap().with_timezone(&Utc);
    match outcome {
        ScheduleOutcome::OneShot { fires_at, message, .. } => {
            assert_eq!(fires_at, expected);
            assert_eq!(message, "Time to tackle it.");
        }
        other => panic!("expected one-shot, got {other:?}"),
    }

    let scheduled = h.dispatcher.list_scheduled().await.unwrap();
    assert_eq!(scheduled.len(), 1);
    assert!(h.dispatcher.registry_calls().is_empty());
}

#[tokio::test]
async fn test_switching_from_daily_to_custom_unregisters_trigger() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(success_body("Go!"))
        .create_async()
        .await;

    let h = harness(server.url());
    h.store.add_task(Task::new("Write report").unwrap()).unwrap();

    h.controller
        .apply_preferences(&enabled(FrequencyMode::Daily, "gsk_live"))
        .await
        .unwrap();
    h.controller
        .apply_preferences(&enabled(FrequencyMode::OneShotSoon, "gsk_live"))
        .await
        .unwrap();

    assert_eq!(
        h.dispatcher.registry_calls(),
        vec![
            RegistryCall::Register {
                name: BACKGROUND_TASK_NAME.to_string(),
                interval_secs: 86400,
            },
            RegistryCall::Unregister {
                name: BACKGROUND_TASK_NAME.to_string(),
            },
        ]
    );
    assert_eq!(h.dispatcher.list_scheduled().await.unwrap().len(), 1);
}

#[derive(Default)]
struct Collect(Mutex<Vec<String>>);

impl Presenter for Collect {
    fn present(&self, notification: &ScheduledNotification) {
        self.0.lock().unwrap().push(notification.body.clone());
    }
}

#[tokio::test]
async fn test_host_fires_trigger_and_delivers_generated_nudge() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(success_body("One small step."))
        .create_async()
        .await;

    let h = harness(server.url());
    h.store.add_task(Task::new("Stretch").unwrap()).unwrap();
    let prefs = enabled(FrequencyMode::Hourly, "gsk_live");
    h.store.set_preferences(&prefs).unwrap();
    h.controller.apply_preferences(&prefs).await.unwrap();

    let presenter = Arc::new(Collect::default());
    let mut host = TriggerHost::new(h.dispatcher.clone(), presenter.clone(), Duration::from_secs(1));
    host.define(BACKGROUND_TASK_NAME, h.controller.clone());

    let report = host
        .tick_once(Utc::now() + chrono::Duration::seconds(3601))
        .await
        .unwrap();
    assert_eq!(
        report.fired,
        vec![(BACKGROUND_TASK_NAME.to_string(), CycleResult::NewData)]
    );
    assert_eq!(report.delivered, 1);
    assert_eq!(*presenter.0.lock().unwrap(), vec!["One small step."]);
}
