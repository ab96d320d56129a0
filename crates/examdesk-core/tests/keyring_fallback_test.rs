//! Integration tests for key rotation and fallback
//!
//! Uses a scripted in-process transport so no network access is needed.

use async_trait::async_trait;
use examdesk_core::{
    Config, ExamDeskError, Generation, GenerationRequest, GenerationSettings,
    GenerationTransport, KeyRing, SlotHealth, TransportError, Usage,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
enum Behavior {
    Answer(&'static str),
    RateLimited,
    QuotaMessage,
    ServerError,
    Offline,
}

/// Answers per key according to a script and records every call
struct ScriptedTransport {
    script: HashMap<String, Behavior>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedTransport {
    fn new(script: &[(&str, Behavior)]) -> Arc<Self> {
        Arc::new(Self {
            script: script
                .iter()
                .map(|(k, b)| (k.to_string(), b.clone()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn keys_called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, p)| p.clone())
            .collect()
    }
}

#[async_trait]
impl GenerationTransport for ScriptedTransport {
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<Generation, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((api_key.to_string(), request.prompt.clone()));

        match self.script.get(api_key).cloned().unwrap_or(Behavior::Offline) {
            Behavior::Answer(text) => Ok(Generation {
                text: text.to_string(),
                usage: Some(Usage {
                    prompt_tokens: 4,
                    completion_tokens: 6,
                    total_tokens: 10,
                }),
            }),
            Behavior::RateLimited => Err(TransportError::Http {
                status: 429,
                message: "Too Many Requests".to_string(),
            }),
            Behavior::QuotaMessage => Err(TransportError::Http {
                status: 403,
                message: "Quota exceeded for this project".to_string(),
            }),
            Behavior::ServerError => Err(TransportError::Http {
                status: 500,
                message: "Internal error".to_string(),
            }),
            Behavior::Offline => Err(TransportError::Network("connection refused".to_string())),
        }
    }
}

fn ring(transport: Arc<ScriptedTransport>, keys: &[&str]) -> KeyRing {
    let mut ring = KeyRing::new(transport, GenerationSettings::default());
    for key in keys {
        ring.add_credential(*key);
    }
    ring
}

fn key_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("key-{i}")).collect()
}

#[tokio::test]
async fn test_single_healthy_slot_found_from_any_start() {
    for n in 1..=5 {
        for healthy in 0..n {
            for start in 0..n {
                let keys = key_names(n);
                let script: Vec<(&str, Behavior)> = keys
                    .iter()
                    .enumerate()
                    .map(|(i, k)| {
                        let behavior = if i == healthy {
                            Behavior::Answer("ok")
                        } else if i % 2 == 0 {
                            Behavior::RateLimited
                        } else {
                            Behavior::ServerError
                        };
                        (k.as_str(), behavior)
                    })
                    .collect();
                let transport = ScriptedTransport::new(&script);
                let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
                let mut ring = ring(transport.clone(), &key_refs);
                ring.select(start).unwrap();

                let completion = ring.send("question", "").await.unwrap();

                assert_eq!(completion.used_slot_index, healthy, "n={n} start={start}");
                assert_eq!(ring.current_index(), healthy);
                assert!(transport.keys_called().len() <= n);
            }
        }
    }
}

#[tokio::test]
async fn test_all_rate_limited_makes_exactly_n_attempts() {
    for n in 1..=6 {
        let keys = key_names(n);
        let script: Vec<(&str, Behavior)> = keys
            .iter()
            .map(|k| (k.as_str(), Behavior::RateLimited))
            .collect();
        let transport = ScriptedTransport::new(&script);
        let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let mut ring = ring(transport.clone(), &key_refs);

        let err = ring.send("question", "").await.unwrap_err();

        match err {
            ExamDeskError::AllCredentialsExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, n);
                assert!(last_error.contains("429"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let mut called = transport.keys_called();
        assert_eq!(called.len(), n);
        called.sort();
        called.dedup();
        assert_eq!(called.len(), n, "a key was tried twice");

        let report = ring.health_report();
        assert!(report
            .slots
            .iter()
            .all(|s| s.stats.health == SlotHealth::Limited && s.stats.error_count == 1));
    }
}

#[tokio::test]
async fn test_health_classification() {
    let transport = ScriptedTransport::new(&[
        ("a", Behavior::RateLimited),
        ("b", Behavior::QuotaMessage),
        ("c", Behavior::ServerError),
        ("d", Behavior::Answer("Giới hạn là 0")),
    ]);
    let mut ring = ring(transport.clone(), &["a", "b", "c", "d"]);

    let completion = ring.send("Tính giới hạn", "").await.unwrap();
    assert_eq!(completion.message, "Giới hạn là 0");
    assert_eq!(completion.used_slot_index, 3);
    assert_eq!(completion.usage.unwrap().total_tokens, 10);

    let health: Vec<SlotHealth> = ring.slots().iter().map(|s| s.stats.health).collect();
    assert_eq!(
        health,
        vec![
            SlotHealth::Limited,
            SlotHealth::Limited,
            SlotHealth::Error,
            SlotHealth::Active
        ]
    );
    assert!(ring.slots()[2].stats.last_error.as_deref().unwrap().contains("500"));
    assert!(ring.slots().iter().all(|s| s.stats.last_used_at.is_some()));
}

#[tokio::test]
async fn test_fallback_disabled_stops_after_first_failure() {
    let transport =
        ScriptedTransport::new(&[("a", Behavior::Offline), ("b", Behavior::Answer("ok"))]);
    let mut ring = ring(transport.clone(), &["a", "b"]);
    ring.set_fallback_enabled(false);

    let err = ring.send("question", "").await.unwrap_err();
    assert!(matches!(
        err,
        ExamDeskError::AllCredentialsExhausted { attempts: 1, .. }
    ));
    assert_eq!(transport.keys_called(), vec!["a"]);
    assert_eq!(ring.current_index(), 0);
}

#[tokio::test]
async fn test_fallback_disabled_stops_on_rate_limit() {
    let transport =
        ScriptedTransport::new(&[("a", Behavior::RateLimited), ("b", Behavior::Answer("ok"))]);
    let mut ring = ring(transport.clone(), &["a", "b"]);
    ring.set_fallback_enabled(false);

    let err = ring.send("question", "").await.unwrap_err();
    match err {
        ExamDeskError::AllCredentialsExhausted {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 1);
            assert!(last_error.contains("429"));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(transport.keys_called(), vec!["a"]);
    assert_eq!(ring.slots()[0].stats.health, SlotHealth::Limited);
    assert_eq!(ring.slots()[0].stats.error_count, 1);
    assert_eq!(ring.slots()[1].stats.request_count, 0);
    assert_eq!(ring.slots()[1].stats.health, SlotHealth::Unknown);
    assert_eq!(ring.current_index(), 0);
}

#[tokio::test]
async fn test_rotation_persists_across_calls() {
    let transport = ScriptedTransport::new(&[
        ("a", Behavior::RateLimited),
        ("b", Behavior::Answer("first")),
        ("c", Behavior::Answer("second")),
    ]);
    let mut ring = ring(transport.clone(), &["a", "b", "c"]);

    ring.send("one", "").await.unwrap();
    assert_eq!(ring.current_index(), 1);

    let completion = ring.send("two", "").await.unwrap();
    assert_eq!(completion.used_slot_index, 1);
    assert_eq!(transport.keys_called(), vec!["a", "b", "b"]);
    assert_eq!(ring.slots()[1].stats.request_count, 2);
}

#[tokio::test]
async fn test_not_configured_makes_no_calls() {
    let transport = ScriptedTransport::new(&[]);
    let mut ring = ring(transport.clone(), &[]);

    let err = ring.send("question", "").await.unwrap_err();
    assert!(matches!(err, ExamDeskError::NotConfigured));
    assert!(transport.keys_called().is_empty());
}

#[tokio::test]
async fn test_context_reaches_prompt() {
    let transport = ScriptedTransport::new(&[("a", Behavior::Answer("ok"))]);
    let mut ring = ring(transport.clone(), &["a"]);

    ring.send("Đạo hàm là gì?", "Chương 2: Đạo hàm và vi phân")
        .await
        .unwrap();

    let prompt = &transport.prompts()[0];
    assert!(prompt.contains("Chương 2: Đạo hàm và vi phân"));
    assert!(prompt.contains("Đạo hàm là gì?"));
}

#[tokio::test]
async fn test_check_credential_does_not_rotate() {
    let transport =
        ScriptedTransport::new(&[("a", Behavior::Answer("ok")), ("b", Behavior::RateLimited)]);
    let mut ring = ring(transport.clone(), &["a", "b"]);

    assert_eq!(ring.check_credential(1).await.unwrap(), SlotHealth::Limited);
    assert_eq!(ring.check_credential(0).await.unwrap(), SlotHealth::Active);
    assert_eq!(ring.current_index(), 0);
    assert!(matches!(
        ring.check_credential(2).await,
        Err(ExamDeskError::CredentialNotFound(2))
    ));
}

#[tokio::test]
async fn test_remove_then_add_leaves_no_stale_stats() {
    let transport = ScriptedTransport::new(&[
        ("a", Behavior::RateLimited),
        ("b", Behavior::ServerError),
        ("c", Behavior::Answer("ok")),
    ]);
    let mut ring = ring(transport.clone(), &["a", "b", "c"]);
    ring.send("question", "").await.unwrap();

    ring.remove_credential(1);
    let index = ring.add_credential("d");

    assert_eq!(index, 2);
    assert_eq!(ring.len(), 3);
    let keys: Vec<&str> = ring.slots().iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "c", "d"]);
    assert_eq!(ring.slots()[1].stats.health, SlotHealth::Active);
    assert_eq!(ring.slots()[2].stats.request_count, 0);
    assert_eq!(ring.slots()[2].stats.health, SlotHealth::Unknown);

    let report = ring.health_report();
    assert_eq!(report.slots.len(), 3);
    assert_eq!(report.total_requests, 2);
    assert_eq!(report.total_errors, 1);
}

#[tokio::test]
async fn test_ring_restored_from_config() {
    let mut config = Config::default();
    config.keyring.keys = vec!["a".to_string(), "b".to_string()];
    config.keyring.current_index = 1;

    let transport =
        ScriptedTransport::new(&[("a", Behavior::Answer("from a")), ("b", Behavior::Offline)]);
    let mut ring = KeyRing::from_config(&config.keyring, config.generation.clone(), transport);

    let completion = ring.send("question", "").await.unwrap();
    assert_eq!(completion.message, "from a");
    assert_eq!(ring.to_config().current_index, 0);
}
