//! API key ring with health tracking and fallback rotation
//!
//! Slots are kept in an owned `Vec` in rotation order; each slot carries its
//! own statistics, so removing a slot shifts the remaining slots and their
//! stats together.

use super::prompt::build_prompt;
use super::{Generation, GenerationRequest, GenerationTransport, TransportError, Usage};
use crate::config::{GenerationSettings, KeyRingConfig};
use crate::error::{ExamDeskError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PROBE_PROMPT: &str = "Reply with the single word: ok";

/// Last observed health of a credential
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotHealth {
    #[default]
    Unknown,
    Active,
    Limited,
    Error,
}

impl SlotHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Active => "active",
            Self::Limited => "limited",
            Self::Error => "error",
        }
    }
}

/// Usage statistics for one credential
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotStats {
    pub request_count: u64,
    pub error_count: u64,
    pub last_used_at: Option<DateTime<Utc>>,
    pub health: SlotHealth,
    pub last_error: Option<String>,
}

/// One configured API key and its statistics
#[derive(Debug, Clone)]
pub struct CredentialSlot {
    pub key: String,
    pub stats: SlotStats,
}

impl CredentialSlot {
    fn new(key: String) -> Self {
        Self {
            key,
            stats: SlotStats::default(),
        }
    }
}

/// Result of a successful `send`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub message: String,
    pub usage: Option<Usage>,
    pub used_slot_index: usize,
}

/// Per-slot line of a health report
#[derive(Debug, Clone, Serialize)]
pub struct SlotReport {
    pub index: usize,
    pub masked_key: String,
    pub is_current: bool,
    pub stats: SlotStats,
}

/// Aggregate health of the ring
#[derive(Debug, Clone, Serialize)]
pub struct KeyRingReport {
    pub slots: Vec<SlotReport>,
    pub total_requests: u64,
    pub total_errors: u64,
    pub current_index: usize,
    pub fallback_enabled: bool,
}

/// States of one logical `send`
enum Step {
    Selecting,
    Trying(usize),
    RoutingAround,
    Succeeded(Completion),
    Exhausted,
}

/// Rotating API key client
pub struct KeyRing {
    slots: Vec<CredentialSlot>,
    current_index: usize,
    fallback_enabled: bool,
    settings: GenerationSettings,
    transport: Arc<dyn GenerationTransport>,
}

impl KeyRing {
    /// Create an empty ring with fallback enabled
    pub fn new(transport: Arc<dyn GenerationTransport>, settings: GenerationSettings) -> Self {
        Self {
            slots: Vec::new(),
            current_index: 0,
            fallback_enabled: true,
            settings,
            transport,
        }
    }

    /// Restore a ring from persisted configuration, including saved stats
    pub fn from_config(
        config: &KeyRingConfig,
        settings: GenerationSettings,
        transport: Arc<dyn GenerationTransport>,
    ) -> Self {
        let slots: Vec<CredentialSlot> = config
            .keys
            .iter()
            .enumerate()
            .map(|(i, key)| CredentialSlot {
                key: key.clone(),
                stats: config.stats.get(i).cloned().unwrap_or_default(),
            })
            .collect();
        let current_index = if config.current_index < slots.len() {
            config.current_index
        } else {
            0
        };

        Self {
            slots,
            current_index,
            fallback_enabled: config.fallback_enabled,
            settings,
            transport,
        }
    }

    /// Persistable part of the ring
    pub fn to_config(&self) -> KeyRingConfig {
        KeyRingConfig {
            keys: self.slots.iter().map(|s| s.key.clone()).collect(),
            current_index: self.current_index,
            fallback_enabled: self.fallback_enabled,
            stats: self.slots.iter().map(|s| s.stats.clone()).collect(),
        }
    }

    /// Append a key with zeroed stats and return its index
    pub fn add_credential(&mut self, key: impl Into<String>) -> usize {
        self.slots.push(CredentialSlot::new(key.into()));
        self.slots.len() - 1
    }

    /// Remove the slot at `index`; out-of-range indices are ignored
    pub fn remove_credential(&mut self, index: usize) -> Option<CredentialSlot> {
        if index >= self.slots.len() {
            return None;
        }

        let removed = self.slots.remove(index);
        if self.current_index >= self.slots.len() {
            self.current_index = self.slots.len().saturating_sub(1);
        }

        tracing::debug!(
            "Removed credential {} at index {}, {} remaining",
            mask_key(&removed.key),
            index,
            self.slots.len()
        );
        Some(removed)
    }

    pub fn current_credential(&self) -> Option<&str> {
        self.slots.get(self.current_index).map(|s| s.key.as_str())
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Advance to the next key; `None` when fewer than two keys exist
    pub fn rotate(&mut self) -> Option<&str> {
        if self.slots.len() < 2 {
            return None;
        }
        self.advance();
        self.current_credential()
    }

    /// Make `index` the current slot
    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.slots.len() {
            return Err(ExamDeskError::CredentialNotFound(index));
        }
        self.current_index = index;
        Ok(())
    }

    pub fn slots(&self) -> &[CredentialSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback_enabled
    }

    pub fn set_fallback_enabled(&mut self, enabled: bool) {
        self.fallback_enabled = enabled;
    }

    /// Send one logical request, trying each key at most once.
    ///
    /// Starts at the current key. After a failure the ring moves to the next
    /// untried key while fallback is enabled. The current index is left on the
    /// key that answered, so the next call starts there.
    pub async fn send(&mut self, prompt: &str, context: &str) -> Result<Completion> {
        if self.slots.is_empty() {
            return Err(ExamDeskError::NotConfigured);
        }

        let request = GenerationRequest::new(
            build_prompt(prompt, context, self.settings.max_context_chars),
            &self.settings,
        );

        let budget = self.slots.len();
        let mut tried = vec![false; budget];
        let mut attempts = 0;
        let mut hops = 0;
        let mut last_error: Option<String> = None;
        let mut step = Step::Selecting;

        loop {
            step = match step {
                Step::Selecting => {
                    if attempts >= budget {
                        Step::Exhausted
                    } else if tried[self.current_index] {
                        Step::RoutingAround
                    } else {
                        Step::Trying(self.current_index)
                    }
                }
                // Guard only: failures advance one slot at a time, so the
                // current slot is untried while budget remains.
                Step::RoutingAround => {
                    hops += 1;
                    if hops > budget {
                        Step::Exhausted
                    } else {
                        self.advance();
                        Step::Selecting
                    }
                }
                Step::Trying(index) => {
                    tried[index] = true;
                    attempts += 1;

                    match self.attempt(index, &request).await {
                        Ok(generation) => Step::Succeeded(Completion {
                            message: generation.text,
                            usage: generation.usage,
                            used_slot_index: index,
                        }),
                        Err(err) => {
                            last_error = Some(err.to_string());
                            if self.fallback_enabled && attempts < budget {
                                self.advance();
                                Step::Selecting
                            } else {
                                Step::Exhausted
                            }
                        }
                    }
                }
                Step::Succeeded(completion) => {
                    if attempts > 1 {
                        tracing::info!(
                            "Request answered by credential {} after {} attempts",
                            completion.used_slot_index,
                            attempts
                        );
                    }
                    return Ok(completion);
                }
                Step::Exhausted => {
                    return Err(ExamDeskError::AllCredentialsExhausted {
                        attempts,
                        last_error: last_error
                            .unwrap_or_else(|| "no credential was attempted".to_string()),
                    });
                }
            };
        }
    }

    /// Probe a single key without rotating; returns its resulting health
    pub async fn check_credential(&mut self, index: usize) -> Result<SlotHealth> {
        if index >= self.slots.len() {
            return Err(ExamDeskError::CredentialNotFound(index));
        }

        let request = GenerationRequest::new(PROBE_PROMPT, &self.settings);
        let _ = self.attempt(index, &request).await;
        Ok(self.slots[index].stats.health)
    }

    /// Snapshot of every slot's statistics
    pub fn health_report(&self) -> KeyRingReport {
        let slots: Vec<SlotReport> = self
            .slots
            .iter()
            .enumerate()
            .map(|(index, slot)| SlotReport {
                index,
                masked_key: mask_key(&slot.key),
                is_current: index == self.current_index,
                stats: slot.stats.clone(),
            })
            .collect();

        KeyRingReport {
            total_requests: slots.iter().map(|s| s.stats.request_count).sum(),
            total_errors: slots.iter().map(|s| s.stats.error_count).sum(),
            slots,
            current_index: self.current_index,
            fallback_enabled: self.fallback_enabled,
        }
    }

    /// Zero all statistics, keeping keys and the current index
    pub fn reset_stats(&mut self) {
        for slot in &mut self.slots {
            slot.stats = SlotStats::default();
        }
    }

    fn advance(&mut self) {
        self.current_index = (self.current_index + 1) % self.slots.len();
    }

    /// One real request with the key at `index`, recording its outcome
    async fn attempt(
        &mut self,
        index: usize,
        request: &GenerationRequest,
    ) -> std::result::Result<Generation, TransportError> {
        let key = {
            let slot = &mut self.slots[index];
            slot.stats.request_count += 1;
            slot.stats.last_used_at = Some(Utc::now());
            slot.key.clone()
        };

        tracing::debug!("Sending request with credential {} ({})", index, mask_key(&key));
        let transport = Arc::clone(&self.transport);
        let outcome = transport.generate(&key, request).await;

        let stats = &mut self.slots[index].stats;
        match &outcome {
            Ok(_) => stats.health = SlotHealth::Active,
            Err(err) => {
                stats.health = if err.is_rate_limited() {
                    SlotHealth::Limited
                } else {
                    SlotHealth::Error
                };
                stats.error_count += 1;
                stats.last_error = Some(err.to_string());
                tracing::warn!(
                    "Credential {} ({}) failed: {}",
                    index,
                    mask_key(&key),
                    err
                );
            }
        }

        outcome
    }
}

/// Display form of a key: first and last four characters
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len().max(4));
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
