//! Key Collection Service
//!
//! Thread-safe front for the committee access gate, used by whatever drives
//! the protocol (RPC handlers, the share distribution layer, the CLI).
//!
//! ```text
//! Submission Flow:
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ 1. Transport authenticates sender, passes its MemberId          │
//! │ 2. Service takes the single lock around the AccessGate          │
//! │ 3. Gate checks membership, phase, one-shot slot; stores key     │
//! │ 4. Last key flips phase and publishes KEYS_COLLECTED on watch   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use num_bigint::BigUint;
use serde::Serialize;
use tokio::sync::{Mutex, watch};

use pvss_committee::{AccessGate, Committee, CommitteeError, MemberId, Phase, Submission};
use pvss_config::PvssConfig;

/// Point-in-time view of the collection state, taken under the lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionStatus {
    pub phase: Phase,
    pub remaining: usize,
    pub threshold: usize,
    pub committee_size: usize,
    /// Per-index submission flags
    pub submitted: Vec<bool>,
}

/// Shared key collection service
#[derive(Clone)]
pub struct KeyCollectionService {
    /// Read-only registry, queried without the lock
    committee: Arc<Committee>,
    /// Slots and protocol state behind one lock
    inner: Arc<Mutex<AccessGate>>,
    /// Phase notifications
    phase_tx: Arc<watch::Sender<Phase>>,
}

impl KeyCollectionService {
    /// Open key collection for `committee`
    pub fn new(committee: Committee) -> Result<Self, CommitteeError> {
        let committee = Arc::new(committee);
        let gate = AccessGate::new(committee.clone())?;
        let (phase_tx, _) = watch::channel(gate.current_phase());

        info!(
            "Key collection opened for {} members (threshold {})",
            committee.size(),
            gate.threshold()
        );

        Ok(Self {
            committee,
            inner: Arc::new(Mutex::new(gate)),
            phase_tx: Arc::new(phase_tx),
        })
    }

    /// Build the committee described by the configuration
    pub fn from_config(config: &PvssConfig) -> Result<Self> {
        let ids = config.committee_ids()?;
        let committee = Committee::new(ids).context("Invalid committee in config")?;
        Ok(Self::new(committee)?)
    }

    /// Register `caller`'s public key
    ///
    /// `caller` must come from the authenticated invocation context, never from
    /// the request payload.
    pub async fn submit_public_key(
        &self,
        caller: &MemberId,
        value: BigUint,
    ) -> Result<Submission, CommitteeError> {
        let mut gate = self.inner.lock().await;

        match gate.submit_public_key(caller, value) {
            Ok(Submission::Completed) => {
                // Sent under the lock: the watch value never lags the gate
                self.phase_tx.send_replace(Phase::KeysCollected);
                info!(
                    "All {} public keys collected; phase is now {}",
                    self.committee.size(),
                    Phase::KeysCollected
                );
                Ok(Submission::Completed)
            }
            Ok(recorded) => {
                debug!("Public key accepted from {} ({:?})", caller, recorded);
                Ok(recorded)
            }
            Err(e) => {
                warn!("Rejected public key from {}: {}", caller, e);
                Err(e)
            }
        }
    }

    pub async fn current_phase(&self) -> Phase {
        self.inner.lock().await.current_phase()
    }

    pub async fn remaining(&self) -> usize {
        self.inner.lock().await.remaining()
    }

    pub async fn threshold(&self) -> usize {
        self.inner.lock().await.threshold()
    }

    pub async fn public_key_of(&self, index: usize) -> Result<BigUint, CommitteeError> {
        self.inner.lock().await.public_key_of(index)
    }

    pub async fn has_submitted(&self, id: &MemberId) -> Result<bool, CommitteeError> {
        self.inner.lock().await.has_submitted(id)
    }

    /// Ordered public keys, once collection is complete
    pub async fn collected_keys(&self) -> Option<Vec<BigUint>> {
        self.inner.lock().await.collected_keys()
    }

    /// Consistent snapshot of every counter and flag
    pub async fn status(&self) -> CollectionStatus {
        let gate = self.inner.lock().await;
        let submitted = self
            .committee
            .members()
            .iter()
            .map(|m| gate.has_submitted(&m.id).unwrap_or(false))
            .collect();

        CollectionStatus {
            phase: gate.current_phase(),
            remaining: gate.remaining(),
            threshold: gate.threshold(),
            committee_size: self.committee.size(),
            submitted,
        }
    }

    pub fn committee(&self) -> &Arc<Committee> {
        &self.committee
    }

    pub fn member_at(&self, index: usize) -> Result<MemberId, CommitteeError> {
        self.committee.member_at(index)
    }

    pub fn is_member(&self, id: &MemberId) -> bool {
        self.committee.is_member(id)
    }

    /// Receive phase changes
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase_tx.subscribe()
    }

    /// Wait until every member has submitted, then return the ordered keys
    pub async fn wait_for_keys(&self) -> Option<Vec<BigUint>> {
        let mut rx = self.subscribe();
        rx.wait_for(|phase| *phase == Phase::KeysCollected)
            .await
            .ok()?;
        self.collected_keys().await
    }
}
