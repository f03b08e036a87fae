//! Local key collection run
//!
//! Every committee member derives a key pair and submits it from its own task;
//! the run finishes when the service signals KEYS_COLLECTED.

use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use log::info;

use pvss_committee::{Committee, CommitteeError, MemberId, Phase};
use pvss_config::PvssConfig;
use pvss_core::KeyCollectionService;
use pvss_group::{GroupParams, KeyPair};

/// Simulation options
#[derive(Debug, Clone)]
pub struct SimulateConfig {
    /// Override the configured committee size
    pub size: Option<usize>,
    /// Give up if collection has not finished after this long
    pub timeout: Duration,
    /// Print every collected key
    pub verbose: bool,
}

impl Default for SimulateConfig {
    fn default() -> Self {
        Self {
            size: None,
            timeout: Duration::from_secs(60),
            verbose: false,
        }
    }
}

/// Summary of a finished run
#[derive(Debug)]
pub struct SimulationReport {
    pub committee_size: usize,
    pub threshold: usize,
    pub elapsed: Duration,
}

pub async fn run_simulation(config: &PvssConfig, sim: &SimulateConfig) -> Result<SimulationReport> {
    let mut config = config.clone();
    if let Some(size) = sim.size {
        config.committee.size = size;
        config.committee.members.clear();
    }

    let params = config.group_params()?;
    let committee = Committee::new(config.committee_ids()?)?;
    let pairs = generate_pairs(&params, committee.size())?;
    let service = KeyCollectionService::new(committee)?;

    println!(
        "🔐 Collecting {} public keys ({}-bit group, threshold {})",
        service.committee().size(),
        params.bits(),
        service.threshold().await
    );

    let start = Instant::now();
    let waiter = {
        let service = service.clone();
        tokio::spawn(async move { service.wait_for_keys().await })
    };

    let mut handles = Vec::with_capacity(pairs.len());
    for (member, pair) in service.committee().members().iter().zip(pairs.iter()) {
        let service = service.clone();
        let id = member.id;
        let public = pair.public.as_biguint().clone();
        handles.push(tokio::spawn(async move {
            service.submit_public_key(&id, public).await
        }));
    }

    for handle in handles {
        handle.await.context("Submission task panicked")??;
    }

    let keys = tokio::time::timeout(sim.timeout, waiter)
        .await
        .context("Timed out waiting for key collection")?
        .context("Collection waiter panicked")?
        .context("Key collection did not complete")?;
    let elapsed = start.elapsed();

    // Each stored key must match the secret its owner holds
    for (index, (key, pair)) in keys.iter().zip(pairs.iter()).enumerate() {
        if key != pair.public.as_biguint() || !params.verify(&pair.secret, &pair.public)? {
            bail!("Collected key for member {} does not match its secret", index);
        }
        if sim.verbose {
            println!("  [{:>3}] {} -> {}", index, service.member_at(index)?, pair.public);
        }
    }

    check_closed(&service).await?;

    let report = SimulationReport {
        committee_size: keys.len(),
        threshold: service.threshold().await,
        elapsed,
    };
    info!("Simulation finished: {:?}", report);
    Ok(report)
}

fn generate_pairs(params: &GroupParams, n: usize) -> Result<Vec<KeyPair>> {
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|_| Ok(KeyPair::generate(params, &mut rng)?))
        .collect()
}

/// Late and foreign submissions must bounce once the phase has closed
async fn check_closed(service: &KeyCollectionService) -> Result<()> {
    if service.current_phase().await != Phase::KeysCollected {
        bail!("Phase did not advance to {}", Phase::KeysCollected);
    }

    let member = service.member_at(0)?;
    match service.submit_public_key(&member, 1u32.into()).await {
        Err(CommitteeError::PhaseClosed) => {}
        other => bail!("Late submission was not rejected: {:?}", other),
    }

    let outsider = MemberId::derive(b"pvss-simulate-outsider");
    match service.submit_public_key(&outsider, 1u32.into()).await {
        Err(CommitteeError::NotAMember(_)) => {}
        other => bail!("Outsider submission was not rejected: {:?}", other),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_group_config(size: usize) -> PvssConfig {
        let mut config = PvssConfig::default();
        config.committee.size = size;
        config.group.modulus = Some("23".into());
        config.group.generator = Some("4".into());
        config.group.order = Some("11".into());
        config
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_simulation_small_group() {
        let report = run_simulation(&small_group_config(10), &SimulateConfig::default())
            .await
            .unwrap();
        assert_eq!(report.committee_size, 10);
        assert_eq!(report.threshold, 6);
    }

    #[tokio::test]
    async fn test_simulation_size_override() {
        let sim = SimulateConfig {
            size: Some(3),
            ..SimulateConfig::default()
        };
        let report = run_simulation(&small_group_config(10), &sim).await.unwrap();
        assert_eq!(report.committee_size, 3);
        assert_eq!(report.threshold, 2);
    }

    #[tokio::test]
    async fn test_simulation_rejects_empty_committee() {
        let sim = SimulateConfig {
            size: Some(0),
            ..SimulateConfig::default()
        };
        assert!(run_simulation(&small_group_config(10), &sim).await.is_err());
    }
}
