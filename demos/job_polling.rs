//! Demonstrates tracing output from a polled deployment workflow
//!
//! Run with: cargo run --example job_polling --features tracing

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use slackwater::{start_and_wait, wait_for_with_hooks, PollOutcome, WaitError, WaitPolicy};

#[derive(Debug, Clone)]
enum DeployError {
    ControlPlaneBusy,
    RolledBack(String),
}

impl std::fmt::Display for DeployError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeployError::ControlPlaneBusy => write!(f, "control plane busy"),
            DeployError::RolledBack(service) => write!(f, "{} rolled back", service),
        }
    }
}

/// Simulated deployment API: a deploy needs three status checks, the control
/// plane answers "busy" on the first one, and anything legacy rolls back.
#[derive(Clone, Default)]
struct DeployService {
    checks: Arc<AtomicU32>,
}

impl DeployService {
    async fn begin(&self, service: &str) -> Result<String, DeployError> {
        tracing::info!(service, "submitting deployment");
        Ok(format!("deploy-{}", service))
    }

    async fn status(&self, id: String) -> PollOutcome<String, DeployError> {
        if id.contains("legacy") {
            return PollOutcome::Failed(DeployError::RolledBack(id));
        }
        match self.checks.fetch_add(1, Ordering::SeqCst) {
            0 => PollOutcome::Failed(DeployError::ControlPlaneBusy),
            1 => PollOutcome::Pending,
            _ => PollOutcome::Done(format!("{} is live", id)),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    tracing::info!("starting deployment");

    let deploys = DeployService::default();
    let policy = WaitPolicy::exponential(Duration::from_secs(2), Duration::from_millis(25))
        .transient_if(|e: &DeployError| matches!(e, DeployError::ControlPlaneBusy));

    let result = start_and_wait(&policy, deploys.begin("api-gateway"), {
        let deploys = deploys.clone();
        move |id| {
            let deploys = deploys.clone();
            async move { deploys.status(id).await }
        }
    })
    .await;

    match result {
        Ok(summary) => tracing::info!("deployment finished: {}", summary),
        Err(e) => tracing::error!("deployment failed: {}", e),
    }

    // A rollback is fatal: one status check, no retries, no timeout.
    tracing::info!("deploying a service that will roll back");

    let result = start_and_wait(&policy, deploys.begin("legacy-worker"), {
        let deploys = deploys.clone();
        move |id| {
            let deploys = deploys.clone();
            async move { deploys.status(id).await }
        }
    })
    .await;

    match result {
        Ok(summary) => tracing::info!("deployment finished: {}", summary),
        Err(e) => tracing::error!("deployment failed: {}", e),
    }

    // A wait that cannot finish in time, with hook-driven progress logs.
    tracing::info!("waiting on a replica rollout that is too slow");

    let policy = WaitPolicy::new(Duration::from_millis(150), Duration::from_millis(40));
    let ready = Arc::new(AtomicU32::new(0));
    let result = wait_for_with_hooks(
        &policy,
        {
            let ready = ready.clone();
            move || {
                let ready = ready.clone();
                async move {
                    let replicas = ready.fetch_add(1, Ordering::SeqCst).min(2);
                    PollOutcome::<u32, String>::PendingWith(replicas)
                }
            }
        },
        |event| {
            tracing::debug!(
                attempt = event.attempt,
                replicas = ?event.last.value(),
                "rollout not complete yet"
            );
        },
    )
    .await;

    match result {
        Err(WaitError::TimedOut(timed_out)) => tracing::warn!(
            waited = ?timed_out.waited,
            attempts = timed_out.attempts,
            replicas = ?timed_out.last_value(),
            "gave up waiting for the rollout"
        ),
        other => tracing::error!("unexpected outcome: {:?}", other),
    }
}
