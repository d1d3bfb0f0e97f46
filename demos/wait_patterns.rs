//! Wait Patterns Example
//!
//! Demonstrates polling patterns for eventually-consistent services.
//! Shows practical patterns including:
//! - Basic waiting on an asynchronous probe
//! - Fixed and exponential poll cadences
//! - Transient vs fatal error classification
//! - Waiting with observability hooks
//! - Timeout handling with last-seen diagnostics
//! - Start-then-poll workflows against a job handle
//!
//! Run with: cargo run --example wait_patterns

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use slackwater::{
    start_and_wait, wait_for, wait_for_with_hooks, PollOutcome, WaitError, WaitPolicy,
};

// ==================== Basic Wait ====================

/// Example 1: Basic wait on a slow resource
///
/// Demonstrates polling a probe that reports pending twice before the
/// resource materializes.
async fn example_basic_wait() {
    println!("\n=== Example 1: Basic Wait ===");

    let probes = Arc::new(AtomicU32::new(0));

    let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_millis(50));
    let result = wait_for(&policy, {
        let probes = probes.clone();
        move || {
            let probes = probes.clone();
            async move {
                let n = probes.fetch_add(1, Ordering::SeqCst);
                println!("  Probe {}", n + 1);
                if n < 2 {
                    PollOutcome::<_, String>::Pending
                } else {
                    PollOutcome::Done("report ready")
                }
            }
        }
    })
    .await;

    match result {
        Ok(report) => println!("Got: {}", report),
        Err(e) => println!("Wait failed: {}", e),
    }
    println!("Total probes: {}", probes.load(Ordering::SeqCst));
}

// ==================== Poll Cadences ====================

/// Example 2: Comparing poll cadences
///
/// Shows how the delay between probes evolves under each cadence.
async fn example_cadences() {
    println!("\n=== Example 2: Poll Cadences ===");

    let fixed = WaitPolicy::new(Duration::from_secs(30), Duration::from_millis(100));
    println!("Fixed delays:");
    for attempt in 1..=5 {
        println!("  After probe {}: {:?}", attempt, fixed.delay_for_attempt(attempt));
    }

    let exponential =
        WaitPolicy::exponential(Duration::from_secs(30), Duration::from_millis(100));
    println!("\nExponential delays:");
    for attempt in 1..=5 {
        println!(
            "  After probe {}: {:?}",
            attempt,
            exponential.delay_for_attempt(attempt)
        );
    }

    let capped = WaitPolicy::exponential(Duration::from_secs(30), Duration::from_millis(100))
        .with_max_interval(Duration::from_millis(500));
    println!("\nExponential delays with 500ms cap:");
    for attempt in 1..=8 {
        println!(
            "  After probe {}: {:?}",
            attempt,
            capped.delay_for_attempt(attempt)
        );
    }
}

// ==================== Error Classification ====================

/// Example 3: Transient vs fatal errors
///
/// Demonstrates classifying probe errors so routine "not yet" failures keep
/// the wait alive while real failures abort it immediately.
async fn example_classification() {
    println!("\n=== Example 3: Error Classification ===");

    #[derive(Debug, Clone, PartialEq)]
    enum JobError {
        Busy,
        NotFound(u64),
    }

    impl std::fmt::Display for JobError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                JobError::Busy => write!(f, "service busy"),
                JobError::NotFound(id) => write!(f, "job {} not found", id),
            }
        }
    }

    let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_millis(50))
        .transient_if(|e: &JobError| matches!(e, JobError::Busy));

    // A missing job is fatal: one probe, no retries.
    let probes = Arc::new(AtomicU32::new(0));
    let result = wait_for(&policy, {
        let probes = probes.clone();
        move || {
            let probes = probes.clone();
            async move {
                probes.fetch_add(1, Ordering::SeqCst);
                println!("  Probing...");
                PollOutcome::<&str, _>::Failed(JobError::NotFound(17))
            }
        }
    })
    .await;
    println!("Fatal error (no retries): {:?}", result.unwrap_err());
    println!("Total probes: {}", probes.load(Ordering::SeqCst));

    // Busy responses ride through until the job completes.
    let probes = Arc::new(AtomicU32::new(0));
    let result = wait_for(&policy, {
        let probes = probes.clone();
        move || {
            let probes = probes.clone();
            async move {
                let n = probes.fetch_add(1, Ordering::SeqCst);
                println!("  Probe {}", n + 1);
                if n < 2 {
                    PollOutcome::Failed(JobError::Busy)
                } else {
                    PollOutcome::Done("job complete")
                }
            }
        }
    })
    .await;
    println!("\nBusy twice then done: {:?}", result.unwrap());
    println!("Total probes: {}", probes.load(Ordering::SeqCst));
}

// ==================== Wait with Observability ====================

/// Example 4: Wait with hooks for logging/metrics
///
/// Demonstrates wait_for_with_hooks observing every pause in the wait.
async fn example_wait_with_hooks() {
    println!("\n=== Example 4: Wait with Hooks ===");

    let probes = Arc::new(AtomicU32::new(0));

    let policy = WaitPolicy::exponential(Duration::from_secs(5), Duration::from_millis(25));
    let result = wait_for_with_hooks(
        &policy,
        {
            let probes = probes.clone();
            move || {
                let probes = probes.clone();
                async move {
                    let n = probes.fetch_add(1, Ordering::SeqCst);
                    if n < 3 {
                        PollOutcome::<_, String>::Pending
                    } else {
                        PollOutcome::Done("finally ready")
                    }
                }
            }
        },
        |event| {
            println!(
                "  [HOOK] Probe {} still pending after {:?}",
                event.attempt, event.elapsed
            );
            match event.next_delay {
                Some(delay) => println!("         Sleeping {:?} before the next probe", delay),
                None => println!("         Budget exhausted, giving up"),
            }
        },
    )
    .await;

    println!("\nResult: {:?}", result.unwrap());
}

// ==================== Timeout Diagnostics ====================

/// Example 5: Timeouts carry the last thing the probe saw
///
/// Demonstrates how a timed-out wait reports the most recent partial value,
/// which makes "it never finished" errors actionable.
async fn example_timeout_diagnostics() {
    println!("\n=== Example 5: Timeout Diagnostics ===");

    let policy = WaitPolicy::new(Duration::from_millis(200), Duration::from_millis(40));
    let result = wait_for(&policy, {
        let percent = Arc::new(AtomicU32::new(0));
        move || {
            let percent = percent.clone();
            async move {
                // The job crawls at 10% per probe; it will not finish in time.
                let done = percent.fetch_add(10, Ordering::SeqCst) + 10;
                PollOutcome::<u32, String>::PendingWith(done)
            }
        }
    })
    .await;

    match result {
        Ok(value) => println!("Completed: {}", value),
        Err(WaitError::TimedOut(timed_out)) => {
            println!(
                "Timed out after {:?} and {} probes",
                timed_out.waited, timed_out.attempts
            );
            if let Some(progress) = timed_out.last_value() {
                println!("Last reported progress: {}%", progress);
            }
        }
        Err(WaitError::Fatal(e)) => println!("Fatal: {}", e),
    }
}

// ==================== Start Then Poll ====================

/// Example 6: Kicking off a job and waiting on its handle
///
/// Demonstrates start_and_wait: the start future yields a handle, and the
/// probe receives a clone of it on every attempt.
async fn example_start_and_wait() {
    println!("\n=== Example 6: Start Then Poll ===");

    // Simulated job server: every job needs three status checks.
    #[derive(Clone, Default)]
    struct JobServer {
        checks: Arc<AtomicU32>,
    }

    impl JobServer {
        async fn submit(&self) -> Result<u64, String> {
            println!("  Submitting job...");
            Ok(42)
        }

        async fn status(&self, id: u64) -> PollOutcome<String, String> {
            let n = self.checks.fetch_add(1, Ordering::SeqCst);
            println!("  Status check {} for job {}", n + 1, id);
            PollOutcome::ready_when(n >= 2, format!("job {} output", id))
        }
    }

    let server = JobServer::default();
    let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_millis(50));

    let result = start_and_wait(&policy, server.submit(), {
        let server = server.clone();
        move |id| {
            let server = server.clone();
            async move { server.status(id).await }
        }
    })
    .await;

    println!("Result: {:?}", result.unwrap());
}

// ==================== Blocking Shell ====================

/// Example 7: The blocking waiter on a dedicated thread
///
/// Demonstrates the synchronous shell, kept off the async runtime via
/// spawn_blocking.
async fn example_blocking_wait() {
    println!("\n=== Example 7: Blocking Wait ===");

    let result = tokio::task::spawn_blocking(|| {
        let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_millis(30));
        let mut remaining = 2u32;
        slackwater::blocking::wait_for(&policy, move || {
            if remaining == 0 {
                PollOutcome::<_, String>::Done("table exists")
            } else {
                remaining -= 1;
                PollOutcome::Pending
            }
        })
    })
    .await;

    println!("Result: {:?}", result.unwrap().unwrap());
}

#[tokio::main]
async fn main() {
    println!("======================================");
    println!("        Wait Patterns Example         ");
    println!("======================================");

    example_basic_wait().await;
    example_cadences().await;
    example_classification().await;
    example_wait_with_hooks().await;
    example_timeout_diagnostics().await;
    example_start_and_wait().await;
    example_blocking_wait().await;

    println!("\n======================================");
    println!("           Examples Complete           ");
    println!("======================================");
}
