use crate::output::print_snapshots;
use crate::plan::Plan;
use anyhow::{bail, Context};
use maint_core::{ActionFactory, ActionRegistry, ActionState, MaintenanceConfig, WorkerPool};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

enum WaitOutcome {
    Drained,
    Interrupted,
    TimedOut,
}

pub fn run(
    config: MaintenanceConfig,
    plan_path: &Path,
    workers: Option<usize>,
    timeout_secs: u64,
    json: bool,
) -> anyhow::Result<()> {
    let plan = Plan::load(plan_path)?;
    let threads = workers.unwrap_or(config.worker_threads);
    let registry = Arc::new(ActionRegistry::new(config, ActionFactory::with_scripted()));

    for (index, planned) in plan.actions.into_iter().enumerate() {
        registry
            .add_action(planned.description, planned.properties)
            .with_context(|| format!("plan action #{index} rejected"))?;
    }

    let pool = WorkerPool::start(Arc::clone(&registry), threads)
        .context("failed to start worker pool")?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;
    let outcome = rt.block_on(wait_for_drain(&registry, timeout_secs));

    pool.shutdown();

    let snapshots = registry.snapshots();
    print_snapshots(&snapshots, json)?;

    match outcome {
        WaitOutcome::Drained => {}
        WaitOutcome::Interrupted => bail!("interrupted; queued and in-flight actions were failed"),
        WaitOutcome::TimedOut => bail!("plan did not finish within {timeout_secs}s"),
    }

    let failed: Vec<String> = snapshots
        .iter()
        .filter(|s| s.state == ActionState::Failed.code())
        .map(|s| format!("#{} [{}] {}", s.id, s.result, s.message))
        .collect();
    if !failed.is_empty() {
        bail!("{} action(s) failed: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}

async fn wait_for_drain(registry: &ActionRegistry, timeout_secs: u64) -> WaitOutcome {
    let mut tick = tokio::time::interval(POLL_INTERVAL);
    let deadline = tokio::time::sleep(Duration::from_secs(timeout_secs));
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                if registry.all_terminal() {
                    return WaitOutcome::Drained;
                }
            }
            _ = &mut ctrl_c => {
                tracing::warn!("interrupt received, shutting down maintenance workers");
                return WaitOutcome::Interrupted;
            }
            _ = &mut deadline => {
                tracing::warn!(timeout_secs, "plan timed out, shutting down maintenance workers");
                return WaitOutcome::TimedOut;
            }
        }
    }
}
