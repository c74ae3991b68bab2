use std::time::Duration;

use tokio::{
    sync::watch,
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    update_client::UpdateClient, update_orchestrator::UpdateOrchestrator,
    update_shell::UpdateShell, CheckOrigin,
};

/// Re-runs the update check every `period` until shutdown is signalled. The
/// first tick lands one full period after start; the startup check is issued
/// separately. Ticks never wait on an in-flight check.
pub(crate) async fn run_periodic_checks<C, S>(
    orchestrator: UpdateOrchestrator<C, S>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    C: UpdateClient,
    S: UpdateShell,
{
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move {
                    orchestrator.check_for_updates(CheckOrigin::Scheduled).await;
                });
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return;
                }
            }
        }
    }
}
