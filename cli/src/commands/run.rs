use std::sync::Arc;

use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use assetronics_common::config::Config;
use assetronics_core::api::InventoryClient;
use assetronics_core::checkin::CheckInService;
use assetronics_core::system::SystemCollector;

/// Endpoint mode: check in right away, then once per interval until the
/// process is asked to stop.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let service = CheckInService::new(
        Arc::new(SystemCollector::new()),
        Arc::new(InventoryClient::new(&cfg.api)?),
    );

    info!(
        "Agent started, checking in every {}s",
        cfg.agent.interval.as_secs()
    );

    let mut ticker = tokio::time::interval(cfg.agent.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => check_in_once(&service, cfg).await,
            stopped = &mut shutdown => {
                if let Err(e) = stopped {
                    warn!("Signal handling failed, stopping: {e:#}");
                }
                info!("Shutting down agent");
                return Ok(());
            }
        }
    }
}

async fn check_in_once(service: &CheckInService, cfg: &Config) {
    if cfg.dry_run {
        match service.collect().await {
            Ok(info) => match serde_json::to_string_pretty(&info) {
                Ok(json) => println!("{json}"),
                Err(e) => error!("Failed to encode system info: {e}"),
            },
            Err(e) => error!("Failed to collect system info: {e:#}"),
        }
        return;
    }

    if let Err(e) = service.check_in().await {
        error!("Check-in failed: {e:#}");
    }
}

async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    Ok(())
}
