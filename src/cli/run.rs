//! Run command implementation

use std::time::Duration;

use clap::Args;
use tokio::time::MissedTickBehavior;

use crate::analysis::{AnalysisClient, AnalysisSource, AnalysisTracker};
use crate::client::ConnectionState;
use crate::config::Config;
use crate::feed::DashboardFeed;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the feed URL from the config file
    #[arg(long)]
    pub url: Option<String>,

    /// Exit after this many seconds (runs until Ctrl-C when unset)
    #[arg(long)]
    pub duration: Option<u64>,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut client_config = config.client_config();
        if let Some(url) = &self.url {
            client_config.url = url.clone();
        }

        let feed = DashboardFeed::new(client_config);
        let (client, mut updates) = feed.subscribe();

        // The worker logs every transition; surface only the terminal one here.
        client.on_state_change(|state, _reason| {
            if state == ConnectionState::Failed {
                tracing::error!("Feed connection failed permanently; restart to retry");
            }
        });
        client.connect();

        if config.analysis.enabled {
            spawn_analysis_refresh(config);
        }

        let duration = self.duration;
        let deadline = async move {
            match duration {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                maybe_update = updates.recv() => {
                    let Some(update) = maybe_update else { break };
                    for quote in &update.quotes {
                        tracing::info!(symbol = %quote.symbol, price = %quote.price, "Price update");
                    }
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutting down");
                    break;
                }
                _ = &mut deadline => {
                    tracing::info!("Run duration elapsed");
                    break;
                }
            }
        }

        client.close();
        // Let the close frame reach the wire before the runtime shuts down
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(())
    }
}

/// Periodically refresh the daily analysis document and log a summary.
///
/// The first fetch happens immediately; failures keep the previous
/// document in place.
fn spawn_analysis_refresh(config: &Config) {
    let tracker =
        AnalysisTracker::new(AnalysisClient::with_config(config.analysis.client_config()));
    let refresh = Duration::from_secs(config.analysis.refresh_interval_secs);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if let Err(e) = tracker.refresh().await {
                tracing::warn!(error = %e, "Analysis refresh failed");
                continue;
            }
            let Some(doc) = tracker.latest().await else {
                continue;
            };
            for (symbol, asset) in &doc.assets {
                tracing::info!(
                    symbol = %symbol,
                    rsi = asset.technical_analysis.rsi,
                    zone = %asset.technical_analysis.rsi_zone(),
                    sentiment = %asset.news_sentiment.overall_sentiment,
                    "Daily analysis"
                );
            }
        }
    });
}
