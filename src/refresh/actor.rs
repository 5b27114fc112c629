use crate::config::config::RefreshCfg;
use crate::core::types::{
    Actor, FetchDetail, FetchLogEntry, FetchStatus, PriceFetchResult, RefreshSummary, TireSpec,
};
use crate::extract::extractor::PriceExtractor;
use crate::persistence::store::{CatalogStore, SettingsStore};
use crate::refresh::log::FetchLog;
use crate::scoring;
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Ad hoc work requested by the host's admin actions.
#[derive(Debug)]
pub enum RefreshCommand {
    RunBatch,
    RefreshTire(String),
    Rescore { tire_id: String, spec: TireSpec },
}

pub struct RefreshActor {
    store: Arc<dyn CatalogStore>,
    log: FetchLog,
    extractor: PriceExtractor,
    cfg: RefreshCfg,
    commands: mpsc::Receiver<RefreshCommand>,
    shutdown: CancellationToken,
    // Explicit guard against overlapping batch runs
    batch_guard: Mutex<()>,
}

impl RefreshActor {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        settings: Arc<dyn SettingsStore>,
        extractor: PriceExtractor,
        cfg: RefreshCfg,
        commands: mpsc::Receiver<RefreshCommand>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            log: FetchLog::new(settings),
            extractor,
            cfg,
            commands,
            shutdown,
            batch_guard: Mutex::new(()),
        }
    }

    pub fn log(&self) -> &FetchLog {
        &self.log
    }

    fn next_run_at(&self) -> DateTime<Utc> {
        let interval = chrono::Duration::from_std(self.cfg.interval)
            .unwrap_or_else(|_| chrono::Duration::days(7));
        Utc::now() + interval
    }

    /// Refresh every catalog row, one tire at a time. Failures are isolated
    /// per row; only a storage fault aborts the run.
    pub async fn fetch_all_prices(&self) -> Result<RefreshSummary> {
        let Ok(_guard) = self.batch_guard.try_lock() else {
            bail!("price refresh already in progress");
        };

        let rows = self.store.tires_for_refresh().await?;
        info!(tires = rows.len(), "starting price refresh");

        let mut summary = RefreshSummary::default();
        let mut details = Vec::new();

        for row in rows {
            if row.affiliate_link.trim().is_empty() {
                summary.skipped += 1;
                continue;
            }

            let result = self
                .extractor
                .fetch_price_from_url(&row.affiliate_link)
                .await;
            let now = Utc::now();

            match (result.success, result.price) {
                (true, Some(price)) if price > Decimal::ZERO => {
                    self.store.record_price_success(&row.id, price, now).await?;
                    summary.updated += 1;
                    info!(tire_id = %row.id, %price, source = %result.source, "price updated");
                    details.push(FetchDetail {
                        tire_id: row.id,
                        status: FetchStatus::Success,
                        price: Some(price),
                        error: None,
                        source: result.source,
                    });
                }
                _ => {
                    // Status and timestamp only; a prior good price stays
                    self.store.record_price_failure(&row.id, now).await?;
                    summary.failed += 1;
                    warn!(tire_id = %row.id, error = ?result.error, "price fetch failed");
                    details.push(FetchDetail {
                        tire_id: row.id,
                        status: FetchStatus::Failed,
                        price: None,
                        error: result.error,
                        source: result.source,
                    });
                }
            }
        }

        // One invalidation per run, not per row
        self.store.invalidate_catalog_cache().await?;
        self.log
            .append(FetchLogEntry {
                run_at: Utc::now(),
                updated: summary.updated,
                failed: summary.failed,
                skipped: summary.skipped,
                details,
            })
            .await?;

        Ok(summary)
    }

    /// Manual refresh of one tire, same persist semantics as the batch loop.
    pub async fn fetch_single_price(&self, tire_id: &str) -> Result<PriceFetchResult> {
        let Some(link) = self.store.affiliate_link(tire_id).await? else {
            return Ok(PriceFetchResult::failure(
                "",
                format!("Unknown tire: {}", tire_id),
            ));
        };
        if link.trim().is_empty() {
            return Ok(PriceFetchResult::failure("", "Empty URL"));
        }

        let result = self.extractor.fetch_price_from_url(&link).await;
        let now = Utc::now();
        match (result.success, result.price) {
            (true, Some(price)) if price > Decimal::ZERO => {
                self.store.record_price_success(tire_id, price, now).await?;
                info!(tire_id, %price, source = %result.source, "price updated");
            }
            _ => {
                self.store.record_price_failure(tire_id, now).await?;
                warn!(tire_id, error = ?result.error, "price fetch failed");
            }
        }
        Ok(result)
    }

    async fn handle_command(&self, cmd: RefreshCommand) {
        match cmd {
            RefreshCommand::RunBatch => match self.fetch_all_prices().await {
                Ok(summary) => info!(
                    updated = summary.updated,
                    failed = summary.failed,
                    skipped = summary.skipped,
                    "manual price refresh finished"
                ),
                Err(e) => error!("manual price refresh failed: {}", e),
            },
            RefreshCommand::RefreshTire(tire_id) => {
                if let Err(e) = self.fetch_single_price(&tire_id).await {
                    error!(%tire_id, "single tire refresh failed: {}", e);
                }
            }
            RefreshCommand::Rescore { tire_id, spec } => {
                if let Err(e) = scoring::store_efficiency(self.store.as_ref(), &tire_id, &spec).await
                {
                    error!(%tire_id, "rescore failed: {}", e);
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl Actor for RefreshActor {
    async fn run(mut self) -> Result<()> {
        info!("RefreshActor started");

        let mut tick = interval(self.cfg.interval);
        // The first tick completes immediately; consume it so the first
        // scheduled batch waits a full interval
        tick.tick().await;

        if let Err(e) = self.log.set_next_run(self.next_run_at()).await {
            warn!(?e, "failed to record next run time");
        }

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("RefreshActor: shutdown requested");
                    break;
                }

                _ = tick.tick() => {
                    match self.fetch_all_prices().await {
                        Ok(summary) => info!(
                            updated = summary.updated,
                            failed = summary.failed,
                            skipped = summary.skipped,
                            "scheduled price refresh finished"
                        ),
                        Err(e) => error!("RefreshActor: scheduled price refresh failed: {}", e),
                    }
                    if let Err(e) = self.log.set_next_run(self.next_run_at()).await {
                        warn!(?e, "failed to record next run time");
                    }
                }

                cmd = self.commands.recv() => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd).await,
                        None => {
                            info!("RefreshActor: command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        info!("RefreshActor stopped cleanly");
        Ok(())
    }
}
