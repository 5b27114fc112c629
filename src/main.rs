mod config;
mod core;
mod extract;
mod persistence;
mod refresh;
mod scoring;

use anyhow::Result;
use config::config::AppCfg;
use core::types::Actor;
use extract::extractor::PriceExtractor;
use persistence::database::Database;
use refresh::actor::RefreshActor;
use reqwest::{redirect, Client};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let cfg = AppCfg::load("config.yml")?;

    // Root span for the supervisor/main thread
    let span = info_span!(
        "Supervisor",
        pid = %std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
    );
    let _enter = span.enter();

    info!("Starting up");

    info!("Initializing Client");
    let client = Client::builder()
        .user_agent(cfg.http.user_agent.clone())
        .timeout(cfg.http.timeout)
        .redirect(redirect::Policy::limited(cfg.http.max_redirects))
        .build()
        .expect("client");

    info!("Connecting to database");
    let db = Arc::new(Database::new(&cfg.database.url).await?);

    info!("Building refresh actor");
    let shutdown = CancellationToken::new();
    let (commands_tx, commands_rx) = mpsc::channel(cfg.refresh.command_buffer);
    let extractor = PriceExtractor::new(client, cfg.http.accept_language.clone());
    let refresh = RefreshActor::new(
        db.clone(),
        db.clone(),
        extractor,
        cfg.refresh.clone(),
        commands_rx,
        shutdown.clone(),
    );

    info!("Spawning actors");
    let mut actors = tokio::task::JoinSet::new();
    actors.spawn(refresh.run().instrument(info_span!("Refresh")));

    info!("Waiting for actors");

    tokio::select! {
        _ = async {
            while let Some(res) = actors.join_next().await {
                match res {
                    Ok(Ok(())) => info!("Actor exited cleanly"),
                    Ok(Err(e)) => error!(?e, "Actor returned error"),
                    Err(panic) => error!(?panic, "Actor panicked/cancelled"),
                }
            }
        } => {  }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down supervisor loop");
            shutdown.cancel();
        }
    }

    info!("Waiting for graceful shutdown of actors");
    while let Some(res) = actors.join_next().await {
        match res {
            Ok(Ok(())) => info!("Actor exited cleanly"),
            Ok(Err(e)) => error!(?e, "Actor returned error"),
            Err(panic) => error!(?panic, "Actor panicked/cancelled"),
        }
    }

    // Held open for the host's admin hooks; dropping it tells the actor no
    // more manual commands are coming
    drop(commands_tx);

    info!("Supervisor exit");
    Ok(())
}
