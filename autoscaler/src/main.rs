//! `spotscaler`: loads configuration, builds the reconciler's collaborators,
//! spawns the admin surface, and runs the tick loop until a shutdown signal
//! arrives. Mirrors the teacher binary's task-spawning `main.rs` style.
mod config;
mod error;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tracing::{error, info, info_span, warn, Instrument};

use cloudapi::{InMemoryCloudClient, SpotPrices};
use dispatch::{DispatchConfig, Dispatcher};
use engine::{Engine, EngineConfig, NoOpReason, TickReport};
use store::SqliteStatusStore;

use crate::config::Config;
use crate::error::AppError;

#[derive(Parser, Debug)]
#[command(name = "spotscaler", about = "Cluster autoscaler for spot-market compute")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "spotscaler.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    common::logger::init_logger("spotscaler");

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    info!(id = %config.id, "configuration loaded");

    let capacity_table = config.capacity_table()?;
    let timer_rules = dispatch_timer_rules(&config);
    let engine_timers: HashMap<_, _> = config
        .timers
        .iter()
        .map(|(name, t)| (name.clone(), t.command.clone()))
        .collect();

    let engine_config = EngineConfig {
        owner_id: config.id.clone(),
        cooldown: config.cooldown,
        capacity_table,
        bidding_price_by_type: config.bidding_price_by_type.clone(),
        configured_varieties: config.instance_varieties(),
        max_cpu_util: config.max_cpu_util,
        scale_in_threshold: config.scale_in_threshold,
        max_terminated_varieties: config.max_terminated_varieties,
        min_capacity: config.min_capacity,
        max_capacity: config.max_capacity,
        prohibit_scale_in: config.prohibit_to_scale_in,
        timers: engine_timers,
    };

    // No cloud SDK is in scope (§1 Non-goals): the binary drives the
    // reconciler against the in-memory mock, same as the engine's own
    // tests, rather than fabricating a vendor client. Swap this out for a
    // real `CloudClient` impl to point the binary at an actual cloud API.
    let cloud = Arc::new(InMemoryCloudClient::new(config.id.clone(), vec![], SpotPrices::new()));
    let metric = Arc::new(config.cpu_util_command.clone());
    let ami = Arc::new(config.ami_command.clone());
    let hooks = Arc::new(cloudapi::OrderedHookRunner {
        commands: config.hook_commands.clone(),
    });
    let store = Arc::new(SqliteStatusStore::new(&config.database_path).await?);

    let engine = Engine::new(engine_config, cloud.clone(), metric, ami, hooks, store.clone())
        .map_err(AppError::from)?;

    let dispatcher = Dispatcher::new(
        DispatchConfig {
            owner_id: config.id.clone(),
            timer_rules,
        },
        cloud,
        store.clone(),
    );

    if let Some(addr) = &config.http_addr {
        let addr: SocketAddr = addr.parse().map_err(|e| AppError::Configuration(format!("invalid HttpAddr: {e}")))?;
        let admin_store: Arc<dyn store::StatusStore> = store.clone();
        tokio::spawn(async move {
            if let Err(e) = admin::serve(addr, admin_store).await {
                error!(error = %e, "admin surface exited");
            }
        });
    }

    run_reconciler(engine, dispatcher, config.loop_interval).await
}

fn dispatch_timer_rules(config: &Config) -> Vec<dispatch::TimerRule> {
    config
        .timers
        .iter()
        .map(|(name, t)| dispatch::TimerRule::new(name.clone(), t.after.clone(), t.duration))
        .collect()
}

/// Runs one tick per `interval` until SIGINT/SIGTERM, letting the
/// in-flight tick finish before exiting (§5 "Cancellation").
async fn run_reconciler<C, M, A, H, S>(
    engine: Engine<C, M, A, H, S>,
    dispatcher: Dispatcher<C, S>,
    interval: Duration,
) -> anyhow::Result<()>
where
    C: cloudapi::CloudClient,
    M: cloudapi::MetricSource,
    A: cloudapi::AmiResolver,
    H: cloudapi::HookRunner,
    S: store::StatusStore,
{
    let mut ticker = tokio::time::interval(interval);
    let mut shutdown = shutdown_signal();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let trace_id = common::logger::TraceId::default();
                let span = info_span!("tick", trace_id = %trace_id.as_str());
                if let Err(e) = run_one_tick(&engine, &dispatcher).instrument(span).await {
                    warn!(error = %e, "tick aborted");
                }
            }
            _ = &mut shutdown => {
                info!("shutdown signal received, exiting after current tick");
                break;
            }
        }
    }

    Ok(())
}

async fn run_one_tick<C, M, A, H, S>(
    engine: &Engine<C, M, A, H, S>,
    dispatcher: &Dispatcher<C, S>,
) -> Result<(), AppError>
where
    C: cloudapi::CloudClient,
    M: cloudapi::MetricSource,
    A: cloudapi::AmiResolver,
    H: cloudapi::HookRunner,
    S: store::StatusStore,
{
    let now = Utc::now();
    match engine.tick(now).await? {
        TickReport::NoOp(reason) => {
            match reason {
                NoOpReason::CooldownActive => info!("no-op: cooldown active"),
                NoOpReason::NoScalingSignal => info!("no-op: no scaling signal"),
                NoOpReason::EmptyDelta => info!("no-op: empty delta"),
            }
            Ok(())
        }
        TickReport::Scale(plan) => {
            info!(ami = %plan.ami, "dispatching scaling plan");
            dispatcher.apply(&plan, now).await.map_err(AppError::from)
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
