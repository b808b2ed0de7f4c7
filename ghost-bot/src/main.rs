mod control;
mod discord;

use std::env;
use std::sync::Arc;

use anyhow::Context as _;
use tracing::{error, info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rustls::crypto::ring::default_provider;
use sqlx::postgres::PgPoolOptions;

use ghost_core::{BotState, Relay, ReplySettings};
use ghost_database::{Database, HistoryStore, MIGRATOR};
use ghost_llm::{LlmConfig, LlmDispatcher, prompt};
use ghost_utils::formatting::parse_bool_flag;

use crate::discord::DiscordNetwork;

const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(|metadata| {
        let target = metadata.target();

        let within_info_level = *metadata.level() <= tracing::Level::INFO;
        if !within_info_level {
            return false;
        }

        !(target.starts_with("serenity::gateway::bridge::shard_manager")
            || target.starts_with("serenity::gateway::bridge::shard_runner"))
    }));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();

    let token = env::var("DISCORD_TOKEN").context("DISCORD_TOKEN must be set")?;

    let history = connect_history().await?;

    let llm_config = LlmConfig::from_env();
    info!(
        providers = ?llm_config.configured_providers(),
        "LLM providers with credentials."
    );
    let llm = LlmDispatcher::new(history.clone(), &llm_config)?;

    let defaults = ReplySettings::default();
    let settings = ReplySettings {
        reply_message: env_string("REPLY_MESSAGE").unwrap_or(defaults.reply_message),
        llm_enabled: env_bool("LLM_ENABLED", false),
        system_prompt: prompt::system_prompt(),
        selected_model: env_string("LLM_MODEL").unwrap_or(defaults.selected_model),
    };
    info!(
        llm_enabled = settings.llm_enabled,
        model = %settings.selected_model,
        "Reply settings loaded."
    );

    let network = Arc::new(DiscordNetwork::new(token));
    let relay = Arc::new(Relay::new(
        network,
        Arc::new(BotState::new(settings)),
        history,
        llm,
    ));

    if env_bool("AUTO_START", true) {
        if let Err(err) = relay.start().await {
            error!(?err, "Relay failed to start; send `start` to retry.");
        }
    } else {
        info!("Auto start disabled (send `start` to connect).");
    }

    tokio::select! {
        _ = control::run(Arc::clone(&relay)) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for shutdown signal")?;
            info!("Shutdown requested.");
        }
    }

    relay.stop().await?;
    Ok(())
}

async fn connect_history() -> anyhow::Result<HistoryStore> {
    let Some(database_url) = env_string("DATABASE_URL") else {
        warn!("DATABASE_URL is not set; chat history is kept in memory only.");
        return Ok(HistoryStore::volatile());
    };

    let max_connections = u32::try_from(env_u64(
        "DATABASE_MAX_CONNECTIONS",
        u64::from(DEFAULT_DATABASE_MAX_CONNECTIONS),
    ))
    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS);

    let db_pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy(&database_url)
        .context("invalid DATABASE_URL")?;
    let db = Database::new(db_pool);

    if env_bool("AUTO_RUN_MIGRATIONS", true) {
        match MIGRATOR.run(db.pool()).await {
            Ok(()) => info!("Database migrations applied."),
            Err(err) => warn!(
                ?err,
                "Failed to apply migrations; history writes will fall back to memory until the database is reachable."
            ),
        }
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
    }

    Ok(HistoryStore::new(Arc::new(db)))
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => parse_bool_flag(&value).unwrap_or(default),
        Err(_) => default,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(value) => value.trim().parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}
