use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use dotenvy::dotenv;
use log::{error, info, warn};
use serenity::async_trait;
use serenity::client::bridge::gateway::{ShardId, ShardManager};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::ChannelId;
use serenity::prelude::*;

use nudge::commands::{Command, CommandHandler};
use nudge::core::Config;
use nudge::database::Database;
use nudge::features::analytics::MemoryStats;
use nudge::features::reminders::{
    HeuristicTimeParser, Notifier, ReminderScheduler, ReminderStore,
};
use nudge::write_queue::WriteQueue;

/// Holds the shard manager so the ping command can report gateway latency.
struct ShardManagerContainer;

impl TypeMapKey for ShardManagerContainer {
    type Value = Arc<Mutex<ShardManager>>;
}

/// Delivers reminder notifications through the Discord REST API.
struct DiscordNotifier {
    http: Arc<serenity::http::Http>,
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, channel_id: &str, text: &str) {
        let channel = match channel_id.parse::<u64>() {
            Ok(id) => ChannelId(id),
            Err(_) => {
                warn!("dropping notification for malformed channel id {channel_id}");
                return;
            }
        };
        if let Err(e) = channel.say(&self.http, text).await {
            error!("failed to deliver reminder to {channel_id}: {e}");
        }
    }
}

struct Handler {
    commands: CommandHandler,
}

impl Handler {
    async fn gateway_latency(&self, ctx: &Context) -> Option<Duration> {
        let data = ctx.data.read().await;
        let shard_manager = data.get::<ShardManagerContainer>()?;
        let manager = shard_manager.lock().await;
        let runners = manager.runners.lock().await;
        runners.get(&ShardId(ctx.shard_id))?.latency
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let reply = match self.commands.route(&msg.content) {
            None => return,
            Some(Command::Ping) => match self.gateway_latency(&ctx).await {
                Some(latency) => format!(":ping_pong: Pong! {}ms", latency.as_millis()),
                None => ":ping_pong: Pong!".to_string(),
            },
            Some(Command::Info) => MemoryStats::gather().format(),
            Some(Command::Remind { raw_args }) => {
                self.commands
                    .remind(
                        &msg.author.id.to_string(),
                        &msg.channel_id.to_string(),
                        &msg.id.to_string(),
                        raw_args,
                    )
                    .await
            }
            Some(Command::Unknown(body)) => format!("Unknown command '{body}'"),
        };

        if let Err(e) = msg.channel_id.say(&ctx.http, reply).await {
            error!("failed to send reply: {e}");
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Nudge reminder bot...");

    // Fatal when the store cannot be opened or the schema cannot be ensured:
    // nothing may serve commands without a working store.
    let database = Database::open(&config.database_path)?;

    let (writes, worker) = WriteQueue::new(database.clone(), config.write_queue_capacity);
    tokio::spawn(worker.run());

    let store = ReminderStore::new(database, writes);

    // Reminders that came due while the process was down are dropped, not
    // delivered late in a burst.
    store.purge_stale(Utc::now().timestamp()).await;

    let commands = CommandHandler::new(
        config.command_prefix.clone(),
        store.clone(),
        Arc::new(HeuristicTimeParser),
    );

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler { commands })
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    {
        let mut data = client.data.write().await;
        data.insert::<ShardManagerContainer>(client.shard_manager.clone());
    }

    // Start the reminder dispatch loop
    let scheduler = ReminderScheduler::new(store, Duration::from_secs(config.poll_interval_secs));
    let notifier = Arc::new(DiscordNotifier {
        http: client.cache_and_http.http.clone(),
    });
    tokio::spawn(async move {
        scheduler.run(notifier).await;
    });

    info!("Bot configured successfully. Connecting to Discord gateway...");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
