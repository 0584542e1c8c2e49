//! TicketBuddy Telegram Bot
//!
//! Main application entry point

use anyhow::Context;
use std::sync::Arc;
use teloxide::{prelude::*, types::Update};
use teloxide::dispatching::UpdateHandler;
use tracing::info;

use TicketBuddy::{
    config::Settings,
    utils::logging,
    database::{PostgresStorage, create_pool, run_migrations},
    services::{ServiceFactory, TelegramMessenger},
    state::{DialogueStorage, InMemoryStorage},
    handlers::messages::{handle_message, handle_unknown_update},
    middleware::LoggingMiddleware,
    TicketBuddyError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    settings.validate().context("Invalid configuration")?;

    // Initialize logging; the guard flushes the log file on shutdown
    let _log_guard = logging::init_logging(&settings.logging).context("Failed to initialize logging")?;

    info!("Starting {}...", TicketBuddy::info());

    let storage: Arc<dyn DialogueStorage> = if settings.database.is_in_memory() {
        info!("Using in-memory dialogue storage");
        Arc::new(InMemoryStorage::new())
    } else {
        info!("Connecting to database...");
        let pool = create_pool(&settings.database).await.context("Failed to connect to database")?;
        run_migrations(&pool).await.context("Failed to run migrations")?;
        Arc::new(PostgresStorage::new(pool))
    };

    let bot = Bot::new(&settings.bot.token);
    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));

    info!("Initializing services...");
    let services = ServiceFactory::new(&settings, storage, messenger)
        .context("Failed to initialize dialogue engine")?;
    let log_middleware = LoggingMiddleware::default();
    let fallback_logging = log_middleware.clone();

    let mut dispatcher = Dispatcher::builder(bot, create_handler())
        .dependencies(dptree::deps![services.engine.clone(), log_middleware])
        .default_handler(move |upd| {
            let logging = fallback_logging.clone();
            async move { handle_unknown_update(upd, logging).await }
        })
        .enable_ctrlc_handler()
        .build();

    info!("TicketBuddy bot is ready, starting polling...");
    dispatcher.dispatch().await;

    info!("TicketBuddy bot has been shut down.");
    Ok(())
}

/// Create the main update handler
///
/// Message failures are logged inside `handle_message`, which never fails the update.
fn create_handler() -> UpdateHandler<TicketBuddyError> {
    Update::filter_message().endpoint(handle_message)
}
