use crate::bot;
use crate::bot::handlers::{Command, RelayHandler};
use crate::config::BotSettings;
use anyhow::{Context, Result};
use media_relay_core::download::MediaDownloader;
use media_relay_core::extractor::YtdlpExtractor;
use media_relay_core::handler::MessageHandler;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{error, info, warn};

/// Run the Telegram transport runtime.
///
/// # Errors
///
/// Returns an error if the bot token is rejected by Telegram.
pub async fn run_bot(settings: Arc<BotSettings>) -> Result<()> {
    let bot = Bot::new(settings.telegram.telegram_token.clone());
    let me = bot
        .get_me()
        .await
        .context("Failed to authorize with the Telegram Bot API")?;
    info!("Authorized as @{}", me.username());

    let relay_handler = init_relay_handler(&settings).await;
    let handler = setup_handler();

    info!("✅ Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![relay_handler])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn init_relay_handler(settings: &BotSettings) -> Arc<RelayHandler> {
    let extractor = YtdlpExtractor::from_settings(&settings.media);
    match extractor.version().await {
        Ok(version) => info!("yt-dlp version: {version}"),
        Err(e) => warn!("yt-dlp is not available, media requests will fail: {e}"),
    }

    let download_dir = &settings.media.download_dir;
    if let Err(e) = tokio::fs::create_dir_all(download_dir).await {
        warn!(
            "Failed to create download directory {}: {}",
            download_dir.display(),
            e
        );
    }
    if settings.media.cookie_file().is_some_and(|path| !path.exists()) {
        warn!(
            "Cookie file {} not found, yt-dlp will fail for cookie domains",
            settings.media.cookie_file
        );
    }

    info!(
        "Initializing media relay (download_dir: {}, max_file_size: {} MB, cookie domains: {:?})",
        download_dir.display(),
        settings.media.max_file_size_mb(),
        settings.media.cookie_domains()
    );

    let downloader = MediaDownloader::new(extractor, settings.media.as_ref().clone());
    Arc::new(MessageHandler::new(downloader))
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            dptree::filter(|msg: Message| {
                msg.text()
                    .is_some_and(bot::handlers::is_media_request_text)
            })
            .endpoint(handle_text),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => bot::handlers::start(bot, msg).await,
        Command::Help => bot::handlers::help(bot, msg).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_text(
    bot: Bot,
    msg: Message,
    relay_handler: Arc<RelayHandler>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::handle_text(bot, msg, relay_handler).await {
        error!("Text handler error: {}", e);
    }
    respond(())
}
