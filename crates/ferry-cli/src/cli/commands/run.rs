//! Start relaying.

use super::Context;
use anyhow::{Context as _, Result};
use colored::Colorize;
use ferry::{Bot, BotConfig, Store, TelegramClient, UpdatePoller};
use std::sync::Arc;
use tracing::info;

pub async fn execute(ctx: Context) -> Result<()> {
    let settings = ctx.settings()?;

    let mut builder =
        TelegramClient::builder(settings.token.clone()).timeout(settings.request_timeout);
    if let Some(url) = &settings.api_base_url {
        builder = builder.base_url(url.clone());
    }
    let client = builder.build()?;

    let me = client
        .account()
        .me()
        .await
        .context("could not authenticate with the Bot API")?;
    info!(bot = %me.id, username = ?me.username, "authenticated");

    let store = Store::open(settings.data_dir.clone())?;
    info!(dir = %store.dir().display(), "state directory ready");

    let bot = Bot::new(
        Arc::new(client.clone()),
        store,
        &BotConfig {
            owner: settings.owner,
            trusted_ids: settings.trusted_ids.clone(),
        },
    );

    eprintln!(
        "{} relaying to operator {} (Ctrl-C to stop)",
        "ferrybot".bold().green(),
        settings.owner.to_string().bold()
    );
    bot.announce().await;

    let poller = UpdatePoller::new(client, settings.poll_timeout);
    bot.run(&poller, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown requested");
    })
    .await?;

    info!("stopped");
    Ok(())
}
