//! ferrybot - Telegram relay bot with a verification challenge

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    ferry_cli::run().await
}
