//! Offline statistics.

use super::Context;
use crate::output;
use anyhow::Result;
use ferry::{Store, Summary};

pub fn execute(ctx: Context) -> Result<()> {
    let store = Store::open(ctx.data_dir()?)?;
    let summary = Summary::read(&store);
    let rendered = output::summary(&summary, ctx.output_format)?;
    println!("{}", rendered.trim_end());
    Ok(())
}
