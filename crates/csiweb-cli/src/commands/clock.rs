//! Clock command - read the device clock

use anyhow::Result;
use csiweb_client::CsiClient;

use crate::output::OutputContext;

/// Check the device clock
pub async fn clock(client: &CsiClient, ctx: &OutputContext) -> Result<()> {
    let time = client.clock_check().await?;
    ctx.info(&format!("Device clock: {time}"));
    Ok(())
}
