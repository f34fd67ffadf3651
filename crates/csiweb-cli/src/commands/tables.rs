//! Tables and fields commands - enumerate what the logger exposes

use anyhow::Result;
use csiweb_client::CsiClient;

use crate::output::{FieldRow, OutputContext, TableRow};

/// List the configured (or discovered) tables
pub fn tables(client: &CsiClient, ctx: &OutputContext) -> Result<()> {
    let rows: Vec<TableRow> = client
        .tables()
        .iter()
        .map(|name| TableRow { name: name.clone() })
        .collect();

    ctx.print(&rows);
    Ok(())
}

/// List the field names of one table, in header order
pub async fn fields(client: &CsiClient, table: &str, ctx: &OutputContext) -> Result<()> {
    let rows: Vec<FieldRow> = client
        .field_names(table)
        .await?
        .into_iter()
        .map(|name| FieldRow { name })
        .collect();

    ctx.print(&rows);
    Ok(())
}
