//! Query command - one dataquery in any mode and format

use anyhow::Result;
use csiweb_client::{CsiClient, OutputFormat as DeviceFormat, QueryMode};

use crate::output::OutputContext;

/// Run one query against a table.
///
/// JSON is decoded and pretty-printed; every other format is passed through
/// verbatim, the way the device produced it.
pub async fn query(
    client: &CsiClient,
    table: &str,
    mode: &QueryMode,
    format: DeviceFormat,
    _ctx: &OutputContext,
) -> Result<()> {
    if format == DeviceFormat::Json {
        let records = client.table_records(table, mode).await?;
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        let body = client.table_export(table, mode, format).await?;
        print!("{body}");
    }
    Ok(())
}
