//! Latest command - most recent record, normalized

use anyhow::Result;
use csiweb_client::{CsiClient, QueryMode, TableData};

use crate::output::{format_value, OutputContext, ReadingRow};

/// Show the most recent record of one table, or of every configured table
/// when none is given. Fan-out failures are warned, not fatal.
pub async fn latest(client: &CsiClient, table: Option<&str>, ctx: &OutputContext) -> Result<()> {
    let mode = QueryMode::most_recent(1);

    let mut rows = Vec::new();
    match table {
        Some(table) => {
            let data = client.table_data(table, &mode).await?;
            push_rows(&mut rows, table, &data);
        }
        None => {
            let all = client.all_table_data(&mode).await;
            for (table, data) in &all.tables {
                push_rows(&mut rows, table, data);
            }
            for (table, err) in &all.errors {
                ctx.warn(&format!("{table}: {err}"));
            }
        }
    }

    ctx.print(&rows);
    Ok(())
}

fn push_rows(rows: &mut Vec<ReadingRow>, table: &str, data: &TableData) {
    for (field, reading) in &data.readings {
        rows.push(ReadingRow {
            table: table.to_string(),
            time: data.time.clone(),
            field: field.clone(),
            value: format_value(&reading.value),
            units: reading.units.clone(),
        });
    }
}
