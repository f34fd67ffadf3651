//! Watch command - periodic sampling with a bounded rolling buffer

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use csiweb_client::{CsiClient, QueryMode, TableData};

use crate::output::{format_value, OutputContext};

/// Poll the most recent record of one table at a fixed interval.
///
/// Each sample is appended to a rolling buffer capped at `retention`
/// entries (oldest dropped) and printed as one line. Transient failures
/// (timeout, connection refused) skip the sample and keep polling; anything
/// else aborts.
pub async fn watch(
    client: &CsiClient,
    table: &str,
    interval_secs: u64,
    retention: usize,
    ctx: &OutputContext,
) -> Result<()> {
    ctx.info(&format!(
        "Sampling {table} every {interval_secs}s (retaining {retention} samples)"
    ));
    ctx.info("Press Ctrl+C to stop");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let mode = QueryMode::most_recent(1);
    let mut history: VecDeque<TableData> = VecDeque::with_capacity(retention);
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

    while running.load(Ordering::SeqCst) {
        tokio::select! {
            _ = ticker.tick() => {
                match client.table_data(table, &mode).await {
                    Ok(data) => {
                        print_sample(&data, ctx);
                        record_sample(&mut history, data, retention);
                    }
                    Err(err) if err.is_transient() => {
                        ctx.warn(&format!("sample skipped: {err}"));
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            _ = tokio::time::sleep(Duration::from_millis(100)) => {
                // Check the stop flag between ticks
            }
        }
    }

    ctx.info(&format!("\nStopped; {} samples retained", history.len()));
    Ok(())
}

/// Append a sample, dropping the oldest entries so the buffer never holds
/// more than `retention` samples. A retention of zero is treated as one.
fn record_sample(history: &mut VecDeque<TableData>, data: TableData, retention: usize) {
    while history.len() >= retention.max(1) {
        history.pop_front();
    }
    history.push_back(data);
}

fn print_sample(data: &TableData, ctx: &OutputContext) {
    if ctx.quiet {
        return;
    }
    let readings: Vec<String> = data
        .readings
        .iter()
        .map(|(field, reading)| {
            if reading.units.is_empty() {
                format!("{field}={}", format_value(&reading.value))
            } else {
                format!("{field}={} {}", format_value(&reading.value), reading.units)
            }
        })
        .collect();
    println!("[{}] {}", data.time, readings.join("  "));
}
