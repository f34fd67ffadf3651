//! Upload command - push a logger program to the device CPU drive

use std::path::Path;

use anyhow::{Context, Result};
use csiweb_client::CsiClient;

use crate::output::OutputContext;

/// Upload a program file via HTTP PUT to `/CPU/<name>`
pub async fn upload(
    client: &CsiClient,
    file: &Path,
    name: Option<&str>,
    ctx: &OutputContext,
) -> Result<()> {
    let contents = std::fs::read(file)
        .with_context(|| format!("Failed to read program file: {}", file.display()))?;

    let name = match name {
        Some(name) => name.to_string(),
        None => file
            .file_name()
            .and_then(|n| n.to_str())
            .context("Program file has no usable name; pass --name")?
            .to_string(),
    };

    ctx.info(&format!("Uploading {} bytes as CPU/{name}...", contents.len()));
    client.upload_program(&name, contents).await?;
    ctx.success(&format!("Uploaded CPU/{name}"));
    Ok(())
}
