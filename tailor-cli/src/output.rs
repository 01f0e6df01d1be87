//! Rendering of resolved catalogs and alterations

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

pub fn render<T: Serialize + ?Sized>(value: &T, format: Format) -> Result<String> {
    let rendered = match format {
        Format::Json => {
            serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")?
        }
        Format::Yaml => serde_yaml_ng::to_string(value).context("Failed to serialize output as YAML")?,
    };
    Ok(rendered)
}

/// Write to `out` when given, stdout otherwise
pub fn emit<T: Serialize + ?Sized>(value: &T, format: Format, out: Option<&Path>) -> Result<()> {
    let mut rendered = render(value, format)?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }

    match out {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write output to {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
