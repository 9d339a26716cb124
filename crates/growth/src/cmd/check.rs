//! Check command - Validate configuration and reach the data source
//!
//! # Usage
//!
//! ```bash
//! growth check --config configs/growth.toml
//! ```

use std::time::Instant;

use anyhow::{Context, Result};
use growth_config::Config;

use crate::bootstrap;

/// Run the check command
pub async fn run(config: &Config) -> Result<()> {
    // Loading already validated the file
    println!("config:   ok");

    let source = bootstrap::build_source(config)?;
    let started = Instant::now();
    source
        .health_check()
        .await
        .with_context(|| format!("{} source health check failed", source.name()))?;

    println!(
        "source:   {} ok ({} ms)",
        source.name(),
        started.elapsed().as_millis()
    );
    if source.is_synthetic() {
        println!("warning:  synthetic placeholder data, not real numbers");
    }

    Ok(())
}
