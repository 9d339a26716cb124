//! Configuration validation
//!
//! Validates config consistency:
//! - BigQuery has a project and credentials
//! - Table identifiers are safe to interpolate
//! - Dashboard defaults name a known period and reduction
//! - Funnel overrides and floors are usable numbers
//! - Log targets fit in a filter directive

use growth_analytics::{PeriodType, Reduction};

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::warehouse::WarehouseBackendKind;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_warehouse(config)?;
    validate_dashboard(config)?;
    validate_log(config)?;
    Ok(())
}

/// Validate logging configuration
fn validate_log(config: &Config) -> Result<()> {
    if let Some(target) = config.log.invalid_target() {
        return Err(ConfigError::invalid_value(
            "log",
            "targets",
            format!("'{}' is not a module path", target),
        ));
    }
    Ok(())
}

/// Validate warehouse configuration
fn validate_warehouse(config: &Config) -> Result<()> {
    let warehouse = &config.warehouse;

    if warehouse.backend == WarehouseBackendKind::Synthetic {
        return Ok(());
    }

    if warehouse
        .project_id
        .as_deref()
        .is_none_or(|p| p.trim().is_empty())
    {
        return Err(ConfigError::missing_field("warehouse", "project_id"));
    }

    if !warehouse.use_adc && warehouse.key_file.is_none() {
        return Err(ConfigError::invalid_value(
            "warehouse",
            "key_file",
            "required unless use_adc = true",
        ));
    }

    if warehouse.timeout_ms == Some(0) {
        return Err(ConfigError::invalid_value(
            "warehouse",
            "timeout_ms",
            "must be greater than 0",
        ));
    }

    warehouse
        .source(config.dashboard.utc_offset_hours)
        .validate()
        .map_err(|e| ConfigError::invalid_value("warehouse", "tables", e.to_string()))?;

    Ok(())
}

/// Validate dashboard configuration
fn validate_dashboard(config: &Config) -> Result<()> {
    let dashboard = &config.dashboard;

    if !(-12..=14).contains(&dashboard.utc_offset_hours) {
        return Err(ConfigError::invalid_value(
            "dashboard",
            "utc_offset_hours",
            format!("{} is outside -12..=14", dashboard.utc_offset_hours),
        ));
    }

    PeriodType::parse(&dashboard.default_period).map_err(|e| {
        ConfigError::invalid_value("dashboard", "default_period", e.to_string())
    })?;

    Reduction::parse(&dashboard.default_reduction).map_err(|e| {
        ConfigError::invalid_value("dashboard", "default_reduction", e.to_string())
    })?;

    for (field, value) in [
        ("site_funnel_override", dashboard.site_funnel_override),
        ("shop_funnel_override", dashboard.shop_funnel_override),
    ] {
        if let Some(v) = value
            && !(v.is_finite() && v >= 0.0)
        {
            return Err(ConfigError::invalid_value(
                "dashboard",
                field,
                format!("{} must be a non-negative number", v),
            ));
        }
    }

    if dashboard.max_window_days < 1 {
        return Err(ConfigError::invalid_value(
            "dashboard",
            "max_window_days",
            format!("{} must be at least 1", dashboard.max_window_days),
        ));
    }

    if let Some((title, floor)) = dashboard.floors.iter().find(|(_, v)| !v.is_finite()) {
        return Err(ConfigError::invalid_value(
            "dashboard",
            "floors",
            format!("floor for '{}' is not a number: {}", title, floor),
        ));
    }

    Ok(())
}
