// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog TOML parsing

use crate::{Catalog, ProductDef};
use mg_core::{Stage, StageTemplate, TaskType, TemplateError, TraySize, MAX_LEAD_TIME_DAYS};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during catalog parsing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("invalid stage template for {product}: {source}")]
    Template {
        product: String,
        source: TemplateError,
    },
}

pub fn load_catalog(path: &Path) -> Result<Catalog, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_catalog(&content)
}

/// Parse a catalog from TOML content
pub fn parse_catalog(content: &str) -> Result<Catalog, ParseError> {
    let raw: toml::Value = toml::from_str(content)?;
    let table = raw
        .as_table()
        .ok_or_else(|| ParseError::InvalidFormat("root must be a table".to_string()))?;

    let mut catalog = Catalog::default();

    if let Some(products) = table.get("product") {
        let products = products
            .as_table()
            .ok_or_else(|| ParseError::InvalidFormat("product must be a table".to_string()))?;
        for (id, value) in products {
            catalog.insert(parse_product(id, value)?);
        }
    }

    Ok(catalog)
}

fn parse_product(id: &str, value: &toml::Value) -> Result<ProductDef, ParseError> {
    let table = value
        .as_table()
        .ok_or_else(|| ParseError::InvalidFormat(format!("product.{} must be a table", id)))?;

    let name = table
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or(id)
        .to_string();

    let tray_size: TraySize = table
        .get("tray_size")
        .ok_or_else(|| ParseError::MissingField(format!("product.{}.tray_size", id)))?
        .as_str()
        .ok_or_else(|| {
            ParseError::InvalidFormat(format!("product.{}.tray_size must be a string", id))
        })?
        .parse()
        .map_err(|e| ParseError::InvalidFormat(format!("product.{}.tray_size: {}", id, e)))?;

    let lead_time_days = match table.get("lead_time_days") {
        Some(v) => {
            let days = non_negative(v, &format!("product.{}.lead_time_days", id))?;
            if days > MAX_LEAD_TIME_DAYS {
                return Err(ParseError::InvalidFormat(format!(
                    "product.{}.lead_time_days must be at most {}",
                    id, MAX_LEAD_TIME_DAYS
                )));
            }
            Some(days)
        }
        None => None,
    };

    let size_oz = match table.get("size_oz") {
        Some(v) => Some(v.as_float().or_else(|| v.as_integer().map(|i| i as f64)).ok_or_else(
            || ParseError::InvalidFormat(format!("product.{}.size_oz must be a number", id)),
        )?),
        None => None,
    };

    // Support both "stage" (from [[product.X.stage]]) and "stages" key names
    let stages_arr = table
        .get("stage")
        .or_else(|| table.get("stages"))
        .map(|v| {
            v.as_array().ok_or_else(|| {
                ParseError::InvalidFormat(format!("product.{}.stage must be an array", id))
            })
        })
        .transpose()?;

    let stages = match stages_arr {
        Some(arr) => {
            let stages = arr
                .iter()
                .enumerate()
                .map(|(i, v)| parse_stage(id, i, v))
                .collect::<Result<Vec<_>, _>>()?;
            let template =
                StageTemplate::new(stages).map_err(|source| ParseError::Template {
                    product: id.to_string(),
                    source,
                })?;
            Some(template)
        }
        None => None,
    };

    if let (Some(lead), Some(template)) = (lead_time_days.filter(|d| *d > 0), &stages) {
        if template.span_days() > lead {
            return Err(ParseError::InvalidFormat(format!(
                "product.{}: last stage on day {} falls after lead_time_days = {}",
                id,
                template.span_days(),
                lead
            )));
        }
    }

    Ok(ProductDef {
        id: id.to_string(),
        name,
        tray_size,
        lead_time_days,
        size_oz,
        stages,
    })
}

fn parse_stage(product: &str, index: usize, value: &toml::Value) -> Result<Stage, ParseError> {
    let ctx = format!("product.{}.stage[{}]", product, index);
    let table = value
        .as_table()
        .ok_or_else(|| ParseError::InvalidFormat(format!("{} must be a table", ctx)))?;

    let kind: TaskType = table
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ParseError::MissingField(format!("{}.type", ctx)))?
        .parse()
        .map_err(|e| ParseError::InvalidFormat(format!("{}.type: {}", ctx, e)))?;

    let offset_days = match table.get("offset_days") {
        Some(v) => non_negative(v, &format!("{}.offset_days", ctx))?,
        None => return Err(ParseError::MissingField(format!("{}.offset_days", ctx))),
    };

    let mut stage = Stage::new(kind, offset_days);
    if let Some(v) = table.get("duration_days") {
        stage = stage.with_duration(non_negative(v, &format!("{}.duration_days", ctx))?);
    }
    if let Some(notes) = table.get("notes").and_then(|v| v.as_str()) {
        stage = stage.with_notes(notes);
    }
    Ok(stage)
}

fn non_negative(value: &toml::Value, ctx: &str) -> Result<u32, ParseError> {
    value
        .as_integer()
        .and_then(|i| u32::try_from(i).ok())
        .ok_or_else(|| ParseError::InvalidFormat(format!("{} must be a non-negative integer", ctx)))
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
