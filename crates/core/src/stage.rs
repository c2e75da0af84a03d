// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Growth stage templates
//!
//! A product's template lists its growth stages with day offsets from the
//! sow date. Templates are validated once, at the boundary, so the scheduler
//! can rely on: exactly one SEED stage, each stage type at most once, stages
//! in canonical order, and non-decreasing offsets.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of production work. Closed set: unknown types are rejected on parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    Seed,
    Germinate,
    Light,
    Harvest,
    Pack,
}

impl TaskType {
    /// All stage types in canonical order
    pub const ALL: [TaskType; 5] = [
        TaskType::Seed,
        TaskType::Germinate,
        TaskType::Light,
        TaskType::Harvest,
        TaskType::Pack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Seed => "SEED",
            TaskType::Germinate => "GERMINATE",
            TaskType::Light => "LIGHT",
            TaskType::Harvest => "HARVEST",
            TaskType::Pack => "PACK",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown stage type: {}", s))
    }
}

/// One stage of a product's growth template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(rename = "type")]
    pub kind: TaskType,
    /// Days after the sow date
    pub offset_days: u32,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Stage {
    pub fn new(kind: TaskType, offset_days: u32) -> Self {
        Self {
            kind,
            offset_days,
            duration_days: None,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_duration(mut self, days: u32) -> Self {
        self.duration_days = Some(days);
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("stage template is empty")]
    Empty,
    #[error("stage template has no SEED stage")]
    NoSeed,
    #[error("stage {0} appears more than once")]
    Duplicate(TaskType),
    #[error("stage {after} listed after {before}, expected canonical order")]
    OutOfOrder { before: TaskType, after: TaskType },
    #[error("stage {stage} offset {offset} is before previous offset {previous}")]
    DecreasingOffset {
        stage: TaskType,
        offset: u32,
        previous: u32,
    },
}

/// Validated, ordered list of a product's stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Stage>", into = "Vec<Stage>")]
pub struct StageTemplate {
    stages: Vec<Stage>,
}

impl StageTemplate {
    pub fn new(stages: Vec<Stage>) -> Result<Self, TemplateError> {
        if stages.is_empty() {
            return Err(TemplateError::Empty);
        }

        let mut seen = Vec::with_capacity(stages.len());
        for stage in &stages {
            if seen.contains(&stage.kind) {
                return Err(TemplateError::Duplicate(stage.kind));
            }
            seen.push(stage.kind);
        }

        for pair in stages.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.kind > next.kind {
                return Err(TemplateError::OutOfOrder {
                    before: prev.kind,
                    after: next.kind,
                });
            }
            if next.offset_days < prev.offset_days {
                return Err(TemplateError::DecreasingOffset {
                    stage: next.kind,
                    offset: next.offset_days,
                    previous: prev.offset_days,
                });
            }
        }

        if !stages.iter().any(|s| s.kind == TaskType::Seed) {
            return Err(TemplateError::NoSeed);
        }

        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// The SEED stage (always present after validation)
    pub fn seed(&self) -> &Stage {
        // Validation guarantees SEED exists and sorts first
        &self.stages[0]
    }

    /// Every stage other than SEED, in order
    pub fn dependents(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter().filter(|s| s.kind != TaskType::Seed)
    }

    pub fn get(&self, kind: TaskType) -> Option<&Stage> {
        self.stages.iter().find(|s| s.kind == kind)
    }

    /// Offset of the last stage, i.e. the days a run spends on the rack
    pub fn span_days(&self) -> u32 {
        self.stages.last().map(|s| s.offset_days).unwrap_or(0)
    }
}

impl TryFrom<Vec<Stage>> for StageTemplate {
    type Error = TemplateError;

    fn try_from(stages: Vec<Stage>) -> Result<Self, Self::Error> {
        StageTemplate::new(stages)
    }
}

impl From<StageTemplate> for Vec<Stage> {
    fn from(template: StageTemplate) -> Self {
        template.stages
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
