//! Recommender configuration.
//!
//! Built in code with the `with_*` methods or loaded from a JSON file.
//! Any field left out of the file keeps its default.
//!
//! ```json
//! { "top_n": 10, "neutral_rating": 2.5, "fill_value": 0.0,
//!   "cold_start": "popularity", "max_matrix_cells": 1000000 }
//! ```

use crate::cold_start::ColdStartPolicy;
use crate::ranker::DEFAULT_TOP_N;
use crate::scorer::DEFAULT_NEUTRAL_RATING;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Value written into the rating matrix for pairs nobody rated
pub const DEFAULT_FILL_VALUE: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecommenderConfig {
    /// How many recommendations to return
    pub top_n: usize,
    /// Rating treated as indifferent when centering
    pub neutral_rating: f64,
    /// Matrix value for unrated (user, movie) pairs
    pub fill_value: f64,
    /// What to do for users without ratings
    pub cold_start: ColdStartPolicy,
    /// Largest users×movies matrix to build; beyond it the cold-start policy answers
    pub max_matrix_cells: Option<usize>,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            neutral_rating: DEFAULT_NEUTRAL_RATING,
            fill_value: DEFAULT_FILL_VALUE,
            cold_start: ColdStartPolicy::default(),
            max_matrix_cells: None,
        }
    }
}

impl RecommenderConfig {
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_neutral_rating(mut self, neutral_rating: f64) -> Self {
        self.neutral_rating = neutral_rating;
        self
    }

    pub fn with_fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = fill_value;
        self
    }

    pub fn with_cold_start(mut self, policy: ColdStartPolicy) -> Self {
        self.cold_start = policy;
        self
    }

    pub fn with_max_matrix_cells(mut self, max_cells: usize) -> Self {
        self.max_matrix_cells = Some(max_cells);
        self
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Invalid recommender config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("In config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.neutral_rating.is_finite(),
            "neutral_rating must be a finite number"
        );
        ensure!(
            self.fill_value.is_finite(),
            "fill_value must be a finite number"
        );
        Ok(())
    }
}
