// src/lib.rs

pub mod config;
pub mod core;
pub mod dataset;
pub mod error;
pub mod history;
pub mod learning;
pub mod logging;
pub mod persistence;
pub mod training;

pub use crate::config::DxConfig;
pub use crate::core::engine::DiagnosisEngine;
pub use crate::core::types::{Diagnosis, RankedDisease};
pub use crate::error::PredictError;
