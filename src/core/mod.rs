// src/core/mod.rs

pub mod assembler;
pub mod encoder;
pub mod engine;
pub mod model;
pub mod ranker;
pub mod types;
