// src/core/mod.rs — Submission pipeline

pub mod orchestrator;
pub mod safety;
pub mod types;
pub mod validation;
