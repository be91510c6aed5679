// src/lib.rs — Library root for ego-auditor

pub mod api;
pub mod cli;
pub mod core;
pub mod infra;
pub mod memory;
pub mod normalizer;
pub mod provider;
pub mod util;
