//! Core template logic: types, parsing, resolution, planning, output.

pub mod config;
pub mod error;
pub mod hasher;
pub mod parser;
pub mod planner;
pub mod resolver;
pub mod synth;
pub mod types;
