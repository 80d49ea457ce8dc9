// src/lib.rs

//! Bratishka: substitutions bot library

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;

#[cfg(test)]
mod testing;
