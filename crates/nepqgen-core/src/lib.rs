//! nepqgen-core: question model, NEP 2020 rubric evaluation, and the
//! generation pipeline.
//!
//! This crate holds everything that does not talk to the network or render
//! output: data model, rubric scoring, recommendations, parsing, fallback
//! questions, the generation orchestrator and report persistence.

pub mod compliance;
pub mod error;
pub mod fallback;
pub mod generator;
pub mod model;
pub mod parser;
pub mod recommendations;
pub mod report;
pub mod rubric;
pub mod statistics;
pub mod traits;
pub mod validator;
