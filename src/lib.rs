//! jobscout - automated personal job search.
//!
//! Discovers job postings from a job board, enriches them with full text,
//! screens them against a candidate profile using an LLM provider, and
//! tracks the approve/apply/archive lifecycle of the results.

pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod repository;
pub mod scan;
pub mod schema;
pub mod scrapers;
pub mod server;
