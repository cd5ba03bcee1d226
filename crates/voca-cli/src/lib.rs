//! # voca-cli
//!
//! Command-line interface for the voca skill forge.
//!
//! ## Commands
//!
//! - `voca serve`: run the HTTP API
//! - `voca generate <word> <meaning>`: create (or fetch) a skill
//! - `voca question <word>` / `voca evaluate`: translation practice
//! - `voca skill show|list`: read the local skill store
//! - `voca config`: print the resolved configuration

pub mod commands;

pub use commands::Cli;
