//! # cppmake - minimal C++ build orchestrator
//!
//! Reads `makeconfig.json`, collects every source file under `src`, hands
//! them to `g++` in one invocation and streams the compiler's output. With
//! `runAfterBuild` set, the fresh executable is run straight away with the
//! terminal's stdin.
//!
//! ## Module Organization
//!
//! - [`config`] - defaults, config document and CLI override layering
//! - [`build`] - discovery, compiler invocation, output streaming, post-build run
//! - [`pipeline`] - the top-level flow tying the stages together
//! - [`cli`] - the `-c <path>` flag

/// Discovery, compilation and post-build execution.
pub mod build;

/// Command-line parsing.
pub mod cli;

/// Configuration layering (`makeconfig.json`).
pub mod config;

/// Error type shared by every stage.
pub mod error;

/// The end-to-end build flow.
pub mod pipeline;

/// Terminal output helpers.
pub mod ui;

pub use error::{MakeError, Result};
pub use pipeline::{BuildReport, RunOutcome, build_with, execute, run};
