//! # Generator Module
//!
//! Turns a design model into service scaffolding that a developer then
//! extends by hand.
//!
//! ## Overview
//!
//! A run produces:
//! - **`main.rs`** - service construction, the middleware chain (request id,
//!   request logging, error handling, panic recovery) and one mount block per
//!   resource, listening on the design's host port
//! - **`<resource>.rs`** - one per resource: a controller struct, its
//!   constructor and one handler per action
//!
//! Handlers carry `start_implement` / `end_implement` markers around the part
//! meant to be edited. Websocket actions get an upgrade handler with an echo
//! body instead.
//!
//! ## Overwrite Policy
//!
//! ```text
//! force? ──yes──► delete existing file ─┐
//!   │                                   ▼
//!   no ─────────────────────────► exists? ──yes──► skip
//!                                       │
//!                                       no ──► render + format
//! ```
//!
//! `main.rs` is written at most once unless `force` is set, because code
//! below the generated scaffold is expected to be edited.
//!
//! ## Failure
//!
//! Every file is created through a [`CreationLog`](crate::rollback::CreationLog),
//! which records it in the same step. A failed run (render, write or format error) deletes
//! all of them before returning the error, and an abort from the watcher
//! thread does the same at any point.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bootgen::design::load_design;
//! use bootgen::generator::{Generator, GeneratorOptions};
//!
//! let api = load_design("design.yaml".as_ref())?;
//! let files = Generator::new(api, GeneratorOptions {
//!     out_dir: "src".into(),
//!     design_pkg: "design.yaml".into(),
//!     ..Default::default()
//! })
//! .generate()?;
//! ```
//!
//! ## Templates
//!
//! Askama templates live in `templates/`:
//!
//! - `header.rs.txt` - `use` lines
//! - `main.rs.txt` - entry point
//! - `controller.rs.txt` - controller struct and constructor
//! - `action.rs.txt` - regular handler
//! - `action_ws.rs.txt` - websocket handler

mod generate;
mod source;
mod templates;
#[cfg(test)]
mod tests;

pub use generate::{resource_file_stem, Generator, GeneratorOptions, DEFAULT_RUNTIME_CRATE};
pub use source::{NoFormat, Rustfmt, SourceFile, SourceFormatter};
pub use templates::*;
