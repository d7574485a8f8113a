//! # CLI Module
//!
//! Command-line interface of the `bootgen` scaffolding generator.
//!
//! ## Commands
//!
//! ### `bootstrap`
//!
//! Generate `main.rs` and one controller file per resource:
//!
//! ```bash
//! bootgen bootstrap --design design/cellar.yaml --out src
//! ```
//!
//! Options:
//! - `--out <DIR>` - Output directory, inside a Cargo package (default: `.`)
//! - `--design <FILE>` - Design document (YAML or JSON)
//! - `--pkg <NAME>` - Module holding the generated types (default: `app`)
//! - `--version <VERSION>` - Version of the invoking tool; must share our major
//! - `--force` - Delete and regenerate files that already exist
//! - `--notest` - Accepted for compatibility, ignored
//! - `--design-pkg <MARKER>` - Marker written into `main.rs` (default: the design path)
//! - `--runtime-crate <CRATE>` - Runtime crate generated code uses (default: `bootkit`)
//! - `--no-fmt` - Skip `rustfmt` on generated files
//!
//! ## Logging
//!
//! Progress is logged through `tracing` to stderr; set `RUST_LOG=debug` to
//! see how each action's success response was resolved.

mod commands;


pub use commands::{init_logging, run_cli, Cli, Commands};
