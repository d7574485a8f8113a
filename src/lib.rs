//! # bootgen
//!
//! **bootgen** scaffolds a Rust service from an API design: a `main.rs` that
//! builds the service and mounts one controller per resource, and one
//! controller file per resource with a handler stub for every action.
//!
//! ## Architecture
//!
//! - **[`design`]** - Design model (resources, actions, media types, views, links),
//!   document loading and view projection
//! - **[`naming`]** - Identifier casing and type references for generated code
//! - **[`response`]** - Resolution of an action's success (200) response
//! - **[`context`]** - Per-run reserved identifiers and scratch variable names
//! - **[`generator`]** - Template rendering and the overwrite policy
//! - **[`rollback`]** - Log of created files, deleted on failure
//! - **[`watcher`]** - Background abort listener sharing only the log
//! - **[`cli`]** - `bootgen` command line
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as CLI<br/>(bootgen)
//!     participant Gen as generator::Generator
//!     participant Resp as response::resolve_success
//!     participant Proj as design::project
//!     participant Log as rollback::CreationLog
//!     participant FS as File System
//!
//!     CLI->>Gen: generate()
//!     Gen->>FS: main.rs (unless present)
//!     Gen->>Log: create(main.rs)
//!     loop resources, sorted
//!         Gen->>Log: create(resource.rs)
//!         loop actions, sorted
//!             Gen->>Resp: success response
//!             Resp->>Proj: project(media type, view)
//!             Proj-->>Resp: projected type
//!             Resp-->>Gen: SuccessResponse
//!         end
//!         Gen->>FS: resource.rs
//!     end
//!     alt failure
//!         Gen->>Log: rollback()
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! bootgen bootstrap --design design/cellar.yaml --out src
//! ```
//!
//! Running the same command again leaves every file alone; add `--force` to
//! regenerate.

pub mod cli;
pub mod context;
pub mod design;
pub mod error;
pub mod generator;
pub mod naming;
pub mod package;
pub mod response;
pub mod rollback;
pub mod version;
pub mod watcher;

pub use error::GenerateError;
pub use generator::{Generator, GeneratorOptions};
