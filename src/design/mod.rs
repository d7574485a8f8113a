//! # Design Module
//!
//! In-memory API design model consumed by the generator: resources, actions,
//! responses, media types, views and links.
//!
//! The model is built once (usually by [`load_design`]) and is read-only for
//! the rest of a generation run. Upward relations (action to resource, view and
//! link to media type) are stored as names and resolved by lookup, so the
//! model has no reference cycles even when a media type refers to itself.
//!
//! ## Design documents
//!
//! ```yaml
//! name: cellar
//! host: localhost:8081
//! resources:
//!   bottle:
//!     actions:
//!       show:
//!         responses:
//!           - { name: OK, status: 200, media_type: application/vnd.bottle, view: tiny }
//! media_types:
//!   - identifier: application/vnd.bottle
//!     type_name: Bottle
//!     attributes: [{ name: id, type: integer }, { name: name, type: string }]
//!     required: [id]
//!     views: { default: [id, name], tiny: [id] }
//! ```

mod load;
mod project;
mod types;

pub use load::{load_design, parse_data_type, parse_design_json, parse_design_yaml};
pub use project::{ProjectedLink, ProjectedMediaType, ProjectedShape, ProjectionError};
pub use types::*;
