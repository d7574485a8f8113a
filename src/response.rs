//! Success response resolution for action handlers.
//!
//! Only an exact `200` counts as the success response. Anything that cannot be
//! resolved (no 200, unknown media type, unknown view, broken link) yields
//! `None` and the generated handler simply returns `Ok(())`.

use tracing::debug;

use crate::design::{ActionDefinition, ApiDefinition, DEFAULT_VIEW};
use crate::naming::{native_type, to_camel_case, to_snake_case, type_ref};

/// Status code of the success response.
pub const SUCCESS_STATUS: u16 = 200;

/// Everything a handler template needs to return the success payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessResponse {
    /// Response name, suffixed with the CamelCase view unless the view is the
    /// default one (`OK`, `OKTiny`).
    pub name: String,
    /// Context method sending the response (`ok`, `ok_tiny`).
    pub method: String,
    /// Untyped shape of the payload, for comments.
    pub native_type: String,
    pub payload: SuccessPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuccessPayload {
    /// Zero-valued instance of the projected type.
    Construct {
        expr: String,
        required_fields: Vec<String>,
    },
    /// The media type is error-shaped; the handler returns an internal error.
    InternalError(String),
}

impl SuccessResponse {
    /// Expression bound to `res` in the generated handler.
    pub fn value_expr(&self) -> &str {
        match &self.payload {
            SuccessPayload::Construct { expr, .. } => expr,
            SuccessPayload::InternalError(expr) => expr,
        }
    }

    pub fn required_fields(&self) -> &[String] {
        match &self.payload {
            SuccessPayload::Construct {
                required_fields, ..
            } => required_fields,
            SuccessPayload::InternalError(_) => &[],
        }
    }
}

/// Resolve the success response of `action`.
///
/// `target` qualifies the payload type and `runtime` names the crate the
/// internal error constructor comes from.
pub fn resolve_success(
    api: &ApiDefinition,
    action: &ActionDefinition,
    target: &str,
    runtime: &str,
) -> Option<SuccessResponse> {
    let ok = action.responses.get(&SUCCESS_STATUS)?;
    let media_type = match ok.media_type.as_deref().and_then(|id| api.media_type(id)) {
        Some(mt) => mt,
        None => {
            debug!(action = %action.name, media_type = ?ok.media_type, "success media type not resolvable");
            return None;
        }
    };
    let view = if ok.view.is_empty() {
        DEFAULT_VIEW
    } else {
        ok.view.as_str()
    };
    let projected = match media_type.project(view, api) {
        Ok(projected) => projected,
        Err(err) => {
            debug!(action = %action.name, %err, "success response projection failed");
            return None;
        }
    };

    let payload = if projected.is_error() {
        SuccessPayload::InternalError(format!("{runtime}::Error::internal(\"not implemented\")"))
    } else {
        let reference = type_ref(&projected, &projected.all_required(), 1, false);
        SuccessPayload::Construct {
            expr: reference.zero_value(target),
            required_fields: reference.required_fields,
        }
    };

    let name = if view == DEFAULT_VIEW {
        ok.name.clone()
    } else {
        format!("{}{}", ok.name, to_camel_case(view))
    };

    debug!(action = %action.name, response = %name, native = native_type(&projected), "resolved success response");
    Some(SuccessResponse {
        method: to_snake_case(&name),
        native_type: native_type(&projected).to_string(),
        name,
        payload,
    })
}
