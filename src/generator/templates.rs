use askama::Template;

/// `use` lines at the top of a generated file
#[derive(Template)]
#[template(path = "header.rs.txt", escape = "none")]
pub struct HeaderTemplateData {
    pub imports: Vec<String>,
}

/// Module declaration in the generated `main.rs`
#[derive(Debug, Clone)]
pub struct ModuleDecl {
    /// Module identifier
    pub ident: String,
    /// File name for a `#[path]` attribute when it differs from `{ident}.rs`
    pub path: String,
}

/// One controller mounted by the generated `main.rs`
#[derive(Debug, Clone)]
pub struct MountEntry {
    /// Resource name as written in the design
    pub resource: String,
    /// Module holding the controller
    pub module: String,
    /// Controller struct name
    pub controller: String,
    /// Mount function of the target module (`mount_bottle_controller`)
    pub mount_fn: String,
    /// Scratch variable holding the controller before mounting
    pub tempvar: String,
}

/// Template data for the service entry point
#[derive(Template)]
#[template(path = "main.rs.txt", escape = "none")]
pub struct MainTemplateData {
    /// API name as a Rust string literal
    pub name_literal: String,
    pub modules: Vec<ModuleDecl>,
    /// Sorted by resource name
    pub mounts: Vec<MountEntry>,
    pub port: String,
    pub target: String,
    pub runtime: String,
}

/// Template data for a resource controller declaration
#[derive(Template)]
#[template(path = "controller.rs.txt", escape = "none")]
pub struct ControllerTemplateData {
    pub controller: String,
    pub resource: String,
    pub runtime: String,
}

/// Template data for a regular action handler
#[derive(Template)]
#[template(path = "action.rs.txt", escape = "none")]
pub struct ActionTemplateData {
    pub controller: String,
    pub action: String,
    pub action_title: String,
    pub method: String,
    pub context_type: String,
    pub marker: String,
    pub target: String,
    pub runtime: String,
    /// Whether a 200 response resolved to a payload type
    pub has_success: bool,
    pub response_method: String,
    pub value_expr: String,
    pub native_type: String,
    /// Comma separated
    pub required_fields: String,
}

/// Template data for a websocket action handler
#[derive(Template)]
#[template(path = "action_ws.rs.txt", escape = "none")]
pub struct ActionWsTemplateData {
    pub controller: String,
    pub action: String,
    pub action_title: String,
    pub method: String,
    pub context_type: String,
    pub marker: String,
    pub target: String,
    pub runtime: String,
    /// String literal written to a new connection before echoing
    pub greeting: String,
}

/// Port the generated service listens on.
///
/// Takes the port of a `host:port` (or `[v6]:port`) address, falling back to
/// `8080` when there is none or it is not a valid port number.
pub fn listen_port(host: &str) -> String {
    const FALLBACK: &str = "8080";
    let port = if let Some(rest) = host.strip_prefix('[') {
        rest.split_once("]:").map(|(_, port)| port)
    } else {
        match host.rsplit_once(':') {
            Some((h, port)) if !h.contains(':') => Some(port),
            _ => None,
        }
    };
    match port.map(str::parse::<u16>) {
        Some(Ok(port)) => port.to_string(),
        _ => FALLBACK.to_string(),
    }
}
