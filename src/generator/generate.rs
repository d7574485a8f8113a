use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::source::{Rustfmt, SourceFile, SourceFormatter};
use super::templates::{
    listen_port, ActionTemplateData, ActionWsTemplateData, ControllerTemplateData,
    MainTemplateData, ModuleDecl, MountEntry,
};
use crate::context::GenerationContext;
use crate::design::{ActionDefinition, ApiDefinition, ResourceDefinition};
use crate::error::GenerateError;
use crate::naming::{sanitize_identifier, to_camel_case, to_snake_case, DEFAULT_TARGET};
use crate::package::crate_path_for_dir;
use crate::response::resolve_success;
use crate::rollback::CreationLog;
use crate::watcher::AbortWatcher;

/// Runtime crate generated code is written against when none is configured.
pub const DEFAULT_RUNTIME_CRATE: &str = "bootkit";

/// Options of a generation run.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Directory receiving `main.rs` and the controller files.
    pub out_dir: PathBuf,
    /// Design marker written into the entry point.
    pub design_pkg: String,
    /// Module generated types live in.
    pub target: String,
    /// Delete and regenerate files that already exist.
    pub force: bool,
    pub runtime_crate: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            design_pkg: String::new(),
            target: DEFAULT_TARGET.to_string(),
            force: false,
            runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
        }
    }
}

/// Scaffold generator for one design.
pub struct Generator {
    api: ApiDefinition,
    options: GeneratorOptions,
    formatter: Box<dyn SourceFormatter>,
    watch_signals: bool,
}

impl Generator {
    pub fn new(api: ApiDefinition, options: GeneratorOptions) -> Self {
        Self {
            api,
            options,
            formatter: Box::new(Rustfmt::from_env()),
            watch_signals: false,
        }
    }

    pub fn with_formatter(mut self, formatter: impl SourceFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Roll back when the process receives SIGINT or SIGTERM mid-run.
    pub fn watch_signals(mut self, watch: bool) -> Self {
        self.watch_signals = watch;
        self
    }

    /// Generate the scaffold, returning every file created.
    ///
    /// Existing files are left alone unless `force` is set. On error every
    /// file created by this run is deleted before the error is returned.
    pub fn generate(&self) -> Result<Vec<PathBuf>, GenerateError> {
        let log = CreationLog::new();
        let watcher = if self.watch_signals {
            AbortWatcher::with_signals(log.clone()).map_err(|e| {
                GenerateError::Config(format!("cannot install signal handlers: {e}"))
            })?
        } else {
            AbortWatcher::spawn(log.clone())
        };

        let result = self.generate_into(&log);
        if let Err(err) = &result {
            warn!(error = %err, "generation failed, rolling back");
            log.rollback();
        }
        watcher.finish();
        result
    }

    /// Generate into `log` without rolling back on failure.
    ///
    /// Callers that run their own [`AbortWatcher`] use this and decide what to
    /// do with the log themselves.
    pub fn generate_into(&self, log: &CreationLog) -> Result<Vec<PathBuf>, GenerateError> {
        let mut ctx = GenerationContext::new(&self.options.target);
        let out_dir = if self.options.out_dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            self.options.out_dir.as_path()
        };
        if !out_dir.is_dir() {
            return Err(GenerateError::Config(format!(
                "output directory {out_dir:?} does not exist"
            )));
        }
        let crate_path = crate_path_for_dir(out_dir)?;
        let app_import = format!("{}::{}", crate_path, ctx.target());
        check_resource_stems(&ctx, &self.api)?;

        let main_path = out_dir.join("main.rs");
        if self.prepare(&main_path)? {
            self.create_main_file(&mut ctx, &main_path, &app_import, log)?;
        }

        for resource in self.api.resources.values() {
            let path = out_dir.join(format!("{}.rs", resource_file_stem(&resource.name)));
            if self.prepare(&path)? {
                self.create_resource_file(&ctx, resource, &path, &app_import, log)?;
            }
        }

        Ok(log.paths())
    }

    /// Apply the overwrite policy to `path`; true when it should be created.
    fn prepare(&self, path: &Path) -> Result<bool, GenerateError> {
        if self.options.force {
            match std::fs::remove_file(path) {
                Ok(()) => info!(path = %path.display(), "removed existing file (force)"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(GenerateError::io(path, e)),
            }
        }
        if path.exists() {
            info!(path = %path.display(), "skipping existing file (use --force to overwrite)");
            return Ok(false);
        }
        Ok(true)
    }

    fn create_main_file(
        &self,
        ctx: &mut GenerationContext,
        path: &Path,
        app_import: &str,
        log: &CreationLog,
    ) -> Result<(), GenerateError> {
        let runtime = &self.options.runtime_crate;
        let mut modules = Vec::new();
        let mut mounts = Vec::new();
        for resource in self.api.resources.values() {
            let stem = resource_file_stem(&resource.name);
            let ident = ctx.safe_ident(&stem);
            let module_path = if ident == stem {
                String::new()
            } else {
                format!("{stem}.rs")
            };
            mounts.push(MountEntry {
                resource: resource.name.clone(),
                module: ident.clone(),
                controller: controller_name(&resource.name),
                mount_fn: format!("mount_{}_controller", to_snake_case(&resource.name)),
                tempvar: ctx.tempvar(),
            });
            modules.push(ModuleDecl {
                ident,
                path: module_path,
            });
        }

        let data = MainTemplateData {
            name_literal: format!("{:?}", self.api.name),
            modules,
            mounts,
            port: listen_port(&self.api.host),
            target: ctx.target().to_string(),
            runtime: runtime.clone(),
        };

        let mut file = SourceFile::create(path, log)?;
        file.write_directive(&self.options.design_pkg)?;
        file.write_header(&[format!("{runtime}::middleware"), app_import.to_string()])?;
        file.render("main", &data)?;
        let path = file.finish(self.formatter.as_ref())?;
        info!(path = %path.display(), "generated entry point");
        Ok(())
    }

    fn create_resource_file(
        &self,
        ctx: &GenerationContext,
        resource: &ResourceDefinition,
        path: &Path,
        app_import: &str,
        log: &CreationLog,
    ) -> Result<(), GenerateError> {
        let runtime = &self.options.runtime_crate;
        let controller = controller_name(&resource.name);

        let mut imports = Vec::new();
        if resource.actions.values().any(|a| a.websocket) {
            imports.push("std::io::{self, Write}".to_string());
        }
        imports.push(app_import.to_string());

        let mut file = SourceFile::create(path, log)?;
        file.write_header(&imports)?;
        file.render(
            "controller",
            &ControllerTemplateData {
                controller: controller.clone(),
                resource: resource.name.clone(),
                runtime: runtime.clone(),
            },
        )?;
        for action in resource.actions.values() {
            let names = ActionNames::new(ctx, &controller, resource, action);
            if action.websocket {
                file.render("action_ws", &names.websocket(ctx, runtime, resource))?;
            } else {
                file.render("action", &names.regular(&self.api, ctx, runtime, action))?;
            }
        }
        let path = file.finish(self.formatter.as_ref())?;
        info!(path = %path.display(), resource = %resource.name, "generated controller");
        Ok(())
    }
}

/// Names shared by both handler shapes of one action.
struct ActionNames {
    controller: String,
    action: String,
    action_title: String,
    method: String,
    context_type: String,
    marker: String,
}

impl ActionNames {
    fn new(
        ctx: &GenerationContext,
        controller: &str,
        resource: &ResourceDefinition,
        action: &ActionDefinition,
    ) -> Self {
        let action_title = to_camel_case(&action.name);
        Self {
            controller: controller.to_string(),
            action: action.name.clone(),
            method: ctx.safe_ident(&to_snake_case(&action.name)),
            context_type: sanitize_identifier(&format!(
                "{}{}Context",
                action_title,
                to_camel_case(&resource.name)
            )),
            marker: format!("{controller}_{action_title}"),
            action_title,
        }
    }

    fn regular(
        self,
        api: &ApiDefinition,
        ctx: &GenerationContext,
        runtime: &str,
        action: &ActionDefinition,
    ) -> ActionTemplateData {
        let success = resolve_success(api, action, ctx.target(), runtime);
        ActionTemplateData {
            controller: self.controller,
            action: self.action,
            action_title: self.action_title,
            method: self.method,
            context_type: self.context_type,
            marker: self.marker,
            target: ctx.target().to_string(),
            runtime: runtime.to_string(),
            has_success: success.is_some(),
            response_method: success
                .as_ref()
                .map(|s| ctx.safe_ident(&s.method))
                .unwrap_or_default(),
            value_expr: success
                .as_ref()
                .map(|s| s.value_expr().to_string())
                .unwrap_or_default(),
            native_type: success
                .as_ref()
                .map(|s| s.native_type.clone())
                .unwrap_or_default(),
            required_fields: success
                .as_ref()
                .map(|s| s.required_fields().join(", "))
                .unwrap_or_default(),
        }
    }

    fn websocket(
        self,
        ctx: &GenerationContext,
        runtime: &str,
        resource: &ResourceDefinition,
    ) -> ActionWsTemplateData {
        ActionWsTemplateData {
            greeting: format!("{:?}", format!("{} {}", self.action, resource.name)),
            controller: self.controller,
            action: self.action,
            action_title: self.action_title,
            method: self.method,
            context_type: self.context_type,
            marker: self.marker,
            target: ctx.target().to_string(),
            runtime: runtime.to_string(),
        }
    }
}

/// Fail when two resources would share a controller file or module name.
fn check_resource_stems(ctx: &GenerationContext, api: &ApiDefinition) -> Result<(), GenerateError> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for resource in api.resources.values() {
        let stem = resource_file_stem(&resource.name);
        for key in [format!("{stem}.rs"), ctx.safe_ident(&stem)] {
            if let Some(other) = seen.insert(key.clone(), &resource.name) {
                return Err(GenerateError::Design(format!(
                    "resources {other:?} and {:?} both map to {key:?}",
                    resource.name
                )));
            }
        }
    }
    Ok(())
}

fn controller_name(resource: &str) -> String {
    sanitize_identifier(&format!("{}Controller", to_camel_case(resource)))
}

/// File stem of a resource's controller file.
///
/// `main` is taken by the entry point, so a resource of that name moves to
/// `main_resource`.
pub fn resource_file_stem(resource: &str) -> String {
    match to_snake_case(resource) {
        stem if stem.is_empty() => "resource".to_string(),
        stem if stem == "main" => "main_resource".to_string(),
        stem => stem,
    }
}
