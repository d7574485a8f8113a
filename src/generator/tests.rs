#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::design::{parse_design_yaml, ApiDefinition};
use crate::error::GenerateError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

const CELLAR: &str = r#"
name: cellar
host: localhost:8081
resources:
  bottle:
    actions:
      show:
        responses:
          - { name: OK, status: 200, media_type: application/vnd.bottle }
          - { name: NotFound, status: 404 }
      show_tiny:
        responses:
          - { name: OK, status: 200, media_type: application/vnd.bottle, view: tiny }
      delete:
        responses:
          - { name: NotFound, status: 404 }
      watch:
        websocket: true
        responses:
          - { name: OK, status: 200, media_type: application/vnd.bottle }
  account:
    actions:
      list:
        responses:
          - { name: OK, status: 200, media_type: application/vnd.bottle-collection }
media_types:
  - identifier: application/vnd.bottle
    type_name: Bottle
    attributes:
      - { name: id, type: integer }
      - { name: name, type: string }
    required: [id]
    views:
      default: [id, name]
      tiny: [id]
  - identifier: application/vnd.bottle-collection
    type_name: BottleCollection
    collection_of: application/vnd.bottle
"#;

/// Temporary crate with an empty `src/` to generate into.
struct Fixture {
    _root: tempfile::TempDir,
    src: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("Cargo.toml"),
            "[package]\nname = \"cellar-svc\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();
        let src = root.path().join("src");
        fs::create_dir_all(&src).unwrap();
        Self { _root: root, src }
    }

    fn options(&self, force: bool) -> GeneratorOptions {
        GeneratorOptions {
            out_dir: self.src.clone(),
            design_pkg: "cellar/design".to_string(),
            force,
            ..Default::default()
        }
    }

    fn generator(&self, force: bool) -> Generator {
        Generator::new(api(), self.options(force)).with_formatter(NoFormat)
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.src.join(name)).unwrap()
    }

    fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.src)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn api() -> ApiDefinition {
    parse_design_yaml(CELLAR).unwrap()
}

/// Formats the first `ok` files, then fails.
struct FailAfter {
    ok: AtomicUsize,
}

impl FailAfter {
    fn new(ok: usize) -> Self {
        Self {
            ok: AtomicUsize::new(ok),
        }
    }
}

impl SourceFormatter for FailAfter {
    fn format(&self, path: &Path) -> Result<(), GenerateError> {
        let remaining = self.ok.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(GenerateError::Format {
                path: path.to_path_buf(),
                message: "injected failure".to_string(),
            });
        }
        self.ok.store(remaining - 1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_generates_main_and_one_file_per_resource() {
    let fx = Fixture::new();
    let files = fx.generator(false).generate().unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["main.rs", "account.rs", "bottle.rs"]);
    assert_eq!(fx.files(), vec!["account.rs", "bottle.rs", "main.rs"]);
}

#[test]
fn test_main_contents() {
    let fx = Fixture::new();
    fx.generator(false).generate().unwrap();
    let main = fx.read("main.rs");

    assert!(main.starts_with("// bootgen:generate bootstrap -d cellar/design\n"));
    assert!(main.contains("use bootkit::middleware;"));
    assert!(main.contains("use cellar_svc::app;"));
    assert!(main.contains("mod account;"));
    assert!(main.contains("mod bottle;"));
    assert!(main.contains("bootkit::Service::new(\"cellar\")"));
    assert!(main.contains("service.listen_and_serve(\":8081\")"));

    let order = [
        "middleware::request_id()",
        "middleware::log_request(true)",
        "middleware::error_handler(true)",
        "middleware::recover()",
    ];
    let positions: Vec<usize> = order.iter().map(|m| main.find(m).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_controllers_mounted_in_sorted_order_with_unique_tempvars() {
    let fx = Fixture::new();
    fx.generator(false).generate().unwrap();
    let main = fx.read("main.rs");

    let account = main.find("// Mount \"account\" controller").unwrap();
    let bottle = main.find("// Mount \"bottle\" controller").unwrap();
    assert!(account < bottle);
    assert!(main.contains("let c = account::AccountController::new(&service);"));
    assert!(main.contains("app::mount_account_controller(&mut service, c);"));
    assert!(main.contains("let c2 = bottle::BottleController::new(&service);"));
    assert!(main.contains("app::mount_bottle_controller(&mut service, c2);"));
}

#[test]
fn test_output_is_identical_across_runs() {
    let first = Fixture::new();
    first.generator(false).generate().unwrap();
    let second = Fixture::new();
    second.generator(false).generate().unwrap();
    for name in ["main.rs", "account.rs", "bottle.rs"] {
        assert_eq!(first.read(name), second.read(name), "{name} differs");
    }
}

#[test]
fn test_second_run_is_idempotent() {
    let fx = Fixture::new();
    fx.generator(false).generate().unwrap();
    let before: Vec<String> = fx.files().iter().map(|f| fx.read(f)).collect();

    let files = fx.generator(false).generate().unwrap();
    assert!(files.is_empty());
    let after: Vec<String> = fx.files().iter().map(|f| fx.read(f)).collect();
    assert_eq!(before, after);
}

#[test]
fn test_existing_files_are_not_touched() {
    let fx = Fixture::new();
    fs::write(fx.src.join("main.rs"), "// hand written\n").unwrap();
    let files = fx.generator(false).generate().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(fx.read("main.rs"), "// hand written\n");
}

#[test]
fn test_force_regenerates_everything() {
    let fx = Fixture::new();
    fx.generator(false).generate().unwrap();
    fs::write(fx.src.join("main.rs"), "// edited\n").unwrap();
    fs::write(fx.src.join("bottle.rs"), "// edited\n").unwrap();

    let files = fx.generator(true).generate().unwrap();
    assert_eq!(files.len(), 3);
    assert!(fx.read("main.rs").contains("fn main()"));
    assert!(fx.read("bottle.rs").contains("pub struct BottleController"));
}

#[test]
fn test_handler_with_default_view_success() {
    let fx = Fixture::new();
    fx.generator(false).generate().unwrap();
    let bottle = fx.read("bottle.rs");

    assert!(bottle.contains("use cellar_svc::app;"));
    assert!(bottle.contains("/// BottleController implements the bottle resource."));
    assert!(bottle.contains("service.new_controller(\"BottleController\")"));
    assert!(bottle.contains(
        "pub fn show(&self, ctx: &mut app::ShowBottleContext) -> bootkit::Result<()>"
    ));
    assert!(bottle.contains("// BottleController_Show: start_implement"));
    assert!(bottle.contains("// BottleController_Show: end_implement"));
    assert!(bottle.contains("let res = Box::new(app::Bottle::default());"));
    assert!(bottle.contains("ctx.ok(res)"));
    assert!(bottle.contains("// Required fields: id"));
}

#[test]
fn test_handler_with_named_view_success() {
    let fx = Fixture::new();
    fx.generator(false).generate().unwrap();
    let bottle = fx.read("bottle.rs");
    assert!(bottle.contains("let res = Box::new(app::BottleTiny::default());"));
    assert!(bottle.contains("ctx.ok_tiny(res)"));
}

#[test]
fn test_handler_without_success_returns_ok() {
    let fx = Fixture::new();
    fx.generator(false).generate().unwrap();
    let bottle = fx.read("bottle.rs");
    let start = bottle.find("pub fn delete(").unwrap();
    let body = &bottle[start..];
    let end = body.find("\n}\n").unwrap();
    let body = &body[..end];
    assert!(body.contains("Ok(())"));
    assert!(!body.contains("let res"));
}

#[test]
fn test_collection_success_is_built_by_value() {
    let fx = Fixture::new();
    fx.generator(false).generate().unwrap();
    let account = fx.read("account.rs");
    assert!(account.contains("let res = app::BottleCollection::default();"));
    assert!(!account.contains("std::io"));
}

#[test]
fn test_websocket_action_gets_echo_stub() {
    let fx = Fixture::new();
    fx.generator(false).generate().unwrap();
    let bottle = fx.read("bottle.rs");
    assert!(bottle.contains("use std::io::{self, Write};"));

    let start = bottle.find("pub fn watch(").unwrap();
    let body = &bottle[start..];
    let end = body.find("\n}\n").unwrap();
    let body = &body[..end];
    assert!(body.contains("ctx.upgrade(Self::watch_ws_handler())"));
    assert!(body.contains("ws.write_all(\"watch bottle\".as_bytes())"));
    assert!(body.contains("io::copy(&mut reader, &mut writer)"));
    assert!(body.contains("// BottleController_Watch: start_implement"));
    assert!(!body.contains("let res"));
    assert!(!body.contains("ctx.ok("));
}

#[test]
fn test_actions_rendered_in_sorted_order() {
    let fx = Fixture::new();
    fx.generator(false).generate().unwrap();
    let bottle = fx.read("bottle.rs");
    let positions: Vec<usize> = ["pub fn delete(", "pub fn show(", "pub fn show_tiny(", "pub fn watch("]
        .iter()
        .map(|f| bottle.find(f).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_failure_rolls_back_every_created_file() {
    for ok in 0..3 {
        let fx = Fixture::new();
        fs::write(fx.src.join("lib.rs"), "pub mod app;\n").unwrap();
        let err = Generator::new(api(), fx.options(false))
            .with_formatter(FailAfter::new(ok))
            .generate()
            .unwrap_err();
        assert!(matches!(err, GenerateError::Format { .. }));
        assert_eq!(fx.files(), vec!["lib.rs"], "leftovers after {ok} files");
        assert_eq!(fx.read("lib.rs"), "pub mod app;\n");
    }
}

#[test]
fn test_failure_keeps_preexisting_main() {
    let fx = Fixture::new();
    fs::write(fx.src.join("main.rs"), "// hand written\n").unwrap();
    let result = Generator::new(api(), fx.options(false))
        .with_formatter(FailAfter::new(1))
        .generate();
    assert!(result.is_err());
    assert_eq!(fx.files(), vec!["main.rs"]);
    assert_eq!(fx.read("main.rs"), "// hand written\n");
}

#[test]
fn test_missing_output_dir_is_config_error() {
    let fx = Fixture::new();
    let options = GeneratorOptions {
        out_dir: fx.src.join("nope"),
        ..fx.options(false)
    };
    let err = Generator::new(api(), options)
        .with_formatter(NoFormat)
        .generate()
        .unwrap_err();
    assert!(matches!(err, GenerateError::Config(_)));
    assert!(fx.files().is_empty());
}

#[test]
fn test_output_outside_a_crate_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let options = GeneratorOptions {
        out_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let err = Generator::new(api(), options)
        .with_formatter(NoFormat)
        .generate()
        .unwrap_err();
    assert!(matches!(err, GenerateError::Config(_)));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_custom_target_and_runtime() {
    let fx = Fixture::new();
    let options = GeneratorOptions {
        target: "Api".to_string(),
        runtime_crate: "svc_rt".to_string(),
        ..fx.options(false)
    };
    Generator::new(api(), options)
        .with_formatter(NoFormat)
        .generate()
        .unwrap();
    let main = fx.read("main.rs");
    assert!(main.contains("use cellar_svc::api;"));
    assert!(main.contains("api::mount_bottle_controller"));
    assert!(main.contains("svc_rt::Service::new"));
    let bottle = fx.read("bottle.rs");
    assert!(bottle.contains("Box::new(api::Bottle::default())"));
    assert!(bottle.contains("-> svc_rt::Result<()>"));
}

#[test]
fn test_resource_named_like_target_gets_path_attribute() {
    let fx = Fixture::new();
    let mut api = api();
    let mut app = api.resources["bottle"].clone();
    app.name = "app".to_string();
    api.resources.insert("app".to_string(), app);

    Generator::new(api, fx.options(false))
        .with_formatter(NoFormat)
        .generate()
        .unwrap();
    let main = fx.read("main.rs");
    assert!(main.contains("#[path = \"app.rs\"]\nmod app_;"));
    assert!(main.contains("let c2 = app_::AppController::new(&service);"));
    assert!(fx.src.join("app.rs").exists());
}

#[test]
fn test_host_without_port_falls_back() {
    let fx = Fixture::new();
    let mut api = api();
    api.host = "cellar.example.com".to_string();
    Generator::new(api, fx.options(false))
        .with_formatter(NoFormat)
        .generate()
        .unwrap();
    assert!(fx.read("main.rs").contains("listen_and_serve(\":8080\")"));
}

#[test]
fn test_resource_file_stem() {
    assert_eq!(resource_file_stem("Bottle"), "bottle");
    assert_eq!(resource_file_stem("WineCellar"), "wine_cellar");
    assert_eq!(resource_file_stem("main"), "main_resource");
    assert_eq!(resource_file_stem("!!"), "resource");
}

#[cfg(unix)]
#[test]
fn test_write_failure_rolls_back_every_created_file() {
    // A dangling link makes creating that one file fail after the files
    // before it were written.
    for blocked in ["account.rs", "bottle.rs"] {
        let fx = Fixture::new();
        let link = fx.src.join(blocked);
        std::os::unix::fs::symlink(fx.src.join("missing").join(blocked), &link).unwrap();

        let err = fx.generator(false).generate().unwrap_err();
        match err {
            GenerateError::Io { path, .. } => assert_eq!(path, link),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fx.files(), vec![blocked.to_string()]);
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    }
}

#[test]
fn test_colliding_resource_files_are_rejected() {
    let fx = Fixture::new();
    let mut api = api();
    let mut upper = api.resources["bottle"].clone();
    upper.name = "Bottle".to_string();
    api.resources.insert("Bottle".to_string(), upper);

    let err = Generator::new(api, fx.options(false))
        .with_formatter(NoFormat)
        .generate()
        .unwrap_err();
    match err {
        GenerateError::Design(message) => assert!(message.contains("bottle.rs")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(fx.files().is_empty());
}

#[test]
fn test_self_linked_success_type_is_generated() {
    let fx = Fixture::new();
    let api = parse_design_yaml(
        r#"
name: tree
resources:
  node:
    actions:
      show:
        responses:
          - { name: OK, status: 200, media_type: application/vnd.node }
media_types:
  - identifier: application/vnd.node
    type_name: Node
    attributes:
      - { name: id, type: integer }
      - { name: parent, type: application/vnd.node }
    views: { default: [id, links] }
    links: [{ name: parent, view: default }]
"#,
    )
    .unwrap();
    Generator::new(api, fx.options(false))
        .with_formatter(NoFormat)
        .generate()
        .unwrap();
    assert!(fx
        .read("node.rs")
        .contains("let res = Box::new(app::Node::default());"));
}
