//! Tests for ScriptLoader, FunctionCatalog, TableBuilder and the bash backend

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use centry::application::services::{FunctionCatalog, ScriptLoader};
use centry::application::{
    ApplicationError, ApplicationResult, BuiltinCommand, BuiltinContext, Dispatchable, Dispatcher,
    TableBuilder,
};
use centry::config::Manifest;
use centry::domain::{
    CommandDef, DomainError, EnvOverlay, ExecutionResult, NamespaceResolver, OptionDef,
    OptionScope, OptionType, OptionsSet, ScriptContext,
};
use centry::infrastructure::bash::BashBackend;
use centry::infrastructure::io::Io;
use centry::infrastructure::traits::{RealFileSystem, ScriptBackend};
use centry::infrastructure::InfraResult;
use centry::util::testing::TestProject;

/// Backend returning a fixed function list and recording invocations.
#[derive(Default)]
struct FakeBackend {
    functions: Vec<String>,
    calls: Mutex<Vec<(String, Vec<String>, EnvOverlay)>>,
}

impl FakeBackend {
    fn with_functions(names: &[&str]) -> Self {
        Self {
            functions: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl ScriptBackend for FakeBackend {
    fn split_char(&self) -> &str {
        ":"
    }

    fn enumerate(&self, _context: &ScriptContext) -> InfraResult<Vec<String>> {
        Ok(self.functions.clone())
    }

    fn invoke(
        &self,
        _context: &ScriptContext,
        function: &str,
        args: &[String],
        env: &EnvOverlay,
        _io: &Io,
    ) -> InfraResult<ExecutionResult> {
        self.calls
            .lock()
            .unwrap()
            .push((function.to_string(), args.to_vec(), env.clone()));
        Ok(ExecutionResult::with_code(0))
    }
}

struct NamedBuiltin(&'static str);

impl BuiltinCommand for NamedBuiltin {
    fn name(&self) -> &str {
        self.0
    }

    fn description(&self) -> &str {
        "builtin"
    }

    fn run(&self, _args: &[String], _ctx: &BuiltinContext<'_>) -> ApplicationResult<i32> {
        Ok(0)
    }
}

fn project_with_scripts() -> (TestProject, Vec<PathBuf>, CommandDef) {
    let project = TestProject::new().unwrap();
    let init = project.write("init.sh", "echo init\n").unwrap();
    let helpers = project.write("helpers.sh", "shared() { :; }\n").unwrap();
    let script = project
        .write(
            "get.sh",
            "get() { echo \"get ($*)\"; }\nget:sub() { :; }\ngetter() { :; }\n",
        )
        .unwrap();
    (project, vec![init, helpers], CommandDef::new("get", script))
}

// ============================================================
// ScriptLoader
// ============================================================

#[test]
fn given_shared_scripts_when_loading_then_command_script_comes_last() {
    // Arrange
    let (_project, shared, command) = project_with_scripts();
    let loader = ScriptLoader::new(Arc::new(RealFileSystem), shared.clone());

    // Act
    let context = loader.load(&command).unwrap();

    // Assert
    assert_eq!(context.command, "get");
    assert_eq!(context.files[..2], shared[..]);
    assert_eq!(context.script(), Some(&command.path));
}

#[test]
fn given_missing_shared_script_when_loading_then_fails_with_script_load() {
    let (project, _, command) = project_with_scripts();
    let missing = project.path().join("missing.sh");
    let loader = ScriptLoader::new(Arc::new(RealFileSystem), vec![missing.clone()]);

    let err = loader.load(&command).unwrap_err();

    match err {
        ApplicationError::ScriptLoad { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn given_directory_as_script_when_loading_then_fails_with_script_load() {
    let (project, _, _) = project_with_scripts();
    let command = CommandDef::new("get", project.path());
    let loader = ScriptLoader::new(Arc::new(RealFileSystem), vec![]);

    assert!(matches!(
        loader.load(&command),
        Err(ApplicationError::ScriptLoad { .. })
    ));
}

// ============================================================
// FunctionCatalog with bash
// ============================================================

#[test]
fn given_script_chain_when_listing_then_all_declared_functions_are_found() {
    // Arrange
    let (_project, shared, command) = project_with_scripts();
    let context = ScriptLoader::new(Arc::new(RealFileSystem), shared)
        .load(&command)
        .unwrap();
    let catalog = FunctionCatalog::new(Arc::new(BashBackend::default()));

    // Act
    let names: Vec<String> = catalog
        .functions(&context)
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();

    // Assert
    for expected in ["shared", "get", "get:sub", "getter"] {
        assert!(names.contains(&expected.to_string()), "{names:?}");
    }
}

#[test]
fn given_script_exiting_early_when_listing_then_fails_with_introspection() {
    let project = TestProject::new().unwrap();
    let script = project.write("bad.sh", "echo broken >&2\nexit 3\n").unwrap();
    let context = ScriptContext {
        command: "bad".into(),
        files: vec![script],
    };
    let catalog = FunctionCatalog::new(Arc::new(BashBackend::default()));

    let err = catalog.functions(&context).unwrap_err();

    assert!(matches!(err, ApplicationError::Introspection { .. }), "{err}");
    assert!(err.to_string().contains("bad"), "{err}");
}

#[test]
fn given_path_with_spaces_when_invoking_then_function_runs() {
    let project = TestProject::new().unwrap();
    let script = project
        .write("my scripts/it's.sh", "hello() { echo \"hello $1\"; }\n")
        .unwrap();
    let context = ScriptContext {
        command: "hello".into(),
        files: vec![script],
    };
    let io = Io::headless();

    let result = BashBackend::default()
        .invoke(&context, "hello", &["world".to_string()], &EnvOverlay::new(), &io)
        .unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout_str(), "hello world\n");
    assert_eq!(io.captured_stdout().as_deref(), Some("hello world\n"));
}

#[test]
fn given_env_overlay_when_invoking_then_variables_are_set_and_removed() {
    let project = TestProject::new().unwrap();
    let script = project
        .write("env.sh", "show() { echo \"set=${SET_ME} gone=${HOME:-unset}\"; }\n")
        .unwrap();
    let context = ScriptContext {
        command: "show".into(),
        files: vec![script],
    };
    let env = EnvOverlay::from([
        ("SET_ME".to_string(), Some("yes".to_string())),
        ("HOME".to_string(), None),
    ]);

    let result = BashBackend::default()
        .invoke(&context, "show", &[], &env, &Io::headless())
        .unwrap();

    assert_eq!(result.stdout_str(), "set=yes gone=unset\n");
}

// ============================================================
// TableBuilder
// ============================================================

#[test]
fn given_functions_when_building_then_only_namespace_members_are_registered() {
    // Arrange
    let (_project, shared, command) = project_with_scripts();
    let backend = Arc::new(FakeBackend::with_functions(&["shared", "get", "get:sub", "getter"]));
    let builder = TableBuilder::new(
        ScriptLoader::new(Arc::new(RealFileSystem), shared),
        FunctionCatalog::new(backend),
        NamespaceResolver::default(),
    );

    // Act
    let table = builder.build(&[command], &[], |_| true).unwrap();

    // Assert
    let keys: Vec<&str> = table.keys().collect();
    assert_eq!(keys, vec!["get", "get sub"]);
    match &table.get("get sub").unwrap().target {
        Dispatchable::Script(s) => assert_eq!(s.function, "get:sub"),
        other => panic!("unexpected target: {other:?}"),
    }
}

#[test]
fn given_builtin_clashing_with_command_when_building_then_fails_fast() {
    let (_project, shared, command) = project_with_scripts();
    let builder = TableBuilder::new(
        ScriptLoader::new(Arc::new(RealFileSystem), shared),
        FunctionCatalog::new(Arc::new(FakeBackend::with_functions(&["get"]))),
        NamespaceResolver::default(),
    );
    let builtins: Vec<Arc<dyn BuiltinCommand>> = vec![Arc::new(NamedBuiltin("get"))];

    let err = builder.build(&[command], &builtins, |_| true).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::DuplicateCommand(ref key)) if key == "get"
    ));
}

#[test]
fn given_disabled_command_when_building_then_its_script_is_never_loaded() {
    // The command script does not exist: loading it would fail
    let builder = TableBuilder::new(
        ScriptLoader::new(Arc::new(RealFileSystem), vec![]),
        FunctionCatalog::new(Arc::new(FakeBackend::with_functions(&["get"]))),
        NamespaceResolver::default(),
    );
    let command = CommandDef::new("get", "/does/not/exist.sh");

    let table = builder.build(&[command], &[], |c| c.name != "get").unwrap();

    assert!(table.is_empty());
}

#[test]
fn given_custom_separator_when_building_then_keys_split_on_it() {
    let (_project, shared, command) = project_with_scripts();
    let builder = TableBuilder::new(
        ScriptLoader::new(Arc::new(RealFileSystem), shared),
        FunctionCatalog::new(Arc::new(FakeBackend::with_functions(&["get", "get_sub", "get:other"]))),
        NamespaceResolver::new("_").unwrap(),
    );

    let table = builder.build(&[command], &[], |_| true).unwrap();

    let keys: Vec<&str> = table.keys().collect();
    assert_eq!(keys, vec!["get", "get sub"]);
}

#[test]
fn given_only_namespaced_functions_when_building_then_group_entry_is_registered() {
    let (_project, shared, command) = project_with_scripts();
    let builder = TableBuilder::new(
        ScriptLoader::new(Arc::new(RealFileSystem), shared),
        FunctionCatalog::new(Arc::new(FakeBackend::with_functions(&["get:sub", "get:other"]))),
        NamespaceResolver::default(),
    );

    let table = builder.build(&[command], &[], |_| true).unwrap();

    let keys: Vec<&str> = table.keys().collect();
    assert_eq!(keys, vec!["get", "get other", "get sub"]);
    assert!(matches!(table.get("get").unwrap().target, Dispatchable::Group(_)));
}

// ============================================================
// Dispatcher
// ============================================================

fn args(s: &str) -> Vec<String> {
    s.split_whitespace().map(String::from).collect()
}

#[test]
fn given_global_and_local_exports_when_dispatching_then_local_wins() {
    // Arrange
    let (_project, shared, command) = project_with_scripts();
    let command = CommandDef::new("post", command.path).option(
        OptionDef::new("production")
            .option_type(OptionType::Select)
            .env_name("CONTEXT")
            .value("prod"),
    );
    let backend = Arc::new(FakeBackend::with_functions(&["post"]));
    let table = TableBuilder::new(
        ScriptLoader::new(Arc::new(RealFileSystem), shared),
        FunctionCatalog::new(backend.clone()),
        NamespaceResolver::default(),
    )
    .build(&[command], &[], |_| true)
    .unwrap();

    let mut global = OptionsSet::new(OptionScope::Global);
    global
        .add(
            OptionDef::new("staging")
                .option_type(OptionType::Select)
                .env_name("CONTEXT"),
        )
        .unwrap();
    global.parse(&args("--staging")).unwrap();

    let manifest = Manifest::default();
    let io = Io::headless();
    let ctx = BuiltinContext {
        manifest: &manifest,
        table: &table,
        io: &io,
    };

    // Act
    let dispatcher = Dispatcher::new(backend.clone());
    let invocation = dispatcher.prepare(&table, &args("post --production x")).unwrap();
    let result = dispatcher.invoke(&invocation, &global, &ctx).unwrap();

    // Assert
    assert!(result.success());
    let calls = backend.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (function, call_args, env) = &calls[0];
    assert_eq!(function, "post");
    assert_eq!(call_args, &args("x"));
    assert_eq!(env.get("CONTEXT"), Some(&Some("prod".to_string())));
}

#[test]
fn given_unknown_key_when_preparing_then_nothing_is_invoked() {
    let backend = Arc::new(FakeBackend::default());
    let table = centry::application::CommandTable::new();

    let err = Dispatcher::new(backend.clone())
        .prepare(&table, &args("nope sub"))
        .unwrap_err();

    assert!(matches!(err, ApplicationError::CommandNotFound(ref name) if name == "nope"));
    assert!(backend.calls.lock().unwrap().is_empty());
}

#[test]
fn given_group_with_unknown_subcommand_when_preparing_then_reports_the_token() {
    let (_project, shared, command) = project_with_scripts();
    let backend = Arc::new(FakeBackend::with_functions(&["get:sub"]));
    let table = TableBuilder::new(
        ScriptLoader::new(Arc::new(RealFileSystem), shared),
        FunctionCatalog::new(backend.clone()),
        NamespaceResolver::default(),
    )
    .build(&[command], &[], |_| true)
    .unwrap();
    let dispatcher = Dispatcher::new(backend.clone());

    let invocation = dispatcher.prepare(&table, &args("get")).unwrap();
    assert!(invocation.help_requested());

    let err = dispatcher.prepare(&table, &args("get nope")).unwrap_err();
    assert!(matches!(err, ApplicationError::CommandNotFound(ref name) if name == "nope"));
    assert!(backend.calls.lock().unwrap().is_empty());
}
