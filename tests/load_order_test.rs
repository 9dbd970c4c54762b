//! Script chain ordering, observed through side effects of the shared scripts.
//!
//! Lives in its own test binary because it sets a process environment variable.

use std::path::PathBuf;

use centry::cli::{Context, Executor, Runtime};
use centry::infrastructure::io::Io;

#[test]
fn given_debug_output_when_invoking_then_scripts_load_in_declared_order() {
    // Arrange
    std::env::set_var("OUTPUT_DEBUG", "true");
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources/main_test.yaml");
    let args = vec![
        manifest.to_string_lossy().into_owned(),
        "--quiet".to_string(),
        "get".to_string(),
    ];

    // Act
    let runtime = Runtime::new(args, Context::new(Executor::Cli, Io::headless())).unwrap();
    let result = runtime.execute();
    std::env::remove_var("OUTPUT_DEBUG");

    // Assert
    assert_eq!(
        result.stdout_str(),
        "Loading init.sh\nLoading helpers.sh\nget ()\n"
    );
}
