use std::process;

use clap::Parser;

use centry::cli::{output, Cli, Context, Executor, InfoCommand, Runtime};
use centry::infrastructure::io::Io;

fn main() {
    let cli = Cli::parse();
    let context = Context::new(Executor::Cli, Io::terminal()).with_builtin(InfoCommand);

    let runtime = match Runtime::new(cli.into_runtime_args(), context) {
        Ok(runtime) => runtime,
        Err(e) => {
            let _ = output::error(&Io::terminal(), &e);
            process::exit(e.exit_code());
        }
    };

    let result = runtime.execute();
    process::exit(result.exit_code);
}
