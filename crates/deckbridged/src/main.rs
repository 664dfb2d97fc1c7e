//! Entry point launched by the control-panel host.

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use deckbridge_config::StartupParameters;
use deckbridged::{StructuredHealthReporter, SystemConfigLoader, bootstrap_with};

fn main() -> ExitCode {
    let parameters = match StartupParameters::parse(env::args_os().skip(1)) {
        Ok(parameters) => parameters,
        Err(error) => return fail(&error),
    };

    let reporter = Arc::new(StructuredHealthReporter::new());
    let plugin = match bootstrap_with(&SystemConfigLoader, reporter, parameters) {
        Ok(plugin) => plugin,
        Err(error) => return fail(&error),
    };

    match plugin.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => fail(&error),
    }
}

fn fail(error: &dyn std::error::Error) -> ExitCode {
    drop(writeln!(io::stderr(), "deckbridged: {error}"));
    ExitCode::FAILURE
}
