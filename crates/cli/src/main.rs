use std::process::ExitCode;

fn main() -> ExitCode {
    assurini_cli::run()
}
