use std::process::ExitCode;

fn main() -> ExitCode {
    mater_cli::run()
}
