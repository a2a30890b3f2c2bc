use clap::Parser;
use roomcrate_cli::{init_logging, print_report, run_legacy, LegacyArgs};
use std::process::ExitCode;

fn main() -> ExitCode {
    init_logging();
    let args = LegacyArgs::parse();

    match run_legacy(&args) {
        Ok(report) => {
            match print_report(&report, &mut std::io::stdout(), &mut std::io::stderr()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            }
        }
        Err(e) => {
            let name = args
                .input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| args.input.display().to_string());
            eprintln!("✗ {}: {:#}", name, e);
            ExitCode::FAILURE
        }
    }
}
