use std::process::ExitCode;

fn main() -> ExitCode {
    match docindex_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("index2search: {e}");
            ExitCode::FAILURE
        }
    }
}
