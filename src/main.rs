use std::process::ExitCode;

fn main() -> ExitCode {
    match proompt_versions::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            proompt_versions::ui::output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
