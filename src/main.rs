use std::process::ExitCode;

fn main() -> ExitCode {
    match price_forecast::app::run() {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
