use std::process::ExitCode;

mod cli;
mod commands;
mod display;
mod logging;

fn main() -> ExitCode {
    let cli = cli::parse();
    logging::init(cli.global.verbose);

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e);
            ExitCode::FAILURE
        }
    }
}
