//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = tablescout_cli::run() {
        eprintln!("tablescout: {err}");
        std::process::exit(1);
    }
}
