use std::process;

use invitation_core::ExitCode;

fn main() {
    match invitation_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("invitations error: {err}");
            process::exit(ExitCode::Io as i32);
        }
    }
}
