use std::process;

fn main() {
    process::exit(pwstage_cli::run());
}
