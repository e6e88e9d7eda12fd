use std::env;
use std::process;

fn main() {
    navlist::logging::init();
    let args: Vec<String> = env::args().collect();
    process::exit(navlist::cli::run_with_args(&args));
}
