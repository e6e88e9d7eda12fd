//! Validate data/cleaned_nav_list.json (relative to the working directory) before publishing.
//! Run: cargo run --bin validate_nav_list
//! Exit codes: 0 pass, 2 fatal rule violation, 1 unreadable or malformed input.

use navlist::data::dataset::DEFAULT_DATASET_PATH;

fn main() {
    navlist::logging::init();
    std::process::exit(navlist::cli::validate_command(DEFAULT_DATASET_PATH));
}
