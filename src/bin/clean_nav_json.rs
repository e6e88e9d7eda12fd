//! Clean a scrape export into the nav-list dataset and record it in data/registry.json.
//! Run: cargo run --bin clean_nav_json -- -i fancyteams.json -o data/cleaned_nav_list.json --multi

use navlist::config::Settings;

fn main() {
    navlist::logging::init();
    let options: Vec<String> = std::env::args().skip(1).collect();
    std::process::exit(navlist::cli::clean_command(&options, &Settings::from_env()));
}
