use crate::{config::Config, shell::start_shell};
use colored::*;

mod cache;
mod config;
mod disk;
mod logging;
mod shell;
mod storage;
mod utils;

fn main() {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} {}", "❌ Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    logging::init(config.log_level);
    start_shell(config);
}
