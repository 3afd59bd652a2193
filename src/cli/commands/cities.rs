use colored::*;

use super::connect;
use crate::cities::{filter_cities, load_cities};
use crate::cli::args::CitiesArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output;
use crate::progress::{messages, ProgressManager};

/// Execute cities command
pub async fn execute(args: CitiesArgs, quiet: bool, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let source = connect(&config)?;

    let progress_manager = ProgressManager::new(quiet, verbose);
    let spinner = progress_manager.create_search_spinner(messages::LOADING_CITIES);
    let cities = load_cities(source.as_ref()).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let matches = filter_cities(&cities, args.filter.as_deref().unwrap_or(""));
    if matches.is_empty() {
        println!("{}", "No matching cities".yellow());
        return Ok(());
    }

    println!("{}", output::format_cities(&matches));
    Ok(())
}
