use log::debug;
use std::time::Duration;

use super::connect;
use crate::cli::args::ListArgs;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::controller::{ControllerHandle, ControllerOptions, PageRequest, TableView};
use crate::error::{CitizensError, Result};
use crate::output;
use crate::progress::{FetchProgress, ProgressManager};

/// Execute list command
pub async fn execute(args: ListArgs, format: OutputFormat, quiet: bool, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let page_size = args.size.unwrap_or(config.table.page_size);
    let requested = PageRequest::new(args.page, page_size)?;

    let source = connect(&config)?;
    let progress_manager = ProgressManager::new(quiet, verbose);
    let progress = FetchProgress::new(&progress_manager);
    progress_manager.show_message(&format!("Querying {}", source.base_url()));

    // Nobody is typing, so text filters need no quiet period
    let options = ControllerOptions {
        page_size,
        debounce: Duration::ZERO,
    };
    let (handle, task) = ControllerHandle::spawn(source, options);

    let view = load_page(&handle, &args, requested, &progress).await;

    handle.shutdown()?;
    if let Err(e) = task.await {
        debug!("Controller task ended abnormally: {}", e);
    }
    progress.finish_and_clear();

    let view = view?;
    if let Some(error) = &view.error {
        return Err(CitizensError::Other(format!("Failed to load citizens: {}", error)));
    }

    println!("{}", output::format_table_view(&view, format)?);
    Ok(())
}

async fn load_page(
    handle: &ControllerHandle,
    args: &ListArgs,
    requested: PageRequest,
    progress: &FetchProgress,
) -> Result<TableView> {
    for (field, value) in args.filters.text_filters() {
        handle.set_text_filter(field, value)?;
    }
    for (field, value) in args.filters.immediate_filters() {
        handle.set_immediate_filter(field, value)?;
    }
    if let Some(range) = args.filters.date_range()? {
        handle.set_date_range(Some(range))?;
    }

    let mut view = handle.wait_until_settled().await?;
    progress.update(&view);

    // Filter changes always land on page 1
    if requested.page != view.page.page {
        handle.set_page(requested.page, requested.page_size)?;
        view = handle.wait_until_settled().await?;
    }

    Ok(view)
}
