use colored::*;
use log::debug;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::connect;
use crate::cities::{filter_cities, load_cities};
use crate::cli::args::BrowseArgs;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::controller::{ControllerHandle, PageRequest, TableView};
use crate::error::{CitizensError, Result};
use crate::filter::{DateRange, ImmediateField, TextField};
use crate::output;

/// One line typed into a browse session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Text(TextField, String),
    Immediate(ImmediateField, String),
    Years(Option<i32>, Option<i32>),
    ClearYears,
    Page(u32, Option<u32>),
    Next,
    Prev,
    Reset,
    Retry,
    Cities(String),
    Show,
    Help,
    Quit,
}

const HELP: &str = "\
Commands:
  search|name|last|mother|father|id <text>   text filters (applied when typing pauses)
  birth-city|gender|address-city <value>      dropdown filters (applied immediately)
  years <from|-> [to]                          birth year range (- leaves the start open)
  clear-years                                  remove the birth year range
  page <n> [size]  next  prev                  pagination
  reset                                        clear every filter
  retry                                        re-run the current query
  cities [text]                                list cities for the city filters
  show  help  quit";

/// Parse one input line; blank lines yield `None`
pub fn parse_line(line: &str) -> Result<Option<BrowseCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "search" => BrowseCommand::Text(TextField::Search, rest.to_string()),
        "name" => BrowseCommand::Text(TextField::FirstName, rest.to_string()),
        "last" => BrowseCommand::Text(TextField::LastName, rest.to_string()),
        "mother" => BrowseCommand::Text(TextField::MotherName, rest.to_string()),
        "father" => BrowseCommand::Text(TextField::FatherName, rest.to_string()),
        "id" => BrowseCommand::Text(TextField::NationalIdentifier, rest.to_string()),
        "birth-city" => BrowseCommand::Immediate(ImmediateField::BirthCity, rest.to_string()),
        "address-city" => BrowseCommand::Immediate(ImmediateField::AddressCity, rest.to_string()),
        "gender" => {
            let code = rest.to_uppercase();
            if !matches!(code.as_str(), "" | "E" | "K") {
                return Err(CitizensError::InvalidInput(format!(
                    "Gender must be E (male) or K (female), got '{}'",
                    rest
                )));
            }
            BrowseCommand::Immediate(ImmediateField::Gender, code)
        }
        "years" => {
            let mut parts = rest.split_whitespace();
            let from = match parts.next() {
                Some("-") => None,
                Some(year) => parse_arg::<i32>(Some(year), "year")?,
                None => return Err(CitizensError::InvalidInput("Usage: years <from|-> [to]".to_string())),
            };
            let to = parse_arg::<i32>(parts.next(), "year")?;
            if from.is_none() && to.is_none() {
                return Err(CitizensError::InvalidInput("Usage: years <from|-> [to]".to_string()));
            }
            BrowseCommand::Years(from, to)
        }
        "clear-years" => BrowseCommand::ClearYears,
        "page" => {
            let mut parts = rest.split_whitespace();
            let page = parse_arg::<u32>(parts.next(), "page")?
                .ok_or_else(|| CitizensError::InvalidInput("Usage: page <n> [size]".to_string()))?;
            let size = parse_arg::<u32>(parts.next(), "page size")?;
            BrowseCommand::Page(page, size)
        }
        "next" => BrowseCommand::Next,
        "prev" => BrowseCommand::Prev,
        "reset" => BrowseCommand::Reset,
        "retry" => BrowseCommand::Retry,
        "cities" => BrowseCommand::Cities(rest.to_string()),
        "show" => BrowseCommand::Show,
        "help" | "?" => BrowseCommand::Help,
        "quit" | "exit" | "q" => BrowseCommand::Quit,
        other => {
            return Err(CitizensError::InvalidInput(format!(
                "Unknown command '{}'. Type 'help' for the list of commands.",
                other
            )))
        }
    };
    Ok(Some(command))
}

fn parse_arg<T: std::str::FromStr>(value: Option<&str>, what: &str) -> Result<Option<T>> {
    value
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| CitizensError::InvalidInput(format!("Invalid {}: '{}'", what, v)))
        })
        .transpose()
}

/// Execute browse command
pub async fn execute(args: BrowseArgs, format: OutputFormat) -> Result<()> {
    let config = Config::load()?;
    let mut options = config.controller_options();
    if let Some(size) = args.size {
        options.page_size = PageRequest::new(1, size)?.page_size;
    }
    if let Some(ms) = args.debounce_ms {
        options.debounce = Duration::from_millis(ms);
    }

    let source = connect(&config)?;
    let (handle, task) = ControllerHandle::spawn(source.clone(), options);
    let mut views = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_rendered: Option<TableView> = None;
    let mut cities: Option<Vec<String>> = None;

    println!("{}", HELP.dimmed());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match parse_line(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        eprintln!("{} {}", "Error:".red(), e);
                        continue;
                    }
                };
                match command {
                    BrowseCommand::Quit => break,
                    BrowseCommand::Help => println!("{}", HELP),
                    BrowseCommand::Show => render(&handle.view(), format)?,
                    BrowseCommand::Cities(filter) => {
                        if cities.is_none() {
                            cities = Some(load_cities(source.as_ref()).await);
                        }
                        let all = cities.as_deref().unwrap_or_default();
                        println!("{}", output::format_cities(&filter_cities(all, &filter)));
                    }
                    command => {
                        if let Err(e) = apply(&handle, command) {
                            eprintln!("{} {}", "Error:".red(), e);
                        }
                    }
                }
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if !view.is_settled() {
                    if view.searching {
                        debug!("Waiting for typing to pause");
                    }
                    continue;
                }
                if last_rendered.as_ref() != Some(&view) {
                    render(&view, format)?;
                    last_rendered = Some(view);
                }
            }
        }
    }

    if handle.shutdown().is_ok() {
        if let Err(e) = task.await {
            debug!("Controller task ended abnormally: {}", e);
        }
    }
    Ok(())
}

fn apply(handle: &ControllerHandle, command: BrowseCommand) -> Result<()> {
    match command {
        BrowseCommand::Text(field, value) => handle.set_text_filter(field, value),
        BrowseCommand::Immediate(field, value) => handle.set_immediate_filter(field, value),
        BrowseCommand::Years(from, to) => {
            let range = DateRange::years(from, to).ok_or_else(|| {
                CitizensError::InvalidInput("Invalid year range: the start year must not be after the end year".to_string())
            })?;
            handle.set_date_range(Some(range))
        }
        BrowseCommand::ClearYears => handle.set_date_range(None),
        BrowseCommand::Page(page, size) => {
            let page_size = size.unwrap_or(handle.view().page.page_size);
            if size.is_some() && page == 1 {
                handle.set_page_size(page_size)
            } else {
                handle.set_page(page, page_size)
            }
        }
        BrowseCommand::Next => {
            let view = handle.view();
            let next = view.page.page + 1;
            if u64::from(next) > view.result.total_pages() {
                return Err(CitizensError::InvalidInput("Already on the last page".to_string()));
            }
            handle.set_page(next, view.page.page_size)
        }
        BrowseCommand::Prev => {
            let view = handle.view();
            if view.page.page <= 1 {
                return Err(CitizensError::InvalidInput("Already on the first page".to_string()));
            }
            handle.set_page(view.page.page - 1, view.page.page_size)
        }
        BrowseCommand::Reset => handle.reset_all(),
        BrowseCommand::Retry => handle.retry(),
        BrowseCommand::Cities(_) | BrowseCommand::Show | BrowseCommand::Help | BrowseCommand::Quit => Ok(()),
    }
}

fn render(view: &TableView, format: OutputFormat) -> Result<()> {
    println!("{}", output::format_table_view(view, format)?);
    Ok(())
}
