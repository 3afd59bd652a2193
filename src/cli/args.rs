use clap::{Args, Subcommand};

use crate::error::{CitizensError, Result};
use crate::filter::{DateRange, ImmediateField, TextField};

/// Filters shared by `list`
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Free-text search across all fields
    #[arg(short = 'q', long)]
    pub search: Option<String>,

    /// First name
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Last name
    #[arg(short = 'l', long)]
    pub last_name: Option<String>,

    /// Mother's first name
    #[arg(long)]
    pub mother_name: Option<String>,

    /// Father's first name
    #[arg(long)]
    pub father_name: Option<String>,

    /// National identifier
    #[arg(long, alias = "id")]
    pub national_id: Option<String>,

    /// Birth city
    #[arg(short = 'b', long)]
    pub birth_city: Option<String>,

    /// Gender code (E = male, K = female)
    #[arg(short = 'g', long, value_parser = ["E", "K"])]
    pub gender: Option<String>,

    /// Address city
    #[arg(short = 'a', long)]
    pub address_city: Option<String>,

    /// Earliest birth year
    #[arg(long)]
    pub born_from: Option<i32>,

    /// Latest birth year
    #[arg(long)]
    pub born_to: Option<i32>,
}

impl FilterArgs {
    /// Text filters that were given on the command line
    pub fn text_filters(&self) -> Vec<(TextField, &str)> {
        [
            (TextField::Search, &self.search),
            (TextField::FirstName, &self.name),
            (TextField::LastName, &self.last_name),
            (TextField::MotherName, &self.mother_name),
            (TextField::FatherName, &self.father_name),
            (TextField::NationalIdentifier, &self.national_id),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    /// Dropdown filters that were given on the command line
    pub fn immediate_filters(&self) -> Vec<(ImmediateField, &str)> {
        [
            (ImmediateField::BirthCity, &self.birth_city),
            (ImmediateField::Gender, &self.gender),
            (ImmediateField::AddressCity, &self.address_city),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    /// Birth year range, if either bound was given.
    ///
    /// Fails for an invalid year or a start year after the end year.
    pub fn date_range(&self) -> Result<Option<DateRange>> {
        if self.born_from.is_none() && self.born_to.is_none() {
            return Ok(None);
        }
        DateRange::years(self.born_from, self.born_to).map(Some).ok_or_else(|| {
            CitizensError::InvalidInput(
                "Invalid birth year range: --born-from must not be after --born-to".to_string(),
            )
        })
    }
}

/// List command arguments
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Page number
    #[arg(short, long, default_value = "1")]
    pub page: u32,

    /// Results per page (defaults to table.page_size)
    #[arg(short = 's', long)]
    pub size: Option<u32>,
}

/// Browse command arguments
#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Results per page (defaults to table.page_size)
    #[arg(short = 's', long)]
    pub size: Option<u32>,

    /// Debounce delay for text filters in milliseconds (defaults to table.debounce_ms)
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

/// Cities command arguments
#[derive(Args, Debug)]
pub struct CitiesArgs {
    /// Only show cities containing this text
    pub filter: Option<String>,
}

/// Configuration command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., api.base_url)
        key: String,

        /// Configuration value
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Show configuration file path
    Path,

    /// Initialize configuration
    Init,
}
