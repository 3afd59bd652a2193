//! Filter vocabulary of the citizens table.
//!
//! Text fields are debounced before they reach the backend; immediate fields and the
//! birth date range are applied as soon as they change. Everything here is plain data:
//! timing and fetching live in [`crate::controller`].

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::api::types::QueryParams;
use crate::error::CitizensError;

/// Free-text filters, applied after the input pauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Search,
    FirstName,
    LastName,
    MotherName,
    FatherName,
    NationalIdentifier,
}

impl TextField {
    pub const ALL: [TextField; 6] = [
        TextField::Search,
        TextField::FirstName,
        TextField::LastName,
        TextField::MotherName,
        TextField::FatherName,
        TextField::NationalIdentifier,
    ];

    /// Query parameter name
    pub fn wire_key(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::MotherName => "mother_name",
            Self::FatherName => "father_name",
            Self::NationalIdentifier => "national_identifier",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Search => "Search",
            Self::FirstName => "Name",
            Self::LastName => "Last Name",
            Self::MotherName => "Mother",
            Self::FatherName => "Father",
            Self::NationalIdentifier => "National ID",
        }
    }
}

impl FromStr for TextField {
    type Err = CitizensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(Self::Search),
            "name" | "first_name" | "firstName" => Ok(Self::FirstName),
            "last_name" | "lastName" => Ok(Self::LastName),
            "mother_name" | "motherName" => Ok(Self::MotherName),
            "father_name" | "fatherName" => Ok(Self::FatherName),
            "national_identifier" | "nationalIdentifier" => Ok(Self::NationalIdentifier),
            other => Err(CitizensError::InvalidFilterKey(other.to_string())),
        }
    }
}

/// Dropdown filters, applied on change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImmediateField {
    BirthCity,
    Gender,
    AddressCity,
}

impl ImmediateField {
    pub const ALL: [ImmediateField; 3] = [
        ImmediateField::BirthCity,
        ImmediateField::Gender,
        ImmediateField::AddressCity,
    ];

    pub fn wire_key(&self) -> &'static str {
        match self {
            Self::BirthCity => "birth_city",
            Self::Gender => "gender",
            Self::AddressCity => "address_city",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BirthCity => "Birth City",
            Self::Gender => "Gender",
            Self::AddressCity => "Address City",
        }
    }
}

impl FromStr for ImmediateField {
    type Err = CitizensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "birth_city" | "birthCityName" => Ok(Self::BirthCity),
            "gender" => Ok(Self::Gender),
            "address_city" | "addressCityName" => Ok(Self::AddressCity),
            other => Err(CitizensError::InvalidFilterKey(other.to_string())),
        }
    }
}

/// Any key the presentation layer may set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    Text(TextField),
    Immediate(ImmediateField),
}

impl FromStr for FilterKey {
    type Err = CitizensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<TextField>()
            .map(Self::Text)
            .or_else(|_| s.parse::<ImmediateField>().map(Self::Immediate))
            .map_err(|_| CitizensError::InvalidFilterKey(s.to_string()))
    }
}

/// Display label for a gender code
pub fn gender_label(code: &str) -> &str {
    match code {
        "E" | "M" => "Male",
        "K" | "F" => "Female",
        other => other,
    }
}

/// Raw two-endpoint birth date selection, year granularity on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// `None` when `start` is after `end`
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) if start > end => None,
            _ => Some(Self { start, end }),
        }
    }

    /// Range covering whole years; `None` for an invalid year or a reversed range
    pub fn years(from: Option<i32>, to: Option<i32>) -> Option<Self> {
        let start = match from {
            Some(year) => Some(NaiveDate::from_ymd_opt(year, 1, 1)?),
            None => None,
        };
        let end = match to {
            Some(year) => Some(NaiveDate::from_ymd_opt(year, 12, 31)?),
            None => None,
        };
        Self::new(start, end)
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// `(birth_date_from, birth_date_to)` as sent to the backend; absent endpoints are ""
    pub fn derived_bounds(&self) -> (String, String) {
        let year = |d: Option<NaiveDate>| d.map(|d| d.format("%Y").to_string()).unwrap_or_default();
        (year(self.start), year(self.end))
    }
}

/// Values of the debounced text fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextFilters {
    pub search: String,
    pub first_name: String,
    pub last_name: String,
    pub mother_name: String,
    pub father_name: String,
    pub national_identifier: String,
}

impl TextFilters {
    pub fn get(&self, field: TextField) -> &str {
        match field {
            TextField::Search => &self.search,
            TextField::FirstName => &self.first_name,
            TextField::LastName => &self.last_name,
            TextField::MotherName => &self.mother_name,
            TextField::FatherName => &self.father_name,
            TextField::NationalIdentifier => &self.national_identifier,
        }
    }

    pub fn set(&mut self, field: TextField, value: impl Into<String>) {
        let value = value.into();
        match field {
            TextField::Search => self.search = value,
            TextField::FirstName => self.first_name = value,
            TextField::LastName => self.last_name = value,
            TextField::MotherName => self.mother_name = value,
            TextField::FatherName => self.father_name = value,
            TextField::NationalIdentifier => self.national_identifier = value,
        }
    }
}

/// Everything currently selected in the filter bar.
///
/// `birth_date_from`/`birth_date_to` are derived from the date range and only ever
/// change together with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub text: TextFilters,
    birth_city: String,
    gender: String,
    address_city: String,
    birth_date_from: String,
    birth_date_to: String,
    date_range: Option<DateRange>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, field: TextField) -> &str {
        self.text.get(field)
    }

    pub fn set_text(&mut self, field: TextField, value: impl Into<String>) {
        self.text.set(field, value);
    }

    pub fn immediate(&self, field: ImmediateField) -> &str {
        match field {
            ImmediateField::BirthCity => &self.birth_city,
            ImmediateField::Gender => &self.gender,
            ImmediateField::AddressCity => &self.address_city,
        }
    }

    pub fn set_immediate(&mut self, field: ImmediateField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ImmediateField::BirthCity => self.birth_city = value,
            ImmediateField::Gender => self.gender = value,
            ImmediateField::AddressCity => self.address_city = value,
        }
    }

    pub fn date_range(&self) -> Option<&DateRange> {
        self.date_range.as_ref()
    }

    pub fn birth_date_from(&self) -> &str {
        &self.birth_date_from
    }

    pub fn birth_date_to(&self) -> &str {
        &self.birth_date_to
    }

    /// Replace the date range and recompute both derived bounds
    pub fn set_date_range(&mut self, range: Option<DateRange>) {
        let range = range.filter(|r| !r.is_empty());
        let (from, to) = range.map(|r| r.derived_bounds()).unwrap_or_default();
        self.birth_date_from = from;
        self.birth_date_to = to;
        self.date_range = range;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Query parameters using this state's own text values
    pub fn query_params(&self) -> QueryParams {
        self.query_params_with(&self.text)
    }

    /// Query parameters using `text` in place of the live text values.
    ///
    /// The raw date range is never part of the query, only its derived bounds.
    pub fn query_params_with(&self, text: &TextFilters) -> QueryParams {
        let mut params = QueryParams::new();
        for field in TextField::ALL {
            params.insert(field.wire_key(), text.get(field));
        }
        params.insert("birth_date_from", &self.birth_date_from);
        params.insert("birth_date_to", &self.birth_date_to);
        for field in ImmediateField::ALL {
            params.insert(field.wire_key(), self.immediate(field));
        }
        params
    }
}

/// Which filter an active-filter chip stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChipKey {
    Text(TextField),
    Immediate(ImmediateField),
    BirthDate,
}

/// Chips in display order
pub const DISPLAYABLE_FILTERS: [(ChipKey, &str); 10] = [
    (ChipKey::Text(TextField::Search), "Search"),
    (ChipKey::Text(TextField::FirstName), "Name"),
    (ChipKey::Text(TextField::LastName), "Last Name"),
    (ChipKey::Text(TextField::MotherName), "Mother"),
    (ChipKey::Text(TextField::FatherName), "Father"),
    (ChipKey::Text(TextField::NationalIdentifier), "National ID"),
    (ChipKey::Immediate(ImmediateField::BirthCity), "Birth City"),
    (ChipKey::Immediate(ImmediateField::Gender), "Gender"),
    (ChipKey::Immediate(ImmediateField::AddressCity), "Address City"),
    (ChipKey::BirthDate, "Birth Date"),
];

/// One active filter as shown above the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChip {
    pub key: ChipKey,
    pub label: &'static str,
    pub value: String,
    /// Immediate filters and the date range can be cleared from the chip
    pub closable: bool,
}

impl fmt::Display for FilterChip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

/// Active chips for `state`, text chips taken from the settled values.
///
/// Text chips are hidden while a search is still settling.
pub fn active_chips(state: &FilterState, settled: &TextFilters, searching: bool) -> Vec<FilterChip> {
    let mut chips = Vec::new();
    for (key, label) in DISPLAYABLE_FILTERS {
        let (value, closable) = match key {
            ChipKey::Text(field) => {
                if searching {
                    continue;
                }
                (settled.get(field).to_string(), false)
            }
            ChipKey::Immediate(field) => (state.immediate(field).to_string(), true),
            ChipKey::BirthDate => match state.date_range().and_then(|r| r.start.map(|s| (s, r.end))) {
                Some((start, end)) => {
                    let end = end
                        .map(|e| e.format("%d/%m/%Y").to_string())
                        .unwrap_or_else(|| "…".to_string());
                    (format!("{} - {}", start.format("%d/%m/%Y"), end), true)
                }
                None => continue,
            },
        };
        if value.is_empty() {
            continue;
        }
        chips.push(FilterChip { key, label, value, closable });
    }
    chips
}
