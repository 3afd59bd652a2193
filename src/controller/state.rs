use log::{debug, info, warn};
use serde::Serialize;

use crate::api::types::{CitizenPayload, CitizenQuery, CitizenRecord};
use crate::error::{CitizensError, Result};
use crate::filter::{active_chips, DateRange, FilterChip, FilterState, ImmediateField, TextField, TextFilters};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page the table is showing or asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    /// Page number (1-based)
    pub page: u32,
    /// Rows per page
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Result<Self> {
        if page == 0 {
            return Err(CitizensError::InvalidInput("Page number must be 1 or greater".to_string()));
        }
        if page_size == 0 {
            return Err(CitizensError::InvalidInput("Page size must be 1 or greater".to_string()));
        }
        Ok(Self { page, page_size })
    }

    pub fn first(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// A citizen row with its table key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub key: String,
    #[serde(flatten)]
    pub record: CitizenRecord,
}

/// Rows and pagination of the last applied fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPage {
    pub rows: Vec<Row>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl ResultPage {
    pub fn empty(request: PageRequest) -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
            page: request.page,
            page_size: request.page_size,
        }
    }

    /// Reconcile a payload with the page that was asked for.
    ///
    /// Server-reported pagination wins when present; a bare list is one unpaginated page.
    pub fn from_payload(payload: CitizenPayload, requested: PageRequest) -> Self {
        let (citizens, total, page, page_size) = match payload {
            CitizenPayload::Paginated { citizens, pagination } => {
                let pagination = pagination.unwrap_or_default();
                let total = pagination.total.unwrap_or(citizens.len() as u64);
                let page = positive_u32(pagination.page).unwrap_or(requested.page);
                let page_size = positive_u32(pagination.limit).unwrap_or(requested.page_size);
                (citizens, total, page, page_size)
            }
            CitizenPayload::List(citizens) => {
                let total = citizens.len() as u64;
                (citizens, total, requested.page, requested.page_size)
            }
            CitizenPayload::Empty => (Vec::new(), 0, requested.page, requested.page_size),
        };

        let rows = citizens
            .into_iter()
            .enumerate()
            .map(|(index, record)| Row {
                key: row_key(&record, page, index),
                record,
            })
            .collect();

        Self {
            rows,
            total,
            page,
            page_size,
        }
    }

    /// 1-based positions of the first and last row on this page
    pub fn range(&self) -> Option<(u64, u64)> {
        if self.total == 0 || self.rows.is_empty() {
            return None;
        }
        let from = (self.page as u64 - 1) * self.page_size as u64 + 1;
        Some((from, from + self.rows.len() as u64 - 1))
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.page_size.max(1) as u64)
    }

    /// "1-10 of 42 citizens", or "No data found"
    pub fn summary(&self) -> String {
        match self.range() {
            Some((from, to)) => format!("{}-{} of {} citizens", from, to, self.total),
            None => "No data found".to_string(),
        }
    }
}

fn positive_u32(value: Option<u64>) -> Option<u32> {
    value.filter(|v| *v >= 1).and_then(|v| u32::try_from(v).ok())
}

/// `uid`, else `id`, else `"{page}-{index}"`
fn row_key(record: &CitizenRecord, page: u32, index: usize) -> String {
    record
        .uid
        .clone()
        .or_else(|| record.id.clone())
        .unwrap_or_else(|| format!("{}-{}", page, index))
}

/// A fetch the driver must perform, tagged with its sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub query: CitizenQuery,
}

/// What happened to a completed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed(String),
    /// A newer request was issued; the response was dropped
    Stale,
}

/// Snapshot of the controller published to observers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub filters: FilterState,
    /// Text values the backend has been (or is being) asked for
    pub settled: TextFilters,
    pub page: PageRequest,
    pub result: ResultPage,
    pub loading: bool,
    /// A debounced field has not settled yet
    pub searching: bool,
    /// Last transport failure, cleared by the next successful fetch
    pub error: Option<String>,
    pub chips: Vec<FilterChip>,
}

impl TableView {
    /// Nothing is in flight and no text is waiting to settle
    pub fn is_settled(&self) -> bool {
        !self.loading && !self.searching
    }
}

/// Filter and pagination state machine of the citizens table.
///
/// It does no I/O and keeps no clock: it decides which fetches to issue and
/// which responses to accept. [`crate::controller::runtime`] drives it.
#[derive(Debug)]
pub struct FilterController {
    filters: FilterState,
    settled: TextFilters,
    /// Text values carried by the most recently issued fetch
    applied_text: TextFilters,
    page: PageRequest,
    result: ResultPage,
    loading: bool,
    last_error: Option<String>,
    next_seq: u64,
    latest_seq: Option<u64>,
}

impl FilterController {
    pub fn new(page_size: u32) -> Self {
        let page = PageRequest::first(page_size);
        Self {
            filters: FilterState::new(),
            settled: TextFilters::default(),
            applied_text: TextFilters::default(),
            page,
            result: ResultPage::empty(page),
            loading: false,
            last_error: None,
            next_seq: 1,
            latest_seq: None,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn settled(&self) -> &TextFilters {
        &self.settled
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    pub fn result(&self) -> &ResultPage {
        &self.result
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Some text field differs from its settled value
    pub fn is_searching(&self) -> bool {
        self.filters.text != self.settled
    }

    /// Unfiltered first page, issued once at start-up
    pub fn initial_fetch(&mut self) -> FetchRequest {
        self.page.page = 1;
        self.issue()
    }

    /// Update a debounced field's display value. Never fetches.
    ///
    /// Returns whether the field now differs from its settled value.
    pub fn set_text_filter(&mut self, field: TextField, value: impl Into<String>) -> bool {
        self.filters.set_text(field, value);
        self.filters.text(field) != self.settled.get(field)
    }

    /// The debounce delay for `field` elapsed without another change
    pub fn settle(&mut self, field: TextField) -> Option<FetchRequest> {
        let value = self.filters.text(field).to_string();
        self.settled.set(field, value);
        self.reconcile_text()
    }

    /// Fetch page 1 if every text field has settled and the settled text differs
    /// from what was last sent.
    pub fn reconcile_text(&mut self) -> Option<FetchRequest> {
        if self.is_searching() || self.settled == self.applied_text {
            return None;
        }
        self.page.page = 1;
        Some(self.issue())
    }

    pub fn set_immediate_filter(&mut self, field: ImmediateField, value: impl Into<String>) -> FetchRequest {
        self.filters.set_immediate(field, value);
        self.page.page = 1;
        self.issue()
    }

    /// Set or clear the birth date range; clearing is a filter change as well
    pub fn set_date_range(&mut self, range: Option<DateRange>) -> FetchRequest {
        self.filters.set_date_range(range);
        self.page.page = 1;
        self.issue()
    }

    /// Clear every filter and fetch the first unfiltered page
    pub fn reset_all(&mut self) -> FetchRequest {
        self.filters.clear();
        self.settled = TextFilters::default();
        self.page.page = 1;
        self.issue()
    }

    /// Change page; filters are unchanged and the page is not reset
    pub fn set_page(&mut self, page: u32, page_size: u32) -> Result<FetchRequest> {
        self.page = PageRequest::new(page, page_size)?;
        Ok(self.issue())
    }

    /// Change the page size, starting again from page 1
    pub fn set_page_size(&mut self, page_size: u32) -> Result<FetchRequest> {
        self.page = PageRequest::new(1, page_size)?;
        Ok(self.issue())
    }

    /// Re-issue the current query
    pub fn retry(&mut self) -> FetchRequest {
        self.issue()
    }

    /// Build the query from settled values and hand out the next sequence number
    fn issue(&mut self) -> FetchRequest {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest_seq = Some(seq);
        self.loading = true;
        self.applied_text = self.settled.clone();

        let query = CitizenQuery {
            page: self.page.page,
            limit: self.page.page_size,
            params: self.filters.query_params_with(&self.settled),
        };
        debug!(
            "Issuing citizens fetch #{} page={} limit={} params={:?}",
            seq, query.page, query.limit, query.params
        );
        FetchRequest { seq, query }
    }

    /// Apply a finished fetch unless a newer one has been issued since
    pub fn complete(&mut self, seq: u64, result: Result<CitizenPayload>) -> FetchOutcome {
        if self.latest_seq != Some(seq) {
            debug!(
                "Discarding stale response #{} (latest is #{:?})",
                seq, self.latest_seq
            );
            return FetchOutcome::Stale;
        }
        self.loading = false;

        match result {
            Ok(payload) => {
                self.result = ResultPage::from_payload(payload, self.page);
                self.page = PageRequest {
                    page: self.result.page,
                    page_size: self.result.page_size,
                };
                self.last_error = None;
                info!(
                    "Applied fetch #{}: {} rows, total {}",
                    seq,
                    self.result.rows.len(),
                    self.result.total
                );
                FetchOutcome::Applied
            }
            Err(e) => {
                warn!("Error fetching citizens: {}", e);
                self.result.rows.clear();
                self.result.total = 0;
                let message = e.to_string();
                self.last_error = Some(message.clone());
                FetchOutcome::Failed(message)
            }
        }
    }

    pub fn snapshot(&self) -> TableView {
        let searching = self.is_searching();
        TableView {
            filters: self.filters.clone(),
            settled: self.settled.clone(),
            page: self.page,
            result: self.result.clone(),
            loading: self.loading,
            searching,
            error: self.last_error.clone(),
            chips: active_chips(&self.filters, &self.settled, searching),
        }
    }
}
