use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use super::debounce::{DebounceTimers, DEFAULT_DEBOUNCE};
use super::state::{FetchRequest, FilterController, PageRequest, TableView, DEFAULT_PAGE_SIZE};
use crate::api::types::CitizenPayload;
use crate::api::CitizenSource;
use crate::error::{CitizensError, Result};
use crate::filter::{DateRange, FilterKey, ImmediateField, TextField};

/// Controller runtime options
#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    /// Initial rows per page
    pub page_size: u32,
    /// Quiet period for text fields
    pub debounce: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

#[derive(Debug)]
enum Command {
    SetText(TextField, String),
    SetImmediate(ImmediateField, String),
    SetDateRange(Option<DateRange>),
    ResetAll,
    SetPage(PageRequest),
    SetPageSize(u32),
    Retry,
    /// Acknowledged once every earlier command has been handled and published
    Sync(oneshot::Sender<()>),
    Shutdown,
}

type InFlight = BoxFuture<'static, (u64, Result<CitizenPayload>)>;

/// Handle to a running filter controller.
///
/// Cloning is cheap; the controller stops when the last handle is dropped or
/// [`ControllerHandle::shutdown`] is called.
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<TableView>,
}

impl ControllerHandle {
    /// Start the controller on the current tokio runtime.
    ///
    /// The first unfiltered page is requested immediately.
    pub fn spawn(source: Arc<dyn CitizenSource>, options: ControllerOptions) -> (Self, JoinHandle<()>) {
        let controller = FilterController::new(options.page_size);
        let (view_tx, view_rx) = watch::channel(controller.snapshot());
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let actor = Actor {
            controller,
            timers: DebounceTimers::new(options.debounce),
            source,
            in_flight: FuturesUnordered::new(),
            view: view_tx,
        };
        let task = tokio::spawn(actor.run(command_rx));

        (
            Self {
                commands: command_tx,
                view: view_rx,
            },
            task,
        )
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| CitizensError::ControllerClosed)
    }

    /// Update a debounced text field; the fetch happens once typing pauses
    pub fn set_text_filter(&self, field: TextField, value: impl Into<String>) -> Result<()> {
        self.send(Command::SetText(field, value.into()))
    }

    /// Update a dropdown filter and fetch page 1 right away
    pub fn set_immediate_filter(&self, field: ImmediateField, value: impl Into<String>) -> Result<()> {
        self.send(Command::SetImmediate(field, value.into()))
    }

    /// Route a filter by its key name.
    ///
    /// Unknown keys are a programming error and are rejected before anything changes.
    pub fn set_filter(&self, key: &str, value: impl Into<String>) -> Result<()> {
        match key.parse::<FilterKey>()? {
            FilterKey::Text(field) => self.set_text_filter(field, value),
            FilterKey::Immediate(field) => self.set_immediate_filter(field, value),
        }
    }

    /// Set or clear (`None`) the birth date range and fetch page 1
    pub fn set_date_range(&self, range: Option<DateRange>) -> Result<()> {
        self.send(Command::SetDateRange(range))
    }

    pub fn reset_all(&self) -> Result<()> {
        self.send(Command::ResetAll)
    }

    pub fn set_page(&self, page: u32, page_size: u32) -> Result<()> {
        let request = PageRequest::new(page, page_size)?;
        self.send(Command::SetPage(request))
    }

    pub fn set_page_size(&self, page_size: u32) -> Result<()> {
        PageRequest::new(1, page_size)?;
        self.send(Command::SetPageSize(page_size))
    }

    /// Re-issue the current query, e.g. after a transport failure
    pub fn retry(&self) -> Result<()> {
        self.send(Command::Retry)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    /// Latest published snapshot
    pub fn view(&self) -> TableView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TableView> {
        self.view.clone()
    }

    /// Wait until every command sent so far has been handled, no text is settling
    /// and no fetch is in flight.
    pub async fn wait_until_settled(&self) -> Result<TableView> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(Command::Sync(ack_tx))?;
        ack_rx.await.map_err(|_| CitizensError::ControllerClosed)?;

        let mut view = self.view.clone();
        let settled = view
            .wait_for(TableView::is_settled)
            .await
            .map_err(|_| CitizensError::ControllerClosed)?;
        Ok(settled.clone())
    }
}

struct Actor {
    controller: FilterController,
    timers: DebounceTimers,
    source: Arc<dyn CitizenSource>,
    in_flight: FuturesUnordered<InFlight>,
    view: watch::Sender<TableView>,
}

impl Actor {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let initial = self.controller.initial_fetch();
        self.dispatch(initial);
        self.publish();

        loop {
            let deadline = self.timers.next_deadline();
            let fetching = !self.in_flight.is_empty();

            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                Some((seq, result)) = self.in_flight.next(), if fetching => {
                    self.controller.complete(seq, result);
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.settle_expired();
                }
            }

            self.publish();
        }

        debug!(
            "Filter controller stopped with {} fetches still in flight",
            self.in_flight.len()
        );
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::SetText(field, value) => {
                if self.controller.set_text_filter(field, value) {
                    self.timers.schedule(field, Instant::now());
                } else {
                    // Back to the settled value: nothing left to wait for on this field
                    self.timers.cancel(field);
                    if let Some(request) = self.controller.reconcile_text() {
                        self.dispatch(request);
                    }
                }
            }
            Command::SetImmediate(field, value) => {
                let request = self.controller.set_immediate_filter(field, value);
                self.dispatch(request);
            }
            Command::SetDateRange(range) => {
                let request = self.controller.set_date_range(range);
                self.dispatch(request);
            }
            Command::ResetAll => {
                self.timers.cancel_all();
                let request = self.controller.reset_all();
                self.dispatch(request);
            }
            Command::SetPage(page) => match self.controller.set_page(page.page, page.page_size) {
                Ok(request) => self.dispatch(request),
                Err(e) => warn!("Ignoring page change: {}", e),
            },
            Command::SetPageSize(size) => match self.controller.set_page_size(size) {
                Ok(request) => self.dispatch(request),
                Err(e) => warn!("Ignoring page size change: {}", e),
            },
            Command::Retry => {
                let request = self.controller.retry();
                self.dispatch(request);
            }
            Command::Sync(ack) => {
                self.publish();
                let _ = ack.send(());
            }
            Command::Shutdown => {}
        }
    }

    fn settle_expired(&mut self) {
        for field in self.timers.take_expired(Instant::now()) {
            if let Some(request) = self.controller.settle(field) {
                self.dispatch(request);
            }
        }
    }

    fn dispatch(&mut self, request: FetchRequest) {
        let source = Arc::clone(&self.source);
        let FetchRequest { seq, query } = request;
        self.in_flight
            .push(async move { (seq, source.fetch_citizens(query).await) }.boxed());
    }

    fn publish(&self) {
        self.view.send_replace(self.controller.snapshot());
    }
}
