//! Incremental "load more" pagination over a [`BookSearch`] backend.
//!
//! Every transition is available in two halves: `begin_*` hands out a
//! [`PageTicket`] describing the request to perform, and [`ResultAccumulator::complete`]
//! applies its result. Starting a new search bumps the session generation, so
//! a ticket issued for an older session is discarded when it completes.
//! The async helpers (`start_new_search`, `load_more`, `change_sort`) run both
//! halves around a single fetch.

use tracing::{debug, info, warn};

use crate::error::{ApiError, Result};
use crate::models::{BookRecord, SearchCriteria, SearchPage, SortOrder};
use crate::services::open_library::{BookSearch, DEFAULT_PAGE_SIZE};
use crate::services::query_builder::{build_query, SearchQuery};

pub const MISSING_CRITERIA_MESSAGE: &str =
    "Please enter at least one search criteria (title, author, or genre).";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Searching,
    Loaded,
    LoadingMore,
    Failed,
}

/// Accumulated state of one logical search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSession {
    pub criteria: SearchCriteria,
    pub items: Vec<BookRecord>,
    pub total_matching: usize,
    pub next_offset: usize,
    /// Set once a follow-up page came back empty
    pub exhausted: bool,
}

impl SearchSession {
    pub fn is_exhausted(&self) -> bool {
        self.exhausted || self.items.len() >= self.total_matching
    }
}

/// What a transition did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Items were received and stored
    Loaded { appended: usize },
    /// The first page was empty
    NoResults,
    /// A follow-up page was empty
    NoMoreResults,
    /// Nothing to do; no request was made
    Skipped,
    /// The result belonged to a superseded session and was dropped
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TicketKind {
    FirstPage,
    NextPage,
}

/// A page request handed out by the accumulator.
#[derive(Debug)]
pub struct PageTicket {
    generation: u64,
    kind: TicketKind,
    criteria: SearchCriteria,
    query: SearchQuery,
    limit: usize,
    offset: usize,
}

impl PageTicket {
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_first_page(&self) -> bool {
        self.kind == TicketKind::FirstPage
    }
}

#[derive(Debug)]
pub struct ResultAccumulator {
    page_size: usize,
    state: SearchState,
    generation: u64,
    /// Criteria of the latest submitted search, set before its first page arrives
    active_criteria: Option<SearchCriteria>,
    session: Option<SearchSession>,
}

impl Default for ResultAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ResultAccumulator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            state: SearchState::Idle,
            generation: 0,
            active_criteria: None,
            session: None,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn session(&self) -> Option<&SearchSession> {
        self.session.as_ref()
    }

    pub fn items(&self) -> &[BookRecord] {
        self.session
            .as_ref()
            .map(|session| session.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SearchState::Searching | SearchState::LoadingMore)
    }

    pub fn can_load_more(&self) -> bool {
        !self.is_loading()
            && self
                .session
                .as_ref()
                .is_some_and(|session| !session.is_exhausted())
    }

    /// Discards the current session and prepares the request for page one.
    pub fn begin_search(&mut self, criteria: SearchCriteria) -> Result<PageTicket> {
        let query = build_query(&criteria)
            .ok_or_else(|| ApiError::InvalidInput(MISSING_CRITERIA_MESSAGE.to_string()))?;

        self.generation += 1;
        self.session = None;
        self.active_criteria = Some(criteria.clone());
        self.state = SearchState::Searching;
        debug!(generation = self.generation, "Starting new search session");

        Ok(PageTicket {
            generation: self.generation,
            kind: TicketKind::FirstPage,
            criteria,
            query,
            limit: self.page_size,
            offset: 0,
        })
    }

    /// Prepares the request for the next page, or `None` when there is no
    /// session, a request is pending, or everything has been loaded.
    pub fn begin_load_more(&mut self) -> Option<PageTicket> {
        if self.is_loading() {
            debug!("Load more ignored: a request is already pending");
            return None;
        }

        let session = self.session.as_ref()?;
        if session.is_exhausted() {
            debug!(
                loaded = session.items.len(),
                total = session.total_matching,
                "Load more ignored: session exhausted"
            );
            return None;
        }

        // criteria were validated when the session started
        let query = build_query(&session.criteria)?;
        let ticket = PageTicket {
            generation: self.generation,
            kind: TicketKind::NextPage,
            criteria: session.criteria.clone(),
            query,
            limit: self.page_size,
            offset: session.next_offset,
        };

        self.state = SearchState::LoadingMore;
        Some(ticket)
    }

    /// Restarts the active search with a new sort order. `Ok(None)` when no
    /// search is active or the order is unchanged.
    pub fn begin_sort_change(&mut self, sort: SortOrder) -> Result<Option<PageTicket>> {
        match &self.active_criteria {
            Some(criteria) if criteria.sort != sort => {
                let criteria = criteria.clone().with_sort(sort);
                self.begin_search(criteria).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Applies the result of a ticket's fetch.
    pub fn complete(
        &mut self,
        ticket: PageTicket,
        result: Result<SearchPage>,
    ) -> Result<PageOutcome> {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding result of a superseded search"
            );
            return Ok(PageOutcome::Stale);
        }

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                warn!("Search page request failed: {}", e);
                self.state = SearchState::Failed;
                return Err(e);
            }
        };

        self.state = SearchState::Loaded;
        match ticket.kind {
            TicketKind::FirstPage => Ok(self.apply_first_page(ticket.criteria, page)),
            TicketKind::NextPage => Ok(self.apply_next_page(page)),
        }
    }

    fn apply_first_page(&mut self, criteria: SearchCriteria, page: SearchPage) -> PageOutcome {
        let appended = page.items.len();
        let total_matching = if appended == 0 {
            0
        } else {
            page.total_matching
        };

        info!("Search loaded {} of {} matching books", appended, total_matching);
        self.session = Some(SearchSession {
            criteria,
            items: page.items,
            total_matching,
            next_offset: appended,
            exhausted: false,
        });

        if appended == 0 {
            PageOutcome::NoResults
        } else {
            PageOutcome::Loaded { appended }
        }
    }

    fn apply_next_page(&mut self, page: SearchPage) -> PageOutcome {
        let Some(session) = self.session.as_mut() else {
            return PageOutcome::Stale;
        };

        if page.items.is_empty() {
            // nothing left upstream even though more were announced
            session.exhausted = true;
            info!("No more results after {} books", session.items.len());
            return PageOutcome::NoMoreResults;
        }

        let appended = page.items.len();
        session.items.extend(page.items);
        session.next_offset += appended;
        session.total_matching = page.total_matching;

        info!(
            "Loaded {} more books ({} of {})",
            appended,
            session.items.len(),
            session.total_matching
        );
        PageOutcome::Loaded { appended }
    }

    async fn run<S>(&mut self, search: &S, ticket: PageTicket) -> Result<PageOutcome>
    where
        S: BookSearch + ?Sized,
    {
        let result = search
            .fetch_page(ticket.query(), ticket.limit(), ticket.offset())
            .await;
        self.complete(ticket, result)
    }

    pub async fn start_new_search<S>(
        &mut self,
        search: &S,
        criteria: SearchCriteria,
    ) -> Result<PageOutcome>
    where
        S: BookSearch + ?Sized,
    {
        let ticket = self.begin_search(criteria)?;
        self.run(search, ticket).await
    }

    pub async fn load_more<S>(&mut self, search: &S) -> Result<PageOutcome>
    where
        S: BookSearch + ?Sized,
    {
        match self.begin_load_more() {
            Some(ticket) => self.run(search, ticket).await,
            None => Ok(PageOutcome::Skipped),
        }
    }

    pub async fn change_sort<S>(&mut self, search: &S, sort: SortOrder) -> Result<PageOutcome>
    where
        S: BookSearch + ?Sized,
    {
        match self.begin_sort_change(sort)? {
            Some(ticket) => self.run(search, ticket).await,
            None => Ok(PageOutcome::Skipped),
        }
    }
}
