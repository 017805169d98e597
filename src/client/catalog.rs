//! Catalog page: filters, paginated record cards and loan buttons

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::{
    api::CatalogBackend,
    debounce::Debouncer,
    sequence::{RequestSequencer, Ticket},
    status::{server_unavailable_notice, StatusLine},
    ClientError,
};
use crate::models::{ListQuery, LoanAction, Record, RecordId, RecordListing};

/// Default number of cards per page
pub const PAGE_SIZE: i64 = 9;

/// Values of the filter controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFilters {
    pub document_type: String,
    pub sort: String,
    pub search: String,
    pub disponibilite: String,
}

impl Default for CatalogFilters {
    fn default() -> Self {
        Self {
            document_type: "tous".to_string(),
            sort: "alpha".to_string(),
            search: String::new(),
            disponibilite: "tous".to_string(),
        }
    }
}

impl CatalogFilters {
    /// Listing parameters for one page; empty controls are left out
    pub fn to_query(&self, page: i64, limit: i64) -> ListQuery {
        ListQuery {
            document_type: Some(self.document_type.clone())
                .filter(|t| !t.is_empty() && t != "tous"),
            page: Some(page),
            limit: Some(limit),
            sort: Some(self.sort.clone()),
            search: Some(self.search.clone()).filter(|s| !s.is_empty()),
            disponibilite: Some(self.disponibilite.clone()),
        }
    }
}

/// Pagination position as last reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: i64,
    pub total_pages: i64,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
        }
    }
}

impl PageState {
    /// A listing with no pages is shown as page 1 of 1.
    pub fn from_listing(listing: &RecordListing) -> Self {
        Self {
            current_page: listing.page.max(1),
            total_pages: listing.total_pages.max(1),
        }
    }

    pub fn controls(&self) -> PaginationControls {
        PaginationControls {
            prev_enabled: self.current_page > 1,
            next_enabled: self.current_page < self.total_pages,
            label: format!("Page {} / {}", self.current_page, self.total_pages),
        }
    }

    pub fn next(&self) -> Option<i64> {
        (self.current_page < self.total_pages).then_some(self.current_page + 1)
    }

    pub fn prev(&self) -> Option<i64> {
        (self.current_page > 1).then_some(self.current_page - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationControls {
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub label: String,
}

/// One record as displayed in the catalog grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: RecordId,
    pub title: String,
    pub checked_out: bool,
    pub badge: &'static str,
    /// Label/value lines for the attributes that are present
    pub details: Vec<(&'static str, String)>,
    /// Checkout date (dd/mm/yyyy) when checked out with a valid marker
    pub checkout_date: Option<String>,
    pub action: LoanAction,
    pub action_label: &'static str,
}

impl From<&Record> for CardView {
    fn from(record: &Record) -> Self {
        let fields = &record.fields;
        let checked_out = record.is_checked_out();

        let mut details = Vec::new();
        if let Some(author) = fields.author().filter(|a| !a.is_empty()) {
            details.push(("Auteur", author.into_owned()));
        }
        if let Some(doc_type) = fields.document_type().filter(|t| !t.is_empty()) {
            details.push(("Type", doc_type.into_owned()));
        }
        let reservations = fields.reservations();
        if reservations != 0 {
            details.push(("Réservations", reservations.to_string()));
        }
        if let Some(rank) = fields.rank().filter(|r| !r.is_empty() && r != "0") {
            details.push(("Rang", rank.into_owned()));
        }

        let (badge, action, action_label) = if checked_out {
            ("Emprunté", LoanAction::Return, "Retourner")
        } else {
            ("Disponible", LoanAction::Checkout, "Emprunter")
        };

        Self {
            id: record.id.clone(),
            title: fields
                .title()
                .filter(|t| !t.is_empty())
                .map(|t| t.into_owned())
                .unwrap_or_else(|| "Sans titre".to_string()),
            checked_out,
            badge,
            details,
            checkout_date: record
                .checkout
                .since()
                .map(|d| d.format("%d/%m/%Y").to_string()),
            action,
            action_label,
        }
    }
}

impl fmt::Display for CardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.title, self.badge)?;
        for (label, value) in &self.details {
            writeln!(f, "  {}: {}", label, value)?;
        }
        if let Some(ref date) = self.checkout_date {
            writeln!(f, "  Emprunté le: {}", date)?;
        }
        writeln!(f, "  ID: {}", self.id)?;
        write!(f, "  -> {}", self.action_label)
    }
}

/// Main area of the catalog page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogContent {
    Cards(Vec<CardView>),
    Empty,
    /// Server unreachable; the notice explains how to start it
    Unavailable(String),
}

/// State of the catalog page between requests
#[derive(Debug)]
pub struct CatalogView {
    pub filters: CatalogFilters,
    pub page_size: i64,
    pub page_state: PageState,
    pub status: StatusLine,
    pub content: CatalogContent,
    pub types: Vec<String>,
    sequencer: RequestSequencer,
}

impl CatalogView {
    pub fn new(page_size: i64) -> Self {
        Self {
            filters: CatalogFilters::default(),
            page_size,
            page_state: PageState::default(),
            status: StatusLine::default(),
            content: CatalogContent::Empty,
            types: Vec::new(),
            sequencer: RequestSequencer::new(),
        }
    }

    /// Start loading `page`: clears the grid and returns the request to send.
    pub fn begin_load(&mut self, page: i64) -> (Ticket, ListQuery) {
        self.status = StatusLine::loading("Chargement des documents...");
        self.content = CatalogContent::Empty;
        (self.sequencer.issue(), self.filters.to_query(page, self.page_size))
    }

    /// Apply a listing response. Returns false, leaving the view untouched,
    /// when a newer request was dispatched after this one.
    pub fn finish_load(&mut self, ticket: Ticket, result: Result<RecordListing, ClientError>) -> bool {
        if !self.sequencer.is_latest(ticket) {
            tracing::debug!("Discarding stale listing response {:?}", ticket);
            return false;
        }

        match result {
            Ok(listing) => {
                self.page_state = PageState::from_listing(&listing);
                if listing.data.is_empty() {
                    self.status = StatusLine::info("Aucun document trouvé");
                    self.content = CatalogContent::Empty;
                } else {
                    self.status = StatusLine::success(format!(
                        "{} document(s) sur {} (page {}/{})",
                        listing.count, listing.total, listing.page, listing.total_pages
                    ));
                    self.content = CatalogContent::Cards(listing.data.iter().map(CardView::from).collect());
                }
            }
            Err(e) => {
                let message = e.to_string();
                self.status = StatusLine::error(&message);
                self.content = CatalogContent::Unavailable(server_unavailable_notice(&message));
            }
        }
        true
    }

    pub fn controls(&self) -> PaginationControls {
        self.page_state.controls()
    }
}

impl fmt::Display for CatalogView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.status)?;
        match self.content {
            CatalogContent::Cards(ref cards) => {
                for card in cards {
                    writeln!(f, "{}", card)?;
                }
            }
            CatalogContent::Empty => writeln!(f, "Aucun document trouvé")?,
            CatalogContent::Unavailable(ref notice) => writeln!(f, "{}", notice)?,
        }
        write!(f, "{}", self.controls().label)
    }
}

/// Drives a `CatalogView` against a backend
pub struct CatalogController<B> {
    backend: Arc<B>,
    view: Mutex<CatalogView>,
    debouncer: Debouncer,
}

impl<B: CatalogBackend + 'static> CatalogController<B> {
    pub fn new(backend: Arc<B>) -> Arc<Self> {
        Self::with_page_size(backend, PAGE_SIZE)
    }

    pub fn with_page_size(backend: Arc<B>, page_size: i64) -> Arc<Self> {
        Arc::new(Self {
            backend,
            view: Mutex::new(CatalogView::new(page_size)),
            debouncer: Debouncer::default(),
        })
    }

    /// Populate the type selector and show the first page.
    /// A failure to load types leaves the selector with its default entry.
    pub async fn init(&self) {
        match self.backend.document_types().await {
            Ok(types) => self.view.lock().await.types = types,
            Err(e) => tracing::warn!("Failed to load document types: {}", e),
        }
        self.load_page(1).await;
    }

    /// Fetch and display one page
    pub async fn load_page(&self, page: i64) {
        let (ticket, query) = self.view.lock().await.begin_load(page);
        let result = self.backend.list_records(&query).await;
        self.view.lock().await.finish_load(ticket, result);
    }

    pub async fn reload_from_start(&self) {
        self.load_page(1).await;
    }

    pub async fn next_page(&self) {
        let next = self.view.lock().await.page_state.next();
        if let Some(page) = next {
            self.load_page(page).await;
        }
    }

    pub async fn prev_page(&self) {
        let prev = self.view.lock().await.page_state.prev();
        if let Some(page) = prev {
            self.load_page(page).await;
        }
    }

    /// Change a select control and reload from the first page
    pub async fn update_filters(&self, update: impl FnOnce(&mut CatalogFilters)) {
        update(&mut self.view.lock().await.filters);
        self.reload_from_start().await;
    }

    /// Record a keystroke in the search box; the reload is debounced.
    pub async fn on_search_input(self: &Arc<Self>, text: impl Into<String>) {
        self.view.lock().await.filters.search = text.into();
        let this = Arc::clone(self);
        self.debouncer.call(async move {
            this.reload_from_start().await;
        });
    }

    /// Check a record out or return it, then refresh the current page.
    pub async fn toggle_loan(&self, id: &RecordId, action: LoanAction) -> Result<String, ClientError> {
        let message = self.backend.set_loan_state(id, action).await?;
        let page = self.view.lock().await.page_state.current_page;
        self.load_page(page).await;
        Ok(message)
    }

    /// Read the current view state
    pub async fn with_view<R>(&self, read: impl FnOnce(&CatalogView) -> R) -> R {
        read(&*self.view.lock().await)
    }
}
