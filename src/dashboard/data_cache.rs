use crate::data::{
    DataFetchError, FetchState, Order, Product, Review, StoreDataProvider, StoreSummary, Ticket,
};
use std::sync::{Arc, Mutex};

/// Hint passed to providers for how many records the dashboard will show at
/// most. Renderers still truncate to their own configured limit.
const FETCH_LIMIT: usize = 25;

/// Immutable view of all dashboard data at one point in time. Every widget
/// on a render pass reads the same snapshot, so sibling stat widgets always
/// agree on the aggregate counts.
#[derive(Clone)]
pub struct DashboardDataSnapshot {
    pub summary: FetchState<Arc<StoreSummary>>,
    pub products: FetchState<Arc<Vec<Product>>>,
    pub orders: FetchState<Arc<Vec<Order>>>,
    pub reviews: FetchState<Arc<Vec<Review>>>,
    pub tickets: FetchState<Arc<Vec<Ticket>>>,
}

impl Default for DashboardDataSnapshot {
    fn default() -> Self {
        Self {
            summary: FetchState::Loading,
            products: FetchState::Loading,
            orders: FetchState::Loading,
            reviews: FetchState::Loading,
            tickets: FetchState::Loading,
        }
    }
}

impl DashboardDataSnapshot {
    fn with_summary(&self, summary: FetchState<Arc<StoreSummary>>) -> Self {
        Self {
            summary,
            ..self.clone()
        }
    }

    fn with_products(&self, products: FetchState<Arc<Vec<Product>>>) -> Self {
        Self {
            products,
            ..self.clone()
        }
    }

    fn with_orders(&self, orders: FetchState<Arc<Vec<Order>>>) -> Self {
        Self {
            orders,
            ..self.clone()
        }
    }

    fn with_reviews(&self, reviews: FetchState<Arc<Vec<Review>>>) -> Self {
        Self {
            reviews,
            ..self.clone()
        }
    }

    fn with_tickets(&self, tickets: FetchState<Arc<Vec<Ticket>>>) -> Self {
        Self {
            tickets,
            ..self.clone()
        }
    }
}

/// Ticket tying an in-flight fetch to the refresh pass that issued it.
/// Completions carrying a stale ticket are discarded, which guards against
/// applying results after the dashboard has moved on (reload, teardown, or
/// a newer refresh pass).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

struct CacheState {
    snapshot: Arc<DashboardDataSnapshot>,
    generation: u64,
}

pub struct DashboardDataCache {
    state: Mutex<CacheState>,
}

impl DashboardDataCache {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState {
                snapshot: Arc::new(DashboardDataSnapshot::default()),
                generation: 0,
            }),
        }
    }

    /// A panic elsewhere must not cost widgets their last good data, so a
    /// poisoned lock is recovered rather than bypassed.
    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn snapshot(&self) -> Arc<DashboardDataSnapshot> {
        Arc::clone(&self.lock().snapshot)
    }

    /// Start a new refresh pass: resets every collection to loading and
    /// invalidates tickets from earlier passes.
    pub fn begin_refresh(&self) -> RefreshTicket {
        let mut state = self.lock();
        state.generation += 1;
        state.snapshot = Arc::new(DashboardDataSnapshot::default());
        RefreshTicket(state.generation)
    }

    /// Fetch everything synchronously from the provider. The summary is
    /// fetched exactly once per pass and shared with all stat widgets.
    pub fn refresh_all(&self, provider: &dyn StoreDataProvider) {
        let ticket = self.begin_refresh();
        self.complete_summary(ticket, provider.summary());
        self.complete_products(ticket, provider.products(FETCH_LIMIT));
        self.complete_orders(ticket, provider.recent_orders(FETCH_LIMIT));
        self.complete_reviews(ticket, provider.recent_reviews(FETCH_LIMIT));
        self.complete_tickets(ticket, provider.open_tickets(FETCH_LIMIT));
    }

    pub fn complete_summary(
        &self,
        ticket: RefreshTicket,
        result: Result<StoreSummary, DataFetchError>,
    ) {
        self.apply(ticket, |snap| {
            snap.with_summary(FetchState::from(result.map(Arc::new)))
        });
    }

    pub fn complete_products(
        &self,
        ticket: RefreshTicket,
        result: Result<Vec<Product>, DataFetchError>,
    ) {
        self.apply(ticket, |snap| {
            snap.with_products(FetchState::from(result.map(Arc::new)))
        });
    }

    pub fn complete_orders(
        &self,
        ticket: RefreshTicket,
        result: Result<Vec<Order>, DataFetchError>,
    ) {
        self.apply(ticket, |snap| {
            snap.with_orders(FetchState::from(result.map(Arc::new)))
        });
    }

    pub fn complete_reviews(
        &self,
        ticket: RefreshTicket,
        result: Result<Vec<Review>, DataFetchError>,
    ) {
        self.apply(ticket, |snap| {
            snap.with_reviews(FetchState::from(result.map(Arc::new)))
        });
    }

    pub fn complete_tickets(
        &self,
        ticket: RefreshTicket,
        result: Result<Vec<Ticket>, DataFetchError>,
    ) {
        self.apply(ticket, |snap| {
            snap.with_tickets(FetchState::from(result.map(Arc::new)))
        });
    }

    fn apply(
        &self,
        ticket: RefreshTicket,
        update: impl FnOnce(&DashboardDataSnapshot) -> DashboardDataSnapshot,
    ) {
        let mut state = self.lock();
        if state.generation != ticket.0 {
            tracing::debug!(
                ticket = ticket.0,
                current = state.generation,
                "stale fetch result discarded"
            );
            return;
        }
        state.snapshot = Arc::new(update(&state.snapshot));
    }
}

impl Default for DashboardDataCache {
    fn default() -> Self {
        Self::new()
    }
}
