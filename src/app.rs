use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::action::{Action, ListTab};
use crate::backend::Backend;
use crate::config::Config;
use crate::loading::{AsyncStateRegistry, PaginationLoading};
use crate::pagination::{PageSizeOptions, PaginationController};
use crate::submit::SubmitTracker;
use crate::tui::Event;
use crate::types::{Order, OrderStatus, Page, PageQuery, Product};

/// Why a list is being (re)fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    Page,
    Search,
    Filter,
}

/// What happened to a load result handed to [`ListView::finish_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load for the same list is in flight.
    Stale,
    /// The new total moved the current page; fetch it again.
    Refetch,
}

/// One paged list: its pagination, the rows of the current page and the
/// bookkeeping that keeps late responses from overwriting newer ones.
#[derive(Debug)]
pub struct ListView<T> {
    pub pagination: PaginationController,
    pub rows: Vec<T>,
    pub selected: usize,
    pub activity: PaginationLoading,
    load_id: u64,
    loaded_query: Option<PageQuery>,
}

impl<T> ListView<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            pagination: PaginationController::with_page_size(page_size),
            rows: Vec::new(),
            selected: 0,
            activity: PaginationLoading::default(),
            load_id: 0,
            loaded_query: None,
        }
    }

    pub fn selected_row(&self) -> Option<&T> {
        self.rows.get(self.selected)
    }

    /// Start a new load. Earlier loads still in flight become stale.
    pub fn begin_load(&mut self, kind: LoadKind) -> u64 {
        self.load_id += 1;
        match kind {
            LoadKind::Page => self.activity.loading_page = true,
            LoadKind::Search => self.activity.searching = true,
            LoadKind::Filter => self.activity.filtering = true,
        }
        self.load_id
    }

    pub fn finish_load(&mut self, load_id: u64, page: Page<T>) -> LoadOutcome {
        if load_id != self.load_id {
            return LoadOutcome::Stale;
        }
        self.activity = PaginationLoading::default();

        let requested = self.pagination.query();
        self.pagination.sync_meta(&page.meta);
        self.rows = page.items;
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));

        if self.pagination.query() != requested {
            return LoadOutcome::Refetch;
        }
        self.loaded_query = Some(requested);
        LoadOutcome::Applied
    }

    /// Returns false when the failure belongs to a superseded load.
    pub fn fail_load(&mut self, load_id: u64) -> bool {
        if load_id != self.load_id {
            return false;
        }
        self.activity = PaginationLoading::default();
        true
    }

    /// Whether the rows on screen belong to the current page.
    pub fn is_current(&self) -> bool {
        self.loaded_query == Some(self.pagination.query())
    }

    fn scroll_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn scroll_down(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }
}

/// Operation key for the status form of one order row.
pub fn order_key(order_id: &str) -> String {
    format!("order:{}", order_id)
}

fn next_filter(filter: Option<OrderStatus>) -> Option<OrderStatus> {
    match filter {
        None => Some(OrderStatus::Pending),
        Some(OrderStatus::Pending) => Some(OrderStatus::Confirmed),
        Some(OrderStatus::Confirmed) => Some(OrderStatus::Preparing),
        Some(OrderStatus::Preparing) => Some(OrderStatus::Ready),
        Some(OrderStatus::Ready) => Some(OrderStatus::Served),
        Some(OrderStatus::Served) => Some(OrderStatus::Completed),
        Some(OrderStatus::Completed) => Some(OrderStatus::Cancelled),
        Some(OrderStatus::Cancelled) => None,
    }
}

pub struct App {
    pub tab: ListTab,
    pub orders: ListView<Order>,
    pub products: ListView<Product>,
    pub order_filter: Option<OrderStatus>,
    /// Applied product name search.
    pub product_search: Option<String>,
    /// Search text being typed, while in search mode.
    pub search_input: Option<String>,
    pub operations: AsyncStateRegistry,
    pub status_form: SubmitTracker,
    pub jump_input: Option<String>,
    pub page_sizes: PageSizeOptions,
    pub range_delta: usize,
    pub error: Option<String>,
    pub should_quit: bool,
    submit_key: Option<String>,
    backend: Arc<dyn Backend>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        backend: Arc<dyn Backend>,
        config: &Config,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        let page_size = config.lists.page_size();
        Self {
            tab: ListTab::default(),
            orders: ListView::new(page_size),
            products: ListView::new(page_size),
            order_filter: None,
            product_search: None,
            search_input: None,
            operations: AsyncStateRegistry::new(),
            status_form: SubmitTracker::new(config.forms.success_ttl()),
            jump_input: None,
            page_sizes: config.lists.page_size_options(),
            range_delta: config.lists.range_delta,
            error: None,
            should_quit: false,
            submit_key: None,
            backend,
            action_tx,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn pagination(&self) -> &PaginationController {
        match self.tab {
            ListTab::Orders => &self.orders.pagination,
            ListTab::Products => &self.products.pagination,
        }
    }

    fn pagination_mut(&mut self) -> &mut PaginationController {
        match self.tab {
            ListTab::Orders => &mut self.orders.pagination,
            ListTab::Products => &mut self.products.pagination,
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::Reload,
            Event::Key(key) => self.handle_key(key),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        if self.search_input.is_some() {
            return match key.code {
                KeyCode::Esc => Action::ExitSearchMode,
                KeyCode::Enter => Action::SearchConfirm,
                KeyCode::Backspace => Action::SearchBackspace,
                KeyCode::Char(c) => Action::SearchInput(c),
                _ => Action::None,
            };
        }
        if self.jump_input.is_some() {
            return match key.code {
                KeyCode::Esc => Action::ExitJumpMode,
                KeyCode::Enter => Action::JumpConfirm,
                KeyCode::Backspace => Action::JumpBackspace,
                KeyCode::Char(c) if c.is_ascii_digit() => Action::JumpInput(c),
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Tab => Action::SwitchTab,
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Char('l') | KeyCode::Right | KeyCode::PageDown => Action::NextPage,
            KeyCode::Char('h') | KeyCode::Left | KeyCode::PageUp => Action::PrevPage,
            KeyCode::Char('g') | KeyCode::Home => Action::FirstPage,
            KeyCode::Char('G') | KeyCode::End => Action::LastPage,
            KeyCode::Char('+') | KeyCode::Char('=') => Action::GrowPageSize,
            KeyCode::Char('-') => Action::ShrinkPageSize,
            KeyCode::Char(':') => Action::EnterJumpMode,
            KeyCode::Char('r') => Action::Reload,
            KeyCode::Char('f') if self.tab == ListTab::Orders => Action::CycleOrderFilter,
            KeyCode::Char('s') if self.tab == ListTab::Orders => Action::AdvanceOrderStatus,
            KeyCode::Char('/') if self.tab == ListTab::Products => Action::EnterSearchMode,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if !action.is_background() {
            self.error = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::SwitchTab => {
                self.tab = self.tab.next();
                if !self.current_list_is_current() {
                    self.load(self.tab, LoadKind::Page);
                }
            }
            Action::ScrollUp => match self.tab {
                ListTab::Orders => self.orders.scroll_up(),
                ListTab::Products => self.products.scroll_up(),
            },
            Action::ScrollDown => match self.tab {
                ListTab::Orders => self.orders.scroll_down(),
                ListTab::Products => self.products.scroll_down(),
            },

            Action::NextPage => self.navigate(PaginationController::go_to_next_page),
            Action::PrevPage => self.navigate(PaginationController::go_to_previous_page),
            Action::FirstPage => self.navigate(PaginationController::go_to_first_page),
            Action::LastPage => self.navigate(PaginationController::go_to_last_page),
            Action::GoToPage(page) => self.navigate(|p| p.go_to_page(page)),
            Action::GrowPageSize => {
                let size = self.page_sizes.next_after(self.pagination().page_size());
                self.change_page_size(size);
            }
            Action::ShrinkPageSize => {
                let size = self.page_sizes.prev_before(self.pagination().page_size());
                self.change_page_size(size);
            }

            Action::EnterJumpMode => {
                self.jump_input = Some(String::new());
            }
            Action::ExitJumpMode => {
                self.jump_input = None;
            }
            Action::JumpInput(c) => {
                if let Some(input) = &mut self.jump_input {
                    if input.len() < 9 {
                        input.push(c);
                    }
                }
            }
            Action::JumpBackspace => {
                if let Some(input) = &mut self.jump_input {
                    input.pop();
                }
            }
            Action::JumpConfirm => {
                if let Some(input) = self.jump_input.take() {
                    if let Ok(page) = input.parse::<i64>() {
                        self.update(Action::GoToPage(page));
                    }
                }
            }

            Action::EnterSearchMode => {
                self.search_input = Some(self.product_search.clone().unwrap_or_default());
            }
            Action::ExitSearchMode => {
                self.search_input = None;
            }
            Action::SearchInput(c) => {
                if let Some(input) = &mut self.search_input {
                    if input.chars().count() < 64 {
                        input.push(c);
                    }
                }
            }
            Action::SearchBackspace => {
                if let Some(input) = &mut self.search_input {
                    input.pop();
                }
            }
            Action::SearchConfirm => {
                if let Some(input) = self.search_input.take() {
                    let search = Some(input.trim().to_string()).filter(|s| !s.is_empty());
                    if search != self.product_search || !self.products.is_current() {
                        self.product_search = search;
                        self.products.pagination.go_to_first_page();
                        self.load(ListTab::Products, LoadKind::Search);
                    }
                }
            }

            Action::CycleOrderFilter => {
                self.order_filter = next_filter(self.order_filter);
                self.orders.pagination.go_to_first_page();
                self.load(ListTab::Orders, LoadKind::Filter);
            }
            Action::Reload => {
                self.load(self.tab, LoadKind::Page);
            }

            Action::OrdersLoaded(page, load_id) => {
                let outcome = self.orders.finish_load(load_id, page);
                self.apply_outcome(ListTab::Orders, outcome, load_id);
            }
            Action::ProductsLoaded(page, load_id) => {
                let outcome = self.products.finish_load(load_id, page);
                self.apply_outcome(ListTab::Products, outcome, load_id);
            }
            Action::LoadFailed {
                tab,
                message,
                load_id,
            } => {
                let current = match tab {
                    ListTab::Orders => self.orders.fail_load(load_id),
                    ListTab::Products => self.products.fail_load(load_id),
                };
                if current {
                    warn!(list = tab.key(), error = %message, "list load failed");
                    self.operations.set_error(tab.key(), Some(message.clone()));
                    self.error = Some(message);
                } else {
                    debug!(list = tab.key(), load_id, "dropping stale load failure");
                }
            }

            Action::AdvanceOrderStatus => self.advance_order_status(),
            Action::OrderStatusUpdated(order) => {
                let key = order_key(&order.id);
                self.operations.set_success(key, true);
                if let Some(row) = self.orders.rows.iter_mut().find(|o| o.id == order.id) {
                    *row = order;
                }
                if let Some(expiry) = self.status_form.stop_submitting(None) {
                    let tx = self.action_tx.clone();
                    tokio::spawn(async move {
                        if let Some(generation) = expiry.wait().await {
                            tx.send(Action::SubmitExpired(generation)).ok();
                        }
                    });
                }
                // the order may have left the filtered set
                if self.order_filter.is_some() {
                    self.load(ListTab::Orders, LoadKind::Filter);
                }
            }
            Action::OrderStatusFailed { order_id, message } => {
                self.operations
                    .set_error(order_key(&order_id), Some(message.clone()));
                let _ = self.status_form.stop_submitting(Some(message));
            }
            Action::SubmitExpired(generation) => {
                if self.status_form.expire(generation) {
                    if let Some(key) = self.submit_key.take() {
                        self.operations.clear_state(&key);
                    }
                }
            }

            Action::Error(msg) => {
                self.error = Some(msg);
            }
            Action::None => {}
        }
    }

    fn current_list_is_current(&self) -> bool {
        match self.tab {
            ListTab::Orders => self.orders.is_current(),
            ListTab::Products => self.products.is_current(),
        }
    }

    /// Apply a pagination change and fetch the page if it moved.
    fn navigate(&mut self, f: impl FnOnce(&mut PaginationController)) {
        let before = self.pagination().query();
        f(self.pagination_mut());
        if self.pagination().query() != before {
            self.load(self.tab, LoadKind::Page);
        }
    }

    fn change_page_size(&mut self, size: usize) {
        if size == self.pagination().page_size() {
            return;
        }
        self.navigate(|p| p.set_page_size(size));
    }

    fn apply_outcome(&mut self, tab: ListTab, outcome: LoadOutcome, load_id: u64) {
        match outcome {
            LoadOutcome::Applied => {
                self.operations.set_success(tab.key(), true);
            }
            LoadOutcome::Stale => {
                debug!(list = tab.key(), load_id, "dropping stale load result");
            }
            LoadOutcome::Refetch => {
                debug!(list = tab.key(), "page moved after total changed, refetching");
                self.load(tab, LoadKind::Page);
            }
        }
    }

    fn load(&mut self, tab: ListTab, kind: LoadKind) {
        self.operations.set_loading(tab.key(), true);
        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);

        match tab {
            ListTab::Orders => {
                let load_id = self.orders.begin_load(kind);
                let query = self.orders.pagination.query();
                let status = self.order_filter;
                debug!(load_id, page = query.page, ?status, "loading orders");
                tokio::spawn(async move {
                    match backend.list_orders(query, status).await {
                        Ok(page) => tx.send(Action::OrdersLoaded(page, load_id)).ok(),
                        Err(e) => tx
                            .send(Action::LoadFailed {
                                tab,
                                message: e.to_string(),
                                load_id,
                            })
                            .ok(),
                    };
                });
            }
            ListTab::Products => {
                let load_id = self.products.begin_load(kind);
                let query = self.products.pagination.query();
                let search = self.product_search.clone();
                debug!(load_id, page = query.page, ?search, "loading products");
                tokio::spawn(async move {
                    match backend.list_products(query, search.as_deref()).await {
                        Ok(page) => tx.send(Action::ProductsLoaded(page, load_id)).ok(),
                        Err(e) => tx
                            .send(Action::LoadFailed {
                                tab,
                                message: e.to_string(),
                                load_id,
                            })
                            .ok(),
                    };
                });
            }
        }
    }

    fn advance_order_status(&mut self) {
        if self.status_form.is_submitting() {
            return;
        }
        let Some(order) = self.orders.selected_row() else {
            return;
        };
        let Some(next) = order.status.next() else {
            self.error = Some(format!(
                "Order {} is already {}",
                order.order_number,
                order.status.to_string().to_lowercase()
            ));
            return;
        };

        let order_id = order.id.clone();
        let key = order_key(&order_id);
        if let Some(previous) = self.submit_key.replace(key.clone()) {
            if previous != key {
                self.operations.clear_state(&previous);
            }
        }
        self.status_form.start_submitting();
        self.operations.set_loading(key, true);

        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            match backend.update_order_status(&order_id, next).await {
                Ok(order) => tx.send(Action::OrderStatusUpdated(order)).ok(),
                Err(e) => tx
                    .send(Action::OrderStatusFailed {
                        order_id,
                        message: e.to_string(),
                    })
                    .ok(),
            };
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::demo::DemoBackend;
    use crate::types::PageMeta;
    use crossterm::event::KeyModifiers;

    fn app_with(
        orders: usize,
        products: usize,
    ) -> (App, mpsc::UnboundedReceiver<Action>) {
        app_with_config(orders, products, &Config::default())
    }

    fn app_with_config(
        orders: usize,
        products: usize,
        config: &Config,
    ) -> (App, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let backend = Arc::new(DemoBackend::new(orders, products, Duration::ZERO));
        let app = App::new(backend, config, tx);
        (app, rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn pump(app: &mut App, rx: &mut mpsc::UnboundedReceiver<Action>) {
        let action = rx.recv().await.expect("action channel closed");
        app.update(action);
    }

    fn page_of(total: usize, count: usize) -> Page<u32> {
        Page {
            items: (0..count as u32).collect(),
            meta: PageMeta {
                current_page: 1,
                per_page: 10,
                total,
                total_pages: total.div_ceil(10),
            },
        }
    }

    #[test]
    fn stale_load_is_dropped() {
        let mut view: ListView<u32> = ListView::new(10);
        let first = view.begin_load(LoadKind::Page);
        let second = view.begin_load(LoadKind::Page);

        assert_eq!(view.finish_load(first, page_of(50, 10)), LoadOutcome::Stale);
        assert!(view.rows.is_empty());
        assert!(view.activity.is_busy());

        assert_eq!(view.finish_load(second, page_of(50, 10)), LoadOutcome::Applied);
        assert_eq!(view.rows.len(), 10);
        assert!(!view.activity.is_busy());
        assert!(view.is_current());
    }

    #[test]
    fn shrinking_total_requests_refetch() {
        let mut view: ListView<u32> = ListView::new(10);
        view.pagination.set_total(100);
        view.pagination.go_to_page(8);
        let id = view.begin_load(LoadKind::Page);

        assert_eq!(view.finish_load(id, page_of(25, 0)), LoadOutcome::Refetch);
        assert_eq!(view.pagination.page(), 3);
        assert!(!view.is_current());
    }

    #[test]
    fn stale_failure_is_ignored() {
        let mut view: ListView<u32> = ListView::new(10);
        let first = view.begin_load(LoadKind::Filter);
        let _second = view.begin_load(LoadKind::Page);
        assert!(!view.fail_load(first));
        assert!(view.activity.is_busy());
    }

    #[test]
    fn selection_is_clamped_to_new_rows() {
        let mut view: ListView<u32> = ListView::new(10);
        let id = view.begin_load(LoadKind::Page);
        view.finish_load(id, page_of(10, 10));
        view.selected = 9;
        let id = view.begin_load(LoadKind::Page);
        view.finish_load(id, page_of(13, 3));
        assert_eq!(view.selected, 2);
    }

    #[tokio::test]
    async fn initial_load_and_navigation() {
        let (mut app, mut rx) = app_with(137, 0);
        app.update(app.handle_event(Event::Init));
        assert!(app.operations.is_any_loading());

        pump(&mut app, &mut rx).await;
        assert!(!app.operations.is_any_loading());
        assert!(app.operations.is_success("orders"));
        assert_eq!(app.orders.rows.len(), 10);
        assert_eq!(app.orders.pagination.total_pages(), 14);

        app.update(Action::LastPage);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.orders.pagination.page(), 14);
        assert_eq!(app.orders.rows.len(), 7);
        assert_eq!(app.orders.pagination.item_range(), (131, 137));

        // already on the last page: no load is dispatched
        app.update(Action::NextPage);
        assert!(!app.operations.is_loading("orders"));
    }

    #[tokio::test]
    async fn page_size_change_returns_to_first_page() {
        let (mut app, mut rx) = app_with(137, 0);
        app.update(Action::Reload);
        pump(&mut app, &mut rx).await;
        app.update(Action::GoToPage(5));
        pump(&mut app, &mut rx).await;

        app.update(Action::GrowPageSize);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.orders.pagination.page(), 1);
        assert_eq!(app.orders.pagination.page_size(), 20);
        assert_eq!(app.orders.rows.len(), 20);
    }

    #[tokio::test]
    async fn jump_mode_goes_to_clamped_page() {
        let (mut app, mut rx) = app_with(45, 0);
        app.update(Action::Reload);
        pump(&mut app, &mut rx).await;

        let colon = KeyEvent::new(KeyCode::Char(':'), KeyModifiers::NONE);
        app.update(app.handle_key(colon));
        for c in ['9', '9'] {
            app.update(app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)));
        }
        assert_eq!(app.jump_input.as_deref(), Some("99"));
        app.update(app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(app.jump_input.is_none());

        pump(&mut app, &mut rx).await;
        assert_eq!(app.orders.pagination.page(), 5);
    }

    #[tokio::test]
    async fn switching_tabs_loads_once() {
        let (mut app, mut rx) = app_with(5, 30);
        app.update(Action::Reload);
        pump(&mut app, &mut rx).await;

        app.update(Action::SwitchTab);
        assert_eq!(app.tab, ListTab::Products);
        assert!(app.operations.is_loading("products"));
        pump(&mut app, &mut rx).await;
        assert_eq!(app.products.rows.len(), 10);

        app.update(Action::SwitchTab);
        assert!(!app.operations.is_any_loading());
    }

    #[tokio::test]
    async fn filter_resets_page_and_reloads() {
        let (mut app, mut rx) = app_with(70, 0);
        app.update(Action::Reload);
        pump(&mut app, &mut rx).await;
        app.update(Action::GoToPage(4));
        pump(&mut app, &mut rx).await;

        app.update(Action::CycleOrderFilter);
        assert!(app.orders.activity.filtering);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.order_filter, Some(OrderStatus::Pending));
        assert_eq!(app.orders.pagination.page(), 1);
        assert!(app.orders.rows.iter().all(|o| o.status == OrderStatus::Pending));
    }

    #[tokio::test]
    async fn oversized_page_size_is_capped() {
        let mut config = Config::default();
        config.lists.page_size = 200;
        config.lists.page_size_options = vec![50, 500];
        let (mut app, mut rx) = app_with_config(137, 0, &config);
        assert_eq!(app.page_sizes.as_slice(), &[50, 100]);

        app.update(Action::Reload);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.orders.pagination.page_size(), 100);
        assert_eq!(app.orders.rows.len(), 100);
        assert_eq!(app.orders.pagination.total_pages(), 2);
        assert_eq!(app.orders.pagination.item_range(), (1, 100));

        app.update(Action::NextPage);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.orders.rows.len(), 37);
    }

    #[tokio::test]
    async fn search_resets_page_and_reloads() {
        let (mut app, mut rx) = app_with(0, 48);
        app.update(Action::SwitchTab);
        pump(&mut app, &mut rx).await;
        app.update(Action::GoToPage(3));
        pump(&mut app, &mut rx).await;
        assert_eq!(app.products.pagination.page(), 3);

        app.update(app.handle_key(key(KeyCode::Char('/'))));
        for c in "rendang".chars() {
            app.update(app.handle_key(key(KeyCode::Char(c))));
        }
        assert_eq!(app.search_input.as_deref(), Some("rendang"));
        app.update(app.handle_key(key(KeyCode::Enter)));
        assert!(app.search_input.is_none());
        assert!(app.products.activity.searching);

        pump(&mut app, &mut rx).await;
        assert!(!app.products.activity.is_busy());
        assert_eq!(app.product_search.as_deref(), Some("rendang"));
        assert_eq!(app.products.pagination.page(), 1);
        assert_eq!(app.products.pagination.total(), 6);
        assert!(app.products.rows.iter().all(|p| p.name.starts_with("Rendang")));

        // paging keeps the search applied
        app.update(Action::NextPage);
        assert!(!app.operations.is_loading("products"));

        // an empty search clears it
        app.update(Action::EnterSearchMode);
        assert_eq!(app.search_input.as_deref(), Some("rendang"));
        for _ in 0..7 {
            app.update(Action::SearchBackspace);
        }
        app.update(Action::SearchConfirm);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.product_search, None);
        assert_eq!(app.products.pagination.total(), 48);
    }

    #[test]
    fn search_keys_only_on_products_tab() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let backend = Arc::new(DemoBackend::new(0, 0, Duration::ZERO));
        let mut app = App::new(backend, &Config::default(), tx);
        assert!(matches!(app.handle_key(key(KeyCode::Char('/'))), Action::None));

        app.tab = ListTab::Products;
        app.update(app.handle_key(key(KeyCode::Char('/'))));
        // in search mode 'q' is text, not quit
        assert!(matches!(
            app.handle_key(key(KeyCode::Char('q'))),
            Action::SearchInput('q')
        ));
        app.update(app.handle_key(key(KeyCode::Esc)));
        assert!(app.search_input.is_none());
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn background_result_keeps_error_visible() {
        let (mut app, mut rx) = app_with(5, 5);
        app.update(Action::Reload);
        pump(&mut app, &mut rx).await;

        app.update(Action::SwitchTab);
        let products_id = app.products.load_id;
        app.update(Action::LoadFailed {
            tab: ListTab::Orders,
            message: "orders unavailable".to_string(),
            load_id: app.orders.load_id,
        });
        assert_eq!(app.error.as_deref(), Some("orders unavailable"));

        pump(&mut app, &mut rx).await;
        assert_eq!(app.products.load_id, products_id);
        assert_eq!(app.error.as_deref(), Some("orders unavailable"));

        app.update(Action::ScrollDown);
        assert_eq!(app.error, None);
    }

    #[tokio::test]
    async fn advance_status_tracks_row_and_form() {
        let (mut app, mut rx) = app_with(3, 0);
        app.update(Action::Reload);
        pump(&mut app, &mut rx).await;

        app.update(Action::AdvanceOrderStatus);
        assert!(app.status_form.is_submitting());
        assert!(app.operations.is_loading("order:ord-0001"));

        // a second press while submitting is ignored
        app.update(Action::AdvanceOrderStatus);

        pump(&mut app, &mut rx).await;
        assert!(app.status_form.is_success());
        assert!(app.operations.is_success("order:ord-0001"));
        assert_eq!(app.orders.rows[0].status, OrderStatus::Confirmed);
    }

    #[tokio::test(start_paused = true)]
    async fn success_expires_after_ttl() {
        let (mut app, mut rx) = app_with(3, 0);
        app.update(Action::Reload);
        pump(&mut app, &mut rx).await;

        app.update(Action::AdvanceOrderStatus);
        pump(&mut app, &mut rx).await;
        assert!(app.status_form.is_success());

        pump(&mut app, &mut rx).await;
        assert!(!app.status_form.is_success());
        assert_eq!(app.operations.get("order:ord-0001"), &Default::default());
    }

    #[tokio::test]
    async fn failed_update_records_error() {
        let (mut app, mut rx) = app_with(7, 0);
        app.update(Action::Reload);
        pump(&mut app, &mut rx).await;

        app.update(Action::OrderStatusFailed {
            order_id: "ord-0002".to_string(),
            message: "Invalid status".to_string(),
        });
        assert_eq!(app.operations.error("order:ord-0002"), Some("Invalid status"));
        assert_eq!(app.status_form.error(), Some("Invalid status"));
    }

    #[tokio::test]
    async fn completed_order_cannot_advance() {
        let (mut app, mut rx) = app_with(7, 0);
        app.update(Action::Reload);
        pump(&mut app, &mut rx).await;
        // ord-0002 is generated as completed
        app.orders.selected = 1;
        assert_eq!(app.orders.rows[1].status, OrderStatus::Completed);

        app.update(Action::AdvanceOrderStatus);
        assert!(!app.status_form.is_submitting());
        assert!(app.error.as_deref().unwrap().contains("already completed"));
    }

    #[tokio::test]
    async fn stale_page_response_does_not_override_newer() {
        let (mut app, mut rx) = app_with(137, 0);
        app.update(Action::Reload);
        pump(&mut app, &mut rx).await;

        app.update(Action::NextPage);
        app.update(Action::NextPage);
        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        // deliver the newest result first, then the superseded one
        let id_of = |action: &Action| match action {
            Action::OrdersLoaded(_, id) => *id,
            _ => 0,
        };
        let (older, newer) = if id_of(&first) < id_of(&second) {
            (first, second)
        } else {
            (second, first)
        };
        app.update(newer);
        app.update(older);

        assert_eq!(app.orders.pagination.page(), 3);
        assert_eq!(app.orders.rows[0].id, "ord-0021");
    }
}
