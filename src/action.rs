use crate::error::AppError;
use crate::types::{Order, Page, Product};

/// Which list the user is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListTab {
    #[default]
    Orders,
    Products,
}

impl ListTab {
    /// Operation key of this list's page loads.
    pub fn key(self) -> &'static str {
        match self {
            ListTab::Orders => "orders",
            ListTab::Products => "products",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ListTab::Orders => "Orders",
            ListTab::Products => "Products",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ListTab::Orders => ListTab::Products,
            ListTab::Products => ListTab::Orders,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    SwitchTab,
    ScrollUp,
    ScrollDown,

    // Page navigation
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    GoToPage(i64),
    GrowPageSize,
    ShrinkPageSize,

    // Jump-to-page input
    EnterJumpMode,
    ExitJumpMode,
    JumpInput(char),
    JumpBackspace,
    JumpConfirm,

    // Product search input
    EnterSearchMode,
    ExitSearchMode,
    SearchInput(char),
    SearchBackspace,
    SearchConfirm,

    CycleOrderFilter,
    Reload,

    // Load results, tagged with the load they answer
    OrdersLoaded(Page<Order>, u64),
    ProductsLoaded(Page<Product>, u64),
    LoadFailed {
        tab: ListTab,
        message: String,
        load_id: u64,
    },

    // Status form
    AdvanceOrderStatus,
    OrderStatusUpdated(Order),
    OrderStatusFailed {
        order_id: String,
        message: String,
    },
    SubmitExpired(u64),

    Error(String),
    None,
}

impl Action {
    /// Results and timers reported by background tasks, as opposed to
    /// actions the user triggered.
    pub fn is_background(&self) -> bool {
        matches!(
            self,
            Action::OrdersLoaded(..)
                | Action::ProductsLoaded(..)
                | Action::LoadFailed { .. }
                | Action::OrderStatusUpdated(_)
                | Action::OrderStatusFailed { .. }
                | Action::SubmitExpired(_)
                | Action::Error(_)
                | Action::None
        )
    }
}

impl From<AppError> for Action {
    fn from(err: AppError) -> Self {
        Action::Error(err.to_string())
    }
}
