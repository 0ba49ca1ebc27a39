use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Order, OrderStatus, Page, PageQuery, Product};

/// Source of the lists the client pages through.
#[async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn list_orders(
        &self,
        query: PageQuery,
        status: Option<OrderStatus>,
    ) -> Result<Page<Order>>;
    /// `search` matches product names, case-insensitively.
    async fn list_products(
        &self,
        query: PageQuery,
        search: Option<&str>,
    ) -> Result<Page<Product>>;
    async fn update_order_status(&self, id: &str, status: OrderStatus) -> Result<Order>;
}
