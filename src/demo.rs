use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::backend::Backend;
use crate::error::{AppError, Result};
use crate::pagination::{total_pages, MAX_PAGE_SIZE};
use crate::types::{Order, OrderStatus, OrderType, Page, PageMeta, PageQuery, Product};

const ORDERS_PER_PAGE: usize = 20;
const PRODUCTS_PER_PAGE: usize = 50;

/// In-memory backend with generated orders and products.
#[derive(Debug)]
pub struct DemoBackend {
    orders: Mutex<Vec<Order>>,
    products: Vec<Product>,
    latency: Duration,
}

impl DemoBackend {
    pub fn new(order_count: usize, product_count: usize, latency: Duration) -> Self {
        Self {
            orders: Mutex::new((0..order_count).map(demo_order).collect()),
            products: (0..product_count).map(demo_product).collect(),
            latency,
        }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for DemoBackend {
    fn default() -> Self {
        Self::new(137, 48, Duration::from_millis(250))
    }
}

const STATUSES: [OrderStatus; 7] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Preparing,
    OrderStatus::Ready,
    OrderStatus::Served,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
];

const CUSTOMERS: [&str; 5] = ["Ana", "Budi", "Chen", "Dewi", "Eko"];

const MENU: [(&str, f64); 8] = [
    ("Nasi Goreng", 6.5),
    ("Mie Ayam", 5.0),
    ("Sate Ayam", 7.25),
    ("Gado-gado", 4.75),
    ("Es Teh", 1.5),
    ("Kopi Susu", 2.5),
    ("Rendang", 9.0),
    ("Soto Betawi", 6.0),
];

fn demo_order(i: usize) -> Order {
    let order_type = match i % 3 {
        0 => OrderType::DineIn,
        1 => OrderType::Takeout,
        _ => OrderType::Delivery,
    };
    Order {
        id: format!("ord-{:04}", i + 1),
        order_number: format!("ORD-{:05}", 10_000 + i),
        customer_name: (order_type != OrderType::DineIn)
            .then(|| CUSTOMERS[i % CUSTOMERS.len()].to_string()),
        order_type,
        status: STATUSES[(i * 5) % STATUSES.len()],
        total_amount: 5.0 + ((i * 37) % 400) as f64 / 10.0,
        created_at: DateTime::<Utc>::from_timestamp(1_714_557_600 + i as i64 * 420, 0)
            .unwrap_or_default(),
    }
}

fn demo_product(i: usize) -> Product {
    let (name, price) = MENU[i % MENU.len()];
    let name = if i < MENU.len() {
        name.to_string()
    } else {
        format!("{} #{}", name, i / MENU.len() + 1)
    };
    Product {
        id: format!("prd-{:03}", i + 1),
        name,
        sku: format!("SKU-{:04}", i + 1),
        price: price + (i / MENU.len()) as f64 * 0.5,
        stock_number: ((i * 13) % 60) as i64,
    }
}

/// Slice one page out of `items` the way the POS server does: page numbers
/// below 1 read as 1, per-page sizes outside `1..=100` fall back to the
/// endpoint's default.
fn paginate<T: Clone>(items: &[T], query: PageQuery, default_per_page: usize) -> Page<T> {
    let page = query.page.max(1);
    let per_page = if (1..=MAX_PAGE_SIZE).contains(&query.per_page) {
        query.per_page
    } else {
        default_per_page
    };
    let start = (page - 1).saturating_mul(per_page).min(items.len());
    let end = start.saturating_add(per_page).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        meta: PageMeta {
            current_page: page,
            per_page,
            total: items.len(),
            total_pages: if items.is_empty() {
                0
            } else {
                total_pages(items.len(), per_page)
            },
        },
    }
}

#[async_trait]
impl Backend for DemoBackend {
    fn name(&self) -> &str {
        "demo"
    }

    async fn list_orders(
        &self,
        query: PageQuery,
        status: Option<OrderStatus>,
    ) -> Result<Page<Order>> {
        self.simulate_latency().await;
        let orders = self
            .orders
            .lock()
            .map_err(|_| AppError::Api("demo order store poisoned".to_string()))?;
        let matching: Vec<Order> = orders
            .iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        debug!(page = query.page, matching = matching.len(), "demo list_orders");
        Ok(paginate(&matching, query, ORDERS_PER_PAGE))
    }

    async fn list_products(
        &self,
        query: PageQuery,
        search: Option<&str>,
    ) -> Result<Page<Product>> {
        self.simulate_latency().await;
        let Some(needle) = search.map(str::to_lowercase).filter(|s| !s.is_empty()) else {
            return Ok(paginate(&self.products, query, PRODUCTS_PER_PAGE));
        };
        let matching: Vec<Product> = self
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        debug!(page = query.page, search = %needle, matching = matching.len(), "demo list_products");
        Ok(paginate(&matching, query, PRODUCTS_PER_PAGE))
    }

    async fn update_order_status(&self, id: &str, status: OrderStatus) -> Result<Order> {
        self.simulate_latency().await;
        let mut orders = self
            .orders
            .lock()
            .map_err(|_| AppError::Api("demo order store poisoned".to_string()))?;
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| AppError::Api(format!("Order not found: {}", id)))?;
        if order.status.next() != Some(status) {
            return Err(AppError::Api(format!(
                "Invalid status transition: {} -> {}",
                order.status, status
            )));
        }
        order.status = status;
        Ok(order.clone())
    }
}
