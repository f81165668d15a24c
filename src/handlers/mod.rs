//! HTTP handlers, grouped per resource, plus the service aggregate they
//! resolve against.

pub mod auth;
pub mod categories;
pub mod common;
pub mod payments;
pub mod products;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::{
    events::EventSender,
    services::{
        catalog::CatalogService, categories::CategoryService, orders::OrderService,
        payments::{PaymentGateway, PaymentService}, users::UserService,
    },
};

/// Aggregate of the app services used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<UserService>,
    pub catalog: Arc<CatalogService>,
    pub categories: Arc<CategoryService>,
    pub orders: Arc<OrderService>,
    pub payments: Arc<PaymentService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let orders = Arc::new(OrderService::new(db.clone(), event_sender.clone()));

        Self {
            users: Arc::new(UserService::new(db.clone(), event_sender.clone())),
            catalog: Arc::new(CatalogService::new(db.clone())),
            categories: Arc::new(CategoryService::new(db)),
            payments: Arc::new(PaymentService::new(
                gateway,
                orders.clone(),
                event_sender,
            )),
            orders,
        }
    }
}
