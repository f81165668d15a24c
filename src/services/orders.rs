//! Order persistence and the order-management surface.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::order::{self, OrderStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    services::payments::TransactionResult,
};

#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Durably record a settled checkout, exactly once per call.
    ///
    /// The cart goes in as submitted and the transaction result verbatim.
    /// A write failure here surfaces to the caller unchanged; the settled
    /// charge is NOT reversed.
    #[instrument(skip(self, cart, payment), fields(buyer_id = %buyer_id))]
    pub async fn record_checkout(
        &self,
        buyer_id: Uuid,
        cart: &[Value],
        payment: &TransactionResult,
    ) -> Result<order::Model, ServiceError> {
        let payment_json = serde_json::to_value(payment)
            .map_err(|e| ServiceError::InternalError(format!("payment serialization: {e}")))?;

        let now = Utc::now();
        let model = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            products: Set(Value::Array(cart.to_vec())),
            payment: Set(payment_json),
            buyer_id: Set(buyer_id),
            status: Set(OrderStatus::NotProcessed),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let order = model.insert(&*self.db).await?;

        info!(order_id = %order.id, "order recorded");
        self.event_sender.send(Event::OrderCreated(order.id)).await;

        Ok(order)
    }

    /// Orders belonging to one buyer, newest first.
    pub async fn list_for_buyer(&self, buyer_id: Uuid) -> Result<Vec<order::Model>, ServiceError> {
        let orders = order::Entity::find()
            .filter(order::Column::BuyerId.eq(buyer_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(orders)
    }

    /// All orders, newest first. Admin surface.
    pub async fn list_all(&self) -> Result<Vec<order::Model>, ServiceError> {
        let orders = order::Entity::find()
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(orders)
    }

    pub async fn get(&self, order_id: Uuid) -> Result<order::Model, ServiceError> {
        order::Entity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    /// Mutate an order's status; the only field that changes after creation.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<order::Model, ServiceError> {
        let existing = self.get(order_id).await?;
        let old_status = existing.status;

        let mut update: order::ActiveModel = existing.into();
        update.status = Set(new_status);
        update.updated_at = Set(Utc::now());
        let order = update.update(&*self.db).await?;

        self.event_sender
            .send(Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            })
            .await;

        Ok(order)
    }
}
