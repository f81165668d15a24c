//! User accounts: registration, credential checks, profile updates.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::password,
    entities::user::{self, Entity as User, UserRole},
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<user::Model, ServiceError> {
        let email = input.email.trim().to_ascii_lowercase();

        let existing = User::find()
            .filter(user::Column::Email.eq(email.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict("Email is already taken".to_string()));
        }

        let password_hash = password::hash_password(&input.password)?;

        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(UserRole::Customer),
            address: Set(input.address),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(&*self.db).await?;

        info!(user_id = %created.id, "user registered");
        self.event_sender
            .send(Event::UserRegistered(created.id))
            .await;

        Ok(created)
    }

    /// Verify credentials; the same error covers unknown email and bad
    /// password so callers cannot probe which one failed.
    #[instrument(skip(self, raw_password))]
    pub async fn authenticate(
        &self,
        email: &str,
        raw_password: &str,
    ) -> Result<user::Model, ServiceError> {
        let email = email.trim().to_ascii_lowercase();

        let found = User::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await?;

        let user = match found {
            Some(user) => user,
            None => {
                return Err(ServiceError::Unauthorized(
                    "Invalid email or password".to_string(),
                ))
            }
        };

        if !password::verify_password(raw_password, &user.password_hash)? {
            return Err(ServiceError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        Ok(user)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        User::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))
    }

    #[instrument(skip(self, input))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<user::Model, ServiceError> {
        let existing = self.get(user_id).await?;
        let mut update: user::ActiveModel = existing.into();

        if let Some(name) = input.name {
            update.name = Set(name);
        }
        if let Some(new_password) = input.password {
            update.password_hash = Set(password::hash_password(&new_password)?);
        }
        if let Some(address) = input.address {
            update.address = Set(Some(address));
        }
        update.updated_at = Set(Utc::now());

        Ok(update.update(&*self.db).await?)
    }
}
