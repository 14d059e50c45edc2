//! In-memory storage for users, books and orders

pub mod models;

pub use models::*;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::{User, UserRole};
use crate::error::{Error, Result};

#[derive(Default)]
struct Tables {
    /// Keyed by username
    users: HashMap<String, User>,
    books: HashMap<String, Book>,
    orders: HashMap<String, Order>,
}

/// Shared store handle; clones see the same data
#[derive(Clone, Default)]
pub struct Store {
    tables: Arc<RwLock<Tables>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // Users

    /// Insert a user, failing if the username is taken
    pub async fn insert_user(&self, user: User) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.username) {
            return Err(Error::UserAlreadyExists(user.username));
        }
        tables.users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    pub async fn find_user_by_username(&self, username: &str) -> Option<User> {
        self.tables.read().await.users.get(username).cloned()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    /// Create the configured administrator if it does not exist yet
    pub async fn ensure_admin(&self, username: &str, password_hash: String) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(username) {
            return Ok(());
        }
        let admin = User::new(username.to_string(), password_hash, UserRole::Admin);
        tables.users.insert(admin.username.clone(), admin);
        tracing::info!("Created administrator account '{}'", username);
        Ok(())
    }

    // Books

    pub async fn create_book(&self, draft: NewBook) -> Result<Book> {
        draft.validate()?;
        let book = Book::new(draft);
        self.tables
            .write()
            .await
            .books
            .insert(book.id.clone(), book.clone());
        Ok(book)
    }

    pub async fn get_book(&self, id: &str) -> Result<Book> {
        self.tables
            .read()
            .await
            .books
            .get(id)
            .cloned()
            .ok_or_else(|| Error::BookNotFound(id.to_string()))
    }

    /// Books with stock left, oldest first
    pub async fn list_available_books(&self) -> Vec<Book> {
        let tables = self.tables.read().await;
        let mut books: Vec<Book> = tables
            .books
            .values()
            .filter(|b| b.is_available())
            .cloned()
            .collect();
        books.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        books
    }

    pub async fn update_book(&self, id: &str, update: BookUpdate) -> Result<Book> {
        update.validate()?;
        let mut tables = self.tables.write().await;
        let book = tables
            .books
            .get_mut(id)
            .ok_or_else(|| Error::BookNotFound(id.to_string()))?;
        book.apply(update);
        Ok(book.clone())
    }

    pub async fn delete_book(&self, id: &str) -> Result<()> {
        self.tables
            .write()
            .await
            .books
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::BookNotFound(id.to_string()))
    }

    // Orders

    /// Place an order for `user_id`, reserving stock for every line.
    ///
    /// Either every line is reserved or nothing changes.
    pub async fn create_order(&self, user_id: &str, request: NewOrder) -> Result<Order> {
        request.validate()?;
        let mut tables = self.tables.write().await;

        // Merge repeated lines for the same book before checking stock
        let mut wanted: Vec<(String, u32)> = Vec::new();
        for item in &request.items {
            match wanted.iter_mut().find(|(id, _)| *id == item.book_id) {
                Some((_, qty)) => *qty = qty.saturating_add(item.quantity),
                None => wanted.push((item.book_id.clone(), item.quantity)),
            }
        }

        let mut items = Vec::with_capacity(wanted.len());
        for (book_id, quantity) in &wanted {
            let book = tables
                .books
                .get(book_id)
                .ok_or_else(|| Error::BookNotFound(book_id.clone()))?;
            if book.stock < *quantity {
                return Err(Error::InsufficientStock(book_id.clone()));
            }
            items.push(OrderItem {
                book_id: book.id.clone(),
                title: book.title.clone(),
                quantity: *quantity,
                unit_price_cents: book.price_cents,
            });
        }

        let total_cents = items
            .iter()
            .try_fold(0u64, |total, i| {
                i.unit_price_cents
                    .checked_mul(u64::from(i.quantity))
                    .and_then(|line| total.checked_add(line))
            })
            .ok_or_else(|| Error::Validation("Order total too large".to_string()))?;

        for (book_id, quantity) in &wanted {
            if let Some(book) = tables.books.get_mut(book_id) {
                book.stock -= quantity;
            }
        }

        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            items,
            total_cents,
            status: OrderStatus::Pending,
            created_at: chrono::Utc::now(),
        };
        tables.orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    /// All orders, or only those of `user_id`, oldest first
    pub async fn list_orders(&self, user_id: Option<&str>) -> Vec<Order> {
        let tables = self.tables.read().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| user_id.is_none_or(|id| o.user_id == id))
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        orders
    }

    /// Change an order's status; cancelling returns its stock
    pub async fn update_order_status(&self, id: &str, status: OrderStatus) -> Result<Order> {
        let mut tables = self.tables.write().await;
        let Tables { books, orders, .. } = &mut *tables;

        let order = orders
            .get_mut(id)
            .ok_or_else(|| Error::OrderNotFound(id.to_string()))?;

        if order.status == OrderStatus::Cancelled && status != OrderStatus::Cancelled {
            return Err(Error::Validation(
                "Cancelled orders cannot be reopened".to_string(),
            ));
        }

        if status == OrderStatus::Cancelled && order.status != OrderStatus::Cancelled {
            for item in &order.items {
                if let Some(book) = books.get_mut(&item.book_id) {
                    book.stock = book.stock.saturating_add(item.quantity);
                }
            }
        }

        order.status = status;
        Ok(order.clone())
    }
}
