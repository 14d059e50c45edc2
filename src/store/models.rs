//! Catalogue and order models

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// A book in the catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    /// Price in the smallest currency unit
    pub price_cents: u64,
    pub stock: u32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Book {
    pub fn new(draft: NewBook) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: draft.title,
            author: draft.author,
            price_cents: draft.price_cents,
            stock: draft.stock,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the book can currently be ordered
    pub fn is_available(&self) -> bool {
        self.stock > 0
    }

    /// Apply a partial update
    pub fn apply(&mut self, update: BookUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(author) = update.author {
            self.author = author;
        }
        if let Some(price_cents) = update.price_cents {
            self.price_cents = price_cents;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        self.updated_at = chrono::Utc::now();
    }
}

/// Payload for creating a book
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub price_cents: u64,
    #[serde(default)]
    pub stock: u32,
}

impl NewBook {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("Title must not be empty".to_string()));
        }
        if self.author.trim().is_empty() {
            return Err(Error::Validation("Author must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Partial update of a book
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub price_cents: Option<u64>,
    pub stock: Option<u32>,
}

impl BookUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(Error::Validation("Title must not be empty".to_string()));
        }
        if self.author.as_deref().is_some_and(|a| a.trim().is_empty()) {
            return Err(Error::Validation("Author must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Shipped => write!(f, "shipped"),
            OrderStatus::Delivered => write!(f, "delivered"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One line of an order request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub book_id: String,
    pub quantity: u32,
}

/// Order placement payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub items: Vec<OrderItemRequest>,
}

impl NewOrder {
    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(Error::Validation(
                "Order must contain at least one item".to_string(),
            ));
        }
        if self.items.iter().any(|item| item.quantity == 0) {
            return Err(Error::Validation("Quantity must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// A priced order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub book_id: String,
    pub title: String,
    pub quantity: u32,
    pub unit_price_cents: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_cents: u64,
    pub status: OrderStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Status change payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}
