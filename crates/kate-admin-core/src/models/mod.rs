//! Data models for the admin service resources.
//!
//! - `User`, `UserDetail`, `UserUpdate`: bot users and their profile edits
//! - `Product`, `ProductCreate`, `ProductUpdate`: catalogue entries
//! - `Order`, `OrderStatus`: orders and their lifecycle
//! - `Notification`, `NotificationCreate`: broadcast messages
//! - `DashboardStats`: the dashboard summary
//! - `MutationAck`: the reply to create/update/delete calls

pub mod dashboard;
pub mod notification;
pub mod order;
pub mod product;
pub mod user;

pub use dashboard::DashboardStats;
pub use notification::{Notification, NotificationCreate};
pub use order::{Order, OrderStatus, UnknownOrderStatus};
pub use product::{Product, ProductCreate, ProductUpdate};
pub use user::{User, UserDetail, UserUpdate};

use serde::{Deserialize, Deserializer, Serialize};

/// Reply to a mutating call, e.g. `{"message": "...", "product_id": 3}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct MutationAck {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// SQLite hands booleans back as 0/1; accept either form.
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Null(()),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
        Flag::Null(()) => false,
    })
}
