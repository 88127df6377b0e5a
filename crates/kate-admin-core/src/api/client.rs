//! Typed accessors for the admin service.
//!
//! Each accessor fixes the method, path and body shape for one endpoint and
//! hands the request to the `Gateway`. They hold no state of their own and do
//! no error handling beyond what the gateway provides.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::auth::{CredentialStore, Session};
use crate::config::Config;
use crate::models::{
    DashboardStats, MutationAck, Notification, NotificationCreate, Order, OrderStatus, Product,
    ProductCreate, ProductUpdate, User, UserDetail, UserUpdate,
};

use super::{ApiError, Gateway, OutboundRequest};

/// Prefix of the locally synthesized admin token
const TOKEN_PREFIX: &str = "admin_";

/// Endpoint used to confirm a freshly synthesized token
const VERIFY_PATH: &str = "/dashboard/stats";

/// Admin service client.
/// Clone is cheap - it only wraps the shared `Gateway`.
#[derive(Clone)]
pub struct AdminClient {
    gateway: Gateway,
}

impl AdminClient {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn from_config(config: &Config, store: CredentialStore) -> Result<Self, ApiError> {
        Ok(Self::new(Gateway::from_config(config, store)?))
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn session(&self) -> Session {
        self.gateway.store().get()
    }

    // ===== Authentication =====

    /// Log in as the admin with the given identifier.
    ///
    /// The token is synthesized locally as `admin_<identifier>` and stored
    /// without contacting the service; the service checks it on the first
    /// authenticated call. The identifier is used as given, only an all
    /// whitespace one is refused, as is one that cannot travel in a header.
    /// Use [`AdminClient::login_verified`] when the caller needs to know the
    /// token is accepted before relying on it.
    pub fn login(&self, identifier: &str) -> Result<String, ApiError> {
        if identifier.trim().is_empty() {
            return Err(ApiError::InvalidCredentials("admin id is required".into()));
        }

        let token = format!("{}{}", TOKEN_PREFIX, identifier);
        Gateway::bearer_value(&token)?;
        self.gateway.store().set(&token);
        info!("Admin session stored");
        Ok(token)
    }

    /// Log in and confirm the token with an authenticated probe.
    ///
    /// A rejected token goes through the normal `403` path: the session is
    /// cleared, a session event is emitted and `Forbidden` is returned.
    pub async fn login_verified(&self, identifier: &str) -> Result<String, ApiError> {
        let token = self.login(identifier)?;
        self.gateway.send(OutboundRequest::get(VERIFY_PATH)).await?;
        info!("Admin token accepted by service");
        Ok(token)
    }

    pub fn logout(&self) {
        self.gateway.store().clear();
        info!("Admin session cleared");
    }

    // ===== Helpers =====

    async fn call<T: DeserializeOwned>(&self, request: OutboundRequest) -> Result<T, ApiError> {
        let path = request.path.clone();
        let body = self.gateway.send(request).await?;
        serde_json::from_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    /// Call and unwrap a `{"<field>": ...}` envelope
    async fn call_field<T: DeserializeOwned>(
        &self,
        request: OutboundRequest,
        field: &str,
    ) -> Result<T, ApiError> {
        let path = request.path.clone();
        let body = self.gateway.send(request).await?;
        Self::take_field(body, field, &path)
    }

    fn take_field<T: DeserializeOwned>(mut body: Value, field: &str, path: &str) -> Result<T, ApiError> {
        let value = body
            .get_mut(field)
            .map(Value::take)
            .ok_or_else(|| ApiError::InvalidResponse(format!("{}: missing `{}` field", path, field)))?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    fn to_body<B: Serialize>(data: &B) -> Result<Value, ApiError> {
        serde_json::to_value(data).map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }

    // ===== Public =====

    /// Active products for the storefront. No token is sent and a failure
    /// never affects the session.
    pub async fn list_public_products(&self) -> Result<Vec<Product>, ApiError> {
        let body = self.gateway.send_public(OutboundRequest::get("/products")).await?;
        match body.get("products") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(products) => serde_json::from_value(products.clone())
                .map_err(|e| ApiError::PublicFetch(format!("unexpected product list: {}", e))),
        }
    }

    // ===== Dashboard =====

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.call(OutboundRequest::get("/dashboard/stats")).await
    }

    // ===== Users =====

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.call_field(OutboundRequest::get("/users"), "users").await
    }

    pub async fn get_user(&self, user_id: i64) -> Result<UserDetail, ApiError> {
        self.call(OutboundRequest::get(format!("/users/{}", user_id))).await
    }

    pub async fn update_user(&self, user_id: i64, update: &UserUpdate) -> Result<MutationAck, ApiError> {
        let body = Self::to_body(update)?;
        self.call(OutboundRequest::put(format!("/users/{}", user_id), body)).await
    }

    // ===== Products =====

    /// All products including inactive ones
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.call_field(OutboundRequest::get("/admin/products"), "products").await
    }

    pub async fn create_product(&self, product: &ProductCreate) -> Result<MutationAck, ApiError> {
        let body = Self::to_body(product)?;
        self.call(OutboundRequest::post("/products", body)).await
    }

    pub async fn update_product(
        &self,
        product_id: i64,
        update: &ProductUpdate,
    ) -> Result<MutationAck, ApiError> {
        let body = Self::to_body(update)?;
        self.call(OutboundRequest::put(format!("/products/{}", product_id), body)).await
    }

    pub async fn delete_product(&self, product_id: i64) -> Result<MutationAck, ApiError> {
        self.call(OutboundRequest::delete(format!("/products/{}", product_id))).await
    }

    // ===== Orders =====

    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.call_field(OutboundRequest::get("/orders"), "orders").await
    }

    pub async fn update_order_status(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<MutationAck, ApiError> {
        if status == OrderStatus::Unknown {
            return Err(ApiError::InvalidRequest(
                "order status must be pending, confirmed, completed or cancelled".into(),
            ));
        }
        debug!(order_id = order_id, status = %status, "Updating order status");
        let request = OutboundRequest::new(reqwest::Method::PUT, format!("/orders/{}/status", order_id))
            .with_query("status", status.as_str());
        self.call(request).await
    }

    // ===== Notifications =====

    pub async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.call_field(OutboundRequest::get("/notifications"), "notifications").await
    }

    pub async fn create_notification(
        &self,
        notification: &NotificationCreate,
    ) -> Result<MutationAck, ApiError> {
        let body = Self::to_body(notification)?;
        self.call(OutboundRequest::post("/notifications", body)).await
    }
}
