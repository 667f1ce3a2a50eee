//! Store operations.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{with_error_handling, ApiError};
use crate::http::{HttpMethod, HttpRequest};
use crate::path::{render, PathParams};
use crate::request::{with_json_body, RequestOptions};
use crate::transport::Transport;
use crate::types::Order;

const INVENTORY: &str = "/store/inventory";
const ORDER: &str = "/store/order";
const ORDER_BY_ID: &str = "/store/order/{orderId}";

/// Client for the `/store` resource.
#[derive(Debug, Clone)]
pub struct StoreApi {
    transport: Arc<Transport>,
}

impl StoreApi {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub fn build_get_inventory(&self, options: Option<&RequestOptions>) -> HttpRequest {
        self.transport
            .request(HttpMethod::Get, INVENTORY.to_string(), None, options)
    }

    pub fn build_place_order(&self, order: &Order, options: Option<&RequestOptions>) -> Result<HttpRequest, ApiError> {
        let request = self.transport.request(HttpMethod::Post, ORDER.to_string(), None, options);
        with_json_body(request, order)
    }

    pub fn build_get_order_by_id(&self, order_id: i64, options: Option<&RequestOptions>) -> Result<HttpRequest, ApiError> {
        let path = render(ORDER_BY_ID, &PathParams::new().with("orderId", order_id))?;
        Ok(self.transport.request(HttpMethod::Get, path, None, options))
    }

    pub fn build_delete_order(&self, order_id: i64, options: Option<&RequestOptions>) -> Result<HttpRequest, ApiError> {
        let path = render(ORDER_BY_ID, &PathParams::new().with("orderId", order_id))?;
        Ok(self.transport.request(HttpMethod::Delete, path, None, options))
    }

    /// GET /store/inventory: quantities keyed by status.
    pub async fn get_inventory(&self, options: Option<&RequestOptions>) -> Result<HashMap<String, i64>, ApiError> {
        let request = self.build_get_inventory(options);
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// POST /store/order
    pub async fn place_order(&self, order: &Order, options: Option<&RequestOptions>) -> Result<Order, ApiError> {
        let request = self.build_place_order(order, options)?;
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// GET /store/order/{orderId}
    pub async fn get_order_by_id(&self, order_id: i64, options: Option<&RequestOptions>) -> Result<Order, ApiError> {
        let request = self.build_get_order_by_id(order_id, options)?;
        with_error_handling(self.transport.send_json(request), None).await
    }

    /// DELETE /store/order/{orderId}
    pub async fn delete_order(&self, order_id: i64, options: Option<&RequestOptions>) -> Result<Value, ApiError> {
        let request = self.build_delete_order(order_id, options)?;
        with_error_handling(self.transport.send_json(request), None).await
    }
}
