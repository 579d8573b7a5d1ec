//! Same-city delivery.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryOrderRef {
    pub shopid: String,
    pub shop_order_id: String,
    pub shop_no: String,
    pub delivery_sign: String,
}

/// The `Delivery` component.
#[derive(Debug, Clone)]
pub struct DeliveryApi {
    base: BaseClient,
}

impl DeliveryApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /cgi-bin/express/local/business/delivery/getall
    pub async fn get_all_immediate_delivery(&self) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/express/local/business/delivery/getall", &json!({}))
            .await
    }

    pub async fn get_bind_account(&self) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/express/local/business/shop/get", &json!({}))
            .await
    }

    /// Quote an order before placing it.
    pub async fn pre_add_order(&self, order: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/express/local/business/order/pre_add", order)
            .await
    }

    pub async fn add_order(&self, order: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/express/local/business/order/add", order)
            .await
    }

    pub async fn re_order(&self, order: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/express/local/business/order/readd", order)
            .await
    }

    pub async fn get_order(&self, order: &DeliveryOrderRef) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/express/local/business/order/get", order)
            .await
    }

    pub async fn cancel_order(
        &self,
        order: &DeliveryOrderRef,
        delivery_id: &str,
        reason_id: i64,
        reason: &str,
    ) -> Result<ApiResponse, WechatError> {
        let mut body = serde_json::to_value(order)?;
        if let Some(fields) = body.as_object_mut() {
            fields.insert("delivery_id".into(), json!(delivery_id));
            fields.insert("cancel_reason_id".into(), json!(reason_id));
            fields.insert("cancel_reason".into(), json!(reason));
        }
        self.base
            .http_post_json("/cgi-bin/express/local/business/order/cancel", &body)
            .await
    }

    pub async fn add_tip(&self, tip: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/express/local/business/order/addtips", tip)
            .await
    }
}

impl Component for DeliveryApi {
    fn name(&self) -> &'static str {
        "Delivery"
    }
}
