//! Logistics: waybills through contracted couriers.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

/// Identifies an existing waybill.
#[derive(Debug, Clone, Serialize)]
pub struct WaybillRef {
    pub order_id: String,
    pub openid: String,
    pub delivery_id: String,
    pub waybill_id: String,
}

/// The `Express` component.
#[derive(Debug, Clone)]
pub struct ExpressApi {
    base: BaseClient,
}

impl ExpressApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// Couriers supported by the platform.
    ///
    /// GET /cgi-bin/express/business/delivery/getall
    pub async fn list_providers(&self) -> Result<ApiResponse, WechatError> {
        self.base
            .http_get("/cgi-bin/express/business/delivery/getall", &[])
            .await
    }

    /// Courier accounts bound to this app.
    pub async fn get_all_accounts(&self) -> Result<ApiResponse, WechatError> {
        self.base
            .http_get("/cgi-bin/express/business/account/getall", &[])
            .await
    }

    /// `order` is passed through as-is; see the addOrder reference for its
    /// shape.
    pub async fn create_waybill(&self, order: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/express/business/order/add", order)
            .await
    }

    pub async fn get_waybill(&self, waybill: &WaybillRef) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/express/business/order/get", waybill)
            .await
    }

    pub async fn delete_waybill(&self, waybill: &WaybillRef) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/express/business/order/cancel", waybill)
            .await
    }

    pub async fn get_path(&self, waybill: &WaybillRef) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/express/business/path/get", waybill)
            .await
    }

    pub async fn get_printer(&self) -> Result<ApiResponse, WechatError> {
        self.base
            .http_get("/cgi-bin/express/business/printer/getall", &[])
            .await
    }

    /// `update_type` is `bind` or `unbind`.
    pub async fn update_printer(&self, open_id: &str, update_type: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/express/business/printer/update",
                &json!({"openid": open_id, "update_type": update_type}),
            )
            .await
    }

    pub async fn get_balance(&self, delivery_id: &str, biz_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/express/business/quota/get",
                &json!({"delivery_id": delivery_id, "biz_id": biz_id}),
            )
            .await
    }
}

impl Component for ExpressApi {
    fn name(&self) -> &'static str {
        "Express"
    }
}
