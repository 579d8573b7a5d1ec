//! "Nearby" mini program locations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize)]
pub struct NearbyPoi {
    pub is_comm_nearby: String,
    pub kf_info: String,
    pub pic_list: String,
    pub service_infos: String,
    pub store_name: String,
    pub contract_phone: String,
    pub hour: String,
    pub company_name: String,
    pub credential: String,
    pub address: String,
    pub qualification_list: String,
    pub poi_id: String,
    pub map_poi_id: String,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NearbyPoiCreated {
    #[serde(default)]
    pub audit_id: String,
    #[serde(default)]
    pub poi_id: String,
    #[serde(default)]
    pub related_credential: String,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NearbyPoiAdded {
    #[serde(default)]
    pub data: NearbyPoiCreated,
}

/// The `NearbyPoi` component.
#[derive(Debug, Clone)]
pub struct NearbyPoiApi {
    base: BaseClient,
}

impl NearbyPoiApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /wxa/addnearbypoi
    pub async fn add(&self, poi: &NearbyPoi) -> Result<NearbyPoiAdded, WechatError> {
        self.base.http_post_json("/wxa/addnearbypoi", poi).await
    }

    pub async fn delete(&self, poi_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/wxa/delnearbypoi", &json!({"poi_id": poi_id}))
            .await
    }

    /// Pages start at 1; `page_rows` is at most 1000.
    pub async fn list(&self, page: u32, page_rows: u32) -> Result<ApiResponse, WechatError> {
        let page = page.to_string();
        let page_rows = page_rows.to_string();
        self.base
            .http_get(
                "/wxa/getnearbypoilist",
                &[("page", page.as_str()), ("page_rows", page_rows.as_str())],
            )
            .await
    }

    pub async fn set_show_status(&self, poi_id: &str, visible: bool) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/wxa/setnearbypoishowstatus",
                &json!({"poi_id": poi_id, "status": u8::from(visible)}),
            )
            .await
    }
}

impl Component for NearbyPoiApi {
    fn name(&self) -> &'static str {
        "NearbyPoi"
    }
}
