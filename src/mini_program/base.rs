use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WechatError;
use crate::kernel::{BaseClient, Component, ServiceContainer};

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaidUnionIdResponse {
    #[serde(default)]
    pub unionid: String,
}

/// The `Base` component.
#[derive(Debug, Clone)]
pub struct BaseApi {
    base: BaseClient,
}

impl BaseApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// UnionID of a user who just paid, by WeChat Pay transaction id.
    ///
    /// GET /wxa/getpaidunionid
    pub async fn get_paid_union_id(
        &self,
        open_id: &str,
        transaction_id: &str,
    ) -> Result<PaidUnionIdResponse, WechatError> {
        self.base
            .http_get(
                "/wxa/getpaidunionid",
                &[("openid", open_id), ("transaction_id", transaction_id)],
            )
            .await
    }

    /// Same lookup by merchant order number.
    ///
    /// GET /wxa/getpaidunionid
    pub async fn get_paid_union_id_by_order(
        &self,
        open_id: &str,
        mch_id: &str,
        out_trade_no: &str,
    ) -> Result<PaidUnionIdResponse, WechatError> {
        self.base
            .http_get(
                "/wxa/getpaidunionid",
                &[
                    ("openid", open_id),
                    ("mch_id", mch_id),
                    ("out_trade_no", out_trade_no),
                ],
            )
            .await
    }
}

impl Component for BaseApi {
    fn name(&self) -> &'static str {
        "Base"
    }
}
