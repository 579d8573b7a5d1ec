//! Office automation: check-in records and approvals.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

#[derive(Serialize)]
struct CheckinQuery<'a> {
    opencheckindatatype: u8,
    starttime: i64,
    endtime: i64,
    useridlist: &'a [String],
}

#[derive(Serialize)]
struct TemplateArg<'a> {
    template_id: &'a str,
}

#[derive(Serialize)]
struct SpNoArg<'a> {
    sp_no: &'a str,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApplyEventResponse {
    #[serde(default)]
    pub sp_no: String,
}

/// The `OA` component.
#[derive(Debug, Clone)]
pub struct OaApi {
    base: BaseClient,
}

impl OaApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// `data_type`: 1 commute, 2 outside, 3 all.
    ///
    /// POST /cgi-bin/checkin/getcheckindata
    pub async fn checkin_records(
        &self,
        data_type: u8,
        start_time: i64,
        end_time: i64,
        user_ids: &[String],
    ) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/checkin/getcheckindata",
                &CheckinQuery {
                    opencheckindatatype: data_type,
                    starttime: start_time,
                    endtime: end_time,
                    useridlist: user_ids,
                },
            )
            .await
    }

    /// POST /cgi-bin/oa/gettemplatedetail
    pub async fn approval_template(&self, template_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/oa/gettemplatedetail", &TemplateArg { template_id })
            .await
    }

    /// Submit an approval on a member's behalf.
    ///
    /// POST /cgi-bin/oa/applyevent
    pub async fn create_approval(&self, approval: &Value) -> Result<ApplyEventResponse, WechatError> {
        self.base.http_post_json("/cgi-bin/oa/applyevent", approval).await
    }

    /// POST /cgi-bin/oa/getapprovalinfo
    pub async fn approval_numbers(&self, query: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/oa/getapprovalinfo", query)
            .await
    }

    /// POST /cgi-bin/oa/getapprovaldetail
    pub async fn approval_detail(&self, sp_no: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/oa/getapprovaldetail", &SpNoArg { sp_no })
            .await
    }
}

impl Component for OaApi {
    fn name(&self) -> &'static str {
        "OA"
    }
}
