//! Chat archive administration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgreeQuery {
    pub userid: String,
    pub exteranalopenid: String,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PermitUsers {
    #[serde(default)]
    pub ids: Vec<String>,
}

#[derive(Serialize)]
struct PermitType {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    permit_type: Option<u8>,
}

#[derive(Serialize)]
struct AgreeInfo<'a> {
    info: &'a [AgreeQuery],
}

#[derive(Serialize)]
struct RoomArg<'a> {
    roomid: &'a str,
}

/// The `MsgAudit` component.
#[derive(Debug, Clone)]
pub struct MsgAuditApi {
    base: BaseClient,
}

impl MsgAuditApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// Members with archiving enabled; `permit_type` narrows by licence
    /// (1 office, 2 service, 3 enterprise).
    ///
    /// POST /cgi-bin/msgaudit/get_permit_user_list
    pub async fn get_permit_users(&self, permit_type: Option<u8>) -> Result<PermitUsers, WechatError> {
        self.base
            .http_post_json("/cgi-bin/msgaudit/get_permit_user_list", &PermitType { permit_type })
            .await
    }

    /// POST /cgi-bin/msgaudit/check_single_agree
    pub async fn get_single_agree_status(&self, info: &[AgreeQuery]) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/msgaudit/check_single_agree", &AgreeInfo { info })
            .await
    }

    /// POST /cgi-bin/msgaudit/check_room_agree
    pub async fn get_room_agree_status(&self, room_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/msgaudit/check_room_agree", &RoomArg { roomid: room_id })
            .await
    }

    /// POST /cgi-bin/msgaudit/groupchat/get
    pub async fn get_room(&self, room_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/msgaudit/groupchat/get", &RoomArg { roomid: room_id })
            .await
    }
}

impl Component for MsgAuditApi {
    fn name(&self) -> &'static str {
        "MsgAudit"
    }
}
