//! Corp groups: parent corps acting on behalf of their subsidiaries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SharedCorp {
    #[serde(default)]
    pub corpid: String,
    #[serde(default)]
    pub corp_name: String,
    #[serde(default)]
    pub agentid: i64,
}

#[derive(Deserialize)]
struct SharedCorpList {
    #[serde(default)]
    corp_list: Vec<SharedCorp>,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubsidiaryToken {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
}

#[derive(Serialize)]
struct AgentArg {
    agentid: i64,
}

#[derive(Serialize)]
struct CorpAgent<'a> {
    corpid: &'a str,
    agentid: i64,
}

#[derive(Serialize)]
struct TransferSession<'a> {
    userid: &'a str,
    session_key: &'a str,
}

/// The `CorpGroup` component.
#[derive(Debug, Clone)]
pub struct CorpGroupApi {
    base: BaseClient,
}

impl CorpGroupApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// Subsidiaries the agent is shared with.
    ///
    /// POST /cgi-bin/corpgroup/corp/list_app_share_info
    pub async fn list_app_share_info(&self, agent_id: i64) -> Result<Vec<SharedCorp>, WechatError> {
        let response: SharedCorpList = self
            .base
            .http_post_json(
                "/cgi-bin/corpgroup/corp/list_app_share_info",
                &AgentArg { agentid: agent_id },
            )
            .await?;
        Ok(response.corp_list)
    }

    /// Access token for a subsidiary's copy of the agent.
    ///
    /// POST /cgi-bin/corpgroup/corp/gettoken
    pub async fn get_token(&self, corp_id: &str, agent_id: i64) -> Result<SubsidiaryToken, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/corpgroup/corp/gettoken",
                &CorpAgent {
                    corpid: corp_id,
                    agentid: agent_id,
                },
            )
            .await
    }

    /// Subsidiary mini program session from the parent's session.
    ///
    /// POST /cgi-bin/miniprogram/transfer_session
    pub async fn transfer_session(&self, user_id: &str, session_key: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/miniprogram/transfer_session",
                &TransferSession {
                    userid: user_id,
                    session_key,
                },
            )
            .await
    }
}

impl Component for CorpGroupApi {
    fn name(&self) -> &'static str {
        "CorpGroup"
    }
}
