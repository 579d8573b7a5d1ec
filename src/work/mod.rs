//! WeCom (WeChat Work) application.
//!
//! [`Work::new`] maps the [`UserConfig`] onto the configuration tree, merges
//! it over the WeCom defaults and registers every component in dependency
//! order: `Config`, then `AccessToken`, then everything that signs requests.
//! Components are reachable through the typed fields or by name through
//! [`Work::get_component`].
//!
//! ```rust,no_run
//! use wechat_sdk::config::UserConfig;
//! use wechat_sdk::work::Work;
//!
//! # async fn run() -> Result<(), wechat_sdk::WechatError> {
//! let work = Work::new(&UserConfig {
//!     corp_id: "ww1234567890".into(),
//!     agent_id: 1000002,
//!     secret: "secret".into(),
//!     ..Default::default()
//! })?;
//!
//! let departments = work.department.list(None).await?;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod base;
pub mod corp_group;
pub mod department;
pub mod external_contact;
pub mod group_robot;
pub mod invoice;
pub mod media;
pub mod menu;
pub mod message;
pub mod msg_audit;
pub mod oa;
pub mod oauth;
pub mod server;
pub mod user;

use std::sync::Arc;

use serde_json::json;

use crate::config::{map_user_config, ConfigTree, UserConfig};
use crate::error::WechatError;
use crate::kernel::{Application, ApplicationBuilder, ComponentHandle, Config, ServiceContainer};
use crate::token::{TokenEndpoint, TokenManager};

pub use agent::{AgentApi, AgentWorkbenchApi};
pub use base::BaseApi;
pub use corp_group::CorpGroupApi;
pub use department::DepartmentApi;
pub use external_contact::{
    ContactWayApi, ExternalContactApi, ExternalContactMessageApi, MessageTemplateApi, MomentApi,
    SchoolApi, StatisticsApi,
};
pub use group_robot::{GroupRobotApi, GroupRobotMessenger};
pub use invoice::InvoiceApi;
pub use media::MediaApi;
pub use menu::MenuApi;
pub use message::{MessageApi, Messager};
pub use msg_audit::MsgAuditApi;
pub use oa::OaApi;
pub use oauth::OAuthApi;
pub use server::{Encryptor, ServerGuard};
pub use user::{UserApi, UserBatchJobsApi, UserLinkedCorpApi, UserTagApi};

pub const DEFAULT_BASE_URI: &str = "https://qyapi.weixin.qq.com/";

/// A fully wired WeCom application.
pub struct Work {
    app: Application,

    pub config: Arc<Config>,
    pub access_token: Arc<TokenManager>,
    pub base: Arc<BaseApi>,
    pub oauth: Arc<OAuthApi>,

    pub agent: Arc<AgentApi>,
    pub agent_workbench: Arc<AgentWorkbenchApi>,

    pub department: Arc<DepartmentApi>,

    pub message: Arc<MessageApi>,
    pub messager: Arc<Messager>,

    pub encryptor: Arc<Encryptor>,
    pub server: Arc<ServerGuard>,

    pub user: Arc<UserApi>,
    pub user_batch_jobs: Arc<UserBatchJobsApi>,
    pub user_linked_corp: Arc<UserLinkedCorpApi>,
    pub user_tag: Arc<UserTagApi>,

    pub external_contact: Arc<ExternalContactApi>,
    pub external_contact_contact_way: Arc<ContactWayApi>,
    pub external_contact_statistics: Arc<StatisticsApi>,
    pub external_contact_message: Arc<ExternalContactMessageApi>,
    pub external_contact_school: Arc<SchoolApi>,
    pub external_contact_moment: Arc<MomentApi>,
    pub external_contact_message_template: Arc<MessageTemplateApi>,

    pub media: Arc<MediaApi>,
    pub menu: Arc<MenuApi>,
    pub oa: Arc<OaApi>,
    pub msg_audit: Arc<MsgAuditApi>,
    pub corp_group: Arc<CorpGroupApi>,
    pub invoice: Arc<InvoiceApi>,

    pub group_robot: Arc<GroupRobotApi>,
    pub group_robot_messenger: Arc<GroupRobotMessenger>,
}

impl std::fmt::Debug for Work {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Work").field("app", &self.app).finish_non_exhaustive()
    }
}

impl Work {
    /// Build the application. Either every component is constructed or an
    /// error is returned.
    ///
    /// # Errors
    /// `WechatError::Config` when `corp_id` or `secret` is empty, the base
    /// URI is malformed, or the OAuth callback cannot be resolved. A
    /// malformed `aes_key` only disables the callback components.
    pub fn new(user_config: &UserConfig) -> Result<Self, WechatError> {
        Self::with_config(map_user_config(user_config))
    }

    /// Build from an already mapped configuration tree.
    pub fn with_config(user_config: ConfigTree) -> Result<Self, WechatError> {
        let mut app = ApplicationBuilder::new(user_config, Self::default_config())?;

        let config = app.register(Config::new)?;
        let access_token =
            app.register_shared(|c| TokenManager::register(c, TokenEndpoint::Work))?;
        let base = app.register(BaseApi::new)?;
        let oauth = app.register(OAuthApi::new)?;

        let agent = app.register(AgentApi::new)?;
        let agent_workbench = app.register(AgentWorkbenchApi::new)?;

        let department = app.register(DepartmentApi::new)?;

        let message = app.register(MessageApi::new)?;
        let messager = app.register(|c| Ok(Messager::new(Arc::clone(&message), c)))?;

        let encryptor = app.register(Encryptor::new)?;
        let server = app.register(|_| Ok(ServerGuard::new(Arc::clone(&encryptor))))?;

        let user = app.register(UserApi::new)?;
        let user_batch_jobs = app.register(UserBatchJobsApi::new)?;
        let user_linked_corp = app.register(UserLinkedCorpApi::new)?;
        let user_tag = app.register(UserTagApi::new)?;

        let external_contact = app.register(ExternalContactApi::new)?;
        let external_contact_contact_way = app.register(ContactWayApi::new)?;
        let external_contact_statistics = app.register(StatisticsApi::new)?;
        let external_contact_message = app.register(ExternalContactMessageApi::new)?;
        let external_contact_school = app.register(SchoolApi::new)?;
        let external_contact_moment = app.register(MomentApi::new)?;
        let external_contact_message_template = app.register(MessageTemplateApi::new)?;

        let media = app.register(MediaApi::new)?;
        let menu = app.register(MenuApi::new)?;
        let oa = app.register(OaApi::new)?;
        let msg_audit = app.register(MsgAuditApi::new)?;
        let corp_group = app.register(CorpGroupApi::new)?;
        let invoice = app.register(InvoiceApi::new)?;

        let group_robot = app.register(GroupRobotApi::new)?;
        let group_robot_messenger =
            app.register(|_| Ok(GroupRobotMessenger::new(Arc::clone(&group_robot))))?;

        let app = app.build();
        log::debug!(
            "[WeChat] work application ready with {} components",
            app.component_names().len()
        );

        Ok(Self {
            app,
            config,
            access_token,
            base,
            oauth,
            agent,
            agent_workbench,
            department,
            message,
            messager,
            encryptor,
            server,
            user,
            user_batch_jobs,
            user_linked_corp,
            user_tag,
            external_contact,
            external_contact_contact_way,
            external_contact_statistics,
            external_contact_message,
            external_contact_school,
            external_contact_moment,
            external_contact_message_template,
            media,
            menu,
            oa,
            msg_audit,
            corp_group,
            invoice,
            group_robot,
            group_robot_messenger,
        })
    }

    /// `http.base_uri` pointing at the WeCom API host.
    pub fn default_config() -> ConfigTree {
        [("http.base_uri", json!(DEFAULT_BASE_URI))]
            .into_iter()
            .collect()
    }

    pub fn get_container(&self) -> &Arc<ServiceContainer> {
        self.app.container()
    }

    pub fn get_access_token(&self) -> Arc<TokenManager> {
        Arc::clone(&self.access_token)
    }

    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Component by registered name, `None` for unknown names.
    pub fn get_component(&self, name: &str) -> Option<ComponentHandle> {
        self.app.get_component(name)
    }

    /// Registered names, in registration order.
    pub fn component_names(&self) -> &[&'static str] {
        self.app.component_names()
    }

    pub fn application(&self) -> &Application {
        &self.app
    }
}
