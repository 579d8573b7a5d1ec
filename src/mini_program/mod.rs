//! Mini Program application.
//!
//! Same assembly as [`crate::work::Work`]: the [`UserConfig`] is mapped and
//! merged over the Mini Program defaults, then `Config`, `AccessToken` and
//! the API components are registered in order. `corp_id` carries the app id.
//!
//! ```rust,no_run
//! use wechat_sdk::config::UserConfig;
//! use wechat_sdk::mini_program::MiniProgram;
//!
//! # async fn run() -> Result<(), wechat_sdk::WechatError> {
//! let app = MiniProgram::new(&UserConfig {
//!     corp_id: "wx1234567890abcdef".into(),
//!     secret: "secret".into(),
//!     ..Default::default()
//! })?;
//!
//! let session = app.auth.session("js_code").await?;
//! println!("{}", session.openid);
//! # Ok(())
//! # }
//! ```

pub mod active_message;
pub mod auth;
pub mod base;
pub mod data_cube;
pub mod delivery;
pub mod express;
pub mod image;
pub mod internet;
pub mod nearby_poi;
pub mod ocr;
pub mod plugin;
pub mod security;
pub mod uniform_message;
pub mod url_link;
pub mod url_scheme;
pub mod wxa_code;

use std::sync::Arc;

use serde_json::json;

use crate::config::{map_user_config, ConfigTree, UserConfig};
use crate::error::WechatError;
use crate::kernel::{Application, ApplicationBuilder, ComponentHandle, Config, ServiceContainer};
use crate::token::{TokenEndpoint, TokenManager};

pub use active_message::ActiveMessageApi;
pub use auth::AuthApi;
pub use base::BaseApi;
pub use data_cube::DataCubeApi;
pub use delivery::DeliveryApi;
pub use express::ExpressApi;
pub use image::ImageApi;
pub use internet::InternetApi;
pub use nearby_poi::NearbyPoiApi;
pub use ocr::OcrApi;
pub use plugin::PluginApi;
pub use security::SecurityApi;
pub use uniform_message::UniformMessageApi;
pub use url_link::UrlLinkApi;
pub use url_scheme::UrlSchemeApi;
pub use wxa_code::WxaCodeApi;

pub const DEFAULT_BASE_URI: &str = "https://api.weixin.qq.com/";

/// A fully wired Mini Program application.
pub struct MiniProgram {
    app: Application,

    pub config: Arc<Config>,
    pub access_token: Arc<TokenManager>,
    pub auth: Arc<AuthApi>,
    pub base: Arc<BaseApi>,
    pub data_cube: Arc<DataCubeApi>,
    pub active_message: Arc<ActiveMessageApi>,
    pub uniform_message: Arc<UniformMessageApi>,
    pub image: Arc<ImageApi>,
    pub internet: Arc<InternetApi>,
    pub express: Arc<ExpressApi>,
    pub delivery: Arc<DeliveryApi>,
    pub ocr: Arc<OcrApi>,
    pub plugin: Arc<PluginApi>,
    pub nearby_poi: Arc<NearbyPoiApi>,
    pub wxa_code: Arc<WxaCodeApi>,
    pub url_scheme: Arc<UrlSchemeApi>,
    pub url_link: Arc<UrlLinkApi>,
    pub security: Arc<SecurityApi>,
}

impl std::fmt::Debug for MiniProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniProgram")
            .field("app", &self.app)
            .finish_non_exhaustive()
    }
}

impl MiniProgram {
    /// # Errors
    /// `WechatError::Config` when the app id (`corp_id`) or `secret` is
    /// empty, or the base URI is malformed.
    pub fn new(user_config: &UserConfig) -> Result<Self, WechatError> {
        Self::with_config(map_user_config(user_config))
    }

    pub fn with_config(user_config: ConfigTree) -> Result<Self, WechatError> {
        let mut app = ApplicationBuilder::new(user_config, Self::default_config())?;

        let config = app.register(Config::new)?;
        let access_token =
            app.register_shared(|c| TokenManager::register(c, TokenEndpoint::MiniProgram))?;
        let auth = app.register(AuthApi::new)?;
        let base = app.register(BaseApi::new)?;
        let data_cube = app.register(DataCubeApi::new)?;
        let active_message = app.register(ActiveMessageApi::new)?;
        let uniform_message = app.register(UniformMessageApi::new)?;
        let image = app.register(ImageApi::new)?;
        let internet = app.register(InternetApi::new)?;
        let express = app.register(ExpressApi::new)?;
        let delivery = app.register(DeliveryApi::new)?;
        let ocr = app.register(OcrApi::new)?;
        let plugin = app.register(PluginApi::new)?;
        let nearby_poi = app.register(NearbyPoiApi::new)?;
        let wxa_code = app.register(WxaCodeApi::new)?;
        let url_scheme = app.register(UrlSchemeApi::new)?;
        let url_link = app.register(UrlLinkApi::new)?;
        let security = app.register(SecurityApi::new)?;

        let app = app.build();
        log::debug!(
            "[WeChat] mini program application ready with {} components",
            app.component_names().len()
        );

        Ok(Self {
            app,
            config,
            access_token,
            auth,
            base,
            data_cube,
            active_message,
            uniform_message,
            image,
            internet,
            express,
            delivery,
            ocr,
            plugin,
            nearby_poi,
            wxa_code,
            url_scheme,
            url_link,
            security,
        })
    }

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

    pub fn get_component(&self, name: &str) -> Option<ComponentHandle> {
        self.app.get_component(name)
    }

    pub fn component_names(&self) -> &[&'static str] {
        self.app.component_names()
    }

    pub fn application(&self) -> &Application {
        &self.app
    }
}
