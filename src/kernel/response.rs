//! Common API response primitives
//!
//! Most WeChat APIs return JSON with `errcode` / `errmsg` next to
//! endpoint-specific fields. Endpoints without a dedicated result type
//! decode into [`ApiResponse`], which keeps the remaining fields in `extra`.
//!
//! ```rust
//! use wechat_sdk::kernel::ApiResponse;
//!
//! let json = r#"{"errcode": 0, "errmsg": "ok", "jobid": "job_1"}"#;
//! let resp: ApiResponse = serde_json::from_str(json).unwrap();
//! assert!(resp.is_success());
//! assert_eq!(resp.get_str("jobid"), Some("job_1"));
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiResponse {
    /// Error code (0 means success)
    #[serde(default)]
    pub errcode: i32,
    /// Error message
    #[serde(default)]
    pub errmsg: String,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.errcode == 0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}
