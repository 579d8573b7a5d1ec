//! Configuration tree and user settings
//!
//! Settings supplied by the caller are projected into a [`ConfigTree`], a
//! string-keyed tree of JSON values addressed with dotted keys
//! (`log.level`, `http.base_uri`). The service container merges that tree
//! over the application defaults once, at startup.
//!
//! ```rust
//! use wechat_sdk::config::ConfigTree;
//!
//! let mut tree = ConfigTree::new();
//! tree.insert("http.base_uri", "https://qyapi.weixin.qq.com/");
//! assert_eq!(tree.get_str("http.base_uri"), Some("https://qyapi.weixin.qq.com/"));
//! ```

mod user;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use user::{map_user_config, HttpConfig, LogConfig, OAuthConfig, UserConfig};

/// Dotted-key configuration tree.
///
/// Dotted keys are stored as nested maps, so `log.level` and
/// `{"log": {"level": ..}}` address the same slot and keys stay unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree(Map<String, Value>);

impl ConfigTree {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Insert `value` at a dotted `key`, creating intermediate maps.
    ///
    /// A scalar sitting on the path is replaced by a map.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        let mut segments = key.split('.').peekable();
        let mut node = &mut self.0;

        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                node.insert(segment.to_string(), value.into());
                return;
            }

            let child = node
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            let Value::Object(map) = child else {
                return;
            };
            node = map;
        }
    }

    /// Look up a dotted key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut value = self.0.get(first)?;
        for segment in segments {
            value = value.as_object()?.get(segment)?;
        }
        Some(value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// String sequence at `key`; non-string items are skipped.
    pub fn get_str_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Deep-merge `other` into `self`; values from `other` win.
    pub fn merge(&mut self, other: &ConfigTree) {
        merge_maps(&mut self.0, &other.0);
    }

    /// `user` merged over `defaults`.
    pub fn merged(defaults: &ConfigTree, user: &ConfigTree) -> ConfigTree {
        let mut effective = defaults.clone();
        effective.merge(user);
        effective
    }

    /// Every leaf keyed by its full dotted path, in key order.
    pub fn flatten(&self) -> BTreeMap<String, Value> {
        let mut leaves = BTreeMap::new();
        flatten_into(&self.0, None, &mut leaves);
        leaves
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for ConfigTree {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: AsRef<str>> FromIterator<(K, Value)> for ConfigTree {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut tree = ConfigTree::new();
        for (key, value) in iter {
            tree.insert(key.as_ref(), value);
        }
        tree
    }
}

fn merge_maps(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_maps(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

fn flatten_into(map: &Map<String, Value>, prefix: Option<&str>, out: &mut BTreeMap<String, Value>) {
    for (key, value) in map {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) if !nested.is_empty() => flatten_into(nested, Some(&path), out),
            _ => {
                out.insert(path, value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_dotted_key_nests() {
        let mut tree = ConfigTree::new();
        tree.insert("log.level", "debug");
        tree.insert("log.file", "./wechat.log");

        assert_eq!(tree.get("log"), Some(&json!({"level": "debug", "file": "./wechat.log"})));
        assert_eq!(tree.get_str("log.level"), Some("debug"));
    }

    #[test]
    fn test_insert_replaces_scalar_on_path() {
        let mut tree = ConfigTree::new();
        tree.insert("oauth", "legacy");
        tree.insert("oauth.callback", "https://example.com/cb");
        assert_eq!(tree.get_str("oauth.callback"), Some("https://example.com/cb"));
    }

    #[test]
    fn test_missing_key_is_none() {
        let tree: ConfigTree = [("corp_id", json!("c1"))].into_iter().collect();
        assert!(tree.get("secret").is_none());
        assert!(tree.get("corp_id.nested").is_none());
        assert!(!tree.contains("http.base_uri"));
    }

    #[test]
    fn test_merge_user_wins() {
        let defaults: ConfigTree = [("http.base_uri", json!("A"))].into_iter().collect();
        let user: ConfigTree = [("http.base_uri", json!("B"))].into_iter().collect();

        let effective = ConfigTree::merged(&defaults, &user);
        assert_eq!(effective.get_str("http.base_uri"), Some("B"));
    }

    #[test]
    fn test_merge_is_deep() {
        let defaults: ConfigTree = [
            ("http.base_uri", json!("https://qyapi.weixin.qq.com/")),
            ("http.timeout", json!(30)),
        ]
        .into_iter()
        .collect();
        let user: ConfigTree = [("http.timeout", json!(5)), ("corp_id", json!("c1"))]
            .into_iter()
            .collect();

        let effective = ConfigTree::merged(&defaults, &user);
        assert_eq!(
            effective.get_str("http.base_uri"),
            Some("https://qyapi.weixin.qq.com/")
        );
        assert_eq!(effective.get_i64("http.timeout"), Some(5));
        assert_eq!(effective.get_str("corp_id"), Some("c1"));
    }

    #[test]
    fn test_flatten_uses_dotted_paths() {
        let tree: ConfigTree = [
            ("oauth.scopes", json!(["snsapi_base"])),
            ("debug", json!(false)),
        ]
        .into_iter()
        .collect();

        let flat = tree.flatten();
        let keys: Vec<_> = flat.keys().cloned().collect();
        assert_eq!(keys, vec!["debug".to_string(), "oauth.scopes".to_string()]);
    }

    #[test]
    fn test_str_list() {
        let mut tree = ConfigTree::new();
        tree.insert("oauth.scopes", json!(["snsapi_base", 3, "snsapi_privateinfo"]));
        assert_eq!(
            tree.get_str_list("oauth.scopes"),
            vec!["snsapi_base".to_string(), "snsapi_privateinfo".to_string()]
        );
        assert!(tree.get_str_list("missing").is_empty());
    }
}
