//! Department management.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Department {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub department_leader: Vec<String>,
    #[serde(default)]
    pub parentid: i64,
    #[serde(default)]
    pub order: i64,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DepartmentId {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub parentid: i64,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DepartmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parentid: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl DepartmentRequest {
    pub fn new(name: impl Into<String>, parent_id: i64) -> Self {
        Self {
            name: Some(name.into()),
            parentid: Some(parent_id),
            ..Default::default()
        }
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateDepartmentResponse {
    #[serde(default)]
    pub id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DepartmentList {
    #[serde(default)]
    department: Vec<Department>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DepartmentIdList {
    #[serde(default)]
    department_id: Vec<DepartmentId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SingleDepartment {
    #[serde(default)]
    department: Department,
}

/// The `Department` component.
#[derive(Debug, Clone)]
pub struct DepartmentApi {
    base: BaseClient,
}

impl DepartmentApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /cgi-bin/department/create
    pub async fn create(
        &self,
        request: &DepartmentRequest,
    ) -> Result<CreateDepartmentResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/department/create", request)
            .await
    }

    /// POST /cgi-bin/department/update
    pub async fn update(&self, request: &DepartmentRequest) -> Result<ApiResponse, WechatError> {
        if request.id.is_none() {
            return Err(WechatError::Config(
                "department id is required for update".to_string(),
            ));
        }
        self.base
            .http_post_json("/cgi-bin/department/update", request)
            .await
    }

    /// GET /cgi-bin/department/delete
    pub async fn delete(&self, id: i64) -> Result<ApiResponse, WechatError> {
        let id = id.to_string();
        self.base
            .http_get("/cgi-bin/department/delete", &[("id", id.as_str())])
            .await
    }

    /// Full records for `id` and its descendants, or the whole tree for
    /// `None`.
    ///
    /// GET /cgi-bin/department/list
    pub async fn list(&self, id: Option<i64>) -> Result<Vec<Department>, WechatError> {
        let id = id.map(|id| id.to_string());
        let query: Vec<(&str, &str)> = id.iter().map(|id| ("id", id.as_str())).collect();
        let response: DepartmentList = self
            .base
            .http_get("/cgi-bin/department/list", &query)
            .await?;
        Ok(response.department)
    }

    /// GET /cgi-bin/department/simplelist
    pub async fn simple_list(&self, id: Option<i64>) -> Result<Vec<DepartmentId>, WechatError> {
        let id = id.map(|id| id.to_string());
        let query: Vec<(&str, &str)> = id.iter().map(|id| ("id", id.as_str())).collect();
        let response: DepartmentIdList = self
            .base
            .http_get("/cgi-bin/department/simplelist", &query)
            .await?;
        Ok(response.department_id)
    }

    /// GET /cgi-bin/department/get
    pub async fn get(&self, id: i64) -> Result<Department, WechatError> {
        let id = id.to_string();
        let response: SingleDepartment = self
            .base
            .http_get("/cgi-bin/department/get", &[("id", id.as_str())])
            .await?;
        Ok(response.department)
    }
}

impl Component for DepartmentApi {
    fn name(&self) -> &'static str {
        "Department"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::testing::{signed_container, TEST_TOKEN};
    use crate::token::TokenEndpoint;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_create_department() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/department/create"))
            .and(query_param("access_token", TEST_TOKEN))
            .and(body_json(json!({"name": "R&D", "parentid": 1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "created",
                "id": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let container = signed_container(&server, TokenEndpoint::Work).await;
        let api = DepartmentApi::new(&container).unwrap();
        let created = api.create(&DepartmentRequest::new("R&D", 1)).await.unwrap();
        assert_eq!(created.id, 2);
    }

    #[tokio::test]
    async fn test_update_requires_id() {
        let server = MockServer::start().await;
        let container = signed_container(&server, TokenEndpoint::Work).await;
        let api = DepartmentApi::new(&container).unwrap();
        let result = api.update(&DepartmentRequest::new("R&D", 1)).await;
        assert!(matches!(result, Err(WechatError::Config(_))));
    }

    #[tokio::test]
    async fn test_list_departments() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/department/list"))
            .and(query_param("id", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok",
                "department": [
                    {"id": 1, "name": "HQ", "parentid": 0, "order": 100},
                    {"id": 2, "name": "R&D", "parentid": 1, "order": 10}
                ]
            })))
            .mount(&server)
            .await;

        let container = signed_container(&server, TokenEndpoint::Work).await;
        let api = DepartmentApi::new(&container).unwrap();
        let departments = api.list(Some(1)).await.unwrap();
        assert_eq!(departments.len(), 2);
        assert_eq!(departments[1].parentid, 1);
    }

    #[tokio::test]
    async fn test_simple_list_without_root() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/department/simplelist"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok",
                "department_id": [{"id": 1, "parentid": 0, "order": 100}]
            })))
            .mount(&server)
            .await;

        let container = signed_container(&server, TokenEndpoint::Work).await;
        let api = DepartmentApi::new(&container).unwrap();
        let ids = api.simple_list(None).await.unwrap();
        assert_eq!(ids[0].id, 1);
    }
}
