//! Printed text recognition.

use std::sync::Arc;

use serde::Serialize;

use super::image::ImageUrl;
use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

/// Which side of an identity card the image shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdCardSide {
    Photo,
    Scan,
}

impl IdCardSide {
    fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Scan => "scan",
        }
    }
}

#[derive(Serialize)]
struct IdCardRequest<'a> {
    img_url: &'a str,
    r#type: &'static str,
}

/// The `OCR` component.
#[derive(Debug, Clone)]
pub struct OcrApi {
    base: BaseClient,
}

impl OcrApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    pub async fn bank_card(&self, img_url: &str) -> Result<ApiResponse, WechatError> {
        self.recognize("/cv/ocr/bankcard", img_url).await
    }

    pub async fn business_license(&self, img_url: &str) -> Result<ApiResponse, WechatError> {
        self.recognize("/cv/ocr/bizlicense", img_url).await
    }

    /// Vehicle registration certificate.
    pub async fn vehicle_license(&self, img_url: &str) -> Result<ApiResponse, WechatError> {
        self.recognize("/cv/ocr/driving", img_url).await
    }

    pub async fn driver_license(&self, img_url: &str) -> Result<ApiResponse, WechatError> {
        self.recognize("/cv/ocr/drivinglicense", img_url).await
    }

    pub async fn printed_text(&self, img_url: &str) -> Result<ApiResponse, WechatError> {
        self.recognize("/cv/ocr/comm", img_url).await
    }

    pub async fn plate_number(&self, img_url: &str) -> Result<ApiResponse, WechatError> {
        self.recognize("/cv/ocr/platenum", img_url).await
    }

    /// POST /cv/ocr/idcard
    pub async fn id_card(&self, img_url: &str, side: IdCardSide) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cv/ocr/idcard",
                &IdCardRequest {
                    img_url,
                    r#type: side.as_str(),
                },
            )
            .await
    }

    async fn recognize(&self, endpoint: &str, img_url: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(endpoint, &ImageUrl { img_url })
            .await
    }
}

impl Component for OcrApi {
    fn name(&self) -> &'static str {
        "OCR"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::testing::signed_container;
    use crate::token::TokenEndpoint;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_id_card_sends_side() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cv/ocr/idcard"))
            .and(body_json(json!({"img_url": "https://example.com/id.jpg", "type": "photo"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok",
                "type": "Front",
                "name": "Zhang San"
            })))
            .mount(&server)
            .await;

        let container = signed_container(&server, TokenEndpoint::MiniProgram).await;
        let ocr = OcrApi::new(&container).unwrap();
        let response = ocr
            .id_card("https://example.com/id.jpg", IdCardSide::Photo)
            .await
            .unwrap();
        assert_eq!(response.get_str("name"), Some("Zhang San"));
    }

    #[tokio::test]
    async fn test_recognition_failure_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cv/ocr/bankcard"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 101000,
                "errmsg": "invalid image url"
            })))
            .mount(&server)
            .await;

        let container = signed_container(&server, TokenEndpoint::MiniProgram).await;
        let ocr = OcrApi::new(&container).unwrap();
        assert!(matches!(
            ocr.bank_card("nope").await,
            Err(WechatError::Api { code: 101000, .. })
        ));
    }
}
