//! Electronic invoices attached to reimbursements.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

/// Identifies one invoice in the member's card package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRef {
    pub card_id: String,
    pub encrypt_code: String,
}

#[derive(Serialize)]
struct StatusUpdate<'a> {
    card_id: &'a str,
    encrypt_code: &'a str,
    reimburse_status: &'a str,
}

#[derive(Serialize)]
struct BatchStatusUpdate<'a> {
    openid: &'a str,
    reimburse_status: &'a str,
    invoice_list: &'a [InvoiceRef],
}

#[derive(Serialize)]
struct InvoiceBatch<'a> {
    item_list: &'a [InvoiceRef],
}

/// The `Invoice` component.
#[derive(Debug, Clone)]
pub struct InvoiceApi {
    base: BaseClient,
}

impl InvoiceApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /cgi-bin/card/invoice/reimburse/getinvoiceinfo
    pub async fn get(&self, invoice: &InvoiceRef) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/card/invoice/reimburse/getinvoiceinfo", invoice)
            .await
    }

    /// POST /cgi-bin/card/invoice/reimburse/getinvoiceinfobatch
    pub async fn select(&self, invoices: &[InvoiceRef]) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/card/invoice/reimburse/getinvoiceinfobatch",
                &InvoiceBatch { item_list: invoices },
            )
            .await
    }

    /// `status`: `INVOICE_REIMBURSE_INIT`, `_LOCK` or `_CLOSURE`.
    ///
    /// POST /cgi-bin/card/invoice/reimburse/updateinvoicestatus
    pub async fn update(&self, invoice: &InvoiceRef, status: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/card/invoice/reimburse/updateinvoicestatus",
                &StatusUpdate {
                    card_id: &invoice.card_id,
                    encrypt_code: &invoice.encrypt_code,
                    reimburse_status: status,
                },
            )
            .await
    }

    /// POST /cgi-bin/card/invoice/reimburse/updatestatusbatch
    pub async fn batch_update(
        &self,
        open_id: &str,
        status: &str,
        invoices: &[InvoiceRef],
    ) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/card/invoice/reimburse/updatestatusbatch",
                &BatchStatusUpdate {
                    openid: open_id,
                    reimburse_status: status,
                    invoice_list: invoices,
                },
            )
            .await
    }
}

impl Component for InvoiceApi {
    fn name(&self) -> &'static str {
        "Invoice"
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
    async fn test_update_status_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/card/invoice/reimburse/updateinvoicestatus"))
            .and(body_json(json!({
                "card_id": "CARDID",
                "encrypt_code": "ENCRYPTCODE",
                "reimburse_status": "INVOICE_REIMBURSE_LOCK"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let container = signed_container(&server, TokenEndpoint::Work).await;
        let invoice = InvoiceApi::new(&container).unwrap();
        let target = InvoiceRef {
            card_id: "CARDID".into(),
            encrypt_code: "ENCRYPTCODE".into(),
        };
        assert!(invoice
            .update(&target, "INVOICE_REIMBURSE_LOCK")
            .await
            .unwrap()
            .is_success());
    }
}
