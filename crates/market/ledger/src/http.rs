//! HTTP client for the wallet API server.

use orca_api::{Ledger, PaymentError};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendToAddressRequest<'a> {
    amount: u64,
    address: &'a str,
    sender_wallet_pass: &'a str,
}

/// Sends payments through the local wallet API server.
#[derive(Debug, Clone)]
pub struct HttpLedger {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLedger {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Ledger for HttpLedger {
    async fn send_to_address(
        &self,
        amount: u64,
        address: &str,
        wallet_password: &str,
    ) -> Result<(), PaymentError> {
        let response = self
            .client
            .post(format!("{}/sendToAddress", self.base_url))
            .json(&SendToAddressRequest {
                amount,
                address,
                sender_wallet_pass: wallet_password,
            })
            .send()
            .await
            .map_err(|e| PaymentError::Unavailable {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            metrics::counter!("ledger.payments_total").increment(1);
            debug!(amount, %address, "Payment sent");
            return Ok(());
        }

        let reason = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, "Failed to read ledger error body");
                status.to_string()
            }
        };
        warn!(amount, %address, %status, %reason, "Payment failed");
        if status.is_client_error() {
            Err(PaymentError::Rejected {
                amount,
                address: address.to_string(),
                reason,
            })
        } else {
            Err(PaymentError::Unavailable { message: reason })
        }
    }
}
