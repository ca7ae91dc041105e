//! Payment notices exchanged between peers.
//!
//! After paying a peer out of band, a node can tell the peer about it by
//! posting a notice to the peer's `/sendTransaction` endpoint.

use axum::{Json, Router, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tracing::info;

/// Notice that `amount` was sent by the holder of `public_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNotice {
    pub amount: u64,
    pub public_key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NoticeError {
    #[error("failed to reach peer: {0}")]
    Request(#[from] reqwest::Error),

    #[error("peer refused notice with status {0}")]
    Refused(reqwest::StatusCode),
}

/// Post `notice` to the peer at `ip:port`.
pub async fn send_payment_notice(
    client: &reqwest::Client,
    ip: IpAddr,
    port: u16,
    notice: &PaymentNotice,
) -> Result<(), NoticeError> {
    let host = match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{v6}]"),
    };
    let response = client
        .post(format!("http://{host}:{port}/sendTransaction"))
        .json(notice)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(NoticeError::Refused(response.status()));
    }
    info!(amount = notice.amount, %ip, port, "Payment notice delivered");
    Ok(())
}

async fn receive_notice(Json(notice): Json<PaymentNotice>) -> StatusCode {
    info!(amount = notice.amount, from = %notice.public_key, "Received payment notice");
    metrics::counter!("ledger.notices_received_total").increment(1);
    StatusCode::OK
}

/// Routes accepting payment notices from peers.
pub fn notice_routes<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route("/sendTransaction", post(receive_notice))
}
