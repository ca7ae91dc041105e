//! Payments for the Orca file market.
//!
//! - [`HttpLedger`] - [`Ledger`](orca_api::Ledger) backed by the wallet API server
//! - [`PaymentNotice`] - Peer-to-peer notice that a payment was sent

mod http;
mod notice;

pub use http::HttpLedger;
pub use notice::{NoticeError, PaymentNotice, notice_routes, send_payment_notice};
