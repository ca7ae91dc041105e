//! Payment backend abstraction.

use crate::PaymentError;

/// Executes value transfers between wallet addresses.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait Ledger: Send + Sync {
    /// Send `amount` to `address`, unlocking the sender wallet with `wallet_password`.
    async fn send_to_address(
        &self,
        amount: u64,
        address: &str,
        wallet_password: &str,
    ) -> Result<(), PaymentError>;
}
