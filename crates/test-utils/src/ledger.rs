use orca_api::{Ledger, PaymentError};
use parking_lot::Mutex;

/// A payment accepted by a [`RecordingLedger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub amount: u64,
    pub address: String,
}

type SendHook = Box<dyn Fn(&Payment) + Send + Sync>;

/// Ledger that accepts everything and remembers what it was asked to send.
#[derive(Default)]
pub struct RecordingLedger {
    payments: Mutex<Vec<Payment>>,
    fail_at: Option<usize>,
    on_send: Option<SendHook>,
}

impl RecordingLedger {
    /// Reject the payment with this zero-based sequence number.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Run `hook` for each accepted payment before it is recorded.
    pub fn on_send(mut self, hook: impl Fn(&Payment) + Send + Sync + 'static) -> Self {
        self.on_send = Some(Box::new(hook));
        self
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.payments.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.payments.lock().len()
    }

    pub fn total(&self) -> u64 {
        self.payments.lock().iter().map(|p| p.amount).sum()
    }
}

#[async_trait::async_trait]
impl Ledger for RecordingLedger {
    async fn send_to_address(
        &self,
        amount: u64,
        address: &str,
        _wallet_password: &str,
    ) -> Result<(), PaymentError> {
        let sequence = self.payments.lock().len();
        if self.fail_at == Some(sequence) {
            return Err(PaymentError::Rejected {
                amount,
                address: address.to_string(),
                reason: "insufficient funds".to_string(),
            });
        }

        let payment = Payment {
            amount,
            address: address.to_string(),
        };
        if let Some(hook) = &self.on_send {
            hook(&payment);
        }
        self.payments.lock().push(payment);
        Ok(())
    }
}
