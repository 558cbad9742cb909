use crate::core::ids::{AccountId, TxnId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single financial transfer between two accounts.
///
/// Transactions are immutable once constructed and are the atomic
/// unit the graph builder consumes. `sender` and `receiver` are
/// expected to differ — self-loops are accepted here (validation is
/// the caller's job) but are dropped when the graph is built.
///
/// # Examples
///
/// ```
/// use muling_graph_engine::core::transaction::Transaction;
/// use muling_graph_engine::core::ids::AccountId;
/// use chrono::Utc;
/// use rust_decimal_macros::dec;
///
/// let txn = Transaction::new(
///     "TXN001",
///     AccountId::new("A"),
///     AccountId::new("B"),
///     dec!(5000),
///     Utc::now(),
/// );
/// assert_eq!(txn.amount(), dec!(5000));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    id: TxnId,
    sender: AccountId,
    receiver: AccountId,
    amount: Decimal,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        sender: AccountId,
        receiver: AccountId,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TxnId::new(id),
            sender,
            receiver,
            amount,
            timestamp,
        }
    }

    pub fn id(&self) -> &TxnId {
        &self.id
    }

    pub fn sender(&self) -> &AccountId {
        &self.sender
    }

    pub fn receiver(&self) -> &AccountId {
        &self.receiver
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// A transaction whose sender and receiver are the same account.
    pub fn is_self_loop(&self) -> bool {
        self.sender == self.receiver
    }

    /// Whether the amount is evenly divisible by 100 with no fractional part.
    /// Used by the graph builder to flag "round amount" activity, a common
    /// structuring signal.
    pub fn is_round_amount(&self) -> bool {
        self.amount.fract().is_zero() && (self.amount % Decimal::from(100)).is_zero()
    }

    /// True when the transaction's hour-of-day (UTC) falls in [22,24) or [0,6),
    /// the "nighttime" window used by the behavioral scorer.
    pub fn is_nighttime(&self) -> bool {
        use chrono::Timelike;
        let hour = self.timestamp.hour();
        (22..24).contains(&hour) || (0..6).contains(&hour)
    }
}
