use crate::core::ids::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-account aggregates computed by the graph builder in a single pass.
///
/// These are the raw behavioral features the suspicion scorer (C6) reads;
/// nothing here is recomputed downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    /// Indices into the graph's transaction array, for outgoing edges.
    out_edges: Vec<usize>,
    /// Indices into the graph's transaction array, for incoming edges.
    in_edges: Vec<usize>,
    tx_count: u32,
    in_count: u32,
    out_count: u32,
    in_volume: Decimal,
    out_volume: Decimal,
    round_amount_count: u32,
    night_count: u32,
    first_ts: Option<DateTime<Utc>>,
    last_ts: Option<DateTime<Utc>>,
    counterparties: HashSet<AccountId>,
}

impl Account {
    pub(crate) fn new(id: AccountId) -> Self {
        Self {
            id,
            out_edges: Vec::new(),
            in_edges: Vec::new(),
            tx_count: 0,
            in_count: 0,
            out_count: 0,
            in_volume: Decimal::ZERO,
            out_volume: Decimal::ZERO,
            round_amount_count: 0,
            night_count: 0,
            first_ts: None,
            last_ts: None,
            counterparties: HashSet::new(),
        }
    }

    pub(crate) fn record_outgoing(&mut self, txn_index: usize, counterparty: &AccountId) {
        self.out_edges.push(txn_index);
        self.out_count += 1;
        self.counterparties.insert(counterparty.clone());
    }

    pub(crate) fn record_incoming(&mut self, txn_index: usize, counterparty: &AccountId) {
        self.in_edges.push(txn_index);
        self.in_count += 1;
        self.counterparties.insert(counterparty.clone());
    }

    pub(crate) fn record_common(&mut self, amount: Decimal, is_round: bool, is_night: bool, ts: DateTime<Utc>) {
        self.tx_count += 1;
        if is_round {
            self.round_amount_count += 1;
        }
        if is_night {
            self.night_count += 1;
        }
        self.first_ts = Some(self.first_ts.map_or(ts, |f| f.min(ts)));
        self.last_ts = Some(self.last_ts.map_or(ts, |l| l.max(ts)));
    }

    pub(crate) fn add_outgoing_volume(&mut self, amount: Decimal) {
        self.out_volume += amount;
    }

    pub(crate) fn add_incoming_volume(&mut self, amount: Decimal) {
        self.in_volume += amount;
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn out_edges(&self) -> &[usize] {
        &self.out_edges
    }

    pub fn in_edges(&self) -> &[usize] {
        &self.in_edges
    }

    pub fn tx_count(&self) -> u32 {
        self.tx_count
    }

    pub fn in_count(&self) -> u32 {
        self.in_count
    }

    pub fn out_count(&self) -> u32 {
        self.out_count
    }

    pub fn in_volume(&self) -> Decimal {
        self.in_volume
    }

    pub fn out_volume(&self) -> Decimal {
        self.out_volume
    }

    pub fn round_amount_count(&self) -> u32 {
        self.round_amount_count
    }

    pub fn night_count(&self) -> u32 {
        self.night_count
    }

    pub fn first_ts(&self) -> Option<DateTime<Utc>> {
        self.first_ts
    }

    pub fn last_ts(&self) -> Option<DateTime<Utc>> {
        self.last_ts
    }

    pub fn distinct_counterparties(&self) -> usize {
        self.counterparties.len()
    }

    /// Hours between the account's first and last observed transaction.
    /// Never less than 1 (avoids division by zero in velocity scoring).
    pub fn hours_active(&self) -> f64 {
        match (self.first_ts, self.last_ts) {
            (Some(first), Some(last)) => {
                let hours = (last - first).num_seconds() as f64 / 3600.0;
                hours.max(1.0)
            }
            _ => 1.0,
        }
    }

    /// Ratio of round-amount transactions to total transactions.
    pub fn round_amount_ratio(&self) -> f64 {
        if self.tx_count == 0 {
            0.0
        } else {
            self.round_amount_count as f64 / self.tx_count as f64
        }
    }

    /// Ratio of nighttime transactions to total transactions.
    pub fn night_ratio(&self) -> f64 {
        if self.tx_count == 0 {
            0.0
        } else {
            self.night_count as f64 / self.tx_count as f64
        }
    }

    /// `min(in_volume, out_volume) / max(1, max(in_volume, out_volume))`,
    /// the balanced-flow ratio used by the behavioral scorer.
    pub fn balance_ratio(&self) -> Decimal {
        let lo = self.in_volume.min(self.out_volume);
        let hi = self.in_volume.max(self.out_volume).max(Decimal::ONE);
        lo / hi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_hours_active_floor() {
        let acc = Account::new(AccountId::new("A"));
        assert_eq!(acc.hours_active(), 1.0);
    }

    #[test]
    fn test_balance_ratio() {
        let mut acc = Account::new(AccountId::new("A"));
        acc.add_incoming_volume(dec!(80));
        acc.add_outgoing_volume(dec!(100));
        assert_eq!(acc.balance_ratio(), dec!(0.8));
    }

    #[test]
    fn test_hours_active_span() {
        let mut acc = Account::new(AccountId::new("A"));
        let t1 = Utc.with_ymd_and_hms(2026, 2, 18, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap();
        acc.record_common(dec!(1), false, false, t1);
        acc.record_common(dec!(1), false, false, t2);
        assert_eq!(acc.hours_active(), 2.0);
    }
}
