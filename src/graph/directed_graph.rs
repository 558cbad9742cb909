use crate::core::account::Account;
use crate::core::ids::AccountId;
use crate::core::transaction::Transaction;
use crate::error::{EngineError, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// A directed, time-stamped, weighted multigraph built from one
/// transaction batch.
///
/// Nodes are parties seen as either a sender or receiver; edges are the
/// transactions themselves (parallel edges between the same ordered
/// pair are expected and preserved). Node and edge storage is arena
/// style — `petgraph`'s `DiGraph` already represents both as
/// contiguous, index-addressed arrays, which is exactly the
/// cache-friendly, trivially-shareable representation the detectors
/// need to run concurrently over a read-only graph.
///
/// Built once by [`build`] and immutable for the rest of one analysis.
#[derive(Debug, Clone)]
pub struct DirectedGraph {
    graph: DiGraph<Account, usize>,
    index: HashMap<AccountId, NodeIndex>,
    /// Insertion order of first appearance — the iteration order downstream
    /// detectors must use so that tie-breaks are reproducible.
    order: Vec<AccountId>,
    transactions: Vec<Transaction>,
    dropped_self_loops: usize,
}

impl DirectedGraph {
    fn empty() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            order: Vec::new(),
            transactions: Vec::new(),
            dropped_self_loops: 0,
        }
    }

    fn node_index(&mut self, id: &AccountId) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            idx
        } else {
            let idx = self.graph.add_node(Account::new(id.clone()));
            self.index.insert(id.clone(), idx);
            self.order.push(id.clone());
            idx
        }
    }

    /// Number of distinct accounts (nodes) in the graph.
    pub fn account_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of transactions (edges) actually loaded (self-loops excluded).
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Self-loop transactions dropped during construction.
    pub fn dropped_self_loops(&self) -> usize {
        self.dropped_self_loops
    }

    /// All accounts, in deterministic insertion order.
    pub fn account_ids(&self) -> &[AccountId] {
        &self.order
    }

    pub fn account(&self, id: &AccountId) -> Option<&Account> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn contains_account(&self, id: &AccountId) -> bool {
        self.index.contains_key(id)
    }

    /// The transaction at a given edge index.
    pub fn transaction(&self, idx: usize) -> &Transaction {
        &self.transactions[idx]
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Outgoing neighbors of `id`, as `(neighbor, txn_index)` pairs, in the
    /// order edges were inserted.
    pub fn out_neighbors(&self, id: &AccountId) -> Vec<(&AccountId, usize)> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        self.graph
            .edges(idx)
            .map(|e| (self.graph[e.target()].id(), *e.weight()))
            .collect()
    }

    /// Incoming neighbors of `id`, as `(neighbor, txn_index)` pairs.
    pub fn in_neighbors(&self, id: &AccountId) -> Vec<(&AccountId, usize)> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, petgraph::Direction::Incoming)
            .map(|e| (self.graph[e.source()].id(), *e.weight()))
            .collect()
    }
}

/// Build a [`DirectedGraph`] from a transaction batch (C1).
///
/// A single pass: self-loops are dropped (counted, not an error); every
/// other transaction becomes one edge and updates both endpoints'
/// aggregates. Input order is preserved as node insertion order, which
/// is the contract downstream detectors rely on for deterministic
/// tie-breaking.
///
/// # Errors
///
/// Returns [`EngineError::MalformedBatch`] if any transaction carries a
/// negative amount (amounts of zero are accepted as degenerate but
/// valid transfers; only negative values are rejected).
pub fn build(transactions: Vec<Transaction>) -> Result<DirectedGraph> {
    let mut g = DirectedGraph::empty();

    for txn in transactions {
        if txn.amount() < Decimal::ZERO {
            return Err(EngineError::MalformedBatch(format!(
                "transaction {} has negative amount {}",
                txn.id(),
                txn.amount()
            )));
        }

        if txn.is_self_loop() {
            g.dropped_self_loops += 1;
            log::debug!("dropped self-loop transaction {}", txn.id());
            continue;
        }

        let sender = txn.sender().clone();
        let receiver = txn.receiver().clone();
        let amount = txn.amount();
        let is_round = txn.is_round_amount();
        let is_night = txn.is_nighttime();
        let ts = txn.timestamp();

        let txn_index = g.transactions.len();
        g.transactions.push(txn);

        let s_idx = g.node_index(&sender);
        let r_idx = g.node_index(&receiver);
        g.graph.add_edge(s_idx, r_idx, txn_index);

        {
            let acc = &mut g.graph[s_idx];
            acc.record_outgoing(txn_index, &receiver);
            acc.record_common(amount, is_round, is_night, ts);
            acc.add_outgoing_volume(amount);
        }
        {
            let acc = &mut g.graph[r_idx];
            acc.record_incoming(txn_index, &sender);
            acc.record_common(amount, is_round, is_night, ts);
            acc.add_incoming_volume(amount);
        }
    }

    log::info!(
        "built graph: {} accounts, {} transactions, {} self-loops dropped",
        g.account_count(),
        g.transaction_count(),
        g.dropped_self_loops()
    );

    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::AccountId;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn ts(hour: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 18, hour, 0, 0).unwrap()
    }

    fn txn(id: &str, s: &str, r: &str, amount: rust_decimal::Decimal, hour: u32) -> Transaction {
        Transaction::new(id, AccountId::new(s), AccountId::new(r), amount, ts(hour))
    }

    #[test]
    fn test_build_basic() {
        let txns = vec![
            txn("T1", "A", "B", dec!(100), 10),
            txn("T2", "B", "C", dec!(200), 11),
        ];
        let g = build(txns).unwrap();
        assert_eq!(g.account_count(), 3);
        assert_eq!(g.transaction_count(), 2);
        assert_eq!(g.dropped_self_loops(), 0);
    }

    #[test]
    fn test_self_loop_dropped() {
        let txns = vec![txn("T1", "A", "A", dec!(100), 10)];
        let g = build(txns).unwrap();
        assert_eq!(g.transaction_count(), 0);
        assert_eq!(g.dropped_self_loops(), 1);
        assert_eq!(g.account_count(), 0);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let txns = vec![txn("T1", "A", "B", dec!(-10), 10)];
        assert!(build(txns).is_err());
    }

    #[test]
    fn test_aggregates() {
        let txns = vec![
            txn("T1", "A", "B", dec!(900), 23),
            txn("T2", "A", "B", dec!(901), 10),
        ];
        let g = build(txns).unwrap();
        let a = g.account(&AccountId::new("A")).unwrap();
        assert_eq!(a.out_count(), 2);
        assert_eq!(a.in_count(), 0);
        assert_eq!(a.round_amount_count(), 1);
        assert_eq!(a.night_count(), 1);
        assert_eq!(a.out_volume(), dec!(1801));
    }

    #[test]
    fn test_parallel_edges_preserved() {
        let txns = vec![
            txn("T1", "A", "B", dec!(100), 10),
            txn("T2", "A", "B", dec!(50), 11),
        ];
        let g = build(txns).unwrap();
        let out = g.out_neighbors(&AccountId::new("A"));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_deterministic_insertion_order() {
        let txns = vec![
            txn("T1", "Z", "Y", dec!(1), 10),
            txn("T2", "A", "B", dec!(1), 10),
        ];
        let g = build(txns).unwrap();
        assert_eq!(
            g.account_ids(),
            &[
                AccountId::new("Z"),
                AccountId::new("Y"),
                AccountId::new("A"),
                AccountId::new("B"),
            ]
        );
    }
}
