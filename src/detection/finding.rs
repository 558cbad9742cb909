use crate::config::EngineConfig;
use crate::core::ids::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The pattern type a ring (or finding) is tagged with. Also used as
/// the merge tie-break priority order: `Cycle > ShellChain >
/// FanIn > FanOut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Cycle,
    FanIn,
    FanOut,
    ShellChain,
}

impl PatternType {
    /// Lower priority value wins ties when merging overlapping findings,
    /// and fixes the block order rings are numbered in: cycles, then
    /// shell chains, then fan-ins, then fan-outs.
    pub(crate) fn merge_priority(self) -> u8 {
        match self {
            PatternType::Cycle => 0,
            PatternType::ShellChain => 1,
            PatternType::FanIn => 2,
            PatternType::FanOut => 3,
        }
    }

    /// `true` if `self` should win a tie-broken merge against `other`.
    pub fn outranks(self, other: PatternType) -> bool {
        self.merge_priority() < other.merge_priority()
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatternType::Cycle => "cycle",
            PatternType::FanIn => "fan_in",
            PatternType::FanOut => "fan_out",
            PatternType::ShellChain => "shell_chain",
        };
        write!(f, "{s}")
    }
}

/// One raw detection event, before ring assembly.
#[derive(Debug, Clone)]
pub enum Finding {
    Cycle {
        /// The cycle path, in traversal order; the last member has an
        /// edge back to the first.
        members: Vec<AccountId>,
    },
    FanIn {
        hub: AccountId,
        spokes: Vec<AccountId>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        total_volume: Decimal,
    },
    FanOut {
        hub: AccountId,
        spokes: Vec<AccountId>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        total_volume: Decimal,
    },
    ShellChain {
        /// Source → … → sink, inclusive of both endpoints.
        path: Vec<AccountId>,
    },
}

impl Finding {
    pub fn pattern_type(&self) -> PatternType {
        match self {
            Finding::Cycle { .. } => PatternType::Cycle,
            Finding::FanIn { .. } => PatternType::FanIn,
            Finding::FanOut { .. } => PatternType::FanOut,
            Finding::ShellChain { .. } => PatternType::ShellChain,
        }
    }

    /// The finding's member accounts, in canonical order: the
    /// cycle path, `[hub, spokes...]` for fans, or the chain path.
    pub fn members(&self) -> Vec<AccountId> {
        match self {
            Finding::Cycle { members } => members.clone(),
            Finding::FanIn { hub, spokes, .. } | Finding::FanOut { hub, spokes, .. } => {
                let mut m = vec![hub.clone()];
                m.extend(spokes.iter().cloned());
                m
            }
            Finding::ShellChain { path } => path.clone(),
        }
    }

    /// Members, deduplicated and sorted — the form used for overlap
    /// comparisons and ring `member_accounts`.
    pub fn sorted_unique_members(&self) -> Vec<AccountId> {
        let mut m = self.members();
        m.sort();
        m.dedup();
        m
    }

    /// A compact textual description of the evidence behind this finding,
    /// used verbatim as a ring's `evidence` field when the ring is not
    /// merged with another finding.
    pub fn evidence_text(&self) -> String {
        match self {
            Finding::Cycle { members } => {
                format!("cycle of length {} through {} accounts", members.len(), members.len())
            }
            Finding::FanIn {
                spokes,
                window_start,
                window_end,
                total_volume,
                ..
            } => format!(
                "{} distinct senders within [{}, {}], total volume {}",
                spokes.len(),
                window_start.to_rfc3339(),
                window_end.to_rfc3339(),
                total_volume
            ),
            Finding::FanOut {
                spokes,
                window_start,
                window_end,
                total_volume,
                ..
            } => format!(
                "{} distinct receivers within [{}, {}], total volume {}",
                spokes.len(),
                window_start.to_rfc3339(),
                window_end.to_rfc3339(),
                total_volume
            ),
            Finding::ShellChain { path } => {
                format!(
                    "shell chain of {} edges through {} intermediate accounts",
                    path.len().saturating_sub(1),
                    path.len().saturating_sub(2)
                )
            }
        }
    }
}

/// §4.6's per-ring base score for `pattern_type`, computed from whichever
/// of `findings` carries that kind: a fixed base plus a per-unit-of-size
/// bonus, capped. Shared by the ring assembler (C5), which needs it to
/// pick the winning pattern type on a merge, and the suspicion scorer
/// (C6), which needs it for the final `risk_score`.
pub(crate) fn base_score(pattern_type: PatternType, findings: &[Finding], config: &EngineConfig) -> f64 {
    match pattern_type {
        PatternType::Cycle => {
            let len = findings
                .iter()
                .filter_map(|f| match f {
                    Finding::Cycle { members } => Some(members.len()),
                    _ => None,
                })
                .max()
                .unwrap_or(3);
            30.0 + (5.0 * len.saturating_sub(3) as f64).min(15.0)
        }
        PatternType::ShellChain => {
            let edges = findings
                .iter()
                .filter_map(|f| match f {
                    Finding::ShellChain { path } => Some(path.len().saturating_sub(1)),
                    _ => None,
                })
                .max()
                .unwrap_or(config.chain_min_length);
            35.0 + (5.0 * edges.saturating_sub(config.chain_min_length) as f64).min(20.0)
        }
        PatternType::FanIn | PatternType::FanOut => {
            let spokes = findings
                .iter()
                .filter_map(|f| match f {
                    Finding::FanIn { spokes, .. } | Finding::FanOut { spokes, .. } => {
                        Some(spokes.len())
                    }
                    _ => None,
                })
                .max()
                .unwrap_or(config.fan_min_spokes);
            25.0 + (5.0 * spokes.saturating_sub(config.fan_min_spokes) as f64).min(15.0)
        }
    }
}
