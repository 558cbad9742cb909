use crate::config::EngineConfig;
use crate::core::ids::AccountId;
use crate::detection::finding::{base_score, Finding, PatternType};

/// One assembled fraud ring, before scoring.
///
/// A ring starts as a single [`Finding`] and may absorb other findings
/// whose member sets overlap heavily enough. The
/// `findings` it was built from are kept so the suspicion scorer (C6)
/// can recover the structural counts (cycle length, spoke count, chain
/// edges) the base score depends on.
#[derive(Debug, Clone)]
pub struct Ring {
    pub ring_id: String,
    pub pattern_type: PatternType,
    pub member_accounts: Vec<AccountId>,
    pub evidence: String,
    pub findings: Vec<Finding>,
    /// Filled in by the suspicion scorer (C6); `0` until then.
    pub risk_score: u8,
}

#[derive(Debug, Clone)]
struct Group {
    members: Vec<AccountId>,
    pattern_type: PatternType,
    findings: Vec<Finding>,
}

impl Group {
    fn from_finding(finding: Finding) -> Self {
        Self {
            members: finding.sorted_unique_members(),
            pattern_type: finding.pattern_type(),
            findings: vec![finding],
        }
    }
}

/// Assemble raw [`Finding`]s from C2/C3/C4 into merged [`Ring`]s (C5).
///
/// Two groups merge when their member sets share at least half of the
/// larger group's members (`ceil(max(|A|, |B|) / 2)`). Merging repeats
/// to a fixed point — a ring may absorb several findings of different
/// pattern types, e.g. a cycle that is also part of a fan-out. Per
/// §4.5, the merged ring's pattern type is whichever contributor has the
/// higher §4.6 per-ring base score, ties broken by priority (cycle >
/// shell_chain > fan_in > fan_out); its evidence is taken from whichever
/// contributing finding carries that winning pattern type.
///
/// Ring IDs are assigned after merging settles, in block order
/// (cycles, then shell chains, then fan-ins, then fan-outs), and within
/// a block lexicographically by sorted member list (§3) — `RING_0001`,
/// `RING_0002`, … — a total order, since two rings that still shared
/// enough members to tie on it would already have merged.
pub fn assemble_rings(findings: Vec<Finding>, config: &EngineConfig) -> Vec<Ring> {
    let mut groups: Vec<Group> = findings.into_iter().map(Group::from_finding).collect();

    loop {
        groups.sort_by(|a, b| {
            a.members
                .cmp(&b.members)
                .then_with(|| a.pattern_type.merge_priority().cmp(&b.pattern_type.merge_priority()))
        });

        let mut merge_pair = None;
        'search: for i in 0..groups.len() {
            for j in (i + 1)..groups.len() {
                if should_merge(&groups[i], &groups[j]) {
                    merge_pair = Some((i, j));
                    break 'search;
                }
            }
        }

        match merge_pair {
            Some((i, j)) => {
                let b = groups.remove(j);
                let a = groups.remove(i);
                groups.push(merge(a, b, config));
            }
            None => break,
        }
    }

    groups.sort_by(|a, b| {
        a.pattern_type
            .merge_priority()
            .cmp(&b.pattern_type.merge_priority())
            .then_with(|| a.members.cmp(&b.members))
    });

    groups
        .into_iter()
        .enumerate()
        .map(|(i, g)| Ring {
            ring_id: format!("RING_{:04}", i + 1),
            evidence: evidence_for(g.pattern_type, &g.findings),
            pattern_type: g.pattern_type,
            member_accounts: g.members,
            findings: g.findings,
            risk_score: 0,
        })
        .collect()
}

fn should_merge(a: &Group, b: &Group) -> bool {
    let shared = count_shared(&a.members, &b.members);
    let threshold = shared_threshold(a.members.len(), b.members.len());
    shared >= threshold
}

/// `ceil(max(a_len, b_len) / 2)`.
fn shared_threshold(a_len: usize, b_len: usize) -> usize {
    let m = a_len.max(b_len);
    (m + 1) / 2
}

/// Count of common elements between two sorted, deduplicated slices.
fn count_shared(a: &[AccountId], b: &[AccountId]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    count
}

/// §4.5: the merged group's pattern type is whichever contributor has
/// the higher per-ring base score (§4.6), computed from each group's own
/// findings of its own kind; a tie falls back to priority order.
fn merge(a: Group, b: Group, config: &EngineConfig) -> Group {
    let mut members = a.members;
    members.extend(b.members);
    members.sort();
    members.dedup();

    let a_base = base_score(a.pattern_type, &a.findings, config);
    let b_base = base_score(b.pattern_type, &b.findings, config);
    let pattern_type = if b_base > a_base {
        b.pattern_type
    } else if a_base > b_base {
        a.pattern_type
    } else if b.pattern_type.outranks(a.pattern_type) {
        b.pattern_type
    } else {
        a.pattern_type
    };

    let mut findings = a.findings;
    findings.extend(b.findings);

    Group {
        members,
        pattern_type,
        findings,
    }
}

fn evidence_for(pattern_type: PatternType, findings: &[Finding]) -> String {
    findings
        .iter()
        .find(|f| f.pattern_type() == pattern_type)
        .or_else(|| findings.first())
        .map(|f| f.evidence_text())
        .unwrap_or_default()
}
