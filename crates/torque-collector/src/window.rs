//! Which records get exposed, and for how long.

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;
use std::collections::HashSet;
use std::time::Duration;
use torque_reports::ReportKind;

/// Lifetime of the set of already exposed identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupScope {
    /// Cleared at the start of every cycle.
    #[default]
    PerCycle,
    /// Never cleared; an identifier is exposed once per process.
    UntilRestart,
}

/// How a report's records are filtered by time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Exposure {
    /// Every record in the latest output.
    #[default]
    Snapshot,
    /// Only records whose timestamp is at or after the last collection.
    SinceLastCollection,
}

/// When the last collection time moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowAdvance {
    /// To the start of each cycle that reached the scheduler host.
    #[default]
    AfterCycle,
    /// Stays at its initial value.
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowPolicy {
    pub dedup: DedupScope,
    pub advance: WindowAdvance,
}

/// Cross-cycle bookkeeping for window-scoped reports.
///
/// Identifiers are keyed per report, so the same job may be exposed once
/// by each report that lists it.
#[derive(Debug, Clone)]
pub struct CollectionWindow {
    last_collection: DateTime<Tz>,
    seen: HashSet<(ReportKind, String)>,
    policy: WindowPolicy,
}

impl CollectionWindow {
    /// Start with a lookback of one `interval` before `now`.
    pub fn new(now: DateTime<Tz>, interval: Duration, policy: WindowPolicy) -> Self {
        let lookback = TimeDelta::from_std(interval).unwrap_or(TimeDelta::zero());
        Self {
            last_collection: now - lookback,
            seen: HashSet::new(),
            policy,
        }
    }

    pub fn last_collection(&self) -> DateTime<Tz> {
        self.last_collection
    }

    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    /// Number of identifiers currently remembered.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn begin_cycle(&mut self) {
        if self.policy.dedup == DedupScope::PerCycle {
            self.seen.clear();
        }
    }

    /// Decide whether a record should be exposed, remembering it if so.
    pub fn admit(
        &mut self,
        report: ReportKind,
        identity: &str,
        observed_at: Option<DateTime<Tz>>,
        exposure: Exposure,
    ) -> bool {
        if exposure == Exposure::SinceLastCollection
            && observed_at.is_some_and(|at| at < self.last_collection)
        {
            return false;
        }
        self.seen.insert((report, identity.to_string()))
    }

    /// Close a cycle that started at `started`.
    pub fn finish_cycle(&mut self, started: DateTime<Tz>) {
        if self.policy.advance == WindowAdvance::AfterCycle {
            self.last_collection = started;
        }
    }
}
