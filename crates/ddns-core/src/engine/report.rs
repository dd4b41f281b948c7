//! Structured results of a reconciliation run
//!
//! Every configured domain gets a [`DomainReport`], in configuration order,
//! and every record processed inside it gets a [`RecordReport`]. Nothing here
//! is persisted.

use std::fmt;

use crate::traits::ResolvedAddress;

/// What happened to a single record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    /// No record existed; one was created
    Created {
        /// Identifier assigned by the provider, when reported
        record_id: Option<String>,
    },
    /// Exactly one record existed and was updated
    Updated {
        /// Identifier of the updated record
        record_id: String,
        /// Content before the update
        previous_content: String,
    },
    /// Several records matched the hostname; nothing was written
    Ambiguous {
        /// Number of matching records
        matches: usize,
    },
    /// The search failed; nothing was written
    SearchFailed {
        /// Error message
        error: String,
    },
    /// The create or update call failed or was rejected by the provider
    WriteFailed {
        /// Error message
        error: String,
    },
}

impl ReconciliationOutcome {
    /// Whether the record needs operator attention
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::SearchFailed { .. } | Self::WriteFailed { .. })
    }
}

/// Result for one configured hostname
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReport {
    /// Hostname as configured
    pub hostname: String,
    /// What happened
    pub outcome: ReconciliationOutcome,
}

/// How far a domain got
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainStatus {
    /// Every record was attempted
    Reconciled,
    /// The domain has no records; the provider was not contacted
    NoRecords,
    /// The zone ID was blank and could not be looked up
    ZoneUnresolved {
        /// Why the lookup failed
        reason: String,
    },
    /// The domain task died before finishing
    Aborted {
        /// Join error message
        reason: String,
    },
}

/// Result for one configured domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainReport {
    /// Domain name as configured
    pub domain: String,
    /// Zone the records were reconciled in, once known
    pub zone_id: Option<String>,
    /// How far the domain got
    pub status: DomainStatus,
    /// Per-record results, in configuration order
    pub records: Vec<RecordReport>,
}

impl DomainReport {
    pub(crate) fn skipped(domain: &str, zone_id: Option<String>, status: DomainStatus) -> Self {
        Self {
            domain: domain.to_string(),
            zone_id,
            status,
            records: Vec::new(),
        }
    }
}

/// Result of a whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// The address every record was pointed at
    pub address: ResolvedAddress,
    /// Per-domain results, in configuration order
    pub domains: Vec<DomainReport>,
}

impl RunReport {
    /// Iterate over every record report together with its domain name
    pub fn records(&self) -> impl Iterator<Item = (&str, &RecordReport)> {
        self.domains
            .iter()
            .flat_map(|d| d.records.iter().map(move |r| (d.domain.as_str(), r)))
    }

    /// Look up the outcome for a hostname
    pub fn outcome_for(&self, hostname: &str) -> Option<&ReconciliationOutcome> {
        self.records()
            .find(|(_, r)| r.hostname == hostname)
            .map(|(_, r)| &r.outcome)
    }

    /// Counts per outcome
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for (_, record) in self.records() {
            match record.outcome {
                ReconciliationOutcome::Created { .. } => summary.created += 1,
                ReconciliationOutcome::Updated { .. } => summary.updated += 1,
                ReconciliationOutcome::Ambiguous { .. } => summary.ambiguous += 1,
                ReconciliationOutcome::SearchFailed { .. }
                | ReconciliationOutcome::WriteFailed { .. } => summary.failed += 1,
            }
        }
        summary.skipped_domains = self
            .domains
            .iter()
            .filter(|d| d.status != DomainStatus::Reconciled)
            .count();
        summary
    }

    /// Whether any record or domain failed
    pub fn has_failures(&self) -> bool {
        self.records().any(|(_, r)| r.outcome.is_failure())
            || self.domains.iter().any(|d| {
                matches!(
                    d.status,
                    DomainStatus::ZoneUnresolved { .. } | DomainStatus::Aborted { .. }
                )
            })
    }
}

/// Outcome counts for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub created: usize,
    pub updated: usize,
    pub ambiguous: usize,
    pub failed: usize,
    pub skipped_domains: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} ambiguous, {} failed, {} domain(s) skipped",
            self.created, self.updated, self.ambiguous, self.failed, self.skipped_domains
        )
    }
}
