//! # Lookup Sequencing
//!
//! Last-query-wins guard for debounced lookups.
//!
//! ```text
//! keystroke "55"   ──► issue(Mobile) = seq 1 ──► settle ──► stale, dropped
//! keystroke "555"  ──► issue(Mobile) = seq 2 ──► settle ──► GET ──┐
//! keystroke "5551" ──► issue(Mobile) = seq 3 ──► settle ──► GET ──┼─┐
//!                                                                 │ │
//!                     seq 3 response ◄────────────────────────────┘─┘
//!                     applied; seq 2 response arriving later is discarded
//! ```
//!
//! Sequences are per kind, so a product search never invalidates a pending
//! customer lookup. Section selections are sequenced the same way: only the
//! latest selection installs its price list.

use serde::Serialize;
use std::collections::HashMap;

use crate::sale::InstanceId;

/// Which debounced input a lookup belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    CustomerName,
    CustomerMobile,
    ProductSearch,
    SectionSelect,
}

/// Handle for one issued lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket {
    pub kind: LookupKind,
    pub seq: u64,
    /// Tab the result is meant for.
    pub instance: InstanceId,
}

/// Issues monotonically increasing sequence numbers per [`LookupKind`].
#[derive(Debug, Default)]
pub struct LookupSequencer {
    latest: HashMap<LookupKind, u64>,
}

impl LookupSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new ticket, superseding every earlier ticket of `kind`.
    pub fn issue(&mut self, kind: LookupKind, instance: InstanceId) -> LookupTicket {
        let seq = self.latest.entry(kind).or_insert(0);
        *seq += 1;
        LookupTicket {
            kind,
            seq: *seq,
            instance,
        }
    }

    /// True if no newer ticket of the same kind was issued.
    pub fn is_current(&self, ticket: &LookupTicket) -> bool {
        self.latest.get(&ticket.kind).copied() == Some(ticket.seq)
    }
}
