//! Unidirectional flow aggregation: packets grouped by (source, destination).
//!
//! Reverse-direction packets form their own flow, so the backward counters
//! stay zero. That matches existing producers of this feature schema and is
//! kept for compatibility even though it leaves the backward fields unused.

use crate::capture::{IpHeader, PacketRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

/// Ordered (source, destination) pair. Not normalized across directions.
// TODO: key by the unordered endpoint pair and fill the backward counters once
// trained models expect non-zero backward features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowKey {
    pub src: IpAddr,
    pub dst: IpAddr,
}

impl From<IpHeader> for FlowKey {
    fn from(h: IpHeader) -> Self {
        Self { src: h.src, dst: h.dst }
    }
}

/// Running statistics for one flow during a single aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowAggregate {
    pub first_seen: f64,
    /// Timestamp of the most recently processed packet, in arrival order
    pub last_seen: f64,
    pub fwd_packets: u64,
    /// Always 0 under unidirectional keying
    pub bwd_packets: u64,
    pub fwd_bytes: u64,
    pub fwd_max_len: u64,
    pub psh_count: u64,
    pub fin_count: u64,
}

impl FlowAggregate {
    fn new(ts: f64) -> Self {
        Self {
            first_seen: ts,
            last_seen: ts,
            fwd_packets: 0,
            bwd_packets: 0,
            fwd_bytes: 0,
            fwd_max_len: 0,
            psh_count: 0,
            fin_count: 0,
        }
    }

    fn push(&mut self, pkt: &PacketRecord) {
        let len = pkt.len as u64;
        self.last_seen = pkt.ts;
        self.fwd_packets += 1;
        self.fwd_bytes += len;
        self.fwd_max_len = self.fwd_max_len.max(len);
        if let Some(flags) = pkt.tcp {
            if flags.psh {
                self.psh_count += 1;
            }
            if flags.fin {
                self.fin_count += 1;
            }
        }
    }

    /// Seconds between first and last packet; never negative.
    pub fn duration(&self) -> f64 {
        (self.last_seen - self.first_seen).max(0.0)
    }
}

/// Flow table for one pass, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct FlowTable {
    index: HashMap<FlowKey, usize>,
    flows: Vec<(FlowKey, FlowAggregate)>,
    skipped: usize,
}

impl FlowTable {
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn get(&self, key: &FlowKey) -> Option<&FlowAggregate> {
        self.index.get(key).map(|&i| &self.flows[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FlowKey, &FlowAggregate)> {
        self.flows.iter().map(|(k, f)| (k, f))
    }

    /// Packets that carried no IP header.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Groups packets into flows. Holds no state between passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowAggregator;

impl FlowAggregator {
    pub fn aggregate<'a, I>(&self, packets: I) -> FlowTable
    where
        I: IntoIterator<Item = &'a PacketRecord>,
    {
        let mut table = FlowTable::default();
        for pkt in packets {
            let Some(ip) = pkt.ip else {
                table.skipped += 1;
                continue;
            };
            let key = FlowKey::from(ip);
            let slot = match table.index.get(&key) {
                Some(&i) => i,
                None => {
                    table.flows.push((key, FlowAggregate::new(pkt.ts)));
                    table.index.insert(key, table.flows.len() - 1);
                    table.flows.len() - 1
                }
            };
            table.flows[slot].1.push(pkt);
        }
        if table.skipped > 0 {
            tracing::debug!(skipped = table.skipped, "non-IP packets ignored");
        }
        tracing::debug!(flows = table.len(), "aggregation pass complete");
        table
    }
}
