//! Packet decoding: capture file bytes → packet records.
//! Container parsing lives in [`pcap`]; link/network/transport decoding in [`decode`].

mod decode;
mod pcap;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

pub use decode::LinkType;
pub use pcap::RawFrame;

/// Network-layer endpoints of a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IpHeader {
    pub src: IpAddr,
    pub dst: IpAddr,
}

/// TCP flags the flow statistics care about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpFlags {
    pub psh: bool,
    pub fin: bool,
}

/// One captured frame, decoded as far as the flow statistics need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketRecord {
    /// Capture timestamp, seconds
    pub ts: f64,
    /// Absent for ARP, unknown link types and undecodable frames
    pub ip: Option<IpHeader>,
    /// Captured frame length in bytes
    pub len: usize,
    /// Present when the packet carries a TCP header
    pub tcp: Option<TcpFlags>,
}

/// Decode every frame of a pcap or pcapng capture.
pub fn read_capture(bytes: &[u8]) -> Result<Vec<PacketRecord>> {
    let mut records = Vec::new();
    pcap::for_each_frame(bytes, |frame| records.push(decode::decode_frame(&frame)))?;
    let skipped = records.iter().filter(|r| r.ip.is_none()).count();
    tracing::debug!(frames = records.len(), non_ip = skipped, "capture decoded");
    Ok(records)
}
