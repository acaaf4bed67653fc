//! Link-layer frame → [`PacketRecord`] via etherparse.
//!
//! Slicing is lax: a frame cut short by the capture snaplen still yields its
//! IP endpoints, and TCP flags when the TCP header was captured.

use super::pcap::RawFrame;
use super::{IpHeader, PacketRecord, TcpFlags};
use etherparse::{LaxNetSlice, LaxSlicedPacket, TransportSlice};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Capture link-layer header type (tcpdump LINKTYPE_* value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkType(pub u32);

impl LinkType {
    pub const NULL: LinkType = LinkType(0);
    pub const ETHERNET: LinkType = LinkType(1);
    pub const RAW: LinkType = LinkType(101);
    pub const LOOP: LinkType = LinkType(108);
    pub const LINUX_SLL: LinkType = LinkType(113);
    pub const IPV4: LinkType = LinkType(228);
    pub const IPV6: LinkType = LinkType(229);
}

const SLL_HEADER_LEN: usize = 16;
const ETHERTYPE_IPV4: u16 = 0x0800;
const ETHERTYPE_IPV6: u16 = 0x86dd;

fn slice<'a>(frame: &RawFrame<'a>) -> Option<LaxSlicedPacket<'a>> {
    let data = frame.data;
    match frame.link {
        LinkType::ETHERNET => LaxSlicedPacket::from_ethernet(data).ok(),
        LinkType::RAW | LinkType::IPV4 | LinkType::IPV6 => LaxSlicedPacket::from_ip(data).ok(),
        // 4-byte address family header
        LinkType::NULL | LinkType::LOOP => LaxSlicedPacket::from_ip(data.get(4..)?).ok(),
        LinkType::LINUX_SLL => {
            let proto = u16::from_be_bytes([*data.get(14)?, *data.get(15)?]);
            if proto != ETHERTYPE_IPV4 && proto != ETHERTYPE_IPV6 {
                return None;
            }
            LaxSlicedPacket::from_ip(data.get(SLL_HEADER_LEN..)?).ok()
        }
        _ => None,
    }
}

pub(super) fn decode_frame(frame: &RawFrame<'_>) -> PacketRecord {
    let sliced = slice(frame);

    let ip = sliced.as_ref().and_then(|s| match &s.net {
        Some(LaxNetSlice::Ipv4(v4)) => {
            let h = v4.header();
            Some(IpHeader {
                src: IpAddr::V4(h.source_addr()),
                dst: IpAddr::V4(h.destination_addr()),
            })
        }
        Some(LaxNetSlice::Ipv6(v6)) => {
            let h = v6.header();
            Some(IpHeader {
                src: IpAddr::V6(h.source_addr()),
                dst: IpAddr::V6(h.destination_addr()),
            })
        }
        _ => None,
    });

    let tcp = sliced.as_ref().and_then(|s| match &s.transport {
        Some(TransportSlice::Tcp(t)) => Some(TcpFlags {
            psh: t.psh(),
            fin: t.fin(),
        }),
        _ => None,
    });

    PacketRecord {
        ts: frame.ts,
        ip,
        len: frame.data.len(),
        tcp,
    }
}
