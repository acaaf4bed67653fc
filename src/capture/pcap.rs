//! Capture container reading (classic libpcap and pcapng) via `pcap-parser`.
//!
//! A file whose header is not recognised is an input error. Once the header
//! is read, a truncated or garbled block ends the read; frames already
//! visited are kept.

use super::decode::LinkType;
use crate::error::{Result, SentinelError};
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{create_reader, Block, Linktype, PcapBlockOwned, PcapError};

/// Smallest reader buffer; a block larger than the buffer cannot be parsed.
const MIN_BUFFER: usize = 1 << 16;

/// A frame as stored in the capture, before link-layer decoding.
#[derive(Debug, Clone, Copy)]
pub struct RawFrame<'a> {
    pub ts: f64,
    pub link: LinkType,
    pub data: &'a [u8],
}

#[derive(Debug, Clone, Copy)]
struct Interface {
    link: LinkType,
    snaplen: u32,
    tick: f64,
    offset: f64,
}

fn link_type(l: Linktype) -> LinkType {
    // Upper bits of the classic header's link field carry FCS metadata.
    LinkType(l.0 as u32 & 0x0fff_ffff)
}

/// Seconds per timestamp unit for a pcapng `if_tsresol` value.
fn tsresol_tick(v: u8) -> f64 {
    if v & 0x80 == 0 {
        10f64.powi(-(v as i32))
    } else {
        2f64.powi(-((v & 0x7f) as i32))
    }
}

/// Container state carried between blocks.
#[derive(Debug, Default)]
struct Walker {
    legacy: Option<(LinkType, f64)>,
    interfaces: Vec<Interface>,
    frames: usize,
}

impl Walker {
    fn visit<F>(&mut self, block: &PcapBlockOwned<'_>, emit: &mut F)
    where
        F: FnMut(RawFrame<'_>),
    {
        let frame = match block {
            PcapBlockOwned::LegacyHeader(hdr) => {
                let tick = if hdr.is_nanosecond_precision() { 1e-9 } else { 1e-6 };
                self.legacy = Some((link_type(hdr.network), tick));
                return;
            }
            PcapBlockOwned::Legacy(b) => {
                let Some((link, tick)) = self.legacy else {
                    return;
                };
                RawFrame {
                    ts: b.ts_sec as f64 + b.ts_usec as f64 * tick,
                    link,
                    data: b.data,
                }
            }
            PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                self.interfaces.clear();
                return;
            }
            PcapBlockOwned::NG(Block::InterfaceDescription(idb)) => {
                self.interfaces.push(Interface {
                    link: link_type(idb.linktype),
                    snaplen: idb.snaplen,
                    tick: tsresol_tick(idb.if_tsresol),
                    offset: idb.if_tsoffset as f64,
                });
                return;
            }
            PcapBlockOwned::NG(Block::EnhancedPacket(epb)) => {
                let Some(iface) = self.interfaces.get(epb.if_id as usize).copied() else {
                    tracing::debug!(if_id = epb.if_id, "packet for undeclared interface");
                    return;
                };
                let units = ((epb.ts_high as u64) << 32) | epb.ts_low as u64;
                // Block data is padded to 32 bits.
                let data = epb.data.get(..epb.caplen as usize).unwrap_or(epb.data);
                RawFrame {
                    ts: iface.offset + units as f64 * iface.tick,
                    link: iface.link,
                    data,
                }
            }
            // Simple packet blocks carry no timestamp; they are stamped at zero.
            PcapBlockOwned::NG(Block::SimplePacket(spb)) => {
                let Some(iface) = self.interfaces.first().copied() else {
                    return;
                };
                let mut len = (spb.origlen as usize).min(spb.data.len());
                if iface.snaplen > 0 {
                    len = len.min(iface.snaplen as usize);
                }
                RawFrame {
                    ts: 0.0,
                    link: iface.link,
                    data: &spb.data[..len],
                }
            }
            _ => return,
        };
        self.frames += 1;
        emit(frame);
    }
}

/// Hand every frame of a pcap or pcapng capture to `emit`, in file order.
/// Returns the number of frames visited.
pub fn for_each_frame<F>(bytes: &[u8], mut emit: F) -> Result<usize>
where
    F: FnMut(RawFrame<'_>),
{
    if bytes.is_empty() {
        return Err(SentinelError::input("unable to read capture: empty file"));
    }
    let mut reader = create_reader(bytes.len().max(MIN_BUFFER), bytes).map_err(|e| {
        tracing::debug!(error = ?e, "capture header rejected");
        SentinelError::input("unable to read capture: not a pcap or pcapng file")
    })?;

    let mut walker = Walker::default();
    let mut stalled = false;
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                walker.visit(&block, &mut emit);
                reader.consume(offset);
                stalled = false;
            }
            Err(PcapError::Eof) => break,
            Err(PcapError::Incomplete(_)) => {
                if stalled {
                    tracing::debug!(frames = walker.frames, "truncated block, stopping");
                    break;
                }
                stalled = true;
                if let Err(e) = reader.refill() {
                    tracing::debug!(error = ?e, frames = walker.frames, "refill failed, stopping");
                    break;
                }
            }
            Err(e) => {
                tracing::debug!(error = ?e, frames = walker.frames, "unreadable block, stopping");
                break;
            }
        }
    }
    Ok(walker.frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAGIC_MICROS: u32 = 0xa1b2_c3d4;
    const MAGIC_NANOS: u32 = 0xa1b2_3c4d;
    const NG_SECTION_HEADER: u32 = 0x0a0d_0d0a;
    const NG_INTERFACE_DESCRIPTION: u32 = 0x0000_0001;
    const NG_ENHANCED_PACKET: u32 = 0x0000_0006;
    const NG_BYTE_ORDER_MAGIC: u32 = 0x1a2b_3c4d;

    fn collect(bytes: &[u8]) -> Result<Vec<(f64, LinkType, Vec<u8>)>> {
        let mut out = Vec::new();
        let n = for_each_frame(bytes, |f| out.push((f.ts, f.link, f.data.to_vec())))?;
        assert_eq!(n, out.len());
        Ok(out)
    }

    /// Little-endian classic capture; each frame is (sec, usec, original length, captured bytes).
    fn classic_le(frames: &[(u32, u32, u32, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC_MICROS.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&4u16.to_le_bytes());
        out.extend_from_slice(&0i32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&65535u32.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        for (sec, usec, orig, data) in frames {
            out.extend_from_slice(&sec.to_le_bytes());
            out.extend_from_slice(&usec.to_le_bytes());
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            out.extend_from_slice(&orig.to_le_bytes());
            out.extend_from_slice(data);
        }
        out
    }

    #[test]
    fn classic_timestamps_and_lengths() {
        let bytes = classic_le(&[(10, 500_000, 60, &[0u8; 60]), (11, 0, 42, &[0u8; 42])]);
        let frames = collect(&bytes).unwrap();
        assert_eq!(frames.len(), 2);
        assert!((frames[0].0 - 10.5).abs() < 1e-9);
        assert_eq!(frames[0].2.len(), 60);
        assert_eq!(frames[1].1, LinkType::ETHERNET);
    }

    #[test]
    fn snapped_records_keep_captured_bytes_only() {
        let bytes = classic_le(&[(1, 0, 1514, &[7u8; 96])]);
        let frames = collect(&bytes).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].2.len(), 96);
    }

    #[test]
    fn classic_big_endian_nanoseconds() {
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC_NANOS.to_be_bytes());
        out.extend_from_slice(&[0, 2, 0, 4]);
        out.extend_from_slice(&[0u8; 8]);
        out.extend_from_slice(&65535u32.to_be_bytes());
        out.extend_from_slice(&101u32.to_be_bytes());
        out.extend_from_slice(&3u32.to_be_bytes());
        out.extend_from_slice(&250_000_000u32.to_be_bytes());
        out.extend_from_slice(&4u32.to_be_bytes());
        out.extend_from_slice(&4u32.to_be_bytes());
        out.extend_from_slice(&[1, 2, 3, 4]);
        let frames = collect(&out).unwrap();
        assert_eq!(frames.len(), 1);
        assert!((frames[0].0 - 3.25).abs() < 1e-9);
        assert_eq!(frames[0].1, LinkType::RAW);
    }

    #[test]
    fn truncated_tail_keeps_complete_frames() {
        let mut bytes = classic_le(&[(1, 0, 20, &[0u8; 20]), (2, 0, 20, &[0u8; 20])]);
        bytes.truncate(bytes.len() - 5);
        let frames = collect(&bytes).unwrap();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(collect(b"hello world, not a capture"), Err(SentinelError::Input(_))));
        assert!(matches!(collect(&[]), Err(SentinelError::Input(_))));
    }

    #[test]
    fn tsresol_values() {
        assert_eq!(tsresol_tick(6), 1e-6);
        assert_eq!(tsresol_tick(9), 1e-9);
        assert_eq!(tsresol_tick(0x80 | 10), 1.0 / 1024.0);
    }

    fn ng_block(kind: u32, body: &[u8]) -> Vec<u8> {
        let mut padded = body.to_vec();
        while padded.len() % 4 != 0 {
            padded.push(0);
        }
        let len = (padded.len() + 12) as u32;
        let mut out = Vec::new();
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&padded);
        out.extend_from_slice(&len.to_le_bytes());
        out
    }

    #[test]
    fn pcapng_enhanced_packets_with_nanosecond_resolution() {
        let mut shb = Vec::new();
        shb.extend_from_slice(&NG_BYTE_ORDER_MAGIC.to_le_bytes());
        shb.extend_from_slice(&1u16.to_le_bytes());
        shb.extend_from_slice(&0u16.to_le_bytes());
        shb.extend_from_slice(&(-1i64).to_le_bytes());

        // linktype, reserved, snaplen, if_tsresol = 9, opt_endofopt
        let mut idb = Vec::new();
        idb.extend_from_slice(&1u16.to_le_bytes());
        idb.extend_from_slice(&0u16.to_le_bytes());
        idb.extend_from_slice(&0u32.to_le_bytes());
        idb.extend_from_slice(&9u16.to_le_bytes());
        idb.extend_from_slice(&1u16.to_le_bytes());
        idb.extend_from_slice(&[9, 0, 0, 0]);
        idb.extend_from_slice(&[0, 0, 0, 0]);

        let ts: u64 = 2_500_000_000;
        let mut epb = Vec::new();
        epb.extend_from_slice(&0u32.to_le_bytes());
        epb.extend_from_slice(&((ts >> 32) as u32).to_le_bytes());
        epb.extend_from_slice(&(ts as u32).to_le_bytes());
        epb.extend_from_slice(&5u32.to_le_bytes());
        epb.extend_from_slice(&5u32.to_le_bytes());
        epb.extend_from_slice(&[1, 2, 3, 4, 5]);

        let mut bytes = ng_block(NG_SECTION_HEADER, &shb);
        bytes.extend(ng_block(NG_INTERFACE_DESCRIPTION, &idb));
        bytes.extend(ng_block(NG_ENHANCED_PACKET, &epb));

        let frames = collect(&bytes).unwrap();
        assert_eq!(frames.len(), 1);
        assert!((frames[0].0 - 2.5).abs() < 1e-9);
        assert_eq!(frames[0].2, vec![1, 2, 3, 4, 5]);
        assert_eq!(frames[0].1, LinkType::ETHERNET);
    }
}
