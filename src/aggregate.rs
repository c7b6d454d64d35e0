//! Cross-frame sequence aggregation.
//!
//! Folds [`DecodedFrame`]s in strict capture order into derived events:
//! inter-frame time and vendor-timestamp deltas, SDO request/response
//! pairing, and the warning cases (orphan responses, overwritten pending
//! requests, aborts). All state lives in the aggregator struct; nothing is
//! global, so the fold is testable with constructed input sequences.

use std::collections::HashMap;

use smallvec::SmallVec;
use tracing::warn;

use crate::frame::DecodedFrame;
use crate::mailbox::SdoCommand;

/// Aggregator configuration.
#[derive(Debug, Clone)]
pub struct AggregateConfig {
    /// Request/response round trips slower than this are flagged on the
    /// emitted pair (milliseconds).
    pub slow_response_threshold_ms: f64,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            slow_response_threshold_ms: 100.0,
        }
    }
}

/// Key identifying an outstanding SDO exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SdoKey {
    pub object_index: u16,
    pub object_subindex: u8,
    /// Logical address of the datagram carrying the exchange.
    pub log_addr: u32,
}

/// A pending SDO request waiting for its response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSdo {
    pub frame: u64,
    pub time: f64,
    pub command: SdoCommand,
}

/// Derived event emitted while folding the frame stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceEvent {
    /// Per-frame deltas against the previous frame. Either member is `None`
    /// on the first frame or when a vendor timestamp is missing.
    FrameDeltas {
        frame: u64,
        /// Capture-time delta in milliseconds.
        time_delta_ms: Option<f64>,
        /// Vendor-timestamp delta in milliseconds (ticks are microseconds).
        ticks_delta_ms: Option<f64>,
    },
    /// A matched SDO request/response pair.
    SdoPair {
        key: SdoKey,
        request_frame: u64,
        response_frame: u64,
        /// `response_time - request_time`, milliseconds.
        response_time_ms: f64,
        /// True when the round trip exceeded the configured threshold.
        slow: bool,
    },
    /// A response arrived with no pending request under its key.
    OrphanResponse { key: SdoKey, frame: u64 },
    /// A pending request was overwritten by a newer one before any
    /// response arrived.
    UnansweredRequest { key: SdoKey, request: PendingSdo },
    /// An SDO Abort Transfer was observed.
    SdoAbort { key: Option<SdoKey>, frame: u64 },
}

/// Events produced by one frame; rarely more than a handful.
pub type EventBatch = SmallVec<[SequenceEvent; 4]>;

/// Stateful, order-dependent reducer over the decoded frame stream.
///
/// Must be fed frames in strict capture order; upstream decoding may run in
/// parallel as long as results are re-ordered before ingestion.
#[derive(Debug, Default)]
pub struct SequenceAggregator {
    config: AggregateConfig,
    previous_time: Option<f64>,
    previous_ticks: Option<u64>,
    pending: HashMap<SdoKey, PendingSdo>,
}

impl SequenceAggregator {
    pub fn new(config: AggregateConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Fold one frame into the running state, returning the derived events.
    pub fn ingest(&mut self, frame: &DecodedFrame) -> EventBatch {
        let mut events = EventBatch::new();

        let time_delta_ms = self.previous_time.map(|prev| (frame.time - prev) * 1000.0);
        let ticks = frame.ticks();
        let ticks_delta_ms = match (ticks, self.previous_ticks) {
            (Some(cur), Some(prev)) => Some((cur as f64 - prev as f64) / 1000.0),
            _ => None,
        };
        self.previous_time = Some(frame.time);
        self.previous_ticks = ticks;

        events.push(SequenceEvent::FrameDeltas {
            frame: frame.number,
            time_delta_ms,
            ticks_delta_ms,
        });

        for (pos, mb) in &frame.mailbox {
            let Some(coe) = mb.coe.as_ref() else { continue };
            let Some(command) = coe.command else { continue };
            let key = match (coe.object_index, coe.object_subindex) {
                (Some(index), Some(subindex)) => Some(SdoKey {
                    object_index: index,
                    object_subindex: subindex,
                    log_addr: frame.datagrams[*pos].log_addr(),
                }),
                _ => None,
            };

            if command == SdoCommand::AbortTransfer {
                warn!(frame = frame.number, ?key, "SDO abort transfer");
                events.push(SequenceEvent::SdoAbort {
                    key,
                    frame: frame.number,
                });
                continue;
            }

            let Some(key) = key else { continue };

            if command.is_request() {
                let pending = PendingSdo {
                    frame: frame.number,
                    time: frame.time,
                    command,
                };
                // A newer request under the same key supersedes the old one;
                // the old one is reported, never dropped silently.
                if let Some(prior) = self.pending.insert(key, pending) {
                    warn!(
                        frame = prior.frame,
                        index = format_args!("{:#06x}", key.object_index),
                        "SDO request superseded before a response arrived"
                    );
                    events.push(SequenceEvent::UnansweredRequest { key, request: prior });
                }
            } else if command.is_response() {
                match self.pending.remove(&key) {
                    Some(request) => {
                        let response_time_ms = (frame.time - request.time) * 1000.0;
                        events.push(SequenceEvent::SdoPair {
                            key,
                            request_frame: request.frame,
                            response_frame: frame.number,
                            response_time_ms,
                            slow: response_time_ms > self.config.slow_response_threshold_ms,
                        });
                    }
                    None => {
                        warn!(
                            frame = frame.number,
                            index = format_args!("{:#06x}", key.object_index),
                            "orphan SDO response"
                        );
                        events.push(SequenceEvent::OrphanResponse {
                            key,
                            frame: frame.number,
                        });
                    }
                }
            }
        }

        events
    }

    /// Requests still outstanding after the stream ends.
    pub fn outstanding(&self) -> impl Iterator<Item = (&SdoKey, &PendingSdo)> {
        self.pending.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    use crate::frame::datagram::cmd;
    use crate::frame::{DecodedFrame, Datagram, EtherCatHeader, HeaderVariant};
    use crate::mailbox::decode_mailbox;

    fn sdo_frame(number: u64, time: f64, specifier: u8, ticks: Option<u64>) -> DecodedFrame {
        let payload = vec![
            0x0a, 0x00, // mailbox length
            0xe9, 0x03, // station address
            0x01, 0x00, // CoE, counter 0
            0x00, 0x20, // CoE header, service 2
            specifier, 0x18, 0x10, 0x02, // specifier, index 0x1018, sub 0x02
        ];
        let dg = Datagram {
            cmd: cmd::FPWR,
            index: 0,
            adp: 0x03e9,
            ado: 0x1100,
            last_indicator: true,
            round_trip: false,
            reserved: 0,
            data_length: payload.len() as u16,
            interrupt: 0,
            data: Bytes::from(payload),
            working_counter: 1,
        };
        let mailbox = decode_mailbox(&dg).map(|mb| (0, mb)).into_iter().collect();
        DecodedFrame {
            number,
            time,
            header: EtherCatHeader::from_word(0x1000, HeaderVariant::ReservedOne),
            datagrams: vec![dg],
            truncated: false,
            pad: Bytes::new(),
            timestamp: ticks.map(|t| crate::timestamp::VendorTimestamp {
                raw: Bytes::new(),
                is_extended_mode: false,
                ticks: t,
                byte_order_note: "",
            }),
            mailbox,
        }
    }

    fn pairs(events: &[SequenceEvent]) -> Vec<&SequenceEvent> {
        events
            .iter()
            .filter(|e| matches!(e, SequenceEvent::SdoPair { .. }))
            .collect()
    }

    #[test]
    fn test_first_frame_deltas_are_none() {
        let mut agg = SequenceAggregator::default();
        let events = agg.ingest(&sdo_frame(1, 0.0, 0x23, None));
        assert!(matches!(
            events[0],
            SequenceEvent::FrameDeltas {
                time_delta_ms: None,
                ticks_delta_ms: None,
                ..
            }
        ));
    }

    #[test]
    fn test_time_and_ticks_deltas() {
        let mut agg = SequenceAggregator::default();
        agg.ingest(&sdo_frame(1, 1.0, 0x23, Some(5_000)));
        let events = agg.ingest(&sdo_frame(2, 1.25, 0x23, Some(8_000)));
        match &events[0] {
            SequenceEvent::FrameDeltas {
                time_delta_ms,
                ticks_delta_ms,
                ..
            } => {
                assert!((time_delta_ms.unwrap() - 250.0).abs() < 1e-6);
                assert!((ticks_delta_ms.unwrap() - 3.0).abs() < 1e-9);
            }
            other => panic!("expected deltas, got {other:?}"),
        }
    }

    #[test]
    fn test_request_response_pairing() {
        let mut agg = SequenceAggregator::default();
        agg.ingest(&sdo_frame(1, 0.000, 0x23, None)); // download request
        let events = agg.ingest(&sdo_frame(2, 0.050, 0x30, None)); // response

        let pairs = pairs(&events);
        assert_eq!(pairs.len(), 1);
        match pairs[0] {
            SequenceEvent::SdoPair {
                request_frame,
                response_frame,
                response_time_ms,
                slow,
                ..
            } => {
                assert_eq!(*request_frame, 1);
                assert_eq!(*response_frame, 2);
                assert!((response_time_ms - 50.0).abs() < 1e-6);
                assert!(!slow);
            }
            _ => unreachable!(),
        }
        assert_eq!(agg.outstanding().count(), 0);
    }

    #[test]
    fn test_slow_response_flagged() {
        let mut agg = SequenceAggregator::default();
        agg.ingest(&sdo_frame(1, 0.0, 0x23, None));
        let events = agg.ingest(&sdo_frame(2, 0.250, 0x30, None));
        assert!(matches!(
            pairs(&events)[0],
            SequenceEvent::SdoPair { slow: true, .. }
        ));
    }

    #[test]
    fn test_orphan_response_reported() {
        let mut agg = SequenceAggregator::default();
        let events = agg.ingest(&sdo_frame(1, 0.0, 0x30, None));
        assert!(events
            .iter()
            .any(|e| matches!(e, SequenceEvent::OrphanResponse { frame: 1, .. })));
    }

    #[test]
    fn test_superseded_request_reported() {
        let mut agg = SequenceAggregator::default();
        agg.ingest(&sdo_frame(1, 0.0, 0x23, None));
        let events = agg.ingest(&sdo_frame(2, 0.1, 0x23, None));
        match events
            .iter()
            .find(|e| matches!(e, SequenceEvent::UnansweredRequest { .. }))
        {
            Some(SequenceEvent::UnansweredRequest { request, .. }) => {
                assert_eq!(request.frame, 1);
            }
            other => panic!("expected unanswered request, got {other:?}"),
        }
        // The newer request still pairs with a later response.
        let events = agg.ingest(&sdo_frame(3, 0.2, 0x30, None));
        assert_eq!(pairs(&events).len(), 1);
    }

    #[test]
    fn test_abort_emits_event() {
        let mut agg = SequenceAggregator::default();
        let events = agg.ingest(&sdo_frame(1, 0.0, 0x80, None));
        assert!(events
            .iter()
            .any(|e| matches!(e, SequenceEvent::SdoAbort { frame: 1, .. })));
    }

    #[test]
    fn test_missing_timestamp_resets_ticks_delta() {
        let mut agg = SequenceAggregator::default();
        agg.ingest(&sdo_frame(1, 0.0, 0x23, Some(1_000)));
        agg.ingest(&sdo_frame(2, 0.1, 0x23, None));
        let events = agg.ingest(&sdo_frame(3, 0.2, 0x23, Some(4_000)));
        match &events[0] {
            SequenceEvent::FrameDeltas { ticks_delta_ms, .. } => {
                // Frame 2 had no timestamp, so frame 3 has nothing to
                // compare against.
                assert_eq!(*ticks_delta_ms, None);
            }
            _ => unreachable!(),
        }
    }
}
