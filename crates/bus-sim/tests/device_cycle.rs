//! End-to-end tests for the simulated device
//!
//! These tests run the sequencer through the async loop with zero delays and
//! check what a host-side listener would observe:
//! - Status payload order within a cycle
//! - One Alive frame per cycle with a counter that increases by one
//! - Frames that survive the streaming decoder intact

use bus_protocol::{
    decode, DeviceStatus, FrameCodec, Message, MessageKind, ProtocolCodec, StatusPayload,
};
use bus_sim::{run_sequencer, DeviceSequencer, FixedClock, RecordingSink, SequencerConfig};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    /// Run `cycles` zero-delay cycles and return everything the sink saw
    pub async fn record_cycles(cycles: u64) -> RecordingSink {
        let mut sink = RecordingSink::new();
        let seq = DeviceSequencer::new(SequencerConfig::immediate());
        run_sequencer(seq, &mut sink, FixedClock(1_700_000_000), Some(cycles))
            .await
            .unwrap();
        sink
    }

    /// Decode every recorded frame into a typed message
    pub fn messages(sink: &RecordingSink) -> Vec<Message> {
        sink.frames()
            .map(|f| Message::from_frame(f).unwrap())
            .collect()
    }
}

#[tokio::test]
async fn test_every_frame_is_well_formed() {
    let sink = helpers::record_cycles(2).await;

    for frame in sink.frames() {
        assert_eq!(frame[0], 0x7E);
        assert_eq!(*frame.last().unwrap(), 0x7F);
        let (_, payload) = decode(frame).unwrap();
        assert_eq!(frame.len(), 3 + payload.len());
    }
}

#[tokio::test]
async fn test_cycle_payload_order() {
    let sink = helpers::record_cycles(1).await;

    let non_alive: Vec<(MessageKind, Vec<u8>)> = sink
        .frames()
        .map(|f| decode(f).unwrap())
        .filter(|(kind, _)| *kind != MessageKind::Alive)
        .collect();

    assert_eq!(
        non_alive,
        vec![
            (MessageKind::Status, vec![0, 0, 0, 0]),
            (MessageKind::Status, vec![1, 0, 0, 0]),
            (MessageKind::Ack, vec![0x14]),
            (MessageKind::Status, vec![0, 0, 0, 0]),
            (MessageKind::Status, vec![2, 5, 0, 0]),
            (MessageKind::Status, vec![0, 0, 0, 0]),
        ]
    );
}

#[tokio::test]
async fn test_alive_opens_each_cycle() {
    let sink = helpers::record_cycles(3).await;
    let messages = helpers::messages(&sink);

    assert_eq!(messages.len(), 21);
    for cycle in messages.chunks(7) {
        assert!(matches!(cycle[0], Message::Alive(_)));
        assert_eq!(
            cycle.iter().filter(|m| matches!(m, Message::Alive(_))).count(),
            1
        );
    }
}

#[tokio::test]
async fn test_alive_counter_sequence() {
    let sink = helpers::record_cycles(4).await;

    let counters: Vec<u16> = helpers::messages(&sink)
        .into_iter()
        .filter_map(|m| match m {
            Message::Alive(p) => Some(p.counter),
            _ => None,
        })
        .collect();

    assert_eq!(counters, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_alive_timestamp_truncated() {
    let sink = helpers::record_cycles(1).await;

    let messages = helpers::messages(&sink);
    let Message::Alive(alive) = &messages[0] else {
        panic!("first frame should be Alive");
    };
    assert_eq!(alive.timestamp, (1_700_000_000u64 & 0xFFFF) as u16);
}

#[tokio::test]
async fn test_error_status_reports_code() {
    let sink = helpers::record_cycles(1).await;

    let errors: Vec<_> = helpers::messages(&sink)
        .into_iter()
        .filter(|m| {
            matches!(
                m,
                Message::Status(StatusPayload {
                    state: DeviceStatus::Error,
                    ..
                })
            )
        })
        .collect();

    assert_eq!(errors, vec![Message::Status(StatusPayload::error(5))]);
}

#[tokio::test]
async fn test_stream_decodes_on_listener_side() {
    let sink = helpers::record_cycles(2).await;
    let stream: Vec<u8> = sink.frames().flatten().copied().collect();

    let mut codec = FrameCodec::new();
    let mut received = Vec::new();
    // Feed the listener in small uneven chunks
    for chunk in stream.chunks(5) {
        codec.push_bytes(chunk);
        while let Some((frame, bytes)) = codec.next_command_with_bytes() {
            assert_eq!(frame.kind().unwrap().as_byte(), bytes[1]);
            received.push(bytes);
        }
    }

    let sent: Vec<Vec<u8>> = sink.frames().map(|f| f.to_vec()).collect();
    assert_eq!(received, sent);
}
