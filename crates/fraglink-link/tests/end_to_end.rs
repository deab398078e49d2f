//! Full send → wire → receive scenarios across the three layers.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fraglink_binary::{BinaryReader, BinaryWriter};
use fraglink_frame::{parse_envelope, Assembler, Envelope, FrameKind};
use fraglink_link::{Link, LinkConfig, Packet, PacketHandler, PacketRegistry, Result};

#[derive(Debug, Clone, PartialEq)]
struct KeepAlive {
    name: String,
}

impl Packet for KeepAlive {
    fn type_id(&self) -> i32 {
        0
    }

    fn encode(&self, writer: &mut BinaryWriter) {
        writer.write_string(&self.name);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn decode_keep_alive(reader: &mut BinaryReader) -> Result<Box<dyn Packet>> {
    Ok(Box::new(KeepAlive {
        name: reader.read_string()?,
    }))
}

fn registry() -> Arc<PacketRegistry> {
    let registry = Arc::new(PacketRegistry::new());
    registry.register(0, decode_keep_alive);
    registry
}

/// A direct envelope is signature + type id + the packet's own fields;
/// a string field is an i32 length prefix plus its UTF-8 bytes.
const ENVELOPE_OVERHEAD: usize = 4 + 4 + 4;

#[test]
fn oversized_packet_chunks_into_header_and_sized_bodies() {
    let handler = PacketHandler::new(registry());
    let packet = KeepAlive {
        name: "k".repeat(100_000 - ENVELOPE_OVERHEAD),
    };

    let mut wire = Vec::new();
    handler
        .send_with_limit(&packet, 32_000, |bytes| wire.push(bytes))
        .unwrap();

    assert_eq!(wire.len(), 5);

    let mut body_sizes = Vec::new();
    let mut body_indices = Vec::new();
    for message in &wire {
        match parse_envelope(message).unwrap().unwrap() {
            Envelope::Framed(frame) => match frame.kind {
                FrameKind::Header {
                    total_size,
                    chunk_count,
                } => {
                    assert_eq!(total_size, 100_000);
                    assert_eq!(chunk_count, 4);
                }
                FrameKind::Body { index, data } => {
                    body_indices.push(index);
                    body_sizes.push(data.len());
                }
            },
            Envelope::Direct { .. } => panic!("oversized payload must not go direct"),
        }
    }
    assert_eq!(body_sizes, vec![32_000, 32_000, 32_000, 4_000]);
    assert_eq!(body_indices, vec![0, 1, 2, 3]);
}

#[test]
fn reverse_order_delivery_reconstructs_the_packet() {
    let handler = PacketHandler::new(registry());
    let packet = KeepAlive {
        name: "r".repeat(100_000 - ENVELOPE_OVERHEAD),
    };

    let mut wire = Vec::new();
    handler
        .send_with_limit(&packet, 32_000, |bytes| wire.push(bytes))
        .unwrap();
    wire.reverse();

    let assembler = Assembler::new();
    let received = Mutex::new(Vec::new());
    for message in &wire {
        handler.receive(message, &assembler, |decoded| {
            received
                .lock()
                .unwrap()
                .push(decoded.downcast_ref::<KeepAlive>().cloned());
        });
    }

    let received = received.into_inner().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].as_ref(), Some(&packet));
    assert_eq!(assembler.in_flight(), 0);
}

#[test]
fn small_packet_round_trips_directly() {
    let handler = PacketHandler::new(registry());
    let packet = KeepAlive {
        name: "ping".to_string(),
    };

    let mut wire = Vec::new();
    handler.send(&packet, |bytes| wire.push(bytes)).unwrap();
    assert_eq!(wire.len(), 1);

    let assembler = Assembler::new();
    let mut received = Vec::new();
    handler.receive(&wire[0], &assembler, |decoded| {
        received.push(decoded.downcast_ref::<KeepAlive>().cloned());
    });

    assert_eq!(received, vec![Some(packet)]);
    assert_eq!(assembler.in_flight(), 0);
}

#[test]
fn link_delivers_to_every_subscriber_in_order() {
    let link = Link::new();
    link.registry().register(0, decode_keep_alive);

    let log = Arc::new(Mutex::new(Vec::new()));
    for id in 0..3usize {
        let log = Arc::clone(&log);
        link.on_receive(move |packet| {
            if let Some(keep_alive) = packet.downcast_ref::<KeepAlive>() {
                log.lock().unwrap().push((id, keep_alive.name.clone()));
            }
        });
    }

    let mut wire = Vec::new();
    link.send(
        &KeepAlive {
            name: "fanout".to_string(),
        },
        |bytes| wire.push(bytes),
    )
    .unwrap();
    for message in wire {
        link.handle_message(&message);
    }

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            (0, "fanout".to_string()),
            (1, "fanout".to_string()),
            (2, "fanout".to_string()),
        ]
    );
}

#[test]
fn interrupted_transfer_is_evicted_then_restarts_clean() {
    let link = Link::with_config(LinkConfig {
        reassembly_timeout: std::time::Duration::from_millis(5),
        ..LinkConfig::default()
    });
    link.registry().register(0, decode_keep_alive);

    let delivered = Arc::new(AtomicUsize::new(0));
    {
        let delivered = Arc::clone(&delivered);
        link.on_receive(move |_packet| {
            delivered.fetch_add(1, Ordering::SeqCst);
        });
    }

    let packet = KeepAlive {
        name: "e".repeat(150_000),
    };
    let mut wire = Vec::new();
    link.send(&packet, |bytes| wire.push(bytes)).unwrap();

    // Deliver all but the last frame, stall past the timeout, evict.
    for message in &wire[..wire.len() - 1] {
        link.handle_message(message);
    }
    std::thread::sleep(std::time::Duration::from_millis(20));
    assert_eq!(link.cleanup(), 1);
    assert_eq!(delivered.load(Ordering::SeqCst), 0);

    // The straggler starts a brand-new entry; the old chunks are gone,
    // so even a full redelivery of the missing frame alone cannot
    // complete anything.
    link.handle_message(&wire[wire.len() - 1]);
    assert_eq!(delivered.load(Ordering::SeqCst), 0);
    assert_eq!(link.assembler().in_flight(), 1);

    // A complete redelivery finishes despite the duplicate frame.
    for message in &wire {
        link.handle_message(message);
    }
    assert_eq!(delivered.load(Ordering::SeqCst), 1);
}

#[test]
fn unrelated_traffic_between_fragments_is_harmless() {
    let handler = PacketHandler::new(registry());
    let packet = KeepAlive {
        name: "i".repeat(90_000),
    };

    let mut wire = Vec::new();
    handler
        .send_with_limit(&packet, 32_000, |bytes| wire.push(bytes))
        .unwrap();

    let assembler = Assembler::new();
    let mut received = Vec::new();
    for message in &wire {
        // Interleave garbage and foreign messages with real fragments.
        handler.receive(b"", &assembler, |_decoded| panic!("decoded garbage"));
        handler.receive(b"\x00\x00\x04\x57foreign", &assembler, |_decoded| {
            panic!("decoded foreign message")
        });
        handler.receive(message, &assembler, |decoded| {
            received.push(decoded.downcast_ref::<KeepAlive>().cloned());
        });
    }

    assert_eq!(received.len(), 1);
    assert_eq!(received[0].as_ref(), Some(&packet));
}
