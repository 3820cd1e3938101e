//! End-to-end wire tests.
//!
//! These tests feed raw packet bytes to a responder's dispatcher entry
//! point, the way a network listener would.

use atp::codec::{Frame, FrameFlags, HEADER_SIZE};
use atp::config::FramingConfig;
use atp::error::Result;
use atp::protocol::Responder;
use hex_literal::hex;

const HANDSHAKE: [u8; 20] = hex!("01 14 0400 00000000 00000000 00000000 00000000");
const GET_NEXT_FRAME: [u8; 20] = hex!("01 14 0800 00000000 00000000 00000000 00000000");

fn upper(request: &[u8]) -> Result<Vec<u8>> {
    Ok(request.to_ascii_uppercase())
}

fn responder(payload: usize) -> Responder<fn(&[u8]) -> Result<Vec<u8>>> {
    Responder::new(
        upper as fn(&[u8]) -> Result<Vec<u8>>,
        &FramingConfig::with_packet_size(HEADER_SIZE + payload),
    )
    .unwrap()
}

/// Test a single-frame transfer expressed entirely in bytes
#[test]
fn test_single_frame_exchange_bytes() {
    let mut rx = responder(16);

    let reply = rx.handle_packet(&HANDSHAKE).unwrap();
    assert_eq!(reply.as_ref(), &GET_NEXT_FRAME[..]);

    // DATA|LAST #1, offset 0, length 2, buffer 2, payload "hi"
    let request = hex!("01 14 0300 01000000 00000000 02000000 02000000 6869");
    let reply = rx.handle_packet(&request).unwrap();
    assert_eq!(
        reply.as_ref(),
        &hex!("01 14 0300 01000000 00000000 02000000 02000000 4849")[..]
    );
}

/// Test a multi-frame request and response driven by raw packets
#[test]
fn test_multi_frame_exchange_bytes() {
    let mut rx = responder(3);
    rx.handle_packet(&HANDSHAKE).unwrap();

    // "abcde" in frames of 3 + 2
    let first = hex!("01 14 0100 01000000 00000000 03000000 05000000 616263");
    let second = hex!("01 14 0300 02000000 03000000 02000000 05000000 6465");

    let reply = Frame::decode(&rx.handle_packet(&first).unwrap()).unwrap();
    assert!(reply.is_get_next_frame());

    let reply = Frame::decode(&rx.handle_packet(&second).unwrap()).unwrap();
    assert_eq!(reply.flags(), FrameFlags::new().with(FrameFlags::DATA));
    assert_eq!(reply.payload.as_ref(), b"ABC");
    assert_eq!(reply.header.buffer_length, 5);

    let reply = Frame::decode(&rx.handle_packet(&GET_NEXT_FRAME).unwrap()).unwrap();
    assert!(reply.is_last());
    assert_eq!(reply.header.frame_number, 2);
    assert_eq!(reply.header.frame_offset, 3);
    assert_eq!(reply.payload.as_ref(), b"DE");

    assert!(!rx.is_expecting_get_next_frame());
    assert_eq!(rx.stats().transfers_completed, 1);
}

/// Test that trailing transport padding after the payload is ignored
#[test]
fn test_trailing_padding_ignored() {
    let mut rx = responder(16);

    let padded = hex!("01 14 0300 01000000 00000000 02000000 02000000 6f6b 00000000");
    let reply = Frame::decode(&rx.handle_packet(&padded).unwrap()).unwrap();
    assert_eq!(reply.payload.as_ref(), b"OK");
}

/// Test that a longer declared header pushes the payload start forward
#[test]
fn test_extended_header_length() {
    let mut rx = responder(16);

    // header_length 24: four extension bytes before the payload
    let extended = hex!("01 18 0300 01000000 00000000 01000000 01000000 deadbeef 7a");
    let reply = Frame::decode(&rx.handle_packet(&extended).unwrap()).unwrap();
    assert_eq!(reply.payload.as_ref(), b"Z");
    assert_eq!(reply.header.header_length as usize, HEADER_SIZE);
}

/// Test that undecodable packets produce no reply and do not disturb state
#[test]
fn test_garbage_packets_rejected() {
    let mut rx = responder(3);
    let first = hex!("01 14 0100 01000000 00000000 03000000 05000000 616263");
    rx.handle_packet(&first).unwrap();
    assert!(rx.has_partial_request());

    // too short
    assert!(rx.handle_packet(&[0x01, 0x14, 0x01]).is_none());
    // wrong version
    assert!(rx
        .handle_packet(&hex!("02 14 0100 02000000 03000000 02000000 05000000 6465"))
        .is_none());
    // header length below minimum
    assert!(rx
        .handle_packet(&hex!("01 10 0100 02000000 03000000 02000000 05000000 6465"))
        .is_none());
    // payload shorter than frame_length
    assert!(rx
        .handle_packet(&hex!("01 14 0300 02000000 03000000 02000000 05000000 64"))
        .is_none());

    assert!(rx.has_partial_request());
    assert_eq!(rx.stats().failures, 4);

    let second = hex!("01 14 0300 02000000 03000000 02000000 05000000 6465");
    let reply = Frame::decode(&rx.handle_packet(&second).unwrap()).unwrap();
    assert_eq!(reply.payload.as_ref(), b"ABC");
}

/// Test that frames inconsistent with the transfer produce no reply
#[test]
fn test_inconsistent_frames_rejected() {
    let mut rx = responder(3);
    let first = hex!("01 14 0100 01000000 00000000 03000000 05000000 616263");
    rx.handle_packet(&first).unwrap();

    // buffer_length changes mid-transfer
    assert!(rx
        .handle_packet(&hex!("01 14 0300 02000000 03000000 02000000 06000000 6465"))
        .is_none());
    // frame runs past the end of the buffer
    assert!(rx
        .handle_packet(&hex!("01 14 0300 02000000 04000000 02000000 05000000 6465"))
        .is_none());
    // zero buffer_length
    assert!(rx
        .handle_packet(&hex!("01 14 0300 02000000 00000000 00000000 00000000"))
        .is_none());

    assert!(rx.has_partial_request());
    assert_eq!(rx.stats().failures, 3);
}
