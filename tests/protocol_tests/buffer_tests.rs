//! Tests for ReceiveBuffer
//!
//! These tests verify:
//! - Draining several complete frames from one read
//! - Keeping partial varints and partial bodies across reads
//! - Reading chunks from a stream
//! - Fatal errors on corrupt input

use std::io::Cursor;

use kvbridge::protocol::{
    encode, Command, CommandRequest, ReceiveBuffer, RequestBody, RequestType, DEFAULT_BUFFER_SIZE,
};
use kvbridge::BridgeError;

// =============================================================================
// Helper Functions
// =============================================================================

fn get_request(idx: u32, key: &str) -> CommandRequest {
    CommandRequest::new(
        idx,
        RequestBody::Single(Command::new(RequestType::Get).arg(key)),
        None,
    )
}

fn set_request(idx: u32, key: &str, value: &str) -> CommandRequest {
    CommandRequest::new(
        idx,
        RequestBody::Single(Command::new(RequestType::Set).arg(key).arg(value)),
        None,
    )
}

fn first_arg(request: &CommandRequest) -> &[u8] {
    match &request.body {
        RequestBody::Single(command) => &command.args[0],
        RequestBody::Batch(_) => panic!("Expected single command"),
    }
}

// =============================================================================
// Basic Tests
// =============================================================================

#[test]
fn test_default_capacity() {
    let mut buffer = ReceiveBuffer::default();
    assert!(buffer.is_empty());
    assert!(buffer.current_buffer().capacity() >= DEFAULT_BUFFER_SIZE);
}

#[test]
fn test_empty_buffer_has_no_messages() {
    let mut buffer = ReceiveBuffer::with_capacity(16);
    assert!(buffer.next_message::<CommandRequest>().unwrap().is_none());
    assert!(buffer.drain_messages::<CommandRequest>().unwrap().is_empty());
}

#[test]
fn test_drain_two_requests() {
    let mut buffer = ReceiveBuffer::with_capacity(50);
    buffer.extend_from_slice(&encode(&get_request(100, "key")).unwrap());
    buffer.extend_from_slice(&encode(&set_request(5, "key", "value")).unwrap());

    let requests = buffer.drain_messages::<CommandRequest>().unwrap();

    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], get_request(100, "key"));
    assert_eq!(requests[1], set_request(5, "key", "value"));
    assert!(buffer.is_empty());
}

#[test]
fn test_repeated_reads_from_same_buffer() {
    let mut buffer = ReceiveBuffer::with_capacity(50);

    buffer.extend_from_slice(&encode(&get_request(100, "key")).unwrap());
    let requests = buffer.drain_messages::<CommandRequest>().unwrap();
    assert_eq!(requests, vec![get_request(100, "key")]);

    buffer.extend_from_slice(&encode(&set_request(5, "key", "value")).unwrap());
    let requests = buffer.drain_messages::<CommandRequest>().unwrap();
    assert_eq!(requests, vec![set_request(5, "key", "value")]);
}

// =============================================================================
// Partial Frame Tests
// =============================================================================

#[test]
fn test_full_message_then_partial_message() {
    const SPLIT_AT: usize = 2;
    let mut buffer = ReceiveBuffer::with_capacity(24);
    buffer.extend_from_slice(&encode(&get_request(100, "key1")).unwrap());

    let second = encode(&get_request(101, "key2")).unwrap();
    buffer.extend_from_slice(&second[..SPLIT_AT]);

    let requests = buffer.drain_messages::<CommandRequest>().unwrap();
    assert_eq!(requests, vec![get_request(100, "key1")]);
    assert_eq!(buffer.len(), SPLIT_AT);

    buffer.extend_from_slice(&second[SPLIT_AT..]);
    let requests = buffer.drain_messages::<CommandRequest>().unwrap();
    assert_eq!(requests, vec![get_request(101, "key2")]);
    assert!(buffer.is_empty());
}

#[test]
fn test_split_varint_length() {
    let key = "k".repeat(10_000);
    let frame = encode(&get_request(100, &key)).unwrap();
    // Long enough that the length prefix spans several bytes
    assert!(frame[0] & 0x80 != 0);

    let mut buffer = ReceiveBuffer::with_capacity(24);
    buffer.extend_from_slice(&frame[..1]);
    assert!(buffer.next_message::<CommandRequest>().unwrap().is_none());
    assert_eq!(buffer.len(), 1);

    buffer.extend_from_slice(&frame[1..]);
    let request = buffer.next_message::<CommandRequest>().unwrap().unwrap();
    assert_eq!(request.callback_idx, 100);
    assert_eq!(first_arg(&request), key.as_bytes());
}

#[test]
fn test_split_varint_after_full_message() {
    let key = "k".repeat(10_000);
    let second = encode(&get_request(101, &key)).unwrap();

    let mut buffer = ReceiveBuffer::with_capacity(24);
    buffer.extend_from_slice(&encode(&get_request(100, "key1")).unwrap());
    buffer.extend_from_slice(&second[..1]);

    let requests = buffer.drain_messages::<CommandRequest>().unwrap();
    assert_eq!(requests, vec![get_request(100, "key1")]);
    assert_eq!(buffer.len(), 1);

    buffer.extend_from_slice(&second[1..]);
    let requests = buffer.drain_messages::<CommandRequest>().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(first_arg(&requests[0]), key.as_bytes());
}

#[test]
fn test_byte_at_a_time_delivery() {
    let mut stream = Vec::new();
    for idx in 0..5u32 {
        stream.extend_from_slice(&encode(&set_request(idx, "key", "value")).unwrap());
    }

    let mut buffer = ReceiveBuffer::with_capacity(8);
    let mut received = Vec::new();
    for byte in stream {
        buffer.extend_from_slice(&[byte]);
        received.extend(buffer.drain_messages::<CommandRequest>().unwrap());
    }

    let indices: Vec<u32> = received.iter().map(|r| r.callback_idx).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    assert!(buffer.is_empty());
}

// =============================================================================
// Stream Reading Tests
// =============================================================================

#[test]
fn test_read_from_in_small_chunks() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&encode(&get_request(1, "alpha")).unwrap());
    bytes.extend_from_slice(&encode(&get_request(2, "beta")).unwrap());
    let total = bytes.len();
    let mut reader = Cursor::new(bytes);

    let mut buffer = ReceiveBuffer::with_capacity(4);
    let mut received = Vec::new();
    let mut read_total = 0;
    loop {
        let n = buffer.read_from(&mut reader, 3).unwrap();
        if n == 0 {
            break;
        }
        assert!(n <= 3);
        read_total += n;
        received.extend(buffer.drain_messages::<CommandRequest>().unwrap());
    }

    assert_eq!(read_total, total);
    assert_eq!(received, vec![get_request(1, "alpha"), get_request(2, "beta")]);
}

#[test]
fn test_read_from_eof_keeps_buffer() {
    let frame = encode(&get_request(1, "alpha")).unwrap();
    let mut buffer = ReceiveBuffer::with_capacity(16);
    buffer.extend_from_slice(&frame[..3]);

    let mut reader = Cursor::new(Vec::<u8>::new());
    assert_eq!(buffer.read_from(&mut reader, 64).unwrap(), 0);
    assert_eq!(buffer.len(), 3);
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_corrupt_prefix_is_fatal() {
    let mut buffer = ReceiveBuffer::with_capacity(16);
    buffer.extend_from_slice(&[0xFF; 12]);

    let err = buffer.next_message::<CommandRequest>().unwrap_err();
    assert!(matches!(err, BridgeError::CorruptFrame(_)));
}

#[test]
fn test_undecodable_body_is_fatal() {
    let mut buffer = ReceiveBuffer::with_capacity(16);
    buffer.extend_from_slice(&encode(&vec![0xFFu8; 4]).unwrap());

    let err = buffer.drain_messages::<CommandRequest>().unwrap_err();
    assert!(matches!(err, BridgeError::Serialization(_)));
}
