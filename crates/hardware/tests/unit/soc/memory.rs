//! # RAM Tests
//!
//! Bounds checking, little-endian composition of sized accesses, bulk copies and sharing of
//! one RAM between threads.

use std::sync::Arc;
use std::sync::Barrier;
use std::thread;

use mr32sim_core::common::{AccessType, MemoryError};
use mr32sim_core::soc::Memory;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

const SIZE: u64 = 4096;

fn ram() -> Memory {
    Memory::new(SIZE).unwrap()
}

#[test]
fn fresh_memory_reads_zero() {
    let m = ram();
    assert_eq!(m.capacity(), SIZE);
    assert_eq!(m.load32(0).unwrap(), 0);
    assert_eq!(m.load32(SIZE as u32 - 4).unwrap(), 0);
}

#[rstest]
#[case(0)]
#[case((1 << 32) + 1)]
fn rejects_invalid_capacity(#[case] size: u64) {
    assert!(matches!(Memory::new(size), Err(MemoryError::InvalidSize(s)) if s == size));
}

#[test]
fn word_store_is_little_endian() {
    let m = ram();
    m.store32(0x10, 0x1122_3344).unwrap();
    assert_eq!(m.load8(0x10).unwrap(), 0x44);
    assert_eq!(m.load8(0x13).unwrap(), 0x11);
    assert_eq!(m.load16(0x10).unwrap(), 0x3344);
    assert_eq!(m.load16(0x12).unwrap(), 0x1122);
    assert_eq!(m.read_bytes(0x10, 4).unwrap(), vec![0x44, 0x33, 0x22, 0x11]);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
fn unaligned_word_spans_two_words(#[case] offset: u32) {
    let m = ram();
    let addr = 0x100 + offset;
    m.store32(addr, 0xDEAD_BEEF).unwrap();
    assert_eq!(m.load32(addr).unwrap(), 0xDEAD_BEEF);
    // Neighbouring bytes stay untouched.
    assert_eq!(m.load8(addr - 1).unwrap(), 0);
    assert_eq!(m.load8(addr + 4).unwrap(), 0);
}

#[test]
fn unaligned_half_across_word_boundary() {
    let m = ram();
    m.store32(0x20, 0xAABB_CCDD).unwrap();
    m.store32(0x24, 0x1122_3344).unwrap();
    assert_eq!(m.load16(0x23).unwrap(), 0x44AA);
    m.store16(0x23, 0x5566).unwrap();
    assert_eq!(m.load32(0x20).unwrap(), 0x66BB_CCDD);
    assert_eq!(m.load32(0x24).unwrap(), 0x1122_3355);
}

#[test]
fn signed_loads_sign_extend() {
    let m = ram();
    m.store8(0, 0x80).unwrap();
    m.store16(2, 0x8001).unwrap();
    assert_eq!(m.load8_signed(0).unwrap(), 0xFFFF_FF80);
    assert_eq!(m.load16_signed(2).unwrap(), 0xFFFF_8001);
    m.store8(4, 0x7F).unwrap();
    assert_eq!(m.load8_signed(4).unwrap(), 0x7F);
}

#[test]
fn byte_store_preserves_rest_of_word() {
    let m = ram();
    m.store32(0x40, 0xFFFF_FFFF).unwrap();
    m.store8(0x41, 0x00).unwrap();
    assert_eq!(m.load32(0x40).unwrap(), 0xFFFF_00FF);
}

#[rstest]
#[case(SIZE as u32, 1)]
#[case(SIZE as u32 - 1, 2)]
#[case(SIZE as u32 - 3, 4)]
#[case(u32::MAX, 1)]
#[case(u32::MAX - 1, 4)]
fn out_of_bounds_access_is_reported(#[case] addr: u32, #[case] width: u64) {
    let m = ram();
    let err = match width {
        1 => m.store8(addr, 0xAA).unwrap_err(),
        2 => m.store16(addr, 0xAAAA).unwrap_err(),
        _ => m.store32(addr, 0xAAAA_AAAA).unwrap_err(),
    };
    match err {
        MemoryError::OutOfBounds {
            addr: a,
            width: w,
            capacity,
            access,
        } => {
            assert_eq!(a, u64::from(addr));
            assert_eq!(w, width);
            assert_eq!(capacity, SIZE);
            assert_eq!(access, AccessType::Write);
        }
        other => panic!("unexpected error {other:?}"),
    }
    // The in-bounds bytes at the end of RAM are not partially written.
    assert_eq!(m.read_bytes(SIZE - 4, 4).unwrap(), vec![0; 4]);
}

#[test]
fn last_byte_is_addressable() {
    let m = ram();
    m.store8(SIZE as u32 - 1, 0x5A).unwrap();
    assert_eq!(m.load8(SIZE as u32 - 1).unwrap(), 0x5A);
    m.store32(SIZE as u32 - 4, 7).unwrap();
    assert!(m.load32(SIZE as u32 - 3).is_err());
    assert!(m.fetch32(SIZE as u32 - 2).is_err());
}

#[test]
fn capacity_not_a_multiple_of_four() {
    let m = Memory::new(10).unwrap();
    m.store16(8, 0xBEEF).unwrap();
    assert_eq!(m.load16(8).unwrap(), 0xBEEF);
    assert!(m.load8(10).is_err());
    assert!(m.load32(8).is_err());
}

#[test]
fn write_bytes_checks_whole_range_first() {
    let m = ram();
    let err = m.write_bytes(SIZE - 2, &[1, 2, 3, 4]).unwrap_err();
    assert!(matches!(err, MemoryError::OutOfBounds { addr, width: 4, .. } if addr == SIZE - 2));
    assert_eq!(m.read_bytes(SIZE - 2, 2).unwrap(), vec![0, 0]);
}

#[test]
fn bulk_copy_round_trips_at_odd_offsets() {
    let m = ram();
    let data: Vec<u8> = (0..=255).collect();
    m.write_bytes(0x123, &data).unwrap();
    assert_eq!(m.read_bytes(0x123, 256).unwrap(), data);
    assert_eq!(m.load8(0x122).unwrap(), 0);
    assert_eq!(m.load8(0x223).unwrap(), 0);
}

#[test]
fn read_into_streams_range() {
    let m = Memory::new(256 * 1024).unwrap();
    m.store32(0x1_0000, 0xCAFE_F00D).unwrap();
    let mut out = Vec::new();
    let n = m.read_into(0xFFFC, 0x2_0000, &mut out).unwrap();
    assert_eq!(n, 0x2_0000);
    assert_eq!(out.len(), 0x2_0000);
    assert_eq!(&out[4..8], &0xCAFE_F00Du32.to_le_bytes());
}

#[test]
fn read_bytes_of_zero_length_at_end() {
    let m = ram();
    assert_eq!(m.read_bytes(SIZE, 0).unwrap(), Vec::<u8>::new());
    assert!(m.read_bytes(SIZE + 1, 0).is_err());
}

#[test]
fn clones_share_storage() {
    let m = ram();
    let other = m.clone();
    other.store32(0x80, 42).unwrap();
    assert_eq!(m.load32(0x80).unwrap(), 42);
}

#[test]
fn concurrent_byte_stores_to_one_word_are_not_lost() {
    let m = ram();
    let barrier = Arc::new(Barrier::new(4));
    let handles: Vec<_> = (0..4u32)
        .map(|lane| {
            let m = m.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let _ = barrier.wait();
                for i in 0..10_000u32 {
                    m.store8(0x100 + lane, (i as u8) | 1).unwrap();
                }
                m.store8(0x100 + lane, 0x10 + lane as u8).unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(m.load32(0x100).unwrap(), 0x1312_1110);
}

#[test]
fn writer_and_reader_threads_observe_whole_words() {
    let m = ram();
    let writer = {
        let m = m.clone();
        thread::spawn(move || {
            for i in 0..50_000u32 {
                let v = if i % 2 == 0 { 0 } else { u32::MAX };
                m.store32(0x200, v).unwrap();
            }
        })
    };
    for _ in 0..50_000 {
        let v = m.load32(0x200).unwrap();
        assert!(v == 0 || v == u32::MAX, "torn aligned word {v:#x}");
    }
    writer.join().unwrap();
}

proptest! {
    #[test]
    fn word_round_trip_anywhere(addr in 0u32..(SIZE as u32 - 3), val: u32) {
        let m = ram();
        m.store32(addr, val).unwrap();
        prop_assert_eq!(m.load32(addr).unwrap(), val);
        prop_assert_eq!(m.read_bytes(u64::from(addr), 4).unwrap(), val.to_le_bytes().to_vec());
    }

    #[test]
    fn half_round_trip_anywhere(addr in 0u32..(SIZE as u32 - 1), val: u16) {
        let m = ram();
        m.store16(addr, val).unwrap();
        prop_assert_eq!(m.load16(addr).unwrap(), val);
    }

    #[test]
    fn any_access_past_the_end_fails(addr in (SIZE as u32 - 3)..=u32::MAX) {
        let m = ram();
        prop_assert!(m.load32(addr).is_err());
        prop_assert!(m.store32(addr, 1).is_err());
    }
}
