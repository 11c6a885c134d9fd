use mr32sim_core::soc::Memory;
use mr32sim_core::soc::video::{Framebuffer, rgb565_to_rgba};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn fb(depth: u32) -> Framebuffer {
    Framebuffer {
        addr: 0x100,
        width: 2,
        height: 2,
        depth,
    }
}

#[rstest]
#[case(8, 4)]
#[case(16, 8)]
#[case(32, 16)]
fn window_size_follows_depth(#[case] depth: u32, #[case] bytes: u64) {
    assert_eq!(fb(depth).window_bytes(), bytes);
    assert_eq!(fb(depth).pixels(), 4);
}

#[test]
fn oversized_window_saturates() {
    let huge = Framebuffer {
        addr: 0,
        width: u32::MAX,
        height: u32::MAX,
        depth: 32,
    };
    assert_eq!(huge.window_bytes(), u64::MAX);
    let memory = Memory::new(0x1000).unwrap();
    let mut out = vec![1];
    assert!(huge.rasterize(&memory, &mut out).is_err());
    assert!(out.is_empty());
}

#[test]
fn grayscale_expands_to_rgba() {
    let m = Memory::new(0x1000).unwrap();
    m.write_bytes(0x100, &[0x00, 0x40, 0x80, 0xFF]).unwrap();
    let mut out = Vec::new();
    fb(8).rasterize(&m, &mut out).unwrap();
    assert_eq!(
        out,
        vec![
            0, 0, 0, 255, 0x40, 0x40, 0x40, 255, 0x80, 0x80, 0x80, 255, 255, 255, 255, 255
        ]
    );
}

#[rstest]
#[case(0x0000, [0, 0, 0, 255])]
#[case(0xFFFF, [255, 255, 255, 255])]
#[case(0xF800, [255, 0, 0, 255])]
#[case(0x07E0, [0, 255, 0, 255])]
#[case(0x001F, [0, 0, 255, 255])]
fn rgb565_replicates_high_bits(#[case] px: u16, #[case] rgba: [u8; 4]) {
    assert_eq!(rgb565_to_rgba(px), rgba);
}

#[test]
fn rgb565_window_is_read_little_endian() {
    let m = Memory::new(0x1000).unwrap();
    m.store16(0x100, 0xF800).unwrap();
    m.store16(0x102, 0x001F).unwrap();
    let mut out = Vec::new();
    fb(16).rasterize(&m, &mut out).unwrap();
    assert_eq!(out.len(), 16);
    assert_eq!(&out[0..4], &[255, 0, 0, 255]);
    assert_eq!(&out[4..8], &[0, 0, 255, 255]);
}

#[test]
fn rgba_window_is_copied_verbatim() {
    let m = Memory::new(0x1000).unwrap();
    let data: Vec<u8> = (1..=16).collect();
    m.write_bytes(0x100, &data).unwrap();
    let mut out = vec![0xEE; 3];
    fb(32).rasterize(&m, &mut out).unwrap();
    assert_eq!(out, data);
}

#[test]
fn window_outside_ram_fails_and_leaves_output_empty() {
    let m = Memory::new(0x101).unwrap();
    let mut out = vec![1, 2, 3];
    assert!(fb(8).rasterize(&m, &mut out).is_err());
    assert!(out.is_empty());
}
