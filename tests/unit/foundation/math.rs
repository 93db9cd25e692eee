use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn lerp_hits_endpoints() {
    assert_eq!(lerp(1.0, 3.0, 0.0), 1.0);
    assert_eq!(lerp(1.0, 3.0, 1.0), 3.0);
    assert_eq!(lerp(1.0, 3.0, 0.5), 2.0);
}

#[test]
fn progress_clamps_and_handles_empty_ranges() {
    assert_eq!(progress(-1.0, 0.0, 2.0), 0.0);
    assert_eq!(progress(1.0, 0.0, 2.0), 0.5);
    assert_eq!(progress(5.0, 0.0, 2.0), 1.0);
    assert_eq!(progress(0.0, 0.0, 0.0), 1.0);
}
