/// Rec. 601 luma weights in 16.16 fixed point. They sum to 65536.
const LUMA_R: u32 = 19595;
const LUMA_G: u32 = 38470;
const LUMA_B: u32 = 7471;

/// Widen an 8-bit straight-alpha channel to 16 bits premultiplied by `alpha`.
///
/// Opaque channels map 0xff -> 0xffff; fully transparent ones map to 0.
fn widen(c: u8, alpha: u8) -> u32 {
    c as u32 * 0x101 * alpha as u32 / 0xff
}

fn luma_of(r16: u32, g16: u32, b16: u32) -> u16 {
    ((LUMA_R * r16 + LUMA_G * g16 + LUMA_B * b16 + (1 << 15)) >> 16) as u16
}

/// 16-bit luminance of an opaque 8-bit RGB triple, rounded to nearest.
pub fn luma16(r: u8, g: u8, b: u8) -> u16 {
    luma_of(widen(r, 0xff), widen(g, 0xff), widen(b, 0xff))
}

/// 8-bit luminance of an opaque 8-bit RGB triple.
///
/// Computed at 16-bit precision and truncated, so gray inputs map to
/// themselves (`luma8(v, v, v) == v`).
pub fn luma8(r: u8, g: u8, b: u8) -> u8 {
    (luma16(r, g, b) >> 8) as u8
}

/// Convert a straight-alpha RGBA pixel to its opaque gray equivalent.
///
/// The color is premultiplied by its alpha first, which composites it over
/// black: a half-transparent red becomes a darker gray than opaque red, and
/// a fully transparent pixel becomes black whatever its hidden RGB.
pub fn to_gray_rgba(pixel: [u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = pixel;
    let y = (luma_of(widen(r, a), widen(g, a), widen(b, a)) >> 8) as u8;
    [y, y, y, 255]
}
