//! Size arithmetic for thumbnails and frames.

pub fn resize_to_contain(
    canvas_w: u32,
    canvas_h: u32,
    src_w: u32,
    src_h: u32,
    max_dim: u32,
) -> (u32, u32) {
    let iw = src_w.max(1) as f32;
    let ih = src_h.max(1) as f32;
    let cw = canvas_w.max(1) as f32;
    let ch = canvas_h.max(1) as f32;
    let scale = (cw / iw).min(ch / ih).max(0.0);
    let scale = if scale.is_finite() { scale } else { 1.0 };
    let w = (iw * scale).round().clamp(1.0, max_dim as f32);
    let h = (ih * scale).round().clamp(1.0, max_dim as f32);
    (w as u32, h as u32)
}

/// Like [`resize_to_contain`] but never enlarges: sources that already fit
/// keep their size.
pub fn shrink_to_fit(bound_w: u32, bound_h: u32, src_w: u32, src_h: u32) -> (u32, u32) {
    if src_w <= bound_w && src_h <= bound_h {
        return (src_w, src_h);
    }
    resize_to_contain(bound_w, bound_h, src_w, src_h, u32::MAX)
}

/// Scale to `height`, keeping the aspect ratio.
pub fn scale_to_height(src_w: u32, src_h: u32, height: u32) -> (u32, u32) {
    let scale = height.max(1) as f32 / src_h.max(1) as f32;
    let w = (src_w.max(1) as f32 * scale).round().max(1.0);
    (w as u32, height.max(1))
}

/// Scale to `width`, keeping the aspect ratio.
pub fn scale_to_width(src_w: u32, src_h: u32, width: u32) -> (u32, u32) {
    let scale = width.max(1) as f32 / src_w.max(1) as f32;
    let h = (src_h.max(1) as f32 * scale).round().max(1.0);
    (width.max(1), h as u32)
}

/// Pixel span `[round(i/n * len), round((i+1)/n * len))` of slice `i` of `n`.
pub fn slice_span(i: usize, n: usize, len: u32) -> (u32, u32) {
    let n = n.max(1) as f64;
    let start = (i as f64 / n * f64::from(len)).round() as u32;
    let end = ((i + 1) as f64 / n * f64::from(len)).round() as u32;
    (start.min(len), end.min(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shrink_never_upscales() {
        assert_eq!(shrink_to_fit(400, 300, 200, 100), (200, 100));
        assert_eq!(shrink_to_fit(400, 300, 1600, 900), (400, 225));
    }

    #[test]
    fn scale_preserves_aspect() {
        assert_eq!(scale_to_height(1920, 1080, 180), (320, 180));
        assert_eq!(scale_to_width(1080, 1920, 180), (180, 320));
    }

    #[test]
    fn slices_tile_the_length() {
        let spans: Vec<_> = (0..3).map(|i| slice_span(i, 3, 100)).collect();
        assert_eq!(spans, vec![(0, 33), (33, 67), (67, 100)]);
    }
}
