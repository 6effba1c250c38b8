use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Draw `to` over `from` at `opacity`, stretching `to` to `from`'s size.
///
/// Opacity outside `[0, 1]` leaves `from` untouched.
pub fn blend_over(from: &mut RgbaImage, to: &RgbaImage, opacity: f64) {
    if !(0.0..=1.0).contains(&opacity) || from.width() == 0 || from.height() == 0 {
        return;
    }

    let resized;
    let to = if to.dimensions() == from.dimensions() {
        to
    } else {
        resized = imageops::resize(to, from.width(), from.height(), FilterType::Triangle);
        &resized
    };

    let a = opacity as f32;
    for (dst, src) in from.pixels_mut().zip(to.pixels()) {
        // Source alpha scales the opacity so transparent areas keep `from`.
        let k = a * f32::from(src[3]) / 255.0;
        for c in 0..3 {
            let mixed = f32::from(dst[c]) * (1.0 - k) + f32::from(src[c]) * k;
            dst[c] = mixed.round().clamp(0.0, 255.0) as u8;
        }
        let alpha = f32::from(dst[3]) + (255.0 - f32::from(dst[3])) * k;
        dst[3] = alpha.round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn halfway_blend_mixes_channels() {
        let mut from = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let to = RgbaImage::from_pixel(4, 4, Rgba([200, 100, 50, 255]));
        blend_over(&mut from, &to, 0.5);
        assert_eq!(from.get_pixel(1, 1), &Rgba([100, 50, 25, 255]));
    }

    #[test]
    fn out_of_range_opacity_is_ignored() {
        let mut from = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255]));
        let to = RgbaImage::from_pixel(1, 1, Rgba([200, 200, 200, 255]));
        blend_over(&mut from, &to, 1.5);
        assert_eq!(from.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    }
}
