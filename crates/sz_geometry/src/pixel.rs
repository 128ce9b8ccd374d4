use crate::zone::{NormalizedZone, PERCENT_MAX};

/// Exact pixel crop inside an image of known natural size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelCrop {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelCrop {
    /// Derive the crop for `zone` against the image's natural (not displayed) size.
    ///
    /// Returns `None` when either natural dimension is zero: the source has not been
    /// decoded yet and any crop would be degenerate.
    ///
    /// The origin is `round(pct / 100 * natural)`, kept on a real pixel. The requested
    /// size is computed the same way with a floor of 1px, then capped by what is left
    /// between the origin and the image edge, so the crop never reads out of bounds.
    pub fn from_zone(zone: &NormalizedZone, natural_width: u32, natural_height: u32) -> Option<Self> {
        if natural_width == 0 || natural_height == 0 {
            return None;
        }

        let (x, width) = axis(zone.x, zone.width, natural_width);
        let (y, height) = axis(zone.y, zone.height, natural_height);

        Some(Self {
            x,
            y,
            width,
            height,
        })
    }

    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Convert a percent to whole pixels of `natural`.
#[inline]
fn to_pixels(percent: f32, natural: u32) -> u32 {
    let value = (f64::from(percent) / f64::from(PERCENT_MAX) * f64::from(natural)).round();
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= f64::from(natural) {
        natural
    } else {
        value as u32
    }
}

/// (start, size) along one axis.
fn axis(start_pct: f32, size_pct: f32, natural: u32) -> (u32, u32) {
    let start = to_pixels(start_pct, natural).min(natural - 1);
    let requested = to_pixels(size_pct, natural).max(1);
    let available = (natural - start).max(1);
    (start, requested.min(available))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_zone_is_capped_by_available_extent() {
        let zone = NormalizedZone::new(50.0, 50.0, 60.0, 60.0);
        let crop = PixelCrop::from_zone(&zone, 200, 100).unwrap();

        assert_eq!(crop.x, 100);
        assert_eq!(crop.y, 50);
        assert!(crop.width <= 100);
        assert!(crop.height <= 50);
        assert_eq!((crop.width, crop.height), (100, 50));
    }

    #[test]
    fn full_zone_maps_to_whole_image() {
        let crop = PixelCrop::from_zone(&NormalizedZone::FULL, 640, 480).unwrap();
        assert_eq!(
            crop,
            PixelCrop {
                x: 0,
                y: 0,
                width: 640,
                height: 480,
            }
        );
    }

    #[test]
    fn tiny_zone_gets_at_least_one_pixel() {
        let zone = NormalizedZone::new(10.0, 10.0, 0.01, 0.01);
        let crop = PixelCrop::from_zone(&zone, 100, 100).unwrap();
        assert_eq!((crop.width, crop.height), (1, 1));
    }

    #[test]
    fn origin_on_far_edge_stays_inside_image() {
        let zone = NormalizedZone::new(100.0, 100.0, 0.0, 0.0);
        let crop = PixelCrop::from_zone(&zone, 50, 20).unwrap();
        assert_eq!(crop.right(), 50);
        assert_eq!(crop.bottom(), 20);
        assert_eq!(crop.area(), 1);
    }

    #[test]
    fn rounding_uses_nearest_pixel() {
        // 33.3% of 10px = 3.33 -> 3, 16.7% of 10px = 1.67 -> 2
        let zone = NormalizedZone::new(33.3, 16.7, 16.7, 33.3);
        let crop = PixelCrop::from_zone(&zone, 10, 10).unwrap();
        assert_eq!(
            crop,
            PixelCrop {
                x: 3,
                y: 2,
                width: 2,
                height: 3,
            }
        );
    }

    #[test]
    fn undecoded_source_yields_none() {
        let zone = NormalizedZone::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(PixelCrop::from_zone(&zone, 0, 100), None);
        assert_eq!(PixelCrop::from_zone(&zone, 100, 0), None);
    }
}
