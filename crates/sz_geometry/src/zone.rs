use std::str::FromStr;

use thiserror::Error;

/// Upper bound of the percentage coordinate space.
pub const PERCENT_MAX: f32 = 100.0;

/// Default minimum zone edge (in percent).
///
/// Anything smaller is treated as an accidental click rather than a region.
pub const DEFAULT_MIN_ZONE_SIZE: f32 = 1.0;

/// Clamp a percentage coordinate into `[0, 100]`.
///
/// NaN maps to 0 so a broken pointer event can never poison later arithmetic.
#[inline]
pub fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, PERCENT_MAX)
}

/// Pointer position in percent of the displayed container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PercentPoint {
    pub x: f32,
    pub y: f32,
}

impl PercentPoint {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Same point with both axes clamped into the container.
    #[inline]
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_percent(self.x),
            y: clamp_percent(self.y),
        }
    }
}

/// Rectangle in percent of the source image's displayed bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedZone {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NormalizedZone {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole image.
    pub const FULL: Self = Self::new(0.0, 0.0, PERCENT_MAX, PERCENT_MAX);

    /// Build a zone from a press point and the current pointer point.
    ///
    /// Both points are clamped before any arithmetic, so drags that leave the image
    /// never yield negative or >100 values. The result does not depend on drag direction.
    pub fn from_drag(press: PercentPoint, current: PercentPoint) -> Self {
        let a = press.clamped();
        let b = current.clamped();
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
        .normalized()
    }

    /// Re-clamp the rectangle so it stays inside the percentage space.
    ///
    /// Applied at commit time: the origin may have drifted through float rounding
    /// even though the size was computed from valid points.
    pub fn normalized(self) -> Self {
        let x = clamp_percent(self.x);
        let y = clamp_percent(self.y);
        let width = clamp_percent(self.width).min(PERCENT_MAX - x);
        let height = clamp_percent(self.height).min(PERCENT_MAX - y);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True if both edges are at least `min_size` percent.
    #[inline]
    pub fn meets_min_size(&self, min_size: f32) -> bool {
        self.width >= min_size && self.height >= min_size
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Error parsing a zone from `"x,y,width,height"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseZoneError {
    #[error("expected 4 comma-separated values, got {0}")]
    FieldCount(usize),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
}

impl FromStr for NormalizedZone {
    type Err = ParseZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(|p| p.trim()).collect();
        if parts.len() != 4 {
            return Err(ParseZoneError::FieldCount(parts.len()));
        }

        let mut values = [0.0f32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f32>()
                .map_err(|_| ParseZoneError::InvalidNumber((*part).to_string()))?;
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }
}
