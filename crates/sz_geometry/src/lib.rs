pub mod pixel;
pub mod zone;

pub use pixel::PixelCrop;
pub use zone::{
    DEFAULT_MIN_ZONE_SIZE, NormalizedZone, PERCENT_MAX, ParseZoneError, PercentPoint, clamp_percent,
};
