//! Door position sensing and the mapping between raw readings and percent.

/// Lowest reading of the 12-bit ADC
pub const DEFAULT_POSITION_MIN: i16 = 0;
/// Highest reading of the 12-bit ADC
pub const DEFAULT_POSITION_MAX: i16 = 4095;

/// A continuous door position sensor, e.g. a potentiometer on the door shaft.
pub trait PositionSensor {
    /// Current raw position reading.
    fn read_position(&mut self) -> i16;
}

impl<F> PositionSensor for F
where
    F: FnMut() -> i16,
{
    fn read_position(&mut self) -> i16 {
        self()
    }
}

/// Raw readings that correspond to fully closed (0 %) and fully open (100 %).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionBounds {
    min: i16,
    max: i16,
}

impl PositionBounds {
    /// Returns `None` unless `min < max`.
    pub fn new(min: i16, max: i16) -> Option<Self> {
        (min < max).then_some(Self { min, max })
    }

    pub fn min(&self) -> i16 {
        self.min
    }

    pub fn max(&self) -> i16 {
        self.max
    }

    pub(crate) fn set_min(&mut self, min: i16) {
        self.min = min;
    }

    pub(crate) fn set_max(&mut self, max: i16) {
        self.max = max;
    }

    /// Map a percentage to a raw position. Values above 100 are clamped.
    pub fn to_raw(&self, percent: u8) -> i16 {
        let percent = i32::from(percent.min(100));
        let raw = linear_map(percent, 0, 100, i32::from(self.min), i32::from(self.max));
        raw as i16
    }

    /// Map a raw position back to 0..=100.
    pub fn to_percent(&self, raw: i16) -> u8 {
        let percent = linear_map(i32::from(raw), i32::from(self.min), i32::from(self.max), 0, 100);
        percent.clamp(0, 100) as u8
    }

    /// Whether `raw` lies strictly between the bounds.
    pub fn is_interior(&self, raw: i16) -> bool {
        raw > self.min && raw < self.max
    }
}

impl Default for PositionBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_POSITION_MIN,
            max: DEFAULT_POSITION_MAX,
        }
    }
}

/// Re-map `value` from the input range to the output range, truncating.
///
/// An empty input range maps everything to `out_min`.
pub fn linear_map(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    if in_max == in_min {
        return out_min;
    }
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}
