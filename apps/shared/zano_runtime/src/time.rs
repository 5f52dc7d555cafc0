/// Simulated time handed to components each frame
///
/// `total` is monotonically non-decreasing across frames; scripts receive it as
/// the argument of their `update` callback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds elapsed since the previous frame
    pub delta: f64,
    /// Seconds elapsed since the driver started
    pub total: f64,
}

impl FrameTime {
    pub fn new(delta: f64, total: f64) -> Self {
        Self { delta, total }
    }

    /// Time of the next frame, `dt` seconds after this one
    ///
    /// Negative or NaN steps are clamped to zero so `total` never goes backwards.
    pub fn advance(&self, dt: f64) -> Self {
        let dt = if dt.is_nan() { 0.0 } else { dt.max(0.0) };
        Self {
            delta: dt,
            total: self.total + dt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates_total() {
        let t = FrameTime::default().advance(0.5).advance(0.25);
        assert_eq!(t.delta, 0.25);
        assert_eq!(t.total, 0.75);
    }

    #[test]
    fn test_advance_never_goes_backwards() {
        let t = FrameTime::new(0.1, 2.0).advance(-1.0);
        assert_eq!(t.total, 2.0);
        assert_eq!(t.delta, 0.0);
        assert_eq!(FrameTime::new(0.1, 2.0).advance(f64::NAN).total, 2.0);
    }
}
