/// Evenly spaced positions for an ordered domain, with outer padding expressed in steps.
///
/// Points are centered in the range; a single point sits at its midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointScale {
    start: f64,
    step: f64,
}

impl PointScale {
    pub fn new(count: usize, range: (f64, f64), padding: f64) -> Self {
        let (r0, r1) = range;
        let span = r1 - r0;
        let gaps = (count as f64 - 1.0 + 2.0 * padding).max(1.0);
        let step = span / gaps;
        let start = r0 + (span - step * (count as f64 - 1.0).max(0.0)) / 2.0;
        Self { start, step }
    }

    /// Position of the `index`-th domain value.
    pub fn at(&self, index: usize) -> f64 {
        self.start + self.step * index as f64
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}
