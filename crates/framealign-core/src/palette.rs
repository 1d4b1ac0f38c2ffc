use indexmap::IndexMap;

/// Categorical palette of the Sankey diagram.
pub const DEFAULT_PALETTE: [&str; 6] = [
    "#3366CC", "#DC3912", "#FF9900", "#109618", "#990099", "#0099C6",
];

/// Endless cycle over a fixed palette.
#[derive(Debug, Clone)]
pub struct ColorCycle {
    palette: Vec<String>,
    next: usize,
}

impl Default for ColorCycle {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect())
    }
}

impl ColorCycle {
    /// An empty `palette` yields `"black"` forever.
    pub fn new(palette: Vec<String>) -> Self {
        Self { palette, next: 0 }
    }

    pub fn next_color(&mut self) -> String {
        if self.palette.is_empty() {
            return "black".to_string();
        }
        let color = self.palette[self.next % self.palette.len()].clone();
        self.next = (self.next + 1) % self.palette.len();
        color
    }
}

/// Stable color per key, assigned from a [`ColorCycle`] in first-request order.
#[derive(Debug, Clone, Default)]
pub struct ColorScale {
    cycle: ColorCycle,
    mapping: IndexMap<String, String>,
}

impl ColorScale {
    pub fn new(cycle: ColorCycle) -> Self {
        Self {
            cycle,
            mapping: IndexMap::new(),
        }
    }

    pub fn color_for(&mut self, key: &str) -> String {
        if let Some(color) = self.mapping.get(key) {
            return color.clone();
        }
        let color = self.cycle.next_color();
        self.mapping.insert(key.to_string(), color.clone());
        color
    }

    /// Assigned colors in assignment order.
    pub fn assigned(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mapping.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
