use serde::{Deserialize, Serialize};

/// One weighted `(primary, secondary)` relation. Rows sharing both keys are summed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub primary: String,
    pub secondary: String,
    pub value: f64,
}

impl Row {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>, value: f64) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            value,
        }
    }

    pub fn key(&self, part: Part) -> &str {
        match part {
            Part::Primary => &self.primary,
            Part::Secondary => &self.secondary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    Primary,
    Secondary,
}

impl Part {
    pub fn other(self) -> Self {
        match self {
            Part::Primary => Part::Secondary,
            Part::Secondary => Part::Primary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Bars stacked top to bottom, primary column on the left.
    #[default]
    Vertical,
    /// Bars laid left to right, primary row on top.
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMode {
    #[default]
    Curved,
    Straight,
}

/// Ordering of category keys along the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyOrder {
    #[default]
    Ascending,
    Descending,
    /// First appearance in the input rows.
    Insertion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BipartiteOptions {
    pub orient: Orientation,
    pub width: f64,
    pub height: f64,
    /// Thickness of the bar columns across the layout axis.
    pub bar_size: f64,
    /// Minimum thickness of a main bar along the layout axis.
    pub min: f64,
    /// Padding on each side of a main bar along the layout axis.
    pub pad: f64,
    pub edge_mode: EdgeMode,
    pub edge_opacity: f64,
    pub sort_primary: KeyOrder,
    pub sort_secondary: KeyOrder,
}

impl Default for BipartiteOptions {
    fn default() -> Self {
        Self {
            orient: Orientation::Vertical,
            width: 400.0,
            height: 600.0,
            bar_size: 35.0,
            min: 0.0,
            pad: 0.0,
            edge_mode: EdgeMode::Curved,
            edge_opacity: 0.4,
            sort_primary: KeyOrder::Ascending,
            sort_secondary: KeyOrder::Ascending,
        }
    }
}

impl BipartiteOptions {
    pub(crate) fn axis_length(&self) -> f64 {
        match self.orient {
            Orientation::Vertical => self.height,
            Orientation::Horizontal => self.width,
        }
    }

    pub(crate) fn order(&self, part: Part) -> KeyOrder {
        match part {
            Part::Primary => self.sort_primary,
            Part::Secondary => self.sort_secondary,
        }
    }
}

/// A focused (expanded) bar. Rows not touching it contribute zero to the opposite side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Focus {
    pub part: Part,
    pub key: String,
}

impl Focus {
    pub fn new(part: Part, key: impl Into<String>) -> Self {
        Self {
            part,
            key: key.into(),
        }
    }

    /// Click semantics: clicking the focused bar clears focus, clicking any other bar moves it.
    pub fn toggle(current: Option<&Focus>, clicked: Focus) -> Option<Focus> {
        match current {
            Some(cur) if cur.key == clicked.key && cur.part == clicked.part => None,
            _ => Some(clicked),
        }
    }

    /// Whether `row` keeps its value when bars of `part` are computed.
    pub fn keeps(focus: Option<&Focus>, row: &Row, part: Part) -> bool {
        match focus {
            None => true,
            Some(f) => f.part == part || row.key(f.part) == f.key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An aggregated category bar. `x`/`y` is the center; `width`/`height` are full extents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainBar {
    pub part: Part,
    pub key: String,
    pub value: f64,
    pub percent: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub highlighted: bool,
}

/// The slice of a main bar devoted to one cross-side partner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubBar {
    pub part: Part,
    pub primary: String,
    pub secondary: String,
    pub value: f64,
    pub percent: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Formatted value, only present on focused secondary sub-bars.
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConnectorPath {
    /// Two cubic Bézier sides joined by straight bar edges.
    Curved {
        corners: [Point; 4],
        controls: [Point; 4],
    },
    Straight {
        corners: [Point; 4],
    },
}

impl ConnectorPath {
    pub fn corners(&self) -> &[Point; 4] {
        match self {
            ConnectorPath::Curved { corners, .. } | ConnectorPath::Straight { corners } => corners,
        }
    }

    /// SVG path data (`d` attribute) for this connector.
    pub fn to_path_d(&self) -> String {
        let p = |pt: &Point| format!("{},{}", fmt_num(pt.x), fmt_num(pt.y));
        match self {
            ConnectorPath::Straight { corners: [a, b, c, d] } => {
                format!("M{}L{}L{}L{}z", p(a), p(b), p(c), p(d))
            }
            ConnectorPath::Curved {
                corners: [a, b, c, d],
                controls: [c1, c2, c3, c4],
            } => format!(
                "M{}C{} {},{}L{}C{} {},{}z",
                p(a),
                p(c1),
                p(c2),
                p(b),
                p(c),
                p(c3),
                p(c4),
                p(d)
            ),
        }
    }
}

fn fmt_num(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    format!("{v}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub primary: String,
    pub secondary: String,
    pub value: f64,
    pub percent: f64,
    pub path: ConnectorPath,
    pub visible: bool,
    pub opacity: f64,
}

impl Connector {
    pub fn key(&self, part: Part) -> &str {
        match part {
            Part::Primary => &self.primary,
            Part::Secondary => &self.secondary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BipartiteLayout {
    pub width: f64,
    pub height: f64,
    pub focus: Option<Focus>,
    pub main_bars: Vec<MainBar>,
    pub sub_bars: Vec<SubBar>,
    pub edges: Vec<Connector>,
}
