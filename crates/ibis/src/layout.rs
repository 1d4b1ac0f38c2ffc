use crate::bpmap::{Span, bpmap};
use crate::model::{
    BipartiteLayout, BipartiteOptions, Connector, ConnectorPath, EdgeMode, Focus, KeyOrder,
    MainBar, Orientation, Part, Point, Row, SubBar,
};
use crate::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;

/// Computes main bars, sub-bars and connectors for `rows`.
///
/// With a `focus`, rows that do not touch the focused key contribute zero to the bars of the
/// opposite side, only connectors touching the focused key stay visible, and the focused secondary
/// sub-bars carry a formatted value label.
pub fn layout(
    rows: &[Row],
    options: &BipartiteOptions,
    focus: Option<&Focus>,
) -> Result<BipartiteLayout> {
    validate(rows, options)?;

    let mut main_bars = Vec::new();
    let mut sub_bars = Vec::new();
    for part in [Part::Primary, Part::Secondary] {
        let (bars, spans) = main_bars_for(rows, options, focus, part);
        sub_bars.extend(sub_bars_for(rows, options, focus, part, &bars, &spans));
        main_bars.extend(bars);
    }

    let edges = connectors(options, focus, &sub_bars);

    Ok(BipartiteLayout {
        width: options.width,
        height: options.height,
        focus: focus.cloned(),
        main_bars,
        sub_bars,
        edges,
    })
}

/// Layout with `focus` expanded.
pub fn expand(rows: &[Row], options: &BipartiteOptions, focus: &Focus) -> Result<BipartiteLayout> {
    layout(rows, options, Some(focus))
}

/// Unfocused layout; restores every connector and clears value labels.
pub fn shrink(rows: &[Row], options: &BipartiteOptions) -> Result<BipartiteLayout> {
    layout(rows, options, None)
}

fn validate(rows: &[Row], options: &BipartiteOptions) -> Result<()> {
    let sizes = [
        ("width", options.width),
        ("height", options.height),
        ("barSize", options.bar_size),
        ("min", options.min),
        ("pad", options.pad),
        ("edgeOpacity", options.edge_opacity),
    ];
    for (name, v) in sizes {
        if !v.is_finite() || v < 0.0 {
            return Err(Error::InvalidOptions {
                message: format!("{name} must be a finite non-negative number, got {v}"),
            });
        }
    }
    for (index, row) in rows.iter().enumerate() {
        if !row.value.is_finite() || row.value < 0.0 {
            return Err(Error::InvalidRow {
                index,
                value: row.value,
            });
        }
    }
    Ok(())
}

fn ordered_keys(rows: &[Row], part: Part, order: KeyOrder) -> Vec<&str> {
    let set: IndexSet<&str> = rows.iter().map(|r| r.key(part)).collect();
    let mut keys: Vec<&str> = set.into_iter().collect();
    match order {
        KeyOrder::Ascending => keys.sort_unstable(),
        KeyOrder::Descending => keys.sort_unstable_by(|a, b| b.cmp(a)),
        KeyOrder::Insertion => {}
    }
    keys
}

fn weighted(row: &Row, focus: Option<&Focus>, part: Part) -> f64 {
    if Focus::keeps(focus, row, part) {
        row.value
    } else {
        0.0
    }
}

/// Center and full extents of a bar of `part` occupying `span` along the layout axis.
fn place(options: &BipartiteOptions, part: Part, span: &Span) -> (f64, f64, f64, f64) {
    let half = options.bar_size / 2.0;
    match options.orient {
        Orientation::Vertical => {
            let x = match part {
                Part::Primary => half,
                Part::Secondary => options.width - half,
            };
            (x, span.center(), options.bar_size, span.thickness())
        }
        Orientation::Horizontal => {
            let y = match part {
                Part::Primary => half,
                Part::Secondary => options.height - half,
            };
            (span.center(), y, span.thickness(), options.bar_size)
        }
    }
}

fn main_bars_for(
    rows: &[Row],
    options: &BipartiteOptions,
    focus: Option<&Focus>,
    part: Part,
) -> (Vec<MainBar>, Vec<Span>) {
    let mut totals: IndexMap<&str, f64> = ordered_keys(rows, part, options.order(part))
        .into_iter()
        .map(|k| (k, 0.0))
        .collect();
    for row in rows {
        if let Some(total) = totals.get_mut(row.key(part)) {
            *total += weighted(row, focus, part);
        }
    }

    let values: Vec<f64> = totals.values().copied().collect();
    let spans = bpmap(
        &values,
        options.pad,
        options.min,
        0.0,
        options.axis_length(),
    );

    let bars = totals
        .iter()
        .zip(&spans)
        .map(|((key, value), span)| {
            let (x, y, width, height) = place(options, part, span);
            MainBar {
                part,
                key: (*key).to_string(),
                value: *value,
                percent: span.percent,
                x,
                y,
                width,
                height,
                highlighted: focus.is_some_and(|f| f.part == part && f.key == *key),
            }
        })
        .collect();
    (bars, spans)
}

fn sub_bars_for(
    rows: &[Row],
    options: &BipartiteOptions,
    focus: Option<&Focus>,
    part: Part,
    main_bars: &[MainBar],
    main_spans: &[Span],
) -> Vec<SubBar> {
    let other = part.other();
    let partner_rank: FxHashMap<&str, usize> = ordered_keys(rows, other, options.order(other))
        .into_iter()
        .enumerate()
        .map(|(i, k)| (k, i))
        .collect();

    // Pairs zeroed by the focus are kept so that every present pair still has a sub-bar.
    let mut groups: FxHashMap<&str, IndexMap<&str, f64>> = FxHashMap::default();
    for row in rows {
        *groups
            .entry(row.key(part))
            .or_default()
            .entry(row.key(other))
            .or_insert(0.0) += weighted(row, focus, part);
    }

    let mut out = Vec::new();
    for (bar, span) in main_bars.iter().zip(main_spans) {
        let Some(partners) = groups.get_mut(bar.key.as_str()) else {
            continue;
        };
        partners.sort_by(|a, _, b, _| {
            let ra = partner_rank.get(a).copied().unwrap_or(usize::MAX);
            let rb = partner_rank.get(b).copied().unwrap_or(usize::MAX);
            ra.cmp(&rb)
        });

        let values: Vec<f64> = partners.values().copied().collect();
        let spans = bpmap(&values, 0.0, 0.0, span.start, span.end);
        for ((partner, value), sub) in partners.iter().zip(&spans) {
            let (x, y, width, height) = place(options, part, sub);
            let (primary, secondary) = match part {
                Part::Primary => (bar.key.clone(), (*partner).to_string()),
                Part::Secondary => ((*partner).to_string(), bar.key.clone()),
            };
            let label = focus
                .filter(|f| {
                    part == Part::Secondary
                        && match f.part {
                            Part::Primary => primary == f.key,
                            Part::Secondary => secondary == f.key,
                        }
                })
                .map(|_| format!("{value:.3}"));
            out.push(SubBar {
                part,
                primary,
                secondary,
                value: *value,
                percent: sub.percent * bar.percent,
                x,
                y,
                width,
                height,
                label,
            });
        }
    }
    out
}

fn connectors(
    options: &BipartiteOptions,
    focus: Option<&Focus>,
    sub_bars: &[SubBar],
) -> Vec<Connector> {
    let secondary: FxHashMap<(&str, &str), &SubBar> = sub_bars
        .iter()
        .filter(|s| s.part == Part::Secondary)
        .map(|s| ((s.primary.as_str(), s.secondary.as_str()), s))
        .collect();

    sub_bars
        .iter()
        .filter(|s| s.part == Part::Primary)
        .filter_map(|d| {
            let g = secondary.get(&(d.primary.as_str(), d.secondary.as_str()))?;
            let mut connector = Connector {
                primary: d.primary.clone(),
                secondary: d.secondary.clone(),
                value: d.value,
                percent: d.percent,
                path: connector_path(options, d, g),
                visible: true,
                opacity: options.edge_opacity,
            };
            if let Some(f) = focus {
                if connector.key(f.part) != f.key {
                    connector.visible = false;
                    connector.opacity = 0.0;
                }
            }
            Some(connector)
        })
        .collect()
}

/// Quadrilateral joining the inner side of sub-bar `d` (primary) to the inner side of `g`.
fn connector_path(options: &BipartiteOptions, d: &SubBar, g: &SubBar) -> ConnectorPath {
    let (dw, dh) = (d.width / 2.0, d.height / 2.0);
    let (gw, gh) = (g.width / 2.0, g.height / 2.0);

    match options.orient {
        Orientation::Vertical => {
            let corners = [
                Point::new(d.x + dw, d.y + dh),
                Point::new(g.x - gw, g.y + gh),
                Point::new(g.x - gw, g.y - gh),
                Point::new(d.x + dw, d.y - dh),
            ];
            let [a, b, c, e] = corners;
            let mx1 = (a.x + b.x) / 2.0;
            let mx3 = (c.x + e.x) / 2.0;
            curve_or_straight(
                options,
                corners,
                [
                    Point::new(mx1, a.y),
                    Point::new(mx1, b.y),
                    Point::new(mx3, c.y),
                    Point::new(mx3, e.y),
                ],
            )
        }
        Orientation::Horizontal => {
            let corners = [
                Point::new(d.x - dw, d.y + dh),
                Point::new(g.x - gw, g.y - gh),
                Point::new(g.x + gw, g.y - gh),
                Point::new(d.x + dw, d.y + dh),
            ];
            let [a, b, c, e] = corners;
            let my1 = (a.y + b.y) / 2.0;
            let my3 = (c.y + e.y) / 2.0;
            curve_or_straight(
                options,
                corners,
                [
                    Point::new(a.x, my1),
                    Point::new(b.x, my1),
                    Point::new(c.x, my3),
                    Point::new(e.x, my3),
                ],
            )
        }
    }
}

fn curve_or_straight(
    options: &BipartiteOptions,
    corners: [Point; 4],
    controls: [Point; 4],
) -> ConnectorPath {
    match options.edge_mode {
        EdgeMode::Curved => ConnectorPath::Curved { corners, controls },
        EdgeMode::Straight => ConnectorPath::Straight { corners },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Row> {
        vec![
            Row::new("a", "x", 2.0),
            Row::new("a", "y", 1.0),
            Row::new("b", "x", 1.0),
        ]
    }

    #[test]
    fn ordered_keys_respects_order() {
        let r = vec![Row::new("b", "x", 1.0), Row::new("a", "y", 1.0)];
        assert_eq!(
            ordered_keys(&r, Part::Primary, KeyOrder::Ascending),
            vec!["a", "b"]
        );
        assert_eq!(
            ordered_keys(&r, Part::Primary, KeyOrder::Descending),
            vec!["b", "a"]
        );
        assert_eq!(
            ordered_keys(&r, Part::Primary, KeyOrder::Insertion),
            vec!["b", "a"]
        );
    }

    #[test]
    fn focus_zeroes_only_the_opposite_side() {
        let focus = Focus::new(Part::Primary, "b");
        let out = layout(&rows(), &BipartiteOptions::default(), Some(&focus)).unwrap();
        let primary: Vec<f64> = out
            .main_bars
            .iter()
            .filter(|b| b.part == Part::Primary)
            .map(|b| b.value)
            .collect();
        assert_eq!(primary, vec![3.0, 1.0]);
        let secondary: Vec<f64> = out
            .main_bars
            .iter()
            .filter(|b| b.part == Part::Secondary)
            .map(|b| b.value)
            .collect();
        assert_eq!(secondary, vec![1.0, 0.0]);
    }

    #[test]
    fn rejects_negative_values() {
        let r = vec![Row::new("a", "x", -1.0)];
        assert!(matches!(
            layout(&r, &BipartiteOptions::default(), None),
            Err(Error::InvalidRow { index: 0, .. })
        ));
    }
}
