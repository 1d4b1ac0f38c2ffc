#![forbid(unsafe_code)]

//! Headless proportional bipartite layout.
//!
//! Two ordered sets of weighted categories are laid out as columns of bars whose sizes follow
//! the aggregated value of the rows touching them (subject to a minimum visible size). Each bar is
//! subdivided into sub-bars, one per cross-side partner, and matching sub-bars are joined by
//! connector paths. Positions and sizes are plain numbers; mapping them to shapes is up to the
//! caller.

pub mod bpmap;
pub mod error;
mod layout;
pub mod model;

pub use bpmap::{Span, bpmap};
pub use error::{Error, Result};
pub use layout::{expand, layout, shrink};
pub use model::{
    BipartiteLayout, BipartiteOptions, Connector, ConnectorPath, EdgeMode, Focus, KeyOrder,
    MainBar, Orientation, Part, Point, Row, SubBar,
};
