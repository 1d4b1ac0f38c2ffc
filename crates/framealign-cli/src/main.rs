use framealign::render::{
    Focus, Part, PositionedGraph, RenderOptions, Viewport, layout_store_graph,
    layout_store_sankey,
};
use framealign::{
    AlignmentDocument, AlignmentStore, AlignmentSummary, LoadedAlignment, MatchingGraph,
    VisualizerConfig,
};
use futures::executor::block_on;
use serde::Serialize;
use std::io::Read;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Alignment(framealign::Error),
    Render(framealign::render::HeadlessError),
    Json(serde_json::Error),
    MissingScoring,
    MissingPair,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Alignment(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::MissingScoring => write!(f, "--scoring <id> is required for this command"),
            CliError::MissingPair => write!(f, "--pair <left>,<right> is required for this command"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<framealign::Error> for CliError {
    fn from(value: framealign::Error) -> Self {
        Self::Alignment(value)
    }
}

impl From<framealign::render::HeadlessError> for CliError {
    fn from(value: framealign::render::HeadlessError) -> Self {
        Self::Render(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Edges,
    Frames,
    Sankey,
    Graph,
    LayoutSankey,
    LayoutGraph,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    config: Option<String>,
    scoring: Option<String>,
    frames: Vec<String>,
    pair: Option<(String, String)>,
    threshold: Option<f64>,
    max_edges: Option<usize>,
    only_frame_set: bool,
    neighborhood: Option<usize>,
    similarity: Option<f64>,
    width: f64,
    height: f64,
    focus: Option<Focus>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphOut<'a> {
    graph: &'a MatchingGraph,
    summary: AlignmentSummary,
}

fn usage() -> &'static str {
    "framealign-cli\n\
\n\
USAGE:\n\
  framealign-cli [edges] [--pretty] [--config <json>] [<path>|-]\n\
  framealign-cli frames --scoring <id> [--pretty] [<path>|-]\n\
  framealign-cli sankey --scoring <id> [--frames <gid,gid..>] [--threshold <f>] [--max-edges <n>] [--only-frame-set] [--neighborhood <n>] [--similarity <f>] [<path>|-]\n\
  framealign-cli graph --scoring <id> --pair <left>,<right> [<path>|-]\n\
  framealign-cli layout sankey|graph [sankey/graph options] [--width <w>] [--height <h>] [--focus primary|secondary:<key>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the alignment document is read from stdin.\n\
  - --config deep-merges a JSON file over the default visualizer config.\n\
  - Logging goes to stderr; set RUST_LOG (default: warn).\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_number<T: std::str::FromStr>(raw: &str) -> Result<T, CliError> {
    raw.trim().parse::<T>().map_err(|_| CliError::Usage(usage()))
}

fn parse_focus(raw: &str) -> Result<Focus, CliError> {
    let (part, key) = raw.split_once(':').ok_or(CliError::Usage(usage()))?;
    let part = match part {
        "primary" => Part::Primary,
        "secondary" => Part::Secondary,
        _ => return Err(CliError::Usage(usage())),
    };
    if key.is_empty() {
        return Err(CliError::Usage(usage()));
    }
    Ok(Focus::new(part, key))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        width: 800.0,
        height: 600.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "edges" => args.command = Command::Edges,
            "frames" => args.command = Command::Frames,
            "sankey" => args.command = Command::Sankey,
            "graph" => args.command = Command::Graph,
            "layout" => {
                args.command = match next_value(&mut it)?.as_str() {
                    "sankey" => Command::LayoutSankey,
                    "graph" => Command::LayoutGraph,
                    _ => return Err(CliError::Usage(usage())),
                };
            }
            "--pretty" => args.pretty = true,
            "--only-frame-set" => args.only_frame_set = true,
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--scoring" => args.scoring = Some(next_value(&mut it)?.clone()),
            "--frames" => {
                args.frames = next_value(&mut it)?
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "--pair" => {
                let (left, right) = next_value(&mut it)?
                    .split_once(',')
                    .ok_or(CliError::Usage(usage()))?;
                args.pair = Some((left.trim().to_string(), right.trim().to_string()));
            }
            "--threshold" => args.threshold = Some(parse_number(next_value(&mut it)?)?),
            "--max-edges" => args.max_edges = Some(parse_number(next_value(&mut it)?)?),
            "--neighborhood" => args.neighborhood = Some(parse_number(next_value(&mut it)?)?),
            "--similarity" => args.similarity = Some(parse_number(next_value(&mut it)?)?),
            "--width" => args.width = parse_number(next_value(&mut it)?)?,
            "--height" => args.height = parse_number(next_value(&mut it)?)?,
            "--focus" => args.focus = Some(parse_focus(next_value(&mut it)?)?),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn load_config(path: Option<&str>) -> Result<VisualizerConfig, CliError> {
    let Some(path) = path else {
        return Ok(VisualizerConfig::default());
    };
    let overrides: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    Ok(VisualizerConfig::with_overrides(&overrides))
}

/// Applies the selection and parameter flags to a loaded store.
fn select(store: &mut AlignmentStore, args: &Args) -> Result<(), CliError> {
    let Some(scoring) = args.scoring.as_deref() else {
        return Err(CliError::MissingScoring);
    };
    store.set_scoring(scoring)?;
    store.update_params(|p| {
        if let Some(t) = args.threshold {
            p.threshold = t;
        }
        if let Some(n) = args.max_edges {
            p.sankey_max_edges = Some(n);
            p.limit_sankey_edges = true;
        }
        if args.only_frame_set {
            p.display_only_frame_set = true;
        }
        if let Some(n) = args.neighborhood {
            p.neighborhood_size = Some(n);
        }
        if let Some(s) = args.similarity {
            p.similarity_threshold = Some(s);
        }
    });
    store.set_sankey_frames(args.frames.iter().map(String::as_str))?;
    if let Some((left, right)) = &args.pair {
        store.set_selected_frame_pair(Some(left.as_str()), Some(right.as_str()))?;
    }
    Ok(())
}

fn layout_graph(store: &AlignmentStore, args: &Args) -> Result<Option<PositionedGraph>, CliError> {
    if args.pair.is_none() {
        return Err(CliError::MissingPair);
    }
    let options = RenderOptions::from_config(store.config());
    Ok(layout_store_graph(
        store,
        Viewport::new(args.width, args.height),
        &options,
    ))
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let text = read_input(args.input.as_deref())?;
    let doc = AlignmentDocument::from_json_str(&text)?;
    let loaded = block_on(LoadedAlignment::prepare(doc, config.ingest_options()))?;

    if args.command == Command::Edges {
        return write_json(loaded.edges(), args.pretty);
    }

    let mut store = AlignmentStore::new(config);
    let ticket = store.begin_load();
    store.finish_load(ticket, loaded)?;
    select(&mut store, &args)?;

    match args.command {
        Command::Edges => Ok(()),
        Command::Frames => write_json(&store.frame_options(), args.pretty),
        Command::Sankey => write_json(&store.sankey_data(), args.pretty),
        Command::Graph => {
            if args.pair.is_none() {
                return Err(CliError::MissingPair);
            }
            let graph = store.graph_data();
            let out = GraphOut {
                summary: graph.summary(),
                graph: &graph,
            };
            write_json(&out, args.pretty)
        }
        Command::LayoutSankey => {
            let options = RenderOptions::from_config(store.config());
            let diagram = layout_store_sankey(
                &mut store,
                Viewport::new(args.width, args.height),
                args.focus.as_ref(),
                &options,
            )
            .map_err(framealign::render::HeadlessError::from)?;
            write_json(&diagram, args.pretty)
        }
        Command::LayoutGraph => write_json(&layout_graph(&store, &args)?, args.pretty),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_logging();
    if let Err(err) = run(args) {
        tracing::debug!(error = ?err, "command failed");
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("framealign-cli")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn parses_layout_flags() {
        let args = parse_args(&argv(&[
            "layout",
            "sankey",
            "--scoring",
            "wn",
            "--frames",
            "E1, P2",
            "--focus",
            "primary:Motion.en",
            "--width",
            "1000",
            "doc.json",
        ]))
        .unwrap();
        assert_eq!(args.command, Command::LayoutSankey);
        assert_eq!(args.frames, vec!["E1".to_string(), "P2".to_string()]);
        assert_eq!(args.focus, Some(Focus::new(Part::Primary, "Motion.en")));
        assert_eq!(args.width, 1000.0);
        assert_eq!(args.height, 600.0);
        assert_eq!(args.input.as_deref(), Some("doc.json"));
    }

    #[test]
    fn rejects_malformed_flags() {
        assert!(matches!(
            parse_args(&argv(&["--focus", "middle:x"])),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&argv(&["--pair", "E1"])),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&argv(&["a.json", "b.json"])),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&argv(&["layout", "pie"])),
            Err(CliError::Usage(_))
        ));
    }
}
