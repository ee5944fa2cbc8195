use cashflow_core::{CashFlow, LayoutConfig};
use cashflow_layout::{
    ColumnDragController, ColumnOffsets, DragEffect, Surface, layout_cash_flow, layout_or_empty,
};
use serde::Serialize;
use std::io::Read;
use std::str::FromStr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Input(cashflow_core::Error),
    Layout(cashflow_layout::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Input(err) => write!(f, "{err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<cashflow_core::Error> for CliError {
    fn from(value: cashflow_core::Error) -> Self {
        Self::Input(value)
    }
}

impl From<cashflow_layout::Error> for CliError {
    fn from(value: cashflow_layout::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Totals,
    Sample,
}

/// A scripted drag: grab `column` at `from`, move to `to` with the button held.
#[derive(Debug, Clone, Copy)]
struct DragSpec {
    column: usize,
    from: f64,
    to: f64,
}

impl FromStr for DragSpec {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let column = parts.next().ok_or(())?.trim().parse::<usize>().map_err(|_| ())?;
        let from = parts.next().ok_or(())?.trim().parse::<f64>().map_err(|_| ())?;
        let to = parts.next().ok_or(())?.trim().parse::<f64>().map_err(|_| ())?;
        if parts.next().is_some() {
            return Err(());
        }
        Ok(Self { column, from, to })
    }
}

fn parse_offsets(s: &str) -> Option<ColumnOffsets> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;
    let values: [f64; cashflow_core::COLUMN_COUNT] = values.try_into().ok()?;
    Some(ColumnOffsets::new(values))
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    strict: bool,
    verbose: bool,
    width: Option<f64>,
    height: Option<f64>,
    offsets: Option<ColumnOffsets>,
    drag: Option<DragSpec>,
    config: Option<String>,
}

fn usage() -> &'static str {
    "cashflow-cli\n\
\n\
USAGE:\n\
  cashflow-cli [layout] [--pretty] [--width <w>] [--height <h>] [--offsets <a,b,c,d,e>] [--drag <column>:<fromX>:<toX>] [--config <path>] [--strict] [--verbose] [<path>|-]\n\
  cashflow-cli totals [--pretty] [<path>|-]\n\
  cashflow-cli sample [--pretty]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', records are read from stdin (JSON or YAML).\n\
  - layout prints the node/link geometry as JSON; without --strict, invalid records yield an empty geometry.\n\
  - --height defaults to a height derived from --width.\n\
  - --drag and --offsets are mutually exclusive.\n\
  - Logging goes to stderr; RUST_LOG overrides the level.\n\
"
}

fn next_f64<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<f64, CliError> {
    let Some(raw) = it.next() else {
        return Err(CliError::Usage(usage()));
    };
    let v = raw.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if !v.is_finite() {
        return Err(CliError::Usage(usage()));
    }
    Ok(v)
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "totals" => args.command = Command::Totals,
            "sample" => args.command = Command::Sample,
            "--pretty" => args.pretty = true,
            "--strict" => args.strict = true,
            "--verbose" | "-v" => args.verbose = true,
            "--width" => args.width = Some(next_f64(&mut it)?),
            "--height" => args.height = Some(next_f64(&mut it)?),
            "--offsets" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.offsets = Some(parse_offsets(raw).ok_or(CliError::Usage(usage()))?);
            }
            "--drag" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.drag = Some(
                    raw.parse::<DragSpec>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
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

    if args.offsets.is_some() && args.drag.is_some() {
        return Err(CliError::Usage(usage()));
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

fn load_config(path: Option<&str>) -> Result<LayoutConfig, CliError> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let text = std::fs::read_to_string(path)?;
    let cfg = if text.trim_start().starts_with('{') {
        LayoutConfig::from_json_str(&text)?
    } else {
        LayoutConfig::from_yaml_str(&text)?
    };
    Ok(cfg)
}

fn drag_offsets(drag: DragSpec, surface_width: f64, config: &LayoutConfig) -> ColumnOffsets {
    let mut controller = ColumnDragController::new(surface_width, config.max_drag_ratio);
    let started = controller.pointer_down(drag.column, drag.from);
    let moved = controller.pointer_move(drag.to, true);
    if !matches!(moved, DragEffect::Moved { .. }) {
        tracing::warn!(?started, ?moved, "scripted drag had no effect");
    }
    *controller.offsets()
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "cashflow_core=debug,cashflow_layout=debug,cashflow_cli=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: Args) -> Result<(), CliError> {
    if let Command::Sample = args.command {
        return write_json(&CashFlow::sample(), args.pretty);
    }

    let text = read_input(args.input.as_deref())?;
    let flow = CashFlow::from_text(&text)?;

    match args.command {
        Command::Sample => Ok(()),
        Command::Totals => {
            flow.validate()?;
            write_json(&flow.totals(), args.pretty)
        }
        Command::Layout => {
            let config = load_config(args.config.as_deref())?;
            let width = args.width.unwrap_or(config.default_surface_width);
            let height = match (args.height, args.width) {
                (Some(h), _) => h,
                (None, Some(w)) => config.surface_height_for(w),
                (None, None) => config.default_surface_height,
            };
            let offsets = match (args.drag, args.offsets) {
                (Some(drag), _) => drag_offsets(drag, width, &config),
                (None, Some(offsets)) => offsets,
                (None, None) => ColumnOffsets::default(),
            };
            tracing::debug!(width, height, ?offsets, "laying out cash flow");

            let surface = Surface::new(width, height);
            let geometry = if args.strict {
                layout_cash_flow(&flow.income, &flow.expenses, surface, &offsets, &config)?
            } else {
                layout_or_empty(&flow.income, &flow.expenses, surface, &offsets, &config)
            };
            write_json(&geometry, args.pretty)
        }
    }
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

    init_tracing(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
