mod store;

use chrono::Utc;
use prochart::layout::LayoutOptions;
use prochart::render::raster::{self, RasterOptions};
use prochart::render::{ChartRenderer, HeadlessError, RenderOptions, sanitize_svg_id};
use prochart::{
    ChartArchetype, ChartLibrary, ChartSpec, CompileOptions, ExportOutcome, GateViolation,
    LibraryQuery, ProductRecord, RecommendationRules, Selection, Theme, Wizard,
    extract_parameters, product::parse_catalog,
};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use store::JsonFileChartStore;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(prochart::Error),
    Gate(GateViolation),
    Render(HeadlessError),
    Raster(raster::RasterError),
    Export(prochart::render::export::ExportError),
    Json(serde_json::Error),
    ExportFailed(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Gate(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::Export(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::ExportFailed(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<prochart::Error> for CliError {
    fn from(value: prochart::Error) -> Self {
        Self::Core(value)
    }
}

impl From<GateViolation> for CliError {
    fn from(value: GateViolation) -> Self {
        Self::Gate(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Render(value)
    }
}

impl From<raster::RasterError> for CliError {
    fn from(value: raster::RasterError) -> Self {
        Self::Raster(value)
    }
}

impl From<prochart::render::export::ExportError> for CliError {
    fn from(value: prochart::render::export::ExportError) -> Self {
        Self::Export(value)
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
    Params,
    Recommend,
    Compile,
    Render,
    Save,
    Library,
    Delete,
    Reuse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
    Jpeg,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    catalog: Option<String>,
    library: Option<String>,
    products: Vec<String>,
    params: Vec<String>,
    archetype: Option<ChartArchetype>,
    title: Option<String>,
    theme: Theme,
    layout: Option<String>,
    rules: Option<String>,
    render_format: RenderFormat,
    render_scale: Option<f32>,
    background: Option<String>,
    diagram_id: Option<String>,
    out: Option<String>,
    search: String,
    insert: bool,
    pretty: bool,
    verbose: bool,
    target: Option<String>,
}

fn usage() -> &'static str {
    "prochart-cli\n\
\n\
USAGE:\n\
  prochart-cli params --catalog <path> [--products <id,...>]\n\
  prochart-cli recommend --products <id,...> --params <name,...> [--catalog <path>] [--rules <path>]\n\
  prochart-cli compile --catalog <path> --products <id,...> --params <name,...> --type <bar|line|pie|radar|table> [--title <t>] [--theme <name>]\n\
  prochart-cli render [--format svg|png|jpg] [--scale <n>] [--background <css-color>] [--layout <path>] [--id <chart-id>] [--out <path>] <compile args>\n\
  prochart-cli save --library <path> [--layout <path>] <compile args>\n\
  prochart-cli library --library <path> [--type <archetype>] [--search <text>]\n\
  prochart-cli delete --library <path> <chart-id>\n\
  prochart-cli reuse --library <path> [--insert] <chart-id>\n\
\n\
OPTIONS:\n\
  --pretty     pretty-print JSON output\n\
  --verbose    log diagnostics to stderr\n\
\n\
NOTES:\n\
  - --products and --params take comma-separated lists and may be repeated.\n\
  - render prints SVG to stdout by default; PNG/JPG default to ./chart.png or ./chart.jpg.\n\
  - --layout reads a JSON layout file (width, height, alignment, margin, padding, border, ...).\n\
"
}

fn push_list(out: &mut Vec<String>, raw: &str) {
    out.extend(
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    );
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut command_seen = false;

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        let mut value = || it.next().ok_or(CliError::Usage(usage()));
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "params" | "recommend" | "compile" | "render" | "save" | "library" | "delete"
            | "reuse"
                if !command_seen =>
            {
                command_seen = true;
                args.command = match a.as_str() {
                    "params" => Command::Params,
                    "recommend" => Command::Recommend,
                    "compile" => Command::Compile,
                    "render" => Command::Render,
                    "save" => Command::Save,
                    "library" => Command::Library,
                    "delete" => Command::Delete,
                    _ => Command::Reuse,
                };
            }
            "--catalog" => args.catalog = Some(value()?.clone()),
            "--library" => args.library = Some(value()?.clone()),
            "--products" => push_list(&mut args.products, value()?),
            "--params" => push_list(&mut args.params, value()?),
            "--type" => args.archetype = Some(value()?.parse::<ChartArchetype>()?),
            "--title" => args.title = Some(value()?.clone()),
            "--theme" => args.theme = value()?.parse::<Theme>()?,
            "--layout" => args.layout = Some(value()?.clone()),
            "--rules" => args.rules = Some(value()?.clone()),
            "--format" => {
                args.render_format = value()?
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                let scale = value()?
                    .parse::<f32>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if !(scale.is_finite() && scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
                args.render_scale = Some(scale);
            }
            "--background" => {
                let bg = value()?;
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--id" => args.diagram_id = Some(value()?.clone()),
            "--out" => args.out = Some(value()?.clone()),
            "--search" => args.search = value()?.clone(),
            "--insert" => args.insert = true,
            "--pretty" => args.pretty = true,
            "--verbose" | "-v" => args.verbose = true,
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            target => {
                if args.target.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.target = Some(target.to_string());
            }
        }
    }

    Ok(args)
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
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

fn load_catalog(args: &Args) -> Result<Vec<ProductRecord>, CliError> {
    let Some(path) = args.catalog.as_deref() else {
        return Err(CliError::Usage("--catalog <path> is required"));
    };
    Ok(parse_catalog(&std::fs::read_to_string(path)?)?)
}

fn pick_products(catalog: &[ProductRecord], ids: &[String]) -> Result<Vec<ProductRecord>, CliError> {
    ids.iter()
        .map(|id| {
            catalog
                .iter()
                .find(|p| &p.id == id)
                .cloned()
                .ok_or_else(|| CliError::Core(prochart::Error::UnknownProduct { id: id.clone() }))
        })
        .collect()
}

fn build_selection(args: &Args) -> Result<Selection, CliError> {
    let catalog = load_catalog(args)?;
    let mut selection = Selection::new();
    for product in pick_products(&catalog, &args.products)? {
        selection.add_product(product)?;
    }
    for name in &args.params {
        selection.add_parameter(name.as_str());
    }
    selection.check_products()?;
    selection.check_parameters()?;
    Ok(selection)
}

fn require_archetype(args: &Args) -> Result<ChartArchetype, CliError> {
    args.archetype
        .ok_or(CliError::Usage("--type <bar|line|pie|radar|table> is required"))
}

fn chart_title(args: &Args) -> String {
    args.title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Product comparison".to_string())
}

fn build_spec(args: &Args) -> Result<ChartSpec, CliError> {
    let selection = build_selection(args)?;
    let archetype = require_archetype(args)?;
    Ok(prochart::compile_with(
        &selection,
        archetype,
        &chart_title(args),
        args.theme,
        &CompileOptions::default(),
    ))
}

fn load_layout(args: &Args, archetype: ChartArchetype) -> Result<LayoutOptions, CliError> {
    let layout = match args.layout.as_deref() {
        Some(path) => serde_json::from_str::<LayoutOptions>(&std::fs::read_to_string(path)?)?,
        None => LayoutOptions::default(),
    };
    Ok(layout.normalized(archetype))
}

fn build_renderer(args: &Args) -> ChartRenderer {
    let mut raster = RasterOptions {
        background: args.background.clone(),
        ..RasterOptions::default()
    };
    if let Some(scale) = args.render_scale {
        raster.scale = scale;
    }
    let mut render = RenderOptions::default();
    if let Some(id) = args.diagram_id.as_deref() {
        render.diagram_id = Some(sanitize_svg_id(id));
    }
    ChartRenderer { render, raster }
}

fn open_library(args: &Args) -> Result<(Arc<JsonFileChartStore>, ChartLibrary), CliError> {
    let Some(path) = args.library.as_deref() else {
        return Err(CliError::Usage("--library <path> is required"));
    };
    let store = Arc::new(JsonFileChartStore::new(path));
    Ok((store.clone(), ChartLibrary::new(store)))
}

fn require_target(args: &Args) -> Result<&str, CliError> {
    args.target
        .as_deref()
        .ok_or(CliError::Usage("a chart id is required"))
}

fn run_params(args: &Args) -> Result<(), CliError> {
    let catalog = load_catalog(args)?;
    let products = if args.products.is_empty() {
        catalog
    } else {
        pick_products(&catalog, &args.products)?
    };
    write_json(&extract_parameters(&products), args.pretty)
}

fn run_recommend(args: &Args) -> Result<(), CliError> {
    let rules = match args.rules.as_deref() {
        Some(path) => serde_json::from_str::<RecommendationRules>(&std::fs::read_to_string(path)?)?,
        None => RecommendationRules::default(),
    };
    let product_count = if args.catalog.is_some() {
        build_selection(args)?.product_count()
    } else {
        args.products.len()
    };
    write_json(&rules.recommend(product_count, args.params.len()), args.pretty)
}

fn run_render(args: &Args) -> Result<(), CliError> {
    let spec = build_spec(args)?;
    let layout = load_layout(args, spec.archetype)?;
    let renderer = build_renderer(args);
    match args.render_format {
        RenderFormat::Svg => {
            let svg = renderer.render_svg_sync(&spec, &layout)?;
            match args.out.as_deref() {
                None => print!("{svg}"),
                Some(path) => std::fs::write(path, svg)?,
            }
        }
        RenderFormat::Png => {
            let bytes = renderer.render_png_sync(&spec, &layout)?;
            std::fs::write(args.out.as_deref().unwrap_or("chart.png"), bytes)?;
        }
        RenderFormat::Jpeg => {
            let bytes = renderer.render_jpeg_sync(&spec, &layout)?;
            std::fs::write(args.out.as_deref().unwrap_or("chart.jpg"), bytes)?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedOut<'a> {
    id: &'a str,
    title: &'a str,
    archetype: ChartArchetype,
    created_at: String,
}

/// Walks a wizard through every step with the requested choices, then exports and saves.
fn run_save(args: &Args) -> Result<(), CliError> {
    let catalog = load_catalog(args)?;
    let archetype = require_archetype(args)?;
    let (store, _) = open_library(args)?;

    let mut wizard = Wizard::new(catalog, store);
    for id in &args.products {
        wizard.select_product(id)?;
    }
    wizard.next()?;
    for name in &args.params {
        wizard.select_parameter(name);
    }
    wizard.next()?;
    wizard.choose_archetype(archetype);
    wizard.set_title(chart_title(args));
    wizard.set_theme(args.theme);
    wizard.next()?;
    wizard.layout_mut().replace(load_layout(args, archetype)?);
    wizard.next()?;

    let exporter = build_renderer(args).exporter();
    match exporter.run_blocking(&mut wizard)? {
        ExportOutcome::Saved(record) => write_json(
            &SavedOut {
                id: &record.id,
                title: &record.title,
                archetype: record.config.archetype,
                created_at: record.created_at.to_rfc3339(),
            },
            args.pretty,
        ),
        ExportOutcome::Failed(msg) => Err(CliError::ExportFailed(msg)),
        ExportOutcome::Stale => Err(CliError::ExportFailed("export was discarded".to_string())),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LibraryRow {
    id: String,
    title: String,
    archetype: ChartArchetype,
    created: String,
    repaired: bool,
    summary: String,
}

fn run_library(args: &Args) -> Result<(), CliError> {
    let (_, library) = open_library(args)?;
    let query = LibraryQuery {
        archetype: args.archetype,
        search: args.search.clone(),
    };
    let rows: Vec<LibraryRow> = library
        .browse(&query, Utc::now())?
        .into_iter()
        .map(|e| LibraryRow {
            created: e.display_time.label(),
            summary: e.record.config.data_summary(),
            archetype: e.record.config.archetype,
            id: e.record.id,
            title: e.record.title,
            repaired: e.repaired,
        })
        .collect();
    write_json(&rows, args.pretty)
}

fn run_delete(args: &Args) -> Result<(), CliError> {
    let (_, library) = open_library(args)?;
    let id = require_target(args)?;
    library.delete(id)?;
    tracing::info!(id, "chart deleted");
    Ok(())
}

fn run_reuse(args: &Args) -> Result<(), CliError> {
    let (_, library) = open_library(args)?;
    let id = require_target(args)?;
    if args.insert {
        let record = library.find(id, Utc::now())?;
        write_json(&record.insert_event(), args.pretty)
    } else {
        write_json(&library.reuse(id, Utc::now())?, args.pretty)
    }
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Params => run_params(&args),
        Command::Recommend => run_recommend(&args),
        Command::Compile => write_json(&build_spec(&args)?, args.pretty),
        Command::Render => run_render(&args),
        Command::Save => run_save(&args),
        Command::Library => run_library(&args),
        Command::Delete => run_delete(&args),
        Command::Reuse => run_reuse(&args),
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

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(CliError::Gate(err)) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
