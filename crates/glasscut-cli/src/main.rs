use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use glasscut_core::{
    calculate_price, optimize, round_for_display, GlassCatalog, LengthUnit, OptimizationResult,
    OptimizeRequest, OptimizeResponse, OptimizerConfig, PriceBreakdown, PriceRequest,
    PriceResponse, StaticCatalog, StockSheet,
};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glasscut")]
#[command(about = "Glass cutting optimizer - lay out pieces on stock sheets and price the glass", long_about = None)]
struct Cli {
    /// Optimizer config file (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Glass catalog file (YAML or JSON); the built-in price list is used otherwise
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize a cutting layout
    Optimize {
        /// Request file (YAML or JSON)
        #[arg(short, long, conflicts_with = "dimensions")]
        input: Option<PathBuf>,

        /// Piece list, e.g. "500x300x2, 400x200f"
        #[arg(short, long)]
        dimensions: Option<String>,

        /// Stock sheet size such as 321x225; repeat to add alternate sizes
        #[arg(short, long = "stock")]
        stock: Vec<StockSheet>,

        #[command(flatten)]
        overrides: ConfigOverrides,

        /// Output file for the response (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Calculate the price of used area plus waste
    Price {
        /// Glass type name or id
        #[arg(short, long)]
        glass: String,

        /// Used area in square meters
        #[arg(short, long)]
        area: f64,

        /// Waste percentage from the optimization
        #[arg(short, long, default_value_t = 0.0)]
        waste: f64,

        /// Output file for the response (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List glass categories, or the glass types of one category
    Catalog {
        #[arg(long)]
        category: Option<u32>,
    },

    /// Optimize several request files in parallel
    Batch {
        /// Request files (YAML or JSON)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory receiving one `<name>.result.json` per request
        #[arg(short, long)]
        out_dir: PathBuf,

        #[command(flatten)]
        overrides: ConfigOverrides,
    },
}

/// Command-line settings. They take precedence over the config file and over
/// settings carried by a request file.
#[derive(clap::Args)]
struct ConfigOverrides {
    /// Gap left by the cutting tool between pieces
    #[arg(long)]
    kerf: Option<f64>,

    /// Keep every piece in its given orientation unless it carries an `r` marker
    #[arg(long)]
    no_rotation: bool,

    /// Maximum number of pieces after quantities are expanded
    #[arg(long)]
    max_pieces: Option<u64>,

    /// Length unit of all dimensions (mm, cm or m)
    #[arg(long)]
    unit: Option<LengthUnit>,
}

impl ConfigOverrides {
    fn apply(&self, mut config: OptimizerConfig) -> OptimizerConfig {
        if let Some(kerf) = self.kerf {
            config.kerf = kerf;
        }
        if self.no_rotation {
            config.allow_rotation = false;
        }
        if let Some(max_pieces) = self.max_pieces {
            config.max_pieces = max_pieces;
        }
        if let Some(unit) = self.unit {
            config.length_unit = unit;
        }
        config
    }

    /// Replaces the request's own rotation and kerf settings with the flags
    /// given on the command line.
    fn apply_to_request(&self, request: &mut OptimizeRequest) {
        if let Some(kerf) = self.kerf {
            request.kerf = Some(kerf);
        }
        if self.no_rotation {
            request.allow_rotation = Some(false);
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Optimize {
            input,
            dimensions,
            stock,
            overrides,
            output,
        } => {
            let config = overrides.apply(load_config(cli.config.as_deref())?);
            optimize_command(input, dimensions, stock, config, &overrides, output)?;
        }
        Commands::Price {
            glass,
            area,
            waste,
            output,
        } => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            price_command(&catalog, glass, area, waste, output)?;
        }
        Commands::Catalog { category } => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            catalog_command(&catalog, category);
        }
        Commands::Batch {
            inputs,
            out_dir,
            overrides,
        } => {
            let config = overrides.apply(load_config(cli.config.as_deref())?);
            batch_command(&inputs, &out_dir, &config, &overrides)?;
        }
    }

    Ok(())
}

fn optimize_command(
    input: Option<PathBuf>,
    dimensions: Option<String>,
    stock: Vec<StockSheet>,
    config: OptimizerConfig,
    overrides: &ConfigOverrides,
    output: Option<PathBuf>,
) -> Result<()> {
    eprintln!("{}", "🔍 Loading input...".bright_blue());

    let mut request = match (input, dimensions) {
        (Some(path), _) => read_structured::<OptimizeRequest>(&path)?,
        (None, Some(dimensions)) => OptimizeRequest::new(dimensions, StockSheet::standard()),
        (None, None) => bail!("Provide either --input FILE or --dimensions TEXT"),
    };

    if let Some((primary, alternates)) = stock.split_first() {
        request.stock_width = primary.width;
        request.stock_height = primary.height;
        request.stock_sheets = alternates.to_vec();
    }
    overrides.apply_to_request(&mut request);

    let stock_labels: Vec<String> = request.stock().iter().map(StockSheet::label).collect();
    eprintln!("  Stock sheets: {}", stock_labels.join(", ").bright_white().bold());
    eprintln!();

    eprintln!("{}", "🚀 Running optimization...".bright_blue());
    info!(
        stock = ?stock_labels,
        kerf = request.kerf.unwrap_or(config.kerf),
        "optimizing request"
    );

    let result = optimize(&request, &config);
    if let Ok(result) = &result {
        print_result(result, config.length_unit);
    }

    let failure = result.as_ref().err().cloned();
    let response = OptimizeResponse::from(result);
    write_response(&response, output.as_deref(), &mut std::io::stdout().lock())?;

    if let Some(err) = failure {
        error!(kind = ?err.kind(), "optimization failed");
        return Err(err.into());
    }

    Ok(())
}

fn print_result(result: &OptimizationResult, unit: LengthUnit) {
    let summary = &result.summary;

    eprintln!();
    eprintln!("{}", "✅ Optimization complete!".bright_green().bold());
    eprintln!();
    eprintln!("{}", "📊 Results:".bright_yellow().bold());
    eprintln!("  Sheets required:");
    for (size, count) in &summary.sheets_required {
        eprintln!("    • {}: {} sheets", size.bright_white(), count);
    }
    eprintln!();

    for sheet in &result.sheets {
        let rotated = sheet.layout.iter().filter(|p| p.rotated).count();
        eprintln!(
            "  Sheet #{} ({}x{}): {} pieces ({} rotated), waste {:.2}%",
            sheet.sheet_number,
            sheet.stock_width,
            sheet.stock_height,
            sheet.layout.len(),
            rotated,
            sheet.waste_percentage
        );
    }
    eprintln!();

    eprintln!(
        "  Total sheets: {}",
        summary.total_sheets.to_string().bright_white().bold()
    );
    eprintln!(
        "  Glass used: {} m² ({:?} input)",
        format!("{:.2}", summary.used_area_m2).bright_white(),
        unit
    );
    eprintln!(
        "  Total waste: {}",
        format!("{:.2}%", summary.waste_percentage).bright_white()
    );
    eprintln!();
}

fn price_command(
    catalog: &StaticCatalog,
    glass: String,
    area: f64,
    waste: f64,
    output: Option<PathBuf>,
) -> Result<()> {
    let request = PriceRequest {
        glass_type: glass,
        area,
        waste_percentage: waste,
    };
    info!(glass = %request.glass_type, area, waste, "calculating price");

    let result = calculate_price(catalog, &request);
    if let Ok(price) = &result {
        print_price(price);
    }

    let failure = result.as_ref().err().cloned();
    write_response(
        &PriceResponse::from(result),
        output.as_deref(),
        &mut std::io::stdout().lock(),
    )?;

    if let Some(err) = failure {
        error!(kind = ?err.kind(), "price calculation failed");
        return Err(err.into());
    }

    Ok(())
}

fn print_price(price: &PriceBreakdown) {
    eprintln!();
    eprintln!("{}", "💶 Price:".bright_yellow().bold());
    eprintln!("  {}", price.glass_name.bright_cyan().bold());
    eprintln!(
        "  Glass area ({:.2} m²): {:>10.2} €",
        round_for_display(price.area),
        round_for_display(price.area_price)
    );
    if price.billed_area > price.area {
        eprintln!(
            "  {}",
            format!(
                "Billed at the minimum of {:.2} m²",
                round_for_display(price.billed_area)
            )
            .yellow()
        );
    }
    eprintln!(
        "  Waste ({:.2} m²):      {:>10.2} €",
        round_for_display(price.waste_area),
        round_for_display(price.waste_price)
    );
    eprintln!(
        "  {} {}",
        "Total:".bold(),
        format!("{:.2} €", round_for_display(price.total_price))
            .bright_green()
            .bold()
    );
    eprintln!();
}

fn catalog_command(catalog: &StaticCatalog, category: Option<u32>) {
    match category {
        None => {
            println!("{}", "📚 Glass categories:".bright_yellow().bold());
            for category in catalog.categories() {
                println!("  {:>3}  {}", category.id, category.name.bright_white());
            }
        }
        Some(category_id) => {
            let types = catalog.glass_types(category_id);
            if types.is_empty() {
                warn!(category_id, "no glass types in category");
            }
            println!(
                "{}",
                format!("📚 Glass types in category {category_id}:")
                    .bright_yellow()
                    .bold()
            );
            for glass in types {
                println!(
                    "  {:>3}  {:<28} {:>8.2} €/m²",
                    glass.id,
                    glass.name.bright_white(),
                    glass.price_per_square_meter
                );
            }
        }
    }
}

fn batch_command(
    inputs: &[PathBuf],
    out_dir: &Path,
    config: &OptimizerConfig,
    overrides: &ConfigOverrides,
) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Cannot create output directory {}", out_dir.display()))?;

    println!(
        "{}",
        format!("🚀 Optimizing {} requests...", inputs.len()).bright_blue()
    );

    let outcomes: Vec<(&PathBuf, Result<bool>)> = inputs
        .par_iter()
        .map(|input| (input, run_batch_item(input, out_dir, config, overrides)))
        .collect();

    let mut failed = 0;
    for (input, outcome) in &outcomes {
        match outcome {
            Ok(true) => println!("  {} {}", "✅".bright_green(), input.display()),
            Ok(false) => {
                failed += 1;
                println!("  {} {} (no layout)", "⚠️".bright_yellow(), input.display());
            }
            Err(err) => {
                failed += 1;
                println!("  {} {}: {:#}", "❌".bright_red(), input.display(), err);
            }
        }
    }

    println!();
    println!(
        "💾 Wrote results to {}",
        out_dir.display().to_string().bright_white()
    );

    if failed > 0 {
        bail!("{failed} of {} requests failed", inputs.len());
    }
    Ok(())
}

/// Optimizes one request file and writes its response. Returns whether a
/// layout was found.
fn run_batch_item(
    input: &Path,
    out_dir: &Path,
    config: &OptimizerConfig,
    overrides: &ConfigOverrides,
) -> Result<bool> {
    let mut request: OptimizeRequest = read_structured(input)?;
    overrides.apply_to_request(&mut request);
    let response = OptimizeResponse::from(optimize(&request, config));
    info!(
        input = %input.display(),
        success = response.success,
        sheets = response.sheets.len(),
        "batch item done"
    );

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("request");
    let output = out_dir.join(format!("{stem}.result.json"));
    std::fs::write(&output, serde_json::to_string_pretty(&response)?)
        .with_context(|| format!("Cannot write {}", output.display()))?;

    Ok(response.success)
}

fn load_config(path: Option<&Path>) -> Result<OptimizerConfig> {
    match path {
        Some(path) => {
            let config = read_structured(path)?;
            info!(path = %path.display(), ?config, "loaded optimizer config");
            Ok(config)
        }
        None => Ok(OptimizerConfig::default()),
    }
}

fn load_catalog(path: Option<&Path>) -> Result<StaticCatalog> {
    let Some(path) = path else {
        return Ok(StaticCatalog::default());
    };

    let catalog: StaticCatalog = read_structured(path)?;
    catalog
        .validate()
        .with_context(|| format!("Invalid catalog {}", path.display()))?;
    info!(
        path = %path.display(),
        glass_types = catalog.glass_types.len(),
        "loaded glass catalog"
    );
    Ok(catalog)
}

/// Reads a YAML or JSON file, chosen by extension.
fn read_structured<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;

    let value = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?,
    };
    Ok(value)
}

/// Writes the JSON response to `output`, or to `stdout` when no file is
/// given. Nothing else is ever written to `stdout`.
fn write_response<T: Serialize>(
    response: &T,
    output: Option<&Path>,
    stdout: &mut impl Write,
) -> Result<()> {
    let json = serde_json::to_string_pretty(response)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Cannot write {}", path.display()))?;
            eprintln!(
                "💾 Saved result to {}",
                path.display().to_string().bright_white()
            );
        }
        None => writeln!(stdout, "{json}")?,
    }
    Ok(())
}
