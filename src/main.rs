use clap::{Parser, Subcommand};
use chrono::{Local, NaiveDate};
use comfy_table::{Attribute, Cell, Color, Table};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use invoice_render::placeholder::{Period, TOKENS};
use invoice_render::{
    compose_css, substitute, HeadlessBrowser, InvoiceArchive, InvoiceRenderer, OutputFormat, Rasterizer,
    RecurringInvoice, RenderRequest, TemplateRegistry,
};

type CliResult<T> = Result<T, Box<dyn Error>>;

// ==========================================
// Settings
// ==========================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct AppSettings {
    output_dir: String,
    catalogs: Vec<String>,
    browser: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            output_dir: "~/Documents/Invoices".to_string(),
            catalogs: Vec::new(),
            browser: "chromium".to_string(),
        }
    }
}

// ==========================================
// CLI
// ==========================================

#[derive(Parser)]
#[command(name = "invoice-render", version, about = "Render invoices from template descriptors")]
struct Cli {
    /// Extra template catalog (TOML) merged over the built-in templates
    #[arg(long, global = true)]
    catalog: Vec<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an invoice request (JSON) to HTML, PDF or PNG
    Render {
        input: PathBuf,
        /// Output file (defaults to the configured output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Template id, overriding the request's templateId
        #[arg(short, long)]
        template: Option<String>,
        #[arg(long, conflicts_with = "png")]
        pdf: bool,
        #[arg(long)]
        png: bool,
        /// Reveal the result in the file manager
        #[arg(long)]
        open: bool,
    },
    /// List available templates
    Templates,
    /// Print the stylesheet of a template
    Css { template: String },
    /// Resolve {{TOKEN}} placeholders in text
    Substitute {
        text: String,
        /// Reference date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the upcoming generation dates of a recurring invoice
    Schedule {
        file: PathBuf,
        #[arg(long, default_value_t = 6)]
        count: usize,
        /// Evaluate as of this date instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Issue the next invoice of a recurring invoice and advance its schedule
    Generate {
        file: PathBuf,
        /// Invoice number prefix
        #[arg(long, default_value = "INV")]
        prefix: String,
        /// Run date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Generate even if the schedule is not due
        #[arg(long)]
        force: bool,
        #[arg(long)]
        pdf: bool,
    },
    /// Show or change settings
    Config {
        #[arg(long)]
        output_dir: Option<String>,
        /// Catalog to load on every run (repeatable)
        #[arg(long = "add-catalog")]
        add_catalog: Vec<String>,
        #[arg(long)]
        clear_catalogs: bool,
        #[arg(long)]
        browser: Option<String>,
    },
}

// ==========================================
// Main Function
// ==========================================

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let settings = load_settings()?;

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Render { input, output, template, pdf, png, open } => {
            let renderer = InvoiceRenderer::new(load_registry(&settings, &cli.catalog)?)?;
            let mut request: RenderRequest = serde_json::from_str(&fs::read_to_string(&input)?)?;
            if template.is_some() {
                request.template_id = template;
            }
            let format = match (pdf, png) {
                (true, _) => Some(OutputFormat::Pdf),
                (_, true) => Some(OutputFormat::Png),
                _ => None,
            };
            let path = write_invoice(&renderer, &settings, &request, output, format)?;
            if open {
                open_and_reveal(&path);
            }
        }
        Commands::Templates => {
            show_templates(&load_registry(&settings, &cli.catalog)?);
        }
        Commands::Css { template } => {
            let registry = load_registry(&settings, &cli.catalog)?;
            let descriptor = registry
                .get(&template)
                .ok_or_else(|| format!("Unknown template '{}'", template))?;
            print!("{}", compose_css(descriptor));
        }
        Commands::Substitute { text, date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            println!("{}", substitute(&text, date));
        }
        Commands::Schedule { file, count, today } => {
            let recurring: RecurringInvoice = serde_json::from_str(&fs::read_to_string(&file)?)?;
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            show_schedule(&recurring, today, count);
        }
        Commands::Generate { file, prefix, date, force, pdf } => {
            let renderer = InvoiceRenderer::new(load_registry(&settings, &cli.catalog)?)?;
            let run_date = date.unwrap_or_else(|| Local::now().date_naive());
            generate(&renderer, &settings, &file, &prefix, run_date, force, pdf)?;
        }
        Commands::Config { output_dir, add_catalog, clear_catalogs, browser } => {
            update_settings(settings, output_dir, add_catalog, clear_catalogs, browser)?;
        }
    }
    Ok(())
}

// ==========================================
// 1. Rendering
// ==========================================

fn load_registry(settings: &AppSettings, extra: &[PathBuf]) -> CliResult<TemplateRegistry> {
    let mut registry = TemplateRegistry::builtin()?;
    let configured = settings.catalogs.iter().map(|c| PathBuf::from(expand_home_dir(c)));
    for path in configured.chain(extra.iter().cloned()) {
        let count = registry
            .merge_file(&path)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        log::info!("Loaded {} template(s) from {}", count, path.display());
    }
    Ok(registry)
}

fn archive(settings: &AppSettings) -> InvoiceArchive {
    InvoiceArchive::new(expand_home_dir(&settings.output_dir))
}

fn write_invoice(
    renderer: &InvoiceRenderer,
    settings: &AppSettings,
    request: &RenderRequest,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
) -> CliResult<PathBuf> {
    let rendered = renderer.render(request)?;
    if rendered.used_fallback {
        println!("⚠️  Unknown template, used '{}' instead.", rendered.template_id);
    }

    let extension = format.map_or("html", OutputFormat::extension);
    let path = match output {
        Some(path) => path,
        None => {
            let filed = request.invoice.issue_date().unwrap_or_else(|| Local::now().date_naive());
            archive(settings).path_for(&request.invoice.invoice_number, filed, extension)
        }
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    match format {
        None => fs::write(&path, &rendered.html)?,
        Some(format) => {
            println!("\n🔨 Rasterizing {}...", extension.to_uppercase());
            let bytes = HeadlessBrowser::new(&settings.browser).rasterize(&rendered.html, format)?;
            fs::write(&path, bytes)?;
        }
    }
    println!("✅ Invoice written: {}", path.display());
    Ok(path)
}

fn show_templates(registry: &TemplateRegistry) {
    let default_id = &registry.default_descriptor().id;

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Id"),
        Cell::new("Name"),
        Cell::new("Style"),
        Cell::new("Header"),
        Cell::new("Items"),
        Cell::new("Footer"),
    ]);

    for descriptor in registry.iter() {
        let layout = &descriptor.layout;
        let id_cell = if &descriptor.id == default_id {
            Cell::new(format!("{} (default)", descriptor.id)).add_attribute(Attribute::Bold)
        } else {
            Cell::new(&descriptor.id)
        };
        let mut style_cell = Cell::new(tag(&layout.style));
        if !layout.unrecognized().is_empty() {
            style_cell = style_cell.fg(Color::Rgb { r: 185, g: 28, b: 28 });
        }
        table.add_row(vec![
            id_cell,
            Cell::new(descriptor.display_name()),
            style_cell,
            Cell::new(tag(&layout.header_position)),
            Cell::new(tag(&layout.items_layout)),
            Cell::new(tag(&layout.footer_layout)),
        ]);
    }

    println!("\n--- Templates ({}) ---", registry.len());
    println!("{table}");
}

/// The serialized tag of a layout variant, e.g. `simple-lines`.
fn tag<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

// ==========================================
// 2. Recurring Invoices
// ==========================================

fn show_schedule(recurring: &RecurringInvoice, today: NaiveDate, count: usize) {
    let schedule = &recurring.schedule;
    let sample = recurring
        .request
        .invoice
        .line_items
        .iter()
        .find_map(|item| item.description.as_deref().filter(|d| d.contains("{{")));

    let mut table = Table::new();
    let mut header = vec![Cell::new("#"), Cell::new("Date"), Cell::new("Period"), Cell::new("Note")];
    if sample.is_some() {
        header.push(Cell::new("Description"));
    }
    table.set_header(header);

    for (i, run) in schedule.upcoming_runs(count).into_iter().enumerate() {
        let date = run.date;
        let period = Period::ending(date);
        let period_str = format!("{} - {}", period.start.format("%b %-d, %Y"), period.end.format("%b %-d, %Y"));
        let mut date_cell = Cell::new(date.format("%Y-%m-%d"));
        let note = if run.paused {
            date_cell = date_cell.fg(Color::Rgb { r: 156, g: 163, b: 175 });
            "paused"
        } else {
            if date <= today {
                date_cell = date_cell.fg(Color::Rgb { r: 4, g: 120, b: 87 });
            }
            ""
        };
        let mut row = vec![Cell::new(i + 1), date_cell, Cell::new(period_str), Cell::new(note)];
        if let Some(text) = sample {
            row.push(Cell::new(substitute(text, date)));
        }
        table.add_row(row);
    }

    println!("\n--- {} schedule ---", schedule.frequency.label());
    println!("{table}");

    if !schedule.is_active {
        println!("⏹  Schedule is inactive.");
    } else if schedule.is_paused(today) {
        println!("⏸  Paused until {}.", schedule.paused_until.unwrap_or(today));
    } else if schedule.is_due(today) {
        println!("🔔 Due today ({}).", today);
    }
    println!("Tokens: {}", TOKENS.join(", "));
}

fn generate(
    renderer: &InvoiceRenderer,
    settings: &AppSettings,
    file: &Path,
    prefix: &str,
    run_date: NaiveDate,
    force: bool,
    pdf: bool,
) -> CliResult<()> {
    let mut recurring: RecurringInvoice = serde_json::from_str(&fs::read_to_string(file)?)?;

    if !force && !recurring.schedule.is_due(run_date) {
        println!(
            "Nothing to do: next generation is {}.",
            recurring.schedule.next_date().format("%Y-%m-%d")
        );
        return Ok(());
    }

    let browser = HeadlessBrowser::new(&settings.browser);
    let rasterizer = pdf.then_some(&browser as &dyn Rasterizer);
    if pdf {
        println!("\n🔨 Rasterizing PDF...");
    }
    let issued = archive(settings).issue(renderer, &mut recurring, prefix, run_date, rasterizer)?;
    if issued.used_fallback {
        println!("⚠️  Unknown template, used '{}' instead.", issued.template_id);
    }
    println!("✅ Invoice {} written: {}", issued.number, issued.path.display());

    match issued.next_run {
        Some(next) => println!("📅 Next generation: {}", next.format("%Y-%m-%d")),
        None => println!("⏹  Schedule finished."),
    }
    fs::write(file, serde_json::to_string_pretty(&recurring)?)?;
    Ok(())
}

// ==========================================
// 3. Config & Utilities
// ==========================================

fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "invoice-render", "app") {
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).ok();
        }
        return config_dir.join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

fn load_settings() -> CliResult<AppSettings> {
    let path = get_config_path();
    if !path.exists() {
        return Ok(AppSettings::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| format!("{}: {}", path.display(), e).into())
}

fn update_settings(
    mut settings: AppSettings,
    output_dir: Option<String>,
    add_catalog: Vec<String>,
    clear_catalogs: bool,
    browser: Option<String>,
) -> CliResult<()> {
    let changed = output_dir.is_some() || !add_catalog.is_empty() || clear_catalogs || browser.is_some();

    if let Some(dir) = output_dir {
        settings.output_dir = dir;
    }
    if clear_catalogs {
        settings.catalogs.clear();
    }
    settings.catalogs.extend(add_catalog);
    if let Some(browser) = browser {
        settings.browser = browser;
    }

    let path = get_config_path();
    if changed {
        fs::write(&path, toml::to_string_pretty(&settings)?)?;
        println!("✅ Settings saved to {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![Cell::new("Setting"), Cell::new("Value")]);
    table.add_row(vec![Cell::new("output_dir"), Cell::new(&settings.output_dir)]);
    table.add_row(vec![Cell::new("browser"), Cell::new(&settings.browser)]);
    table.add_row(vec![Cell::new("catalogs"), Cell::new(settings.catalogs.join("\n"))]);
    println!("{table}");
    Ok(())
}

fn expand_home_dir(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}

// Helper: Open file and reveal in Finder/Explorer
fn open_and_reveal(path: &Path) {
    #[cfg(target_os = "macos")]
    Command::new("open").arg("-R").arg(path).spawn().ok();

    #[cfg(target_os = "windows")]
    Command::new("explorer").arg(format!("/select,{}", path.to_string_lossy())).spawn().ok();

    #[cfg(target_os = "linux")]
    if let Some(parent) = path.parent() {
        Command::new("xdg-open").arg(parent).spawn().ok();
    }

    #[cfg(target_os = "macos")]
    Command::new("open").arg(path).spawn().ok();

    #[cfg(target_os = "windows")]
    Command::new("explorer").arg(path).spawn().ok();

    #[cfg(target_os = "linux")]
    Command::new("xdg-open").arg(path).spawn().ok();
}
