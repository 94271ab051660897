use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;

use porchmap::api::{ArtistPageClient, NominatimClient};
use porchmap::config::{DEFAULT_DATA_DIR, DEFAULT_YEAR, FileConfig, GeocoderConfig};
use porchmap::enrich::{EnrichStats, Enricher};
use porchmap::logging;
use porchmap::output::{
    FeatureCollection, feature_collection, write_artist_profile, write_events,
    write_feature_collection, write_tabular,
};
use porchmap::parse::EventClock;
use porchmap::source::{ListingEntry, read_raw_table, read_records};

/// Geocode porch festival listings into CSV and GeoJSON for the event map
///
/// Examples:
///   # Append coordinates to data/2025/input.csv -> data/2025/output.csv
///   porchmap --year 2025
///
///   # Build the map's GeoJSON instead
///   porchmap --year 2025 --format geojson --event-date 2025-05-10
///
///   # Convert a raw listing table dumped from the festival site
///   porchmap import-raw data/raw-2024-05-06.json --geojson data/output.geojson
///
///   # Save artist details and photos
///   porchmap scrape https://example.org/view/porchfest-single-entry/entry/846/
#[derive(Parser, Debug)]
#[command(name = "porchmap")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches porchmap.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding one sub-directory per festival year
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Base URL of the geocoding service
    #[arg(long, global = true)]
    geocoder_url: Option<String>,

    /// Locality appended to addresses that don't mention it
    #[arg(long, global = true)]
    locality: Option<String>,

    /// Time zone the listing's clock times are in
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// Festival date (YYYY-MM-DD) the clock times fall on; defaults to today
    #[arg(long, global = true)]
    event_date: Option<NaiveDate>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Festival year: reads data/<year>/input.csv
    #[arg(short = 'y', long)]
    year: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Output path (defaults to data/<year>/output.csv or output.geojson)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enrich the raw listing table scraped from the festival site
    ImportRaw {
        /// Raw table JSON: {"data": [[name, start, end, genres, address], ...]}
        input: PathBuf,

        /// Event list output (defaults to data/artists.json)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Also write a GeoJSON FeatureCollection here
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
    /// Save artist detail pages and images
    Scrape {
        /// Artist entry URLs (.../entry/<id>/)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Directory receiving one folder per artist
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Geojson,
}

impl OutputFormat {
    fn file_name(self) -> &'static str {
        match self {
            OutputFormat::Csv => "output.csv",
            OutputFormat::Geojson => "output.geojson",
        }
    }
}

/// Everything resolved from CLI flags, config file and defaults.
struct Settings {
    data_dir: PathBuf,
    year: String,
    geocoder: GeocoderConfig,
    clock: EventClock,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = match args.config {
        Some(ref path) => Some(FileConfig::load_from(path)?),
        None => FileConfig::load(),
    };

    let verbose = args.verbose || file_config.as_ref().map(|c| c.verbose).unwrap_or(false);
    logging::init(verbose);

    let settings = resolve_settings(&args, file_config.as_ref())?;

    println!("porchmap - Porch Festival Geocoder");
    println!("==================================");
    println!();

    if verbose {
        println!("Configuration:");
        println!("  Data directory: {}", settings.data_dir.display());
        println!("  Year: {}", settings.year);
        println!("  Geocoder: {}", settings.geocoder.url);
        println!("  Locality: {}", settings.geocoder.locality);
        println!(
            "  Event date: {} ({})",
            settings.clock.date, settings.clock.zone
        );
        println!();
    }

    match args.command {
        None => run_listing(&settings, args.format, args.output)?,
        Some(Command::ImportRaw {
            ref input,
            ref output,
            ref geojson,
        }) => {
            let output = output
                .clone()
                .unwrap_or_else(|| settings.data_dir.join("artists.json"));
            run_import_raw(&settings, input, &output, geojson.as_deref())?
        }
        Some(Command::Scrape {
            ref urls,
            ref out_dir,
        }) => run_scrape(urls, out_dir)?,
    }

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );

    Ok(())
}

fn resolve_settings(args: &Args, file_config: Option<&FileConfig>) -> Result<Settings> {
    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| file_config.and_then(|c| c.data_dir.clone()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let year = args
        .year
        .clone()
        .or_else(|| file_config.and_then(|c| c.year.clone()))
        .unwrap_or_else(|| DEFAULT_YEAR.to_string());

    let mut geocoder = file_config
        .and_then(|c| c.geocoder.clone())
        .unwrap_or_default();
    if let Some(ref url) = args.geocoder_url {
        geocoder.url = url.clone();
    }
    if let Some(ref locality) = args.locality {
        geocoder.locality = locality.clone();
    }

    let mut schedule = file_config
        .and_then(|c| c.schedule.clone())
        .unwrap_or_default();
    if let Some(ref timezone) = args.timezone {
        schedule.timezone = timezone.clone();
    }
    let zone = schedule.zone()?;
    let date = match args.event_date {
        Some(date) => Some(date),
        None => schedule.date()?,
    };
    let clock = match date {
        Some(date) => EventClock::new(date, zone),
        None => EventClock::today(zone),
    };

    Ok(Settings {
        data_dir,
        year,
        geocoder,
        clock,
    })
}

fn enricher(settings: &Settings) -> Result<Enricher<NominatimClient>> {
    let client =
        NominatimClient::new(&settings.geocoder).context("Failed to create geocoding client")?;
    Ok(Enricher::new(client, settings.clock))
}

impl Settings {
    fn year_dir(&self) -> PathBuf {
        self.data_dir.join(&self.year)
    }

    fn output_path(&self, format: OutputFormat, output: Option<PathBuf>) -> PathBuf {
        output.unwrap_or_else(|| self.year_dir().join(format.file_name()))
    }
}

fn run_listing(settings: &Settings, format: OutputFormat, output: Option<PathBuf>) -> Result<()> {
    let input_path = settings.year_dir().join("input.csv");
    let output_path = settings.output_path(format, output);

    let records = read_records(&input_path)?;
    if records.is_empty() {
        bail!("Input file is empty: {}", input_path.display());
    }
    println!(
        "Read {} rows from {}",
        records.len() - 1,
        input_path.display()
    );

    let enricher = enricher(settings)?;
    let spinner = create_spinner("Geocoding listing...");
    let start = Instant::now();

    let stats = match format {
        OutputFormat::Csv => write_tabular(&records, &enricher, &output_path)?,
        OutputFormat::Geojson => {
            let (collection, stats) = feature_collection(&records, &enricher);
            write_feature_collection(&collection, &output_path)?;
            stats
        }
    };

    spinner.finish_with_message(format!(
        "Enriched {} [{:.1}s]",
        stats,
        start.elapsed().as_secs_f32()
    ));
    println!("Output: {}", output_path.display());

    Ok(())
}

fn run_import_raw(
    settings: &Settings,
    input: &Path,
    output: &Path,
    geojson: Option<&Path>,
) -> Result<()> {
    let table = read_raw_table(input)?;
    println!("Read {} entries from {}", table.data.len(), input.display());

    let enricher = enricher(settings)?;
    let spinner = create_spinner("Geocoding raw listing...");
    let start = Instant::now();

    let mut stats = EnrichStats::default();
    let mut events = Vec::new();
    for (i, cells) in table.data.iter().enumerate() {
        stats.rows += 1;
        let Some(entry) = ListingEntry::from_cells(cells) else {
            tracing::warn!(row = i, cells = cells.len(), "Short raw entry, skipping");
            stats.skipped += 1;
            continue;
        };
        let event = enricher.enrich_listing(&entry);
        stats.record(&event);
        events.push(event);
    }

    write_events(&events, output)?;
    spinner.finish_with_message(format!(
        "Enriched {} [{:.1}s]",
        stats,
        start.elapsed().as_secs_f32()
    ));
    println!("Output: {}", output.display());

    if let Some(path) = geojson {
        write_feature_collection(&FeatureCollection::from_events(&events), path)?;
        println!("GeoJSON: {}", path.display());
    }

    Ok(())
}

fn run_scrape(urls: &[String], out_dir: &Path) -> Result<()> {
    let client = ArtistPageClient::new()?;
    let mut failed = 0;

    for url in urls {
        let spinner = create_spinner(&format!("Scraping {}...", url));
        match scrape_one(&client, url, out_dir) {
            Ok(message) => spinner.finish_with_message(message),
            Err(e) => {
                spinner.finish_and_clear();
                tracing::error!(url = %url, "Scrape failed: {:#}", e);
                failed += 1;
            }
        }
    }

    println!(
        "Scraped {} of {} pages into {}",
        urls.len() - failed,
        urls.len(),
        out_dir.display()
    );
    Ok(())
}

fn scrape_one(client: &ArtistPageClient, url: &str, out_dir: &Path) -> Result<String> {
    let profile = client.fetch_profile(url)?;
    let json_path = write_artist_profile(out_dir, &profile)?;

    let image = match client.download_image(out_dir, &profile) {
        Ok(Some(path)) => format!(", image {}", path.display()),
        Ok(None) => ", no image".to_string(),
        Err(e) => {
            tracing::warn!(url = %profile.img_url, "Image download failed: {:#}", e);
            ", image failed".to_string()
        }
    };

    Ok(format!(
        "Saved {} ({} links){}",
        json_path.display(),
        profile.links.len(),
        image
    ))
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
