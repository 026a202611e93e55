//! CLI command implementations.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::Local;
use colored::Colorize;

use offerpipe::config::Config;
use offerpipe::csv_out;
use offerpipe::error::{PipeError, Result};
use offerpipe::offer::{CanonicalOffer, RawPageContent};
use offerpipe::pipeline::Pipeline;
use offerpipe::sink::RecordStore;

/// Read page payloads from a JSON-lines file ("-" reads stdin)
fn read_pages(input: &Path) -> Result<Vec<RawPageContent>> {
    let content = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input)?
    };

    let mut pages = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let page: RawPageContent = serde_json::from_str(line).map_err(|e| {
            PipeError::Input(format!("line {}: {}", number + 1, e))
        })?;
        pages.push(page);
    }
    Ok(pages)
}

fn resolve_operator(config: &Config, override_operator: Option<String>) -> String {
    override_operator.unwrap_or_else(|| config.operator.clone())
}

fn process_all(operator: &str, pages: &[RawPageContent]) -> (Vec<CanonicalOffer>, usize) {
    let pipeline = Pipeline::new(operator);
    let offers: Vec<CanonicalOffer> = pages.iter().map(|p| pipeline.process(p)).collect();
    let collisions = pipeline.collisions();
    (offers, collisions)
}

fn print_summary(offers: &[CanonicalOffer], collisions: usize, csv_path: &Path) {
    let estimates: Vec<f64> = offers
        .iter()
        .filter_map(|o| o.co2_estimate_kg_year)
        .collect();

    println!();
    println!(
        "{} {} offers extracted at {}",
        "✓".green(),
        offers.len(),
        Local::now().format("%Y-%m-%d %H:%M")
    );
    if collisions > 0 {
        println!(
            "{} {} duplicate reference(s) resolved by suffixing",
            "!".yellow(),
            collisions
        );
    }
    if let (Some(min), Some(max)) = (
        estimates.iter().cloned().reduce(f64::min),
        estimates.iter().cloned().reduce(f64::max),
    ) {
        println!("  CO2 estimates: {:.1} - {:.1} kg/year", min, max);
    }
    println!("  CSV written to {}", csv_path.display().to_string().bold());
}

pub fn cmd_run(
    input: &Path,
    csv: Option<PathBuf>,
    operator: Option<String>,
    upsert: bool,
) -> Result<()> {
    let config = Config::load()?;
    let operator = resolve_operator(&config, operator);

    let pages = read_pages(input)?;
    let (offers, collisions) = process_all(&operator, &pages);

    let csv_path = csv
        .or_else(|| config.csv_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| {
            PathBuf::from(format!("offers_{}.csv", Local::now().format("%Y%m%d")))
        });
    csv_out::write_csv(&csv_path, &offers)?;
    print_summary(&offers, collisions, &csv_path);

    if upsert {
        let sink_config = config.sink.as_ref().ok_or_else(|| {
            PipeError::Config("no [sink] section configured, cannot upsert".into())
        })?;
        let api_key = config.sink_api_key().ok_or_else(|| {
            PipeError::Config("no sink API key in config or OFFERPIPE_API_KEY".into())
        })?;
        let store = RecordStore::new(sink_config, &api_key);
        let sent = store.upsert_all(&offers)?;
        println!("{} {} records upserted to {}", "✓".green(), sent, sink_config.table);
    }

    Ok(())
}

pub fn cmd_preview(input: &Path, limit: usize, operator: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let operator = resolve_operator(&config, operator);

    let pages = read_pages(input)?;
    let pipeline = Pipeline::new(&operator);
    for page in pages.iter().take(limit) {
        let offer = pipeline.process(page);
        println!("{}", serde_json::to_string_pretty(&offer)?);
    }
    Ok(())
}

pub fn cmd_config_show() -> Result<()> {
    let config = Config::load()?;
    let path = Config::config_path()?;
    println!("{} {}", "Config path:".bold(), path.display());
    let rendered =
        toml::to_string_pretty(&config).map_err(|e| PipeError::Config(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}

pub fn cmd_config_init() -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() {
        println!("{} config already exists at {}", "!".yellow(), path.display());
        return Ok(());
    }
    Config::default().save()?;
    println!("{} wrote default config to {}", "✓".green(), path.display());
    Ok(())
}
