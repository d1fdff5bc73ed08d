mod api;
mod parser;
mod pipeline;
mod territory;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "wiki_plates",
    about = "Download European license plate images from the Wikipedia catalog article"
)]
struct Cli {
    /// Parse and resolve without downloading
    #[arg(long)]
    dry_run: bool,

    /// Process only one territory (canonical id, e.g. DE)
    #[arg(long)]
    country: Option<String>,

    /// Output directory
    #[arg(long, default_value = "dataset")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let client = api::WikiClient::new()?;

    println!("Fetching Wikipedia article wikitext...");
    let wikitext = client.fetch_wikitext().await?;
    let mut entries = parser::parse_plate_tables(&wikitext);
    println!("Parsed {} entries from wikitables", entries.len());

    if let Some(country) = &cli.country {
        let code = country.to_uppercase();
        let all = std::mem::take(&mut entries);
        entries = all
            .iter()
            .filter(|e| e.territory_id == code)
            .cloned()
            .collect();
        if entries.is_empty() {
            println!("Unknown country code: {}", code);
            println!("Available codes:");
            for e in &all {
                println!("  {:5} {}", e.territory_id, e.display_name);
            }
            return Ok(());
        }
    }

    let log = pipeline::run(&client, &entries, &cli.output_dir, cli.dry_run).await?;

    println!(
        "\nDone: {}/{} entries ({})",
        log.successful,
        log.total_entries,
        if log.dry_run { "dry run" } else { "downloaded" }
    );
    if log.failed > 0 {
        println!("Failed entries:");
        for (id, result) in log.failed_entries() {
            println!("  {}: {}", id, result.reason.as_deref().unwrap_or("unknown"));
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nFinished in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
