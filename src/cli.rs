//! Command Line Module
//! Subcommands, argument parsing and text or JSON rendering of query results.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hiresight::data::DatasetKind;
use hiresight::query::{
    GeoLevel, GeographyConcentration, GeographyWage, IndustryShare, OccupationListing,
    OccupationSnapshot, OccupationSummary, WagePoint, WageRanking,
};
use hiresight::OewsStore;
use log::info;
use polars::prelude::{CsvWriter, SerWriter};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hiresight", version, about = "OEWS occupation wage and employment queries")]
pub struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    pub format: Format,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Ranking {
    Employment,
    Median,
    P90,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Top occupations nationally
    Top {
        /// Ranking measure
        #[arg(long, value_enum, default_value_t = Ranking::Employment)]
        by: Ranking,

        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    /// All occupations, sorted by title
    List,
    /// Headline wage and employment figures for an occupation
    Snapshot {
        /// SOC code, e.g. 15-1252
        code: String,
    },
    /// Annual wage percentiles for an occupation
    Wages { code: String },
    /// Best-paying states or metro areas for an occupation
    Geo {
        code: String,

        /// state or msa
        #[arg(long, default_value = "state")]
        level: GeoLevel,

        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    /// Areas where an occupation is most concentrated
    Concentration {
        code: String,

        /// state or msa
        #[arg(long, default_value = "state")]
        level: GeoLevel,

        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    /// Industry sectors employing an occupation
    Industries {
        code: String,

        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    /// Write the snapshot of every occupation as JSON
    Export {
        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a normalized table as CSV
    Normalize {
        /// national, state, msa or natsector
        kind: DatasetKind,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Show the effective source configuration
    Sources,
}

pub fn run_command(store: &OewsStore, command: Commands, format: Format) -> Result<()> {
    match command {
        Commands::Top { by, limit } => match by {
            Ranking::Employment => {
                let rows = store.top_occupations_by_employment(limit)?;
                emit(format, rows.as_slice(), render_summaries)
            }
            Ranking::Median => {
                let rows = store.top_occupations_by_median_wage(limit)?;
                emit(format, rows.as_slice(), render_rankings)
            }
            Ranking::P90 => {
                let rows = store.top_occupations_by_p90_wage(limit)?;
                emit(format, rows.as_slice(), render_rankings)
            }
        },
        Commands::List => {
            let rows = store.occupation_list_az()?;
            emit(format, rows.as_slice(), render_listings)
        }
        Commands::Snapshot { code } => {
            let snapshot = store
                .snapshot_for_occ(&code)?
                .with_context(|| format!("Occupation {code} not found in the national table"))?;
            emit(format, &snapshot, render_snapshot)
        }
        Commands::Wages { code } => {
            let points = store.wage_distribution_for_occ(&code)?;
            emit(format, points.as_slice(), render_wages)
        }
        Commands::Geo { code, level, limit } => {
            let rows = store.top_geographies_for_occ(&code, level, limit)?;
            emit(format, rows.as_slice(), render_geographies)
        }
        Commands::Concentration { code, level, limit } => {
            let rows = store.employment_concentration_for_occ(&code, level, limit)?;
            emit(format, rows.as_slice(), render_concentration)
        }
        Commands::Industries { code, limit } => {
            let rows = store.industry_mix_for_occ(&code, limit)?;
            emit(format, rows.as_slice(), render_industries)
        }
        Commands::Export { output } => handle_export(store, output),
        Commands::Normalize { kind, output } => handle_normalize(store, kind, output),
        Commands::Sources => {
            println!("{}", serde_json::to_string_pretty(store.settings())?);
            Ok(())
        }
    }
}

fn handle_export(store: &OewsStore, output: Option<PathBuf>) -> Result<()> {
    let snapshots = store.all_snapshots()?;
    let json = serde_json::to_string_pretty(&snapshots)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} snapshots to {}", snapshots.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn handle_normalize(store: &OewsStore, kind: DatasetKind, output: PathBuf) -> Result<()> {
    let table = store.load(kind)?;
    let mut df = table.to_dataframe()?;

    let mut file = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Wrote {} normalized {kind} rows to {}", df.height(), output.display());
    Ok(())
}

fn emit<T, F>(format: Format, value: &T, render: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&mut dyn Write, &T) -> io::Result<()>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        Format::Text => render(&mut out, value)?,
    }
    Ok(())
}

fn na(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{v:.0}"),
        _ => "NA".to_string(),
    }
}

fn na_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{v:.2}"),
        _ => "NA".to_string(),
    }
}

fn title(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("NA")
}

fn render_summaries(out: &mut dyn Write, rows: &[OccupationSummary]) -> io::Result<()> {
    writeln!(out, "{:<9} {:>12} {:>10} {:>10}  TITLE", "CODE", "EMPLOYMENT", "MEDIAN", "MEAN")?;
    for r in rows {
        writeln!(
            out,
            "{:<9} {:>12} {:>10} {:>10}  {}",
            r.occ_code,
            na(r.employment),
            na(r.median_wage),
            na(r.mean_wage),
            title(&r.occ_title)
        )?;
    }
    Ok(())
}

fn render_rankings(out: &mut dyn Write, rows: &[WageRanking]) -> io::Result<()> {
    writeln!(out, "{:<9} {:>10}  TITLE", "CODE", "WAGE")?;
    for r in rows {
        writeln!(
            out,
            "{:<9} {:>10}  {}",
            r.occ_code,
            na(Some(r.annual_wage)),
            title(&r.occ_title)
        )?;
    }
    Ok(())
}

fn render_listings(out: &mut dyn Write, rows: &[OccupationListing]) -> io::Result<()> {
    for r in rows {
        writeln!(out, "{:<9} {}", r.occ_code, title(&r.occ_title))?;
    }
    Ok(())
}

fn render_snapshot(out: &mut dyn Write, s: &OccupationSnapshot) -> io::Result<()> {
    writeln!(out, "{} {}", s.occ_code, s.occ_title)?;
    writeln!(out, "  Median wage:   {}", na(Some(s.median_wage)))?;
    writeln!(
        out,
        "  P10 - P90:     {} - {}",
        na(Some(s.wage_range.0)),
        na(Some(s.wage_range.1))
    )?;
    writeln!(out, "  Mean wage:     {}", na(Some(s.mean_wage)))?;
    writeln!(out, "  Employment:    {}", na(Some(s.employment)))?;
    writeln!(out, "  vs US median:  {}", na_ratio(Some(s.relative_wage)))
}

fn render_wages(out: &mut dyn Write, points: &[WagePoint]) -> io::Result<()> {
    for p in points {
        writeln!(out, "{:<4} {:>10}", p.percentile, na(Some(p.annual_wage)))?;
    }
    Ok(())
}

fn render_geographies(out: &mut dyn Write, rows: &[GeographyWage]) -> io::Result<()> {
    writeln!(out, "{:>10} {:>12} {:>6}  AREA", "MEDIAN", "EMPLOYMENT", "LQ")?;
    for r in rows {
        writeln!(
            out,
            "{:>10} {:>12} {:>6}  {}",
            na(Some(r.median_wage)),
            na(r.employment),
            na_ratio(r.location_quotient),
            title(&r.area_title)
        )?;
    }
    Ok(())
}

fn render_concentration(
    out: &mut dyn Write,
    rows: &[GeographyConcentration],
) -> io::Result<()> {
    writeln!(out, "{:>6} {:>12} {:>10}  AREA", "LQ", "EMPLOYMENT", "MEDIAN")?;
    for r in rows {
        writeln!(
            out,
            "{:>6} {:>12} {:>10}  {}",
            na_ratio(Some(r.location_quotient)),
            na(r.employment),
            na(r.median_wage),
            title(&r.area_title)
        )?;
    }
    Ok(())
}

fn render_industries(out: &mut dyn Write, rows: &[IndustryShare]) -> io::Result<()> {
    for r in rows {
        writeln!(out, "{:>7}%  {}", na_ratio(r.share_pct), r.industry)?;
    }
    Ok(())
}
