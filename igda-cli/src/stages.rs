use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{Write, stdout};

use igda_core::{
    AcquisitionMode, Calculator, CalculatorError, Dimensions, Session, StageError,
};

use crate::OutputTarget;
use crate::lookup::{ChatCompletionsLookup, GeographyLookup, LookupSettings};
use crate::reports::{self, ReportFormat, command_for};
use crate::storage::{JsonFileStore, StoreError};

type FileCalculator = Calculator<JsonFileStore>;

/// How a single invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The stage refused to run; nothing was saved.
    Halted,
}

pub struct GeographyRequest {
    pub country: Option<String>,
    pub length_km: Option<f64>,
    pub width_km: Option<f64>,
    pub lookup: LookupSettings,
}

fn heading(title: &str) {
    println!("{}", format!("🌐 i-GDA · {title}").bright_cyan().bold());
}

fn report_stage_error(err: &StageError) {
    eprintln!("{} {err}", "⚠️ ".yellow().bold());
    if let StageError::MissingPrerequisite { needs, .. } = err {
        eprintln!("   run `{}` first", command_for(*needs));
    }
}

/// Print stage refusals as warnings; storage failures are real errors.
fn settle<R>(result: Result<R, CalculatorError<StoreError>>) -> Result<Option<R>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CalculatorError::Stage(err)) => {
            log::debug!("stage refused: {err:?}");
            report_stage_error(&err);
            Ok(None)
        }
        Err(CalculatorError::Storage(err)) => {
            Err(anyhow::Error::new(err).context("the stage ran but the session was not saved"))
        }
    }
}

fn print_next(session: &Session) {
    if let Some(next) = session.progress().next() {
        println!("{} {}", "➡️  Next:".dimmed(), command_for(next).bold());
    }
}

/// Ask `lookup` for the dimensions, reporting failures to the user.
pub async fn lookup_or_report<L>(lookup: &L, country: &str) -> Option<Dimensions>
where
    L: GeographyLookup + Sync,
{
    match lookup.lookup(country).await {
        Ok(dims) => Some(dims),
        Err(err) if err.is_recoverable() => {
            eprintln!("{} {err}", "⚠️ ".yellow().bold());
            eprintln!(
                "   enter the dimensions manually: igda geography \"{country}\" --length <km> --width <km>"
            );
            None
        }
        Err(err) => {
            eprintln!("{} {err}", "❌".red());
            None
        }
    }
}

pub async fn geography(calc: &mut FileCalculator, request: GeographyRequest) -> Result<Outcome> {
    heading("Geography");
    let (length_km, width_km) = if let (Some(length), Some(width)) =
        (request.length_km, request.width_km)
    {
        println!("✍️  Manual entry");
        (length, width)
    } else {
        let country = request.country.as_deref().unwrap_or_default();
        let lookup = match ChatCompletionsLookup::new(request.lookup) {
            Ok(lookup) => lookup,
            Err(err) => {
                eprintln!("{} {err}", "❌".red());
                return Ok(Outcome::Halted);
            }
        };
        println!("🔎 Looking up {country}...");
        let Some(dims) = lookup_or_report(&lookup, country).await else {
            return Ok(Outcome::Halted);
        };
        (dims.length_km, dims.width_km)
    };

    let country = request.country.as_deref();
    let Some(pd) = settle(calc.apply(|s| s.resolve_geography(country, length_km, width_km)))?
    else {
        return Ok(Outcome::Halted);
    };

    let session = calc.session();
    reports::write_geography(
        &mut stdout().lock(),
        session.country.as_deref(),
        length_km,
        width_km,
        pd,
    )?;
    if !session.has_pd() {
        println!(
            "{}",
            "⚠️  PD is not a positive finite number, so it is still unset.".yellow()
        );
    }
    print_next(session);
    Ok(Outcome::Done)
}

pub fn foods(calc: &mut FileCalculator, names: &[String]) -> Result<Outcome> {
    heading("Foods");
    if settle(calc.apply(|s| s.set_foods(names)))?.is_none() {
        return Ok(Outcome::Halted);
    }
    for (position, food) in calc.session().foods.iter().enumerate() {
        println!("   {}. {}", position + 1, food.name);
    }
    print_next(calc.session());
    Ok(Outcome::Done)
}

pub fn tables(calc: &mut FileCalculator) -> Result<Outcome> {
    heading("Distance tables");
    let Some(tables) = settle(calc.apply(Session::build_tables))? else {
        return Ok(Outcome::Halted);
    };
    reports::write_tables(&mut stdout().lock(), &tables)?;
    print_next(calc.session());
    Ok(Outcome::Done)
}

pub fn distances(calc: &mut FileCalculator, km: &[f64]) -> Result<Outcome> {
    heading("Distances");
    let Some(classified) = settle(calc.apply(|s| s.record_distances(km)))? else {
        return Ok(Outcome::Halted);
    };
    let session = calc.session();
    reports::write_classification(&mut stdout().lock(), session)?;
    let unclassified = session.foods.len() - classified;
    if unclassified > 0 {
        println!(
            "{}",
            format!("⚠️  {unclassified} food(s) fall below every threshold and stay unclassified")
                .yellow()
        );
    }
    print_next(session);
    Ok(Outcome::Done)
}

pub fn modes(calc: &mut FileCalculator, modes: &[AcquisitionMode]) -> Result<Outcome> {
    heading("Acquisition modes");
    if settle(calc.apply(|s| s.tag_modes(modes)))?.is_none() {
        return Ok(Outcome::Halted);
    }
    for food in &calc.session().foods {
        println!("   {:<16} {}", food.name, reports::label_or_unset(food.mode));
    }
    print_next(calc.session());
    Ok(Outcome::Done)
}

pub fn values(
    calc: &mut FileCalculator,
    format: ReportFormat,
    output: &mut OutputTarget,
) -> Result<Outcome> {
    let console = format == ReportFormat::Console;
    if console {
        heading("Values");
    }
    let Some(rows) = settle(calc.apply(Session::compute_values))? else {
        return Ok(Outcome::Halted);
    };
    reports::write_values(output.writer(), &rows, format)?;
    output.flush_inner().context("failed to write values")?;
    if console {
        print_next(calc.session());
    }
    Ok(Outcome::Done)
}

pub fn result(
    calc: &mut FileCalculator,
    format: ReportFormat,
    output: &mut OutputTarget,
) -> Result<Outcome> {
    let Some(report) = settle(calc.apply(|s| s.finalize()))? else {
        return Ok(Outcome::Halted);
    };
    log::info!(
        "i-GDA {:.2} ({}) over {} foods",
        report.igda,
        report.category,
        report.food_count
    );
    reports::write_index(output.writer(), &report, format)?;
    output.flush_inner().context("failed to write report")?;
    Ok(Outcome::Done)
}

pub fn status(calc: &FileCalculator) -> Result<Outcome> {
    heading("Status");
    let mut out = stdout().lock();
    reports::write_status(&mut out, calc.session(), calc.storage().path())?;
    out.flush()?;
    Ok(Outcome::Done)
}
