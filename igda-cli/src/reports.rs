use anyhow::Result;
use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use std::io::Write;
use std::path::Path;

use igda_core::{
    Category, DistanceTables, FoodValue, IndexReport, Session, Stage, display_pd,
};

const UNSET: &str = "not set";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Coloured tables for the terminal
    Console,
    /// Pretty-printed JSON
    Json,
    /// Markdown tables
    Markdown,
}

pub fn label_or_unset<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| UNSET.to_string(), |v| v.to_string())
}

fn category_badge(category: Category) -> ColoredString {
    match category {
        Category::Local => category.label().green().bold(),
        Category::Regional => category.label().yellow().bold(),
        Category::National => category.label().truecolor(255, 165, 0).bold(),
        Category::Global => category.label().red().bold(),
    }
}

pub fn write_geography(
    out: &mut dyn Write,
    country: Option<&str>,
    length_km: f64,
    width_km: f64,
    pd: f64,
) -> Result<()> {
    if let Some(country) = country {
        writeln!(out, "🌐 Country: {}", country.bold())?;
    }
    writeln!(out, "Length: {length_km} km")?;
    writeln!(out, "Width: {width_km} km")?;
    writeln!(
        out,
        "{} PD: {:.2} km",
        "✅".green(),
        display_pd(pd)
    )?;
    Ok(())
}

pub fn write_tables(out: &mut dyn Write, tables: &DistanceTables) -> Result<()> {
    for (level, table) in tables.iter() {
        writeln!(out, "{}", format!("📊 {level} table").bright_cyan().bold())?;
        for (bracket, km) in table.entries() {
            writeln!(out, "   {:<12} {km:>12.2} km", bracket.name())?;
        }
    }
    Ok(())
}

pub fn write_classification(out: &mut dyn Write, session: &Session) -> Result<()> {
    for food in &session.foods {
        match food.classification() {
            Some((level, bracket)) => writeln!(
                out,
                "   {:<16} {:>10.2} km  {level} / {bracket}",
                food.name, food.km
            )?,
            None => writeln!(
                out,
                "   {:<16} {:>10.2} km  {}",
                food.name,
                food.km,
                "below every threshold".yellow()
            )?,
        }
    }
    Ok(())
}

pub fn write_values(out: &mut dyn Write, rows: &[FoodValue], format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(rows)?)?;
        }
        ReportFormat::Markdown => {
            writeln!(out, "| Food | Level | Bracket | Mode | Value |")?;
            writeln!(out, "|---|---|---|---|---:|")?;
            for row in rows {
                writeln!(
                    out,
                    "| {} | {} | {} | {} | {} |",
                    row.name,
                    label_or_unset(row.level),
                    label_or_unset(row.bracket),
                    label_or_unset(row.mode),
                    row.value
                )?;
            }
        }
        ReportFormat::Console => {
            writeln!(
                out,
                "{}",
                "📊 Accumulated value per food".bright_cyan().bold()
            )?;
            writeln!(
                out,
                "   {:<16} {:<12} {:<12} {:<8} {:>6}",
                "Food", "Level", "Bracket", "Mode", "Value"
            )?;
            for row in rows {
                writeln!(
                    out,
                    "   {:<16} {:<12} {:<12} {:<8} {:>6}",
                    row.name,
                    label_or_unset(row.level),
                    label_or_unset(row.bracket),
                    label_or_unset(row.mode),
                    row.value
                )?;
            }
        }
    }
    Ok(())
}

pub fn write_index(out: &mut dyn Write, report: &IndexReport, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Json => write_index_json(out, report),
        ReportFormat::Markdown => write_index_markdown(out, report),
        ReportFormat::Console => write_index_console(out, report),
    }
}

fn write_index_json(out: &mut dyn Write, report: &IndexReport) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
    Ok(())
}

fn write_index_markdown(out: &mut dyn Write, report: &IndexReport) -> Result<()> {
    writeln!(out, "# i-GDA Result\n")?;
    writeln!(out, "- **i-GDA**: {:.2}", report.igda)?;
    writeln!(out, "- **Diet type**: {}", report.category)?;
    writeln!(out, "- **Foods**: {}", report.food_count)?;
    writeln!(out, "- **Total value**: {}", report.total_value)?;
    if report.insufficient_data {
        writeln!(
            out,
            "- **Note**: accumulated values sum to 0; the index is not meaningful"
        )?;
    }

    writeln!(out, "\n## Kilometres per level\n")?;
    writeln!(out, "| Level | km |")?;
    writeln!(out, "|---|---:|")?;
    for entry in &report.km_by_level {
        writeln!(out, "| {} | {:.2} |", entry.level, entry.km)?;
    }

    writeln!(out, "\n## Foods\n")?;
    writeln!(out, "| Food | km | Level | Mode | Value |")?;
    writeln!(out, "|---|---:|---|---|---:|")?;
    for food in &report.foods {
        writeln!(
            out,
            "| {} | {:.2} | {} | {} | {} |",
            food.name,
            food.km,
            label_or_unset(food.level),
            label_or_unset(food.mode),
            food.value
        )?;
    }
    Ok(())
}

fn write_index_console(out: &mut dyn Write, report: &IndexReport) -> Result<()> {
    writeln!(
        out,
        "{}",
        "🌐 Food globalization dependency".bright_cyan().bold()
    )?;
    writeln!(out, "{}", "================================".cyan())?;
    writeln!(out, "i-GDA index: {}", format!("{:.2}", report.igda).bold())?;
    writeln!(out, "Diet type: {}", category_badge(report.category))?;
    if report.insufficient_data {
        writeln!(
            out,
            "{}",
            "⚠️  Accumulated values sum to 0; there is not enough data for a meaningful index."
                .yellow()
        )?;
    }
    writeln!(out)?;

    writeln!(out, "{}", "📊 Kilometres per level".bright_yellow().bold())?;
    for entry in &report.km_by_level {
        writeln!(out, "   {:<12} {:>12.2} km", entry.level.name(), entry.km)?;
    }
    writeln!(out)?;

    writeln!(out, "{}", "📋 Summary per food".bright_yellow().bold())?;
    writeln!(
        out,
        "   {:<16} {:>10} {:<12} {:<8} {:>6}",
        "Food", "km", "Level", "Mode", "Value"
    )?;
    for food in &report.foods {
        writeln!(
            out,
            "   {:<16} {:>10.2} {:<12} {:<8} {:>6}",
            food.name,
            food.km,
            label_or_unset(food.level),
            label_or_unset(food.mode),
            food.value
        )?;
    }
    Ok(())
}

pub fn write_status(out: &mut dyn Write, session: &Session, data_path: &Path) -> Result<()> {
    let stage = session.progress();
    writeln!(out, "Snapshot: {}", data_path.display())?;
    writeln!(
        out,
        "Country: {}",
        session.country.as_deref().unwrap_or(UNSET)
    )?;
    if session.has_pd() {
        writeln!(out, "PD: {:.2} km", display_pd(session.pd))?;
    } else {
        writeln!(out, "PD: {UNSET}")?;
    }
    writeln!(out, "Foods: {}", session.foods.len())?;
    for (position, food) in session.foods.iter().enumerate() {
        writeln!(
            out,
            "   {}. {} ({} km, {}, {}, value {})",
            position + 1,
            food.name,
            food.km,
            label_or_unset(food.level),
            label_or_unset(food.mode),
            label_or_unset(food.accumulated_value)
        )?;
    }
    writeln!(out, "Progress: {}", stage.label().bold())?;
    if let Some(next) = stage.next() {
        writeln!(out, "Next: {} ({})", next.label(), command_for(next))?;
    }
    Ok(())
}

/// Subcommand that produces `stage`.
#[must_use]
pub const fn command_for(stage: Stage) -> &'static str {
    match stage {
        Stage::Unset | Stage::GeographyResolved => "igda geography",
        Stage::FoodsListed => "igda foods",
        Stage::TablesBuilt => "igda tables",
        Stage::FoodsClassified => "igda distances",
        Stage::ModesTagged => "igda modes",
        Stage::ValuesAggregated => "igda values",
        Stage::IndexFinalized => "igda result",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use igda_core::{AcquisitionMode, Bracket, Level};

    fn finished_session() -> Session {
        let mut session = Session::default();
        session
            .resolve_geography(Some("Testland"), 1_000.0, 1_000.0)
            .unwrap();
        session.set_foods(&["rice", "kale"]).unwrap();
        session.build_tables().unwrap();
        session.record_distances(&[100.0, 0.0]).unwrap();
        session
            .tag_modes(&[AcquisitionMode::Buy, AcquisitionMode::Produce])
            .unwrap();
        session.compute_values().unwrap();
        session
    }

    fn render(f: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buffer: Vec<u8> = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn json_index_report_round_trips_key_fields() {
        let report = finished_session().finalize().unwrap();
        let text = render(|out| write_index(out, &report, ReportFormat::Json));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["food_count"], 2);
        assert_eq!(value["total_value"], 4);
        assert_eq!(value["category"], "global");
        assert_eq!(value["km_by_level"][0]["level"], "Local");
    }

    #[test]
    fn markdown_index_lists_levels_and_foods() {
        let report = finished_session().finalize().unwrap();
        let text = render(|out| write_index(out, &report, ReportFormat::Markdown));
        assert!(text.starts_with("# i-GDA Result"));
        assert!(text.contains("- **i-GDA**: 5.00"));
        assert!(text.contains("| Nacional | 100.00 |"));
        assert!(text.contains("| kale | 0.00 | not set | Produce | 0 |"));
    }

    #[test]
    fn console_index_flags_insufficient_data() {
        let mut session = finished_session();
        session.foods[0].accumulated_value = Some(0);
        let report = session.finalize().unwrap();
        let text = render(|out| write_index(out, &report, ReportFormat::Console));
        assert!(text.contains("LOCAL"));
        assert!(text.contains("not enough data"));
    }

    #[test]
    fn value_rows_render_unset_labels() {
        let rows = vec![FoodValue {
            name: "salt".to_string(),
            level: None,
            bracket: None,
            mode: Some(AcquisitionMode::Buy),
            value: -3,
        }];
        let text = render(|out| write_values(out, &rows, ReportFormat::Markdown));
        assert!(text.contains("| salt | not set | not set | Buy | -3 |"));

        let rows = vec![FoodValue {
            name: "salt".to_string(),
            level: Some(Level::Zonal),
            bracket: Some(Bracket::MuyLejano),
            mode: Some(AcquisitionMode::Barter),
            value: 5,
        }];
        let text = render(|out| write_values(out, &rows, ReportFormat::Json));
        assert!(text.contains("\"bracket\": \"Muy lejano\""));
    }

    #[test]
    fn unmapped_mode_renders_as_unset() {
        let rows = vec![FoodValue {
            name: "tea".to_string(),
            level: Some(Level::Nacional),
            bracket: Some(Bracket::Cercano),
            mode: None,
            value: 7,
        }];
        let text = render(|out| write_values(out, &rows, ReportFormat::Markdown));
        assert!(text.contains("| tea | Nacional | Cercano | not set | 7 |"));
        let text = render(|out| write_values(out, &rows, ReportFormat::Json));
        assert!(text.contains("\"mode\": null"));
    }

    #[test]
    fn tables_render_every_level() {
        let session = finished_session();
        let text = render(|out| write_tables(out, session.tables.as_ref().unwrap()));
        for level in Level::ALL {
            assert!(text.contains(&format!("{level} table")));
        }
        assert!(text.contains("Muy lejano"));
    }

    #[test]
    fn status_points_to_next_command() {
        let session = finished_session();
        let text = render(|out| write_status(out, &session, Path::new("datos.json")));
        // kale is unclassified, so distances are the pending step.
        assert!(text.contains("tables built"));
        assert!(text.contains("igda distances"));

        let empty = render(|out| write_status(out, &Session::default(), Path::new("x.json")));
        assert!(empty.contains("PD: not set"));
        assert!(empty.contains("igda geography"));
    }
}
