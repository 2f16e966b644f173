//! Output adapters for calculation reports and factor tables.

use std::io::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;
use comp_core::calculations::{CommutedValueReport, NpvTableRow};
use comp_core::calculations::common::{format_percent, round_factor};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
}

impl OutputFormat {
    pub fn exporter(self) -> Box<dyn ReportExporter> {
        match self {
            OutputFormat::Text => Box::new(TextExporter),
            OutputFormat::Csv => Box::new(CsvExporter),
        }
    }
}

/// Writes calculation output in one presentation format.
pub trait ReportExporter {
    fn export_reports(
        &self,
        reports: &[CommutedValueReport],
        out: &mut dyn Write,
    ) -> Result<()>;

    fn export_table(
        &self,
        rows: &[NpvTableRow],
        out: &mut dyn Write,
    ) -> Result<()>;
}

/// Human-readable report blocks separated by blank lines.
pub struct TextExporter;

impl ReportExporter for TextExporter {
    fn export_reports(
        &self,
        reports: &[CommutedValueReport],
        out: &mut dyn Write,
    ) -> Result<()> {
        for (i, report) in reports.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            writeln!(out, "{report}")?;
        }
        Ok(())
    }

    fn export_table(
        &self,
        rows: &[NpvTableRow],
        out: &mut dyn Write,
    ) -> Result<()> {
        writeln!(out, "{:>6}  {:>7}  {:>9}", "Weeks", "Rate", "Factor")?;
        for row in rows {
            writeln!(
                out,
                "{:>6}  {:>7}  {:>9}",
                row.weeks_remaining,
                format_percent(round_factor(row.annual_discount_rate)),
                row.display_factor()
            )?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct TableCsvRow {
    weeks_remaining: u32,
    annual_discount_rate: String,
    factor: String,
}

/// One header row plus one CSV record per report or table row.
pub struct CsvExporter;

impl ReportExporter for CsvExporter {
    fn export_reports(
        &self,
        reports: &[CommutedValueReport],
        out: &mut dyn Write,
    ) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        for report in reports {
            writer
                .serialize(report)
                .context("Failed to write report row")?;
        }
        writer.flush().context("Failed to flush CSV output")?;
        Ok(())
    }

    fn export_table(
        &self,
        rows: &[NpvTableRow],
        out: &mut dyn Write,
    ) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        for row in rows {
            writer
                .serialize(TableCsvRow {
                    weeks_remaining: row.weeks_remaining,
                    annual_discount_rate: row.annual_discount_rate.to_string(),
                    factor: row.display_factor().to_string(),
                })
                .context("Failed to write table row")?;
        }
        writer.flush().context("Failed to flush CSV output")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use comp_core::calculations::{
        CalculationInput, CalculatorConfig, CommutedValueCalculator, npv_table,
    };
    use comp_core::models::RateTable;
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_report() -> CommutedValueReport {
        let calculator = CommutedValueCalculator::new(CalculatorConfig::for_year(2025));
        let table = RateTable::from_entries([(2025, 1134.43)]).unwrap();
        let input = CalculationInput {
            year_of_injury: 2025,
            compensation_rate: 500.0,
            weeks_already_paid: 0.0,
            other_credit_weeks: 0.0,
        };
        let result = calculator.calculate(&input, &table, Some(0.0438)).unwrap();
        CommutedValueReport::new(&input, &result)
    }

    fn render(
        exporter: &dyn ReportExporter,
        reports: &[CommutedValueReport],
    ) -> String {
        let mut buf = Vec::new();
        exporter.export_reports(reports, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn csv_report_has_header_and_one_row_per_report() {
        let report = sample_report();

        let out = render(&CsvExporter, &[report.clone(), report]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("year_of_injury,compensation_rate,"));
        assert!(lines[1].contains("204288.15"), "row: {}", lines[1]);
    }

    #[test]
    fn text_report_separates_blocks() {
        let report = sample_report();

        let out = render(&TextExporter, &[report.clone(), report]);

        assert_eq!(out.matches("Commuted value, injury year 2025").count(), 2);
        assert!(out.contains("\n\n"));
    }

    #[test]
    fn empty_batch_writes_nothing_as_text() {
        assert_eq!(render(&TextExporter, &[]), "");
    }

    #[test]
    fn table_text_lists_every_week() {
        let rows = npv_table(0.0438).unwrap();
        let mut buf = Vec::new();

        TextExporter.export_table(&rows, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();

        assert_eq!(out.lines().count(), 501);
        assert!(out.lines().last().unwrap().contains("408.5763"));
    }

    #[test]
    fn table_csv_uses_display_factor() {
        let rows = npv_table(0.0438).unwrap();
        let mut buf = Vec::new();

        CsvExporter.export_table(&rows[99..101], &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();

        assert_eq!(
            out,
            "weeks_remaining,annual_discount_rate,factor\n100,0.02,98.0828\n101,0.0438,97.7018\n"
        );
    }

    #[test]
    fn format_selects_exporter() {
        let report = sample_report();
        let out = render(OutputFormat::Csv.exporter().as_ref(), &[report]);
        assert!(out.starts_with("year_of_injury"));
    }
}
