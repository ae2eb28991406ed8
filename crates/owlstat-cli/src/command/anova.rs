use std::{io::Write, path::PathBuf};

use owlstat_stats::{
    anova::{AnovaResult, AnovaTable},
    dataset::GroupedDataset,
    descriptive::DescriptiveStats,
    tukey::{DEFAULT_FAMILY_ERROR_RATE, PairwiseComparisonSet, TukeyConfig},
};
use serde::Serialize;

use crate::{data, util::Output};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub(crate) enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AnovaArg {
    /// JSON file with an array of `{"label": ..., "value": ...}` records.
    /// Uses the built-in archers scores when omitted
    #[arg(long)]
    input: Option<PathBuf>,
    /// Family-wise error rate of the pairwise comparison
    #[arg(long, default_value_t = DEFAULT_FAMILY_ERROR_RATE)]
    family_error_rate: f64,
    /// Report format (text or json)
    #[arg(long, default_value = "text")]
    format: ReportFormat,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Default for AnovaArg {
    fn default() -> Self {
        Self {
            input: None,
            family_error_rate: DEFAULT_FAMILY_ERROR_RATE,
            format: ReportFormat::Text,
            output: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct GroupSummary<'a> {
    label: &'a str,
    #[serde(flatten)]
    stats: DescriptiveStats,
}

#[derive(Debug, Serialize)]
struct AnovaReport<'a> {
    groups: Vec<GroupSummary<'a>>,
    table: AnovaTable,
    anova: AnovaResult,
    tukey: PairwiseComparisonSet,
}

pub(crate) fn run(arg: &AnovaArg) -> anyhow::Result<()> {
    let AnovaArg {
        input,
        family_error_rate,
        format,
        output,
    } = arg;

    let dataset = match input {
        Some(path) => data::load_dataset(path)?,
        None => data::archers()?,
    };
    let report = build_report(&dataset, *family_error_rate)?;

    let output = Output::create(output.as_deref())?;
    match format {
        ReportFormat::Text => output.write_report(|w| write_text(w, &report)),
        ReportFormat::Json => output.write_json(&report),
    }
}

fn build_report(
    dataset: &GroupedDataset,
    family_error_rate: f64,
) -> anyhow::Result<AnovaReport<'_>> {
    let groups = dataset
        .groups()
        .iter()
        .filter_map(|g| {
            g.summary().map(|stats| GroupSummary {
                label: g.label(),
                stats,
            })
        })
        .collect();
    let table = AnovaTable::from_dataset(dataset);
    let anova = table.test()?;
    let tukey = TukeyConfig { family_error_rate }.compare(dataset)?;
    Ok(AnovaReport {
        groups,
        table,
        anova,
        tukey,
    })
}

fn write_text<W>(w: &mut W, report: &AnovaReport<'_>) -> std::io::Result<()>
where
    W: Write,
{
    writeln!(w, "Groups")?;
    writeln!(w, "======")?;
    writeln!(
        w,
        "  {:<12} {:>6} {:>10} {:>10} {:>8} {:>8}",
        "Group", "N", "Mean", "Std Dev", "Min", "Max"
    )?;
    writeln!(w, "  {}", "-".repeat(59))?;
    for group in &report.groups {
        let s = &group.stats;
        writeln!(
            w,
            "  {:<12} {:>6} {:>10.4} {:>10.4} {:>8.2} {:>8.2}",
            group.label, s.count, s.mean, s.std_dev, s.min, s.max
        )?;
    }
    writeln!(w)?;

    let table = &report.table;
    writeln!(w, "One-way ANOVA")?;
    writeln!(w, "=============")?;
    writeln!(
        w,
        "  {:<10} {:>12} {:>6} {:>12} {:>10} {:>10}",
        "Source", "SS", "df", "MS", "F", "P"
    )?;
    writeln!(w, "  {}", "-".repeat(65))?;
    writeln!(
        w,
        "  {:<10} {:>12.4} {:>6} {:>12.4} {:>10.4} {:>10.4}",
        "Between",
        table.ss_between,
        table.df_between,
        table.ms_between(),
        report.anova.f_statistic,
        report.anova.p_value
    )?;
    writeln!(
        w,
        "  {:<10} {:>12.4} {:>6} {:>12.4}",
        "Within",
        table.ss_within,
        table.df_within,
        table.ms_within()
    )?;
    writeln!(
        w,
        "  {:<10} {:>12.4} {:>6}",
        "Total",
        table.ss_total(),
        table.df_between + table.df_within
    )?;
    writeln!(w)?;
    writeln!(w, "F value: {}", report.anova.f_statistic)?;
    writeln!(w, "P value: {}", report.anova.p_value)?;
    writeln!(w)?;

    let tukey = &report.tukey;
    writeln!(
        w,
        "Multiple Comparison of Means - Tukey HSD, FWER={:.2}",
        tukey.family_error_rate
    )?;
    writeln!(w, "{}", "=".repeat(66))?;
    writeln!(
        w,
        "{:<10} {:<10} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "group1", "group2", "meandiff", "p-adj", "lower", "upper", "reject"
    )?;
    writeln!(w, "{}", "-".repeat(66))?;
    for c in tukey {
        writeln!(
            w,
            "{:<10} {:<10} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>8}",
            c.group_a,
            c.group_b,
            c.mean_diff,
            c.p_adjusted,
            c.lower,
            c.upper,
            if c.reject { "True" } else { "False" }
        )?;
    }
    writeln!(w, "{}", "-".repeat(66))?;
    writeln!(w, "groups: {:?}", tukey.groups)?;
    Ok(())
}
