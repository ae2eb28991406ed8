use std::{io::Write, path::PathBuf};

use anyhow::Context as _;
use owlstat_sampler::{
    grid::{DEFAULT_START, DEFAULT_STEP, DEFAULT_STOP, SampleGrid},
    noise::{DEFAULT_MEAN, DEFAULT_STD_DEV, NoiseSeed, NoiseSpec},
    sampler::{self, GeneratedSeries, TargetFunction},
};
use rand::Rng as _;
use serde::Serialize;

use crate::util::Output;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub(crate) enum SeriesFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SampleArg {
    /// Start of the x interval (inclusive)
    #[arg(long, default_value_t = DEFAULT_START, allow_negative_numbers = true)]
    start: f64,
    /// End of the x interval (exclusive)
    #[arg(long, default_value_t = DEFAULT_STOP, allow_negative_numbers = true)]
    stop: f64,
    /// Spacing between x values
    #[arg(long, default_value_t = DEFAULT_STEP, allow_negative_numbers = true)]
    step: f64,
    /// Mean of the Gaussian noise
    #[arg(long, default_value_t = DEFAULT_MEAN, allow_negative_numbers = true)]
    mean: f64,
    /// Standard deviation of the Gaussian noise
    #[arg(long, default_value_t = DEFAULT_STD_DEV, allow_negative_numbers = true)]
    std_dev: f64,
    /// Underlying function (linear: y = x, sine: y = 2*pi*sin(x))
    #[arg(long, default_value = "linear")]
    function: TargetFunction,
    /// Seed for reproducible noise. A random seed is used when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Output format (csv or json)
    #[arg(long, default_value = "csv")]
    format: SeriesFormat,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SeriesPoint {
    x: f64,
    y: f64,
    f_x: f64,
}

#[derive(Debug, Serialize)]
struct SeriesReport {
    function: String,
    formula: &'static str,
    seed: NoiseSeed,
    grid: SampleGrid,
    noise: NoiseSpec,
    points: Vec<SeriesPoint>,
}

pub(crate) fn run(arg: &SampleArg) -> anyhow::Result<()> {
    let SampleArg {
        start,
        stop,
        step,
        mean,
        std_dev,
        function,
        seed,
        format,
        output,
    } = arg;

    let grid = SampleGrid::new(*start, *stop, *step).context("Invalid sample grid")?;
    let noise = NoiseSpec::new(*mean, *std_dev).context("Invalid noise parameters")?;
    let seed = seed.map_or_else(|| rand::rng().random(), NoiseSeed::from);
    tracing::info!(%seed, %function, points = grid.len(), "generating series");

    let series = sampler::generate(&grid, noise, |x| function.eval(x), Some(seed));
    let report = build_report(*function, seed, grid, noise, &series);

    let output = Output::create(output.as_deref())?;
    match format {
        SeriesFormat::Csv => output.write_report(|w| write_csv(w, &report.points)),
        SeriesFormat::Json => output.write_json(&report),
    }
}

fn build_report(
    function: TargetFunction,
    seed: NoiseSeed,
    grid: SampleGrid,
    noise: NoiseSpec,
    series: &GeneratedSeries,
) -> SeriesReport {
    let truth = series.truth(|x| function.eval(x));
    let points = series
        .iter()
        .zip(truth)
        .map(|((x, y), f_x)| SeriesPoint { x, y, f_x })
        .collect();
    SeriesReport {
        function: function.to_string(),
        formula: function.formula(),
        seed,
        grid,
        noise,
        points,
    }
}

fn write_csv<W>(w: &mut W, points: &[SeriesPoint]) -> std::io::Result<()>
where
    W: Write,
{
    writeln!(w, "x,y,f_x")?;
    for p in points {
        writeln!(w, "{},{},{}", p.x, p.y, p.f_x)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(seed: u64) -> SeriesReport {
        let grid = SampleGrid::new(0.0, 2.0, 0.5).unwrap();
        let noise = NoiseSpec::new(0.0, 0.0).unwrap();
        let function = TargetFunction::Linear;
        let seed = NoiseSeed::from(seed);
        let series = sampler::generate(&grid, noise, |x| function.eval(x), Some(seed));
        build_report(function, seed, grid, noise, &series)
    }

    #[test]
    fn test_csv_has_header_and_one_row_per_point() {
        let report = report(1);
        let mut buf = Vec::new();
        write_csv(&mut buf, &report.points).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines, ["x,y,f_x", "0,0,0", "0.5,0.5,0.5", "1,1,1", "1.5,1.5,1.5"]);
    }

    #[test]
    fn test_json_report_records_parameters() {
        let value = serde_json::to_value(report(2)).unwrap();
        assert_eq!(value["function"], "Linear");
        assert_eq!(value["formula"], "y = x + e");
        assert_eq!(value["seed"], "00000000000000000000000000000002");
        assert_eq!(value["grid"]["step"], 0.5);
        assert_eq!(value["noise"]["std_dev"], 0.0);
        assert_eq!(value["points"].as_array().unwrap().len(), 4);
    }
}
