//! Chi-square goodness-of-fit command.

use anyhow::Result;
use clap::Args;

use rollquest_simulation::{ChiSquareReport, StatisticalAnalyzer};

use super::output::{banner, emit, parse_list, OutputFormat, RULE};

/// Arguments for the chi-square command.
#[derive(Args, Debug, Clone)]
pub struct ChiSquareArgs {
    /// Six comma-separated observed counts, faces 1 to 6
    #[arg(long)]
    pub observed: String,

    /// Six comma-separated expected probabilities or weights (fair die if omitted)
    #[arg(long)]
    pub expected: Option<String>,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    pub format: String,
}

pub fn run_chi_square(args: ChiSquareArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let observed: Vec<u64> = parse_list(&args.observed, "count")?;
    let expected: Option<Vec<f64>> = args
        .expected
        .as_deref()
        .map(|e| parse_list(e, "probability"))
        .transpose()?;

    let report = StatisticalAnalyzer::chi_square_test(&observed, expected.as_deref())?;
    emit(format, &report, format_chi_square)
}

fn format_chi_square(report: &ChiSquareReport) -> String {
    let mut output = banner("CHI-SQUARE GOODNESS OF FIT");
    output.push_str("Face   Observed    Expected\n");
    output.push_str(RULE);
    output.push('\n');
    for (i, (o, e)) in report.observed.iter().zip(&report.expected).enumerate() {
        output.push_str(&format!("{:>4}   {:>8}   {:>9.2}\n", i + 1, o, e));
    }
    output.push('\n');
    output.push_str(&format!(
        "Chi-square:     {:.4} (df {})\n",
        report.chi_square_statistic, report.degrees_of_freedom
    ));
    output.push_str(&format!("Critical (95%): {:.4}\n", report.critical_value_95));
    output.push_str(&format!("p-value:        {:.6}\n\n", report.p_value));
    output.push_str(&report.interpretation);
    output.push('\n');
    output
}
