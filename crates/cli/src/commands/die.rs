//! Die inspection command.
//!
//! Prints the probabilities and moments of a fair or weighted die, optionally
//! after moving one face to a new probability.

use anyhow::{anyhow, Result};
use clap::Args;

use rollquest_core::{redistribute, Die, DieInfo};

use super::output::{banner, emit, parse_list, OutputFormat, RULE};

/// Arguments for the die command.
#[derive(Args, Debug, Clone)]
pub struct DieArgs {
    /// Six comma-separated die weights (fair die if omitted)
    #[arg(short, long)]
    pub weights: Option<String>,

    /// Face (1-6) whose probability to set
    #[arg(long, requires = "adjust_value")]
    pub adjust_face: Option<u8>,

    /// New probability for --adjust-face; the other faces are rescaled
    #[arg(long, requires = "adjust_face")]
    pub adjust_value: Option<f64>,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    pub format: String,
}

pub fn run_die(args: DieArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let weights: Option<Vec<f64>> = args
        .weights
        .as_deref()
        .map(|w| parse_list(w, "weight"))
        .transpose()?;
    let mut die = Die::new(weights.as_deref())?;

    if let (Some(face), Some(value)) = (args.adjust_face, args.adjust_value) {
        let index = usize::from(face)
            .checked_sub(1)
            .ok_or_else(|| anyhow!("Face must be between 1 and 6"))?;
        let adjusted = redistribute(die.probabilities(), index, value)?;
        die = Die::new(Some(adjusted.as_slice()))?;
        tracing::info!("Set face {} to probability {:.4}", face, adjusted[index]);
    }

    emit(format, &die.probability_info(), format_die)
}

fn format_die(info: &DieInfo) -> String {
    let mut output = banner("DIE");
    output.push_str(&format!("Mode: {}\n\n", info.mode));
    output.push_str("Face   Probability\n");
    output.push_str(RULE);
    output.push('\n');
    for (face, p) in &info.probabilities {
        output.push_str(&format!("{:>4}   {:>10.4}%\n", face, p * 100.0));
    }
    output.push('\n');
    output.push_str(&format!("Expected Value: {:.4}\n", info.expected_value));
    output.push_str(&format!("Variance:       {:.4}\n", info.variance));
    output.push_str(&format!("Std Dev:        {:.4}\n", info.std_dev));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_die_lists_every_face() {
        let report = format_die(&Die::fair().probability_info());

        assert!(report.contains("Mode: fair"));
        assert!(report.contains("16.6667%"));
        assert!(report.contains("Expected Value: 3.5000"));
        assert_eq!(report.matches('%').count(), 6);
    }
}
