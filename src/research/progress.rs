//! Prints the progress of a bundle method run to the standard output.
use colored::Colorize;

use super::observer::{
    IterationRecord,
    Observer,
};
use crate::bundle::{
    BundleOutcome,
    Termination,
};
use crate::common::constants::DEFAULT_PRINT_EVERY;

const WIDTH: usize = 8;
const PREC_WIDTH: usize = 5;
const FULL_WIDTH: usize = 60;
const STAT_WIDTH: usize = (FULL_WIDTH - 4) / 2;


/// An [`Observer`] that prints a table of
/// the loss, the best objective value, and the gap.
/// 
/// ```no_run
/// use structsvm::BundleMethod;
/// use structsvm::research::ProgressPrinter;
/// 
/// let oracle = |w: &[f64]| (w[0].abs(), vec![w[0].signum()]);
/// let mut printer = ProgressPrinter::new()
///     .print_every(1);
/// let outcome = BundleMethod::init(oracle, 1)
///     .optimize_with(None, &mut printer)
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct ProgressPrinter {
    round: usize,
    elapsed_millis: u128,
}


impl ProgressPrinter {
    /// Constructs a printer that prints every `10` iterations.
    pub fn new() -> Self {
        Self {
            round: DEFAULT_PRINT_EVERY,
            elapsed_millis: 0,
        }
    }


    /// Set the interval to print the current status.
    /// If you don't want to print the log,
    /// set `usize::MAX`.
    #[inline(always)]
    pub fn print_every(mut self, round: usize) -> Self {
        assert!(round > 0, "the printing interval must be positive.");
        self.round = round;
        self
    }


    #[inline(always)]
    fn is_silent(&self) -> bool {
        self.round == usize::MAX
    }


    #[inline(always)]
    fn print_log_header(&self) {
        println!(
            "      {:>WIDTH$}\t\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}",
            "".bold().red(),
            "LOSS".bold().blue(),
            "MIN.".bold().green(),
            "".bold().yellow(),
            "ACC.".bold().cyan(),
        );
        println!(
            "      {:>WIDTH$}\t\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\n",
            "ROUND".bold().red(),
            "VALUE".bold().blue(),
            "VALUE".bold().green(),
            "GAP".bold().yellow(),
            "TIME".bold().cyan(),
        );
    }


    /// print current settings.
    #[inline(always)]
    fn print_stats(&self, name: &str, info: &[(&str, String)]) {
        let header = format!(
            "{:=>FULL_WIDTH$}\n{:^FULL_WIDTH$}\n{:->FULL_WIDTH$}",
            "", "STATS".bold(), "",
        );
        println!(
            "\n{header}\n\
            + {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}",
            "Algorithm".bold(),
            name.bold().green(),
        );

        let line = info.iter()
            .map(|(key, val)| {
                format!(
                    "    + {:<STAT_WIDTH$}\t{:>width$}",
                    key,
                    val.bold().yellow(),
                    width = STAT_WIDTH - 8
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        println!("{line}");
        println!("{:=^FULL_WIDTH$}\n", "".bold());
    }
}


impl Default for ProgressPrinter {
    fn default() -> Self {
        Self::new()
    }
}


impl Observer for ProgressPrinter {
    fn start(&mut self, name: &str, info: &[(&str, String)]) {
        self.elapsed_millis = 0;
        if self.is_silent() { return; }
        self.print_stats(name, info);
        self.print_log_header();
    }


    fn observe(&mut self, record: &IterationRecord<'_>) {
        self.elapsed_millis = record.elapsed_millis;
        if self.is_silent() || record.iteration % self.round != 0 {
            return;
        }
        println!(
            "{} {}\t\t{}\t{}\t{}\t{}",
            "[LOG]".bold().magenta(),
            format!("{:>WIDTH$}", record.iteration).red(),
            format!("{:>WIDTH$.PREC_WIDTH$}", record.value).blue(),
            format!("{:>WIDTH$.PREC_WIDTH$}", record.min_value).green(),
            format!("{:>WIDTH$.PREC_WIDTH$e}", record.gap).yellow(),
            time_format(record.elapsed_millis).bold().cyan(),
        );
    }


    fn finish(&mut self, outcome: &BundleOutcome) {
        if self.is_silent() { return; }
        let tag = match outcome.termination {
            Termination::Converged        => "[FIN]".bold().bright_green(),
            Termination::NumericalAnomaly => "[WRN]".bold().bright_yellow(),
            Termination::MaxIterations    => "[CUT]".bold().bright_red(),
        };
        println!(
            "{} {}\t\t{}\t{}\t{}\t{}\n",
            tag,
            format!("{:>WIDTH$}", outcome.iterations).red(),
            format!("{:>WIDTH$}", "-").bold().blue(),
            format!("{:>WIDTH$.PREC_WIDTH$}", outcome.min_value).bold().green(),
            format!("{:>WIDTH$.PREC_WIDTH$e}", outcome.gap).bold().yellow(),
            time_format(self.elapsed_millis).bold().cyan(),
        );
    }
}


/// Formats elapsed milliseconds with the two most significant units.
fn time_format(millis: u128) -> String {
    let (secs, millis) = (millis / 1_000, millis % 1_000);
    let (mins, secs) = (secs / 60, secs % 60);
    let (hours, mins) = (mins / 60, mins % 60);
    match (hours, mins) {
        (0, 0) => format!("{secs:>3}.{millis:03}s"),
        (0, _) => format!("{mins:>3}m {secs:02}s"),
        _      => format!("{hours:>3}h {mins:02}m"),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_format() {
        assert_eq!(time_format(42), "  0.042s");
        assert_eq!(time_format(12_345), " 12.345s");
        assert_eq!(time_format(61_500), "  1m 01s");
        assert_eq!(time_format(3_600_000 + 120_000), "  1h 02m");
    }

    #[test]
    #[should_panic]
    fn test_zero_interval() {
        let _ = ProgressPrinter::new().print_every(0);
    }
}
