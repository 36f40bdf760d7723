use colored::Colorize;

use crate::analysis::HistogramBin;

/// Format a text-based histogram of predicted volumes as a string.
pub fn format_volume_histogram(bins: &[HistogramBin]) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Predicted Volume Distribution".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0);
    if max_count == 0 {
        output.push_str("  No data available.\n");
        return output;
    }

    let bar_width = 40;

    output.push_str(&format!(
        "  {:>23}  {:>6}  {:>7}  Distribution\n",
        "Volume (mm³)", "Count", "%"
    ));
    output.push_str(&format!("  {}\n", "-".repeat(80)));

    for bin in bins {
        let bar_len = ((bin.count as f64 / max_count as f64) * bar_width as f64).round() as usize;
        let bar = "\u{2588}".repeat(bar_len);

        output.push_str(&format!(
            "  {:>11.1}-{:<11.1}  {:>6}  {:>6.1}%  {}\n",
            bin.bin_start,
            bin.bin_end,
            bin.count,
            bin.percentage,
            bar.green()
        ));
    }

    output.push('\n');
    output
}

/// Print a text-based histogram of predicted volumes.
pub fn print_volume_histogram(bins: &[HistogramBin]) {
    print!("{}", format_volume_histogram(bins));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(start: f64, end: f64, count: usize, percentage: f64) -> HistogramBin {
        HistogramBin {
            bin_start: start,
            bin_end: end,
            bin_center: (start + end) / 2.0,
            count,
            percentage,
        }
    }

    #[test]
    fn test_format_histogram_empty() {
        let output = format_volume_histogram(&[]);
        assert!(output.contains("No data available."));
        assert!(output.contains("Predicted Volume Distribution"));
    }

    #[test]
    fn test_format_histogram_all_zero_counts() {
        let output = format_volume_histogram(&[bin(0.0, 0.0, 0, 0.0), bin(0.0, 0.0, 0, 0.0)]);
        assert!(output.contains("No data available."));
    }

    #[test]
    fn test_format_histogram_with_data() {
        let bins = vec![bin(100.0, 200.0, 3, 75.0), bin(200.0, 300.0, 1, 25.0)];
        let output = format_volume_histogram(&bins);
        assert!(output.contains("Count"));
        assert!(output.contains("75.0%"));
        assert!(output.contains("25.0%"));
        assert!(output.contains('\u{2588}'));
    }

    #[test]
    fn test_histogram_bar_scaling() {
        let bins = vec![bin(0.0, 1.0, 4, 80.0), bin(1.0, 2.0, 1, 20.0)];
        let output = format_volume_histogram(&bins);
        let full_bar = "\u{2588}".repeat(40);
        assert!(output.contains(&full_bar));
        let lines: Vec<&str> = output.lines().filter(|l| l.contains("20.0%")).collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].matches('\u{2588}').count(), 10);
    }
}
