//! ASCII bar charts for terminal output.
//!
//! This is intentionally "dumb" (fixed-width rows), optimized for:
//! - quick visual checks of a digit distribution in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Chart elements, one row per leading digit:
//! - observed share: `#` bar
//! - expected (Benford) share: `|` marker

use crate::domain::{Digit, DigitComparison, FrequencyTable, GoodnessOfFit};

/// Render the overall observed vs expected comparison.
pub fn render_comparison(comparison: &DigitComparison, width: usize) -> String {
    render_digit_chart(
        "all groups",
        &comparison.observed,
        &comparison.expected,
        Some(&comparison.fit),
        width,
    )
}

/// Render one observed table against an expected distribution.
///
/// Bars are scaled so the largest observed or expected share spans `width` columns.
pub fn render_digit_chart(
    title: &str,
    observed: &FrequencyTable,
    expected: &[f64; 9],
    fit: Option<&GoodnessOfFit>,
    width: usize,
) -> String {
    let width = width.max(10);
    let mut out = String::new();

    out.push_str(&format!("Leading digits: {title} | n={}", observed.total()));
    if let Some(fit) = fit {
        out.push_str(&format!(" | chi2={:.4} p={:.4}", fit.statistic, fit.p_value));
    }
    out.push('\n');

    let scale = observed
        .frequencies()
        .iter()
        .chain(expected.iter())
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    for digit in Digit::ALL {
        let obs = observed.frequency(digit);
        let exp = expected[digit.index()];
        let bar = render_bar(obs, exp, scale, width);
        out.push_str(&format!("{digit} {bar} {:>7.2}% {:>7.2}%\n", obs * 100.0, exp * 100.0));
    }

    out
}

fn render_bar(observed: f64, expected: f64, scale: f64, width: usize) -> String {
    let mut cells = vec![' '; width];
    if scale > 0.0 {
        let filled = cells_for(observed, scale, width);
        for cell in cells.iter_mut().take(filled) {
            *cell = '#';
        }
        let marker = cells_for(expected, scale, width).min(width - 1);
        cells[marker] = '|';
    }
    cells.into_iter().collect()
}

fn cells_for(value: f64, scale: f64, width: usize) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    ((value / scale) * width as f64).round().clamp(0.0, width as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::benford_distribution;

    #[test]
    fn chart_golden_snapshot_small() {
        let observed = FrequencyTable::from_counts([5, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        let expected = *benford_distribution().probabilities();

        let txt = render_digit_chart("Vendor A", &observed, &expected, None, 10);
        let expected_txt = concat!(
            "Leading digits: Vendor A | n=5\n",
            "1 ###|######  100.00%   30.10%\n",
            "2   |           0.00%   17.61%\n",
            "3  |            0.00%   12.49%\n",
            "4  |            0.00%    9.69%\n",
            "5  |            0.00%    7.92%\n",
            "6  |            0.00%    6.69%\n",
            "7  |            0.00%    5.80%\n",
            "8  |            0.00%    5.12%\n",
            "9 |             0.00%    4.58%\n",
        );
        assert_eq!(txt, expected_txt);
    }

    #[test]
    fn fit_is_shown_in_the_header() {
        let observed = FrequencyTable::from_counts([3, 2, 1, 1, 1, 1, 1, 1, 1]).unwrap();
        let comparison = DigitComparison {
            observed,
            expected: *benford_distribution().probabilities(),
            fit: GoodnessOfFit {
                statistic: 0.25,
                p_value: 0.9,
                dof: 8,
            },
        };
        let txt = render_comparison(&comparison, 40);
        let first = txt.lines().next().unwrap();
        assert_eq!(first, "Leading digits: all groups | n=12 | chi2=0.2500 p=0.9000");
        assert_eq!(txt.lines().count(), 10);
    }

    #[test]
    fn narrow_width_is_clamped() {
        let observed = FrequencyTable::from_counts([1; 9]).unwrap();
        let txt = render_digit_chart("x", &observed, &[1.0 / 9.0; 9], None, 3);
        let row = txt.lines().nth(1).unwrap();
        // digit, space, 10 bar cells, space
        assert_eq!(&row[..2], "1 ");
        assert_eq!(row[2..12].chars().filter(|&c| c == '#').count(), 9);
        assert!(row[2..12].ends_with('|'));
    }
}
