//! Calendar arithmetic over `(year, month)` pairs and the cyclic month encoding.
//!
//! Grounded in `tesi/zappai/utils/common.py` (`calc_months_delta`,
//! `get_next_n_months`, `get_previous_n_months`) and in the sin/cos feature the
//! climate generator uses in place of a one-hot month (spec §9).

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// A `(year, month)` pair, `month` always in `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month), "month must be in 1..=12");
        Self { year, month }
    }

    /// The `(year, month)` immediately after this one.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// The `(year, month)` immediately before this one.
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// Advance by `n` months (`n` may be negative).
    pub fn add_months(self, n: i64) -> Self {
        let zero_based = self.month as i64 - 1 + n;
        let year = self.year as i64 + zero_based.div_euclid(12);
        let month = zero_based.rem_euclid(12) + 1;
        Self::new(year as i32, month as u32)
    }

    /// Number of calendar months from `self` to `other` (`other - self`).
    /// Negative if `other` precedes `self`.
    pub fn months_until(self, other: YearMonth) -> i64 {
        (other.year as i64 - self.year as i64) * 12 + (other.month as i64 - self.month as i64)
    }

    /// `(sin, cos)` cyclic encoding of the month, period 12. Identical for
    /// `m` and `m + 12` by construction (property tested below).
    pub fn cyclic_encoding(self) -> (f64, f64) {
        let angle = 2.0 * PI * (self.month as f64 - 1.0) / 12.0;
        (angle.sin(), angle.cos())
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Number of calendar months between two `(year, month)` pairs
/// (`calc_months_delta` in the prototype).
pub fn months_between(start: YearMonth, end: YearMonth) -> i64 {
    start.months_until(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_month_rolls_over_year() {
        assert_eq!(YearMonth::new(2022, 12).next(), YearMonth::new(2023, 1));
        assert_eq!(YearMonth::new(2022, 6).next(), YearMonth::new(2022, 7));
    }

    #[test]
    fn previous_month_rolls_back_year() {
        assert_eq!(YearMonth::new(2023, 1).previous(), YearMonth::new(2022, 12));
    }

    #[test]
    fn add_months_handles_large_offsets_and_negatives() {
        assert_eq!(YearMonth::new(2020, 1).add_months(13), YearMonth::new(2021, 2));
        assert_eq!(YearMonth::new(2020, 1).add_months(-1), YearMonth::new(2019, 12));
        assert_eq!(YearMonth::new(2020, 1).add_months(0), YearMonth::new(2020, 1));
    }

    #[test]
    fn months_between_matches_calendar_distance() {
        assert_eq!(
            months_between(YearMonth::new(2020, 3), YearMonth::new(2020, 5)),
            2
        );
        assert_eq!(
            months_between(YearMonth::new(2020, 11), YearMonth::new(2021, 2)),
            3
        );
        assert_eq!(
            months_between(YearMonth::new(2021, 2), YearMonth::new(2020, 11)),
            -3
        );
    }

    /// Cyclic encoding property (spec §8 property 6): sin/cos are periodic
    /// with period 12 months.
    #[test]
    fn cyclic_encoding_has_period_12() {
        for m in 1..=12u32 {
            let a = YearMonth::new(2021, m).cyclic_encoding();
            let b = YearMonth::new(2022, m).cyclic_encoding();
            assert!((a.0 - b.0).abs() < 1e-12);
            assert!((a.1 - b.1).abs() < 1e-12);
        }
    }
}
