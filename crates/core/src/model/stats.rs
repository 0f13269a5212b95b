use serde::Serialize;

use crate::model::progress::DEFAULT_LEVEL;

/// Raw sums gathered by a single scan over the stored records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressTotals {
    pub users: u64,
    pub stars: u64,
    pub level_sum: u64,
    pub max_level: Option<u32>,
}

impl ProgressTotals {
    /// Fold one stored record into the totals.
    pub fn record(&mut self, stars: u32, level: u32) {
        self.users += 1;
        self.stars += u64::from(stars);
        self.level_sum += u64::from(level);
        self.max_level = Some(self.max_level.map_or(level, |max| max.max(level)));
    }
}

/// Summary statistics across every stored progress record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProgressStats {
    pub total_users: u64,
    pub total_stars: u64,
    pub average_level: f64,
    pub max_level: u32,
}

impl ProgressStats {
    /// Derive the reported statistics.
    ///
    /// With no stored records the level figures report the starting level (1)
    /// rather than zero. The average is rounded to two decimals, ties away from
    /// zero, using integer arithmetic so `1.125` reliably becomes `1.13`.
    #[must_use]
    pub fn from_totals(totals: &ProgressTotals) -> Self {
        if totals.users == 0 {
            return Self {
                total_users: 0,
                total_stars: totals.stars,
                average_level: f64::from(DEFAULT_LEVEL),
                max_level: DEFAULT_LEVEL,
            };
        }

        let users = u128::from(totals.users);
        let hundredths = (u128::from(totals.level_sum) * 200 + users) / (2 * users);
        #[allow(clippy::cast_precision_loss)]
        let average_level = hundredths as f64 / 100.0;

        Self {
            total_users: totals.users,
            total_stars: totals.stars,
            average_level,
            max_level: totals.max_level.unwrap_or(DEFAULT_LEVEL),
        }
    }
}
