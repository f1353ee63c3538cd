//! Accounting record value object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of octets per gigaword overflow increment (2^32).
const GIGAWORD: u128 = 1 << 32;

/// One accounting update streamed in from the AAA infrastructure.
///
/// The octet counters are 32-bit on the wire; every wrap past 2^32
/// increments the matching gigaword counter. Totals are reconstructed
/// in unsigned 64-bit arithmetic only — a floating-point intermediate
/// would lose precision at multi-terabyte totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountingUpdate {
    /// 32-bit input (upload) octet counter.
    pub input_octets: u32,
    /// 32-bit output (download) octet counter.
    pub output_octets: u32,
    /// Input counter wrap count.
    pub input_gigawords: u32,
    /// Output counter wrap count.
    pub output_gigawords: u32,
    /// When the AAA infrastructure recorded this update. Ingestion
    /// compares this against the ledger's per-window reset marks, never
    /// against wall-clock now.
    pub recorded_at: DateTime<Utc>,
}

impl AccountingUpdate {
    /// Combined byte total:
    /// `input + output + (input_gigawords + output_gigawords) * 2^32`.
    ///
    /// Computed in 128-bit arithmetic: with all four counters at
    /// `u32::MAX` the total is just above 2^65 and does not fit in u64.
    /// Callers narrow to the ledger's i64 column and reject what does
    /// not fit.
    pub fn total_bytes(&self) -> u128 {
        u128::from(self.input_octets)
            + u128::from(self.output_octets)
            + (u128::from(self.input_gigawords) + u128::from(self.output_gigawords)) * GIGAWORD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(inp: u32, out: u32, gin: u32, gout: u32) -> AccountingUpdate {
        AccountingUpdate {
            input_octets: inp,
            output_octets: out,
            input_gigawords: gin,
            output_gigawords: gout,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_total_without_overflow() {
        assert_eq!(update(1_000, 2_500, 0, 0).total_bytes(), 3_500);
    }

    #[test]
    fn test_gigaword_combination() {
        // 1 input wrap + 2 output wraps on top of the residual counters
        let u = update(10, 20, 1, 2);
        assert_eq!(u.total_bytes(), 30 + 3 * (1u128 << 32));
    }

    #[test]
    fn test_total_at_counter_maximums() {
        let u = update(u32::MAX, u32::MAX, u32::MAX, u32::MAX);
        // 2 * (2^32 - 1) * (2^32 + 1) = 2 * (2^64 - 1), past u64::MAX
        let expected = 2 * u128::from(u32::MAX) * ((1u128 << 32) + 1);
        assert_eq!(u.total_bytes(), expected);
        assert!(u.total_bytes() > u128::from(u64::MAX));
        // the ledger column rejects what it cannot hold
        assert!(i64::try_from(u.total_bytes()).is_err());
    }
}
