//! Satoshi and BCH amount conversion for display.

/// Satoshis in one BCH.
pub const SATOSHI_PER_BCH: f64 = 100_000_000.0;

/// Decimal places kept when showing BCH amounts.
const DISPLAY_SCALE: f64 = 10_000.0;

/// Satoshis as BCH, rounded to four decimal places.
pub fn satoshi_to_bch(satoshi: i64) -> f64 {
    let bch = satoshi as f64 / SATOSHI_PER_BCH;
    (bch * DISPLAY_SCALE).round() / DISPLAY_SCALE
}

/// BCH price of one of `quantity` units bought for `satoshi`.
///
/// # Returns
/// `None` when `quantity` is zero.
pub fn satoshi_to_bch_per_unit(satoshi: i64, quantity: i64) -> Option<f64> {
    if quantity == 0 {
        return None;
    }
    let per_unit = (satoshi as f64 / quantity as f64).round() as i64;
    Some(satoshi_to_bch(per_unit))
}

/// A BCH amount in satoshis, rounded to the nearest satoshi.
pub fn bch_to_satoshi(bch: f64) -> i64 {
    (bch * SATOSHI_PER_BCH).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satoshi_to_bch_rounds_to_four_places() {
        assert_eq!(satoshi_to_bch(100_000_000), 1.0);
        assert_eq!(satoshi_to_bch(97_881), 0.001);
        assert_eq!(satoshi_to_bch(12_345_678), 0.1235);
        assert_eq!(satoshi_to_bch(-50_000_000), -0.5);
        assert_eq!(satoshi_to_bch(0), 0.0);
    }

    #[test]
    fn test_per_unit() {
        assert_eq!(satoshi_to_bch_per_unit(300_000_000, 3), Some(1.0));
        assert_eq!(satoshi_to_bch_per_unit(10, 0), None);
    }

    #[test]
    fn test_bch_to_satoshi() {
        assert_eq!(bch_to_satoshi(1.0), 100_000_000);
        assert_eq!(bch_to_satoshi(0.00097881), 97_881);
        assert_eq!(bch_to_satoshi(0.1), 10_000_000);
        assert_eq!(bch_to_satoshi(satoshi_to_bch(250_000_000)), 250_000_000);
    }
}
