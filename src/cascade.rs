//! Four-tier price cascade.
//!
//! Each tier's price is the tier above marked down by one margin ratio and
//! rounded to a whole currency unit. Rounding happens at every stage, so the
//! result can differ by a few units from rounding the full product once.

use crate::models::{MarginConfig, PriceVector};

/// Derive the four tier prices for a base price.
///
/// Margins are used as given; out-of-range ratios produce negative or
/// inverted prices rather than an error. Tier 1 is the rounded base price
/// and each later tier is derived from the rounded tier above it.
pub fn cascade(base_price: f64, margins: &MarginConfig) -> PriceVector {
    let tier1 = base_price.round();
    let tier2 = step(tier1, margins.tier1to2);
    let tier3 = step(tier2, margins.tier2to3);
    let tier4 = step(tier3, margins.tier3to4);

    PriceVector {
        tier1_price: tier1,
        tier2_price: tier2,
        tier3_price: tier3,
        tier4_price: tier4,
    }
}

/// One markdown stage: `round(price * (1 - margin))`.
///
/// Uses `f64::round` (half away from zero).
pub fn step(price: f64, margin: f64) -> f64 {
    (price * (1.0 - margin)).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardboard_at_default_margins() {
        let p = cascade(1500.0, &MarginConfig::new(0.15, 0.20, 0.25));
        assert_eq!(p.as_array(), [1500.0, 1275.0, 1020.0, 765.0]);
    }

    #[test]
    fn zero_base_price_stays_zero() {
        let p = cascade(0.0, &MarginConfig::new(0.15, 0.20, 0.25));
        assert_eq!(p.as_array(), [0.0; 4]);
    }

    #[test]
    fn rounds_each_stage() {
        // 333 * 0.5 = 166.5 -> 167, 167 * 0.5 = 83.5 -> 84.
        // A single final rounding would give 333 * 0.25 = 83.25 -> 83.
        let p = cascade(333.0, &MarginConfig::new(0.5, 0.5, 0.0));
        assert_eq!(p.tier2_price, 167.0);
        assert_eq!(p.tier3_price, 84.0);
        assert_eq!(p.tier4_price, 84.0);
    }

    #[test]
    fn fractional_base_price_is_rounded_at_tier_one() {
        let p = cascade(1500.4, &MarginConfig::pass_through());
        assert_eq!(p.as_array(), [1500.0; 4]);
    }

    #[test]
    fn out_of_range_margin_is_not_clamped() {
        let p = cascade(1000.0, &MarginConfig::new(1.5, 0.0, 0.0));
        assert_eq!(p.tier2_price, -500.0);
    }
}
