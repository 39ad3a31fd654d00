//! Cascade engine properties.

use wastemarket_sdk::cascade::{cascade, step};
use wastemarket_sdk::models::{MarginConfig, Tier};

const BASES: [f64; 8] = [0.0, 1.0, 7.0, 499.5, 1500.0, 11000.0, 70000.0, 987_654.321];
const RATIOS: [f64; 6] = [0.0, 0.01, 0.15, 0.5, 0.99, 0.999];

// ---------------------------------------------------------------------------
// Ordering and sign
// ---------------------------------------------------------------------------

#[test]
fn tiers_never_increase_and_never_go_negative() {
    for base in BASES {
        for a in RATIOS {
            for b in RATIOS {
                for c in RATIOS {
                    let p = cascade(base, &MarginConfig::new(a, b, c));
                    let [t1, t2, t3, t4] = p.as_array();
                    assert!(
                        t1 >= t2 && t2 >= t3 && t3 >= t4 && t4 >= 0.0,
                        "base={} margins=({}, {}, {}) -> {:?}",
                        base,
                        a,
                        b,
                        c,
                        p
                    );
                }
            }
        }
    }
}

#[test]
fn every_tier_is_a_whole_number() {
    for base in BASES {
        let p = cascade(base, &MarginConfig::new(0.13, 0.17, 0.29));
        for price in p.as_array() {
            assert_eq!(price, price.round());
        }
    }
}

// ---------------------------------------------------------------------------
// Determinism and identity
// ---------------------------------------------------------------------------

#[test]
fn same_inputs_give_same_outputs() {
    let margins = MarginConfig::new(0.15, 0.2, 0.25);
    for base in BASES {
        assert_eq!(cascade(base, &margins), cascade(base, &margins));
    }
}

#[test]
fn zero_margins_pass_the_rounded_base_price_through() {
    for base in BASES {
        let p = cascade(base, &MarginConfig::pass_through());
        assert_eq!(p.as_array(), [base.round(); 4]);
    }
}

#[test]
fn zero_base_price_gives_zero_everywhere() {
    let p = cascade(0.0, &MarginConfig::new(0.9, 0.9, 0.9));
    assert_eq!(p.as_array(), [0.0; 4]);
}

// ---------------------------------------------------------------------------
// Known values
// ---------------------------------------------------------------------------

#[test]
fn cardboard_example() {
    let p = cascade(1500.0, &MarginConfig::new(0.15, 0.20, 0.25));
    assert_eq!(p.tier1_price, 1500.0);
    assert_eq!(p.tier2_price, 1275.0);
    assert_eq!(p.tier3_price, 1020.0);
    assert_eq!(p.tier4_price, 765.0);
}

#[test]
fn aluminium_example() {
    let p = cascade(11000.0, &MarginConfig::new(0.15, 0.20, 0.25));
    assert_eq!(p.as_array(), [11000.0, 9350.0, 7480.0, 5610.0]);
}

#[test]
fn default_margins_match_the_worked_examples() {
    let p = cascade(1500.0, &MarginConfig::default());
    assert_eq!(p.at(Tier::Consumer), 765.0);
}

#[test]
fn price_vector_lookup_by_tier() {
    let p = cascade(11000.0, &MarginConfig::default());
    assert_eq!(p.at(Tier::Aggregator), 11000.0);
    assert_eq!(p.at(Tier::CollectionCenter), 9350.0);
    assert_eq!(p.at(Tier::CollectionPoint), 7480.0);
    assert_eq!(p.at(Tier::Consumer), 5610.0);
}

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

#[test]
fn rounding_is_applied_per_stage() {
    // Per stage: 101 -> 50.5 -> 51 -> 25.5 -> 26.
    // Rounding once at the end would give round(101 * 0.25) = 25.
    let p = cascade(101.0, &MarginConfig::new(0.5, 0.5, 0.0));
    assert_eq!(p.tier2_price, 51.0);
    assert_eq!(p.tier3_price, 26.0);
    assert_eq!(p.tier4_price, 26.0);
}

#[test]
fn step_rounds_half_away_from_zero() {
    assert_eq!(step(5.0, 0.5), 3.0);
    assert_eq!(step(3.0, 0.5), 2.0);
}

#[test]
fn large_base_prices_keep_precision() {
    let p = cascade(123_456_789.0, &MarginConfig::new(0.1, 0.0, 0.0));
    assert_eq!(p.tier2_price, 111_111_110.0);
}

// ---------------------------------------------------------------------------
// Out-of-domain margins
// ---------------------------------------------------------------------------

#[test]
fn margin_of_one_or_more_is_not_clamped() {
    let p = cascade(1000.0, &MarginConfig::new(1.0, 0.0, 0.0));
    assert_eq!(p.tier2_price, 0.0);

    let p = cascade(1000.0, &MarginConfig::new(1.2, 0.0, 0.0));
    assert_eq!(p.tier2_price, -200.0);
}

#[test]
fn negative_margin_inflates_lower_tiers() {
    let p = cascade(1000.0, &MarginConfig::new(-0.1, 0.0, 0.0));
    assert_eq!(p.tier2_price, 1100.0);
    assert!(p.tier2_price > p.tier1_price);
}
