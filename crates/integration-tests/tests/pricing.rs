//! Pricing arithmetic contracts.
//!
//! For every product the tax-inclusive unit price is
//! `price + price * tax_percent / 100`, a line totals `unit * quantity`,
//! and an order totals the sum of its lines.

use rust_decimal::Decimal;

use tricity_api::services::orders::unit_price_with_tax;

fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal")
}

#[test]
fn unit_price_includes_the_tax_percentage() {
    assert_eq!(unit_price_with_tax(dec("100"), dec("18")), dec("118"));
    assert_eq!(unit_price_with_tax(dec("200"), dec("5")), dec("210"));
    assert_eq!(unit_price_with_tax(dec("80"), dec("12.5")), dec("90"));
}

#[test]
fn zero_tax_is_the_identity() {
    for price in ["0", "1", "99.99", "12345.67"] {
        assert_eq!(
            unit_price_with_tax(dec(price), Decimal::ZERO),
            dec(price)
        );
    }
}

#[test]
fn fractional_prices_stay_exact() {
    // 19.99 * 18% = 3.5982; decimal arithmetic keeps every digit.
    assert_eq!(unit_price_with_tax(dec("19.99"), dec("18")), dec("23.5882"));
}

#[test]
fn a_cart_totals_the_sum_of_its_lines() {
    // (product price, tax percent, quantity)
    let cart = [
        (dec("100.00"), dec("18"), 2),
        (dec("50.00"), dec("5"), 1),
        (dec("19.99"), dec("0"), 3),
    ];

    let total: Decimal = cart
        .iter()
        .map(|(price, tax, quantity)| {
            unit_price_with_tax(*price, *tax) * Decimal::from(*quantity)
        })
        .sum();

    // 236 + 52.50 + 59.97
    assert_eq!(total, dec("348.47"));
}

#[test]
fn quantity_scales_the_taxed_unit_price_not_the_base() {
    let unit = unit_price_with_tax(dec("10"), dec("10"));
    let line = unit * Decimal::from(7);
    assert_eq!(line, dec("77"));
}
