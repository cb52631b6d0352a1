//! Product domain model.
//!
//! # Responsibility
//! - Define the canonical product record and its write shapes.
//! - Parse raw user input into validated fields in a fixed rule order.
//! - Convert prices between `Decimal` and stored hundredths.
//!
//! # Invariants
//! - `price` and `offer_price` carry at most two fractional digits.
//! - `name` and `category` are trimmed and non-empty once validated.
//! - Validation order is name, category, price, stock; the first failing
//!   rule wins.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Storage-generated product identifier.
pub type ProductId = i64;

/// Number of fractional digits kept for monetary values.
pub const PRICE_SCALE: u32 = 2;

/// One catalog record as persisted in `products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub stock: i64,
    pub brand: Option<String>,
    pub sku: Option<String>,
    /// Threshold at or below which the product counts as low stock.
    pub stock_minimum: i64,
    /// Discounted price; `Some` means the product is on offer.
    pub offer_price: Option<Decimal>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds, bumped on every update.
    pub updated_at: i64,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.stock_minimum
    }

    pub fn is_on_offer(&self) -> bool {
        self.offer_price.is_some()
    }
}

/// Insert shape. `stock` falls back to zero when unspecified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub stock: Option<i64>,
}

/// Full replacement of the four user-editable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub stock: i64,
}

/// Which lower bound applies to `stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockRule {
    /// Zero or more, used when a product is created.
    AllowZero,
    /// Strictly positive, used when a product is edited.
    RequirePositive,
}

/// Rejection reasons for user-entered product fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductValidationError {
    EmptyName,
    EmptyCategory,
    PriceNotNumeric(String),
    NegativePrice,
    PriceOutOfRange,
    StockNotInteger(String),
    NegativeStock,
    NonPositiveStock,
}

impl Display for ProductValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name cannot be empty"),
            Self::EmptyCategory => write!(f, "category cannot be empty"),
            Self::PriceNotNumeric(raw) => write!(f, "price must be a valid number, got `{raw}`"),
            Self::NegativePrice => write!(f, "price cannot be negative"),
            Self::PriceOutOfRange => write!(f, "price is too large"),
            Self::StockNotInteger(raw) => {
                write!(f, "stock must be a valid integer, got `{raw}`")
            }
            Self::NegativeStock => write!(f, "stock cannot be negative"),
            Self::NonPositiveStock => write!(f, "stock must be greater than 0"),
        }
    }
}

impl Error for ProductValidationError {}

/// Validated product fields parsed from raw user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub stock: i64,
}

impl ProductDraft {
    /// Parses and validates raw field text.
    ///
    /// # Errors
    /// - Returns the first violated rule in name, category, price, stock
    ///   order.
    pub fn parse(
        name: &str,
        price: &str,
        category: &str,
        stock: &str,
        stock_rule: StockRule,
    ) -> Result<Self, ProductValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProductValidationError::EmptyName);
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(ProductValidationError::EmptyCategory);
        }

        let price = parse_price(price)?;
        let stock = parse_stock(stock, stock_rule)?;

        Ok(Self {
            name: name.to_string(),
            price,
            category: category.to_string(),
            stock,
        })
    }

    pub fn into_new_product(self) -> NewProduct {
        NewProduct {
            name: self.name,
            price: self.price,
            category: self.category,
            stock: Some(self.stock),
        }
    }

    pub fn into_changes(self) -> ProductChanges {
        ProductChanges {
            name: self.name,
            price: self.price,
            category: self.category,
            stock: self.stock,
        }
    }
}

/// Parses a non-negative price and rounds it to [`PRICE_SCALE`] digits.
///
/// Accepts plain (`"12.5"`) and scientific (`"1.25e1"`) notation.
pub fn parse_price(raw: &str) -> Result<Decimal, ProductValidationError> {
    let trimmed = raw.trim();
    let value = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ProductValidationError::PriceNotNumeric(trimmed.to_string()))?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(ProductValidationError::NegativePrice);
    }

    let rounded = round_price(value);
    if price_to_cents(rounded).is_none() {
        return Err(ProductValidationError::PriceOutOfRange);
    }
    Ok(rounded.abs())
}

/// Parses an integer stock count and applies the given lower bound.
pub fn parse_stock(raw: &str, rule: StockRule) -> Result<i64, ProductValidationError> {
    let trimmed = raw.trim();
    let stock = trimmed
        .parse::<i64>()
        .map_err(|_| ProductValidationError::StockNotInteger(trimmed.to_string()))?;

    match rule {
        StockRule::AllowZero if stock < 0 => Err(ProductValidationError::NegativeStock),
        StockRule::RequirePositive if stock <= 0 => Err(ProductValidationError::NonPositiveStock),
        _ => Ok(stock),
    }
}

/// Parses a product id; malformed input yields `None`.
pub fn parse_product_id(raw: &str) -> Option<ProductId> {
    raw.trim().parse::<ProductId>().ok()
}

/// Rounds to two places, midpoint away from zero.
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a price to integer hundredths, `None` when it overflows `i64`.
pub fn price_to_cents(value: Decimal) -> Option<i64> {
    round_price(value)
        .checked_mul(Decimal::ONE_HUNDRED)?
        .to_i64()
}

/// Inclusive lower range bound in hundredths; sub-cent values round up.
pub fn min_price_bound_cents(value: Decimal) -> i64 {
    bound_cents(value, Decimal::ceil)
}

/// Inclusive upper range bound in hundredths; sub-cent values round down.
pub fn max_price_bound_cents(value: Decimal) -> i64 {
    bound_cents(value, Decimal::floor)
}

// Out-of-range bounds clamp to the `i64` limits.
fn bound_cents(value: Decimal, round: fn(&Decimal) -> Decimal) -> i64 {
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| round(&cents).to_i64())
        .unwrap_or(if value.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
}

pub fn price_from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, PRICE_SCALE)
}

#[cfg(test)]
mod tests {
    use super::{
        max_price_bound_cents, min_price_bound_cents, parse_price, parse_product_id, parse_stock,
        price_from_cents, price_to_cents,
        ProductDraft, ProductValidationError, StockRule,
    };
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).expect("valid decimal literal")
    }

    #[test]
    fn parse_trims_text_fields() {
        let draft = ProductDraft::parse("  Widget ", "9.99", " Tools ", "3", StockRule::AllowZero)
            .expect("valid draft");
        assert_eq!(draft.name, "Widget");
        assert_eq!(draft.category, "Tools");
        assert_eq!(draft.price, dec("9.99"));
        assert_eq!(draft.stock, 3);
    }

    #[test]
    fn name_is_checked_before_everything_else() {
        let err = ProductDraft::parse(" ", "x", "", "y", StockRule::AllowZero).unwrap_err();
        assert_eq!(err, ProductValidationError::EmptyName);
    }

    #[test]
    fn category_is_checked_before_numbers() {
        let err =
            ProductDraft::parse("Widget", "-5", "  ", "-1", StockRule::AllowZero).unwrap_err();
        assert_eq!(err, ProductValidationError::EmptyCategory);
    }

    #[test]
    fn price_is_checked_before_stock() {
        let err = ProductDraft::parse("Widget", "abc", "Tools", "abc", StockRule::AllowZero)
            .unwrap_err();
        assert_eq!(err, ProductValidationError::PriceNotNumeric("abc".to_string()));
    }

    #[test]
    fn price_rounds_half_away_from_zero() {
        assert_eq!(parse_price("10.005").unwrap(), dec("10.01"));
        assert_eq!(parse_price("1.234").unwrap(), dec("1.23"));
        assert_eq!(parse_price(" 7 ").unwrap(), dec("7"));
    }

    #[test]
    fn price_accepts_scientific_notation() {
        assert_eq!(parse_price("1.5e2").unwrap(), dec("150"));
    }

    #[test]
    fn price_rejects_negative_and_garbage() {
        assert_eq!(parse_price("-1"), Err(ProductValidationError::NegativePrice));
        assert_eq!(parse_price("-0.001"), Err(ProductValidationError::NegativePrice));
        assert!(matches!(
            parse_price(""),
            Err(ProductValidationError::PriceNotNumeric(_))
        ));
    }

    #[test]
    fn negative_zero_price_is_accepted_as_zero() {
        assert_eq!(parse_price("-0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn price_beyond_storage_range_is_rejected() {
        assert_eq!(
            parse_price("79228162514264337593543950335"),
            Err(ProductValidationError::PriceOutOfRange)
        );
    }

    #[test]
    fn stock_rules_differ_between_create_and_edit() {
        assert_eq!(parse_stock("0", StockRule::AllowZero), Ok(0));
        assert_eq!(
            parse_stock("0", StockRule::RequirePositive),
            Err(ProductValidationError::NonPositiveStock)
        );
        assert_eq!(
            parse_stock("-2", StockRule::AllowZero),
            Err(ProductValidationError::NegativeStock)
        );
        assert_eq!(
            parse_stock("2.5", StockRule::AllowZero),
            Err(ProductValidationError::StockNotInteger("2.5".to_string()))
        );
    }

    #[test]
    fn product_id_parse_treats_garbage_as_none() {
        assert_eq!(parse_product_id(" 42 "), Some(42));
        assert_eq!(parse_product_id("4x"), None);
        assert_eq!(parse_product_id(""), None);
    }

    #[test]
    fn cents_conversion_keeps_two_places() {
        assert_eq!(price_to_cents(dec("12.34")), Some(1234));
        assert_eq!(price_from_cents(1234), dec("12.34"));
        assert_eq!(price_from_cents(500), dec("5"));
    }

    #[test]
    fn range_bounds_never_widen_past_sub_cent_input() {
        assert_eq!(min_price_bound_cents(dec("1.004")), 101);
        assert_eq!(max_price_bound_cents(dec("1.006")), 100);
        assert_eq!(min_price_bound_cents(dec("1.00")), 100);
        assert_eq!(max_price_bound_cents(dec("1.00")), 100);
        assert_eq!(min_price_bound_cents(dec("-0.005")), 0);
        assert_eq!(max_price_bound_cents(Decimal::MAX), i64::MAX);
        assert_eq!(min_price_bound_cents(Decimal::MIN), i64::MIN);
    }
}
