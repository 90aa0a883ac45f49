use mongodb::bson::{doc, DateTime};
use mongodb::Client;
use std::sync::Arc;

use crate::models::discount::{Discount, DiscountKind};

#[derive(Debug, thiserror::Error)]
pub enum DiscountError {
    #[error("discount code not found")]
    NotFound,
    #[error("discount code is not active")]
    Inactive,
    #[error("discount code is outside its validity window")]
    OutOfWindow,
    #[error("discount code has reached its usage limit")]
    Exhausted,
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub struct DiscountService;

impl DiscountService {
    /// Monetary effect of an already-validated discount on a subtotal.
    /// Percentage amounts use round-half-away-from-zero (`f64::round`);
    /// fixed amounts are capped at the subtotal. The result is always in
    /// `[0, subtotal]`, so the final total can never go negative.
    pub fn discount_amount(discount: Option<&Discount>, subtotal: i64) -> i64 {
        let Some(discount) = discount else { return 0 };
        let raw = match discount.kind {
            DiscountKind::Percentage => (subtotal as f64 * discount.value / 100.0).round() as i64,
            DiscountKind::FixedAmount => discount.value.round() as i64,
        };
        raw.clamp(0, subtotal)
    }

    pub fn final_total(subtotal: i64, discount: Option<&Discount>) -> (i64, i64) {
        let amount = Self::discount_amount(discount, subtotal);
        (amount, subtotal - amount)
    }

    /// Catalog-side checks a code must pass before it reaches the
    /// calculator.
    pub fn check_redeemable(discount: &Discount) -> Result<(), DiscountError> {
        if !discount.active {
            return Err(DiscountError::Inactive);
        }
        let now = DateTime::now();
        if let Some(from) = discount.valid_from {
            if now < from {
                return Err(DiscountError::OutOfWindow);
            }
        }
        if let Some(until) = discount.valid_until {
            if now > until {
                return Err(DiscountError::OutOfWindow);
            }
        }
        if let Some(limit) = discount.usage_limit {
            if discount.times_used.unwrap_or(0) >= limit {
                return Err(DiscountError::Exhausted);
            }
        }
        Ok(())
    }
}

/// Lookup seam so the orchestrator can be exercised against an in-memory
/// catalog in tests.
pub trait DiscountLookup {
    async fn find_valid(&self, code: &str) -> Result<Discount, DiscountError>;
}

pub struct MongoDiscountCatalog {
    client: Arc<Client>,
}

impl MongoDiscountCatalog {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn collection(&self) -> mongodb::Collection<Discount> {
        self.client.database("Catalog").collection("Discounts")
    }
}

impl DiscountLookup for MongoDiscountCatalog {
    async fn find_valid(&self, code: &str) -> Result<Discount, DiscountError> {
        let found = self.collection().find_one(doc! { "code": code }).await?;
        let discount = found.ok_or(DiscountError::NotFound)?;
        DiscountService::check_redeemable(&discount)?;
        Ok(discount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discount(kind: DiscountKind, value: f64) -> Discount {
        Discount {
            id: None,
            code: "TEST".to_string(),
            kind,
            value,
            active: true,
            valid_from: None,
            valid_until: None,
            usage_limit: None,
            times_used: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_percentage_discount() {
        let d = discount(DiscountKind::Percentage, 10.0);
        assert_eq!(DiscountService::discount_amount(Some(&d), 1_000_000), 100_000);
        assert_eq!(
            DiscountService::final_total(1_000_000, Some(&d)),
            (100_000, 900_000)
        );
    }

    #[test]
    fn test_percentage_rounds_half_away_from_zero() {
        // 0.5% of 101 = 0.505 -> 1
        let d = discount(DiscountKind::Percentage, 0.5);
        assert_eq!(DiscountService::discount_amount(Some(&d), 101), 1);
    }

    #[test]
    fn test_percentage_never_exceeds_subtotal() {
        let d = discount(DiscountKind::Percentage, 100.0);
        assert_eq!(DiscountService::discount_amount(Some(&d), 30_000), 30_000);
    }

    #[test]
    fn test_fixed_amount_is_capped_at_subtotal() {
        let d = discount(DiscountKind::FixedAmount, 50_000.0);
        assert_eq!(DiscountService::discount_amount(Some(&d), 30_000), 30_000);
        assert_eq!(DiscountService::final_total(30_000, Some(&d)), (30_000, 0));
    }

    #[test]
    fn test_fixed_amount_below_subtotal() {
        let d = discount(DiscountKind::FixedAmount, 50_000.0);
        assert_eq!(DiscountService::discount_amount(Some(&d), 200_000), 50_000);
    }

    #[test]
    fn test_no_discount_is_zero() {
        assert_eq!(DiscountService::discount_amount(None, 1_000_000), 0);
        assert_eq!(DiscountService::final_total(500, None), (0, 500));
    }

    #[test]
    fn test_inactive_code_is_rejected() {
        let mut d = discount(DiscountKind::Percentage, 10.0);
        d.active = false;
        assert!(matches!(
            DiscountService::check_redeemable(&d),
            Err(DiscountError::Inactive)
        ));
    }

    #[test]
    fn test_exhausted_code_is_rejected() {
        let mut d = discount(DiscountKind::Percentage, 10.0);
        d.usage_limit = Some(5);
        d.times_used = Some(5);
        assert!(matches!(
            DiscountService::check_redeemable(&d),
            Err(DiscountError::Exhausted)
        ));
    }

    #[test]
    fn test_expired_code_is_rejected() {
        let mut d = discount(DiscountKind::Percentage, 10.0);
        d.valid_until = Some(DateTime::from_millis(0));
        assert!(matches!(
            DiscountService::check_redeemable(&d),
            Err(DiscountError::OutOfWindow)
        ));
    }
}
