use crate::models::participant::{ParticipantRole, RoleCounts};

/// One priced row of a booking: `quantity` travellers of `role` at
/// `unit_price` VND each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub role: ParticipantRole,
    pub unit_price: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOnCharge {
    pub name: String,
    pub fee: i64,
    pub quantity: u32,
}

/// Per-role fare ratios applied to an item's base (adult) fare. A domain
/// policy, configured per product kind rather than hard-coded in the
/// calculator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FarePolicy {
    pub child_ratio: f64,
    pub infant_ratio: f64,
    pub senior_ratio: f64,
}

impl Default for FarePolicy {
    fn default() -> Self {
        Self {
            child_ratio: 1.0,
            infant_ratio: 1.0,
            senior_ratio: 1.0,
        }
    }
}

impl FarePolicy {
    /// The flight policy: children pay 90% of the adult fare, infants 10%.
    pub fn flight() -> Self {
        Self {
            child_ratio: 0.9,
            infant_ratio: 0.1,
            senior_ratio: 1.0,
        }
    }

    pub fn role_fare(&self, base_fare: i64, role: ParticipantRole) -> i64 {
        let ratio = match role {
            ParticipantRole::Adult => 1.0,
            ParticipantRole::Child => self.child_ratio,
            ParticipantRole::Infant => self.infant_ratio,
            ParticipantRole::Senior => self.senior_ratio,
        };
        (base_fare as f64 * ratio).round() as i64
    }
}

pub struct PricingService;

impl PricingService {
    /// Subtotal before discount. Zero-quantity rows contribute zero.
    pub fn subtotal(items: &[LineItem], add_ons: &[AddOnCharge]) -> i64 {
        let fares: i64 = items
            .iter()
            .map(|item| item.unit_price * item.quantity as i64)
            .sum();
        let extras: i64 = add_ons
            .iter()
            .map(|add_on| add_on.fee * add_on.quantity as i64)
            .sum();
        fares + extras
    }

    /// Line items for products priced per role (tours).
    pub fn line_items_from_role_prices(
        adult: i64,
        child: i64,
        infant: i64,
        senior: Option<i64>,
        counts: &RoleCounts,
    ) -> Vec<LineItem> {
        let rows = [
            (ParticipantRole::Adult, adult, counts.adults),
            (ParticipantRole::Child, child, counts.children),
            (ParticipantRole::Infant, infant, counts.infants),
            (ParticipantRole::Senior, senior.unwrap_or(adult), counts.seniors),
        ];
        rows.into_iter()
            .filter(|(_, _, quantity)| *quantity > 0)
            .map(|(role, unit_price, quantity)| LineItem {
                role,
                unit_price,
                quantity,
            })
            .collect()
    }

    /// Line items for products with a single base fare and a fare policy
    /// (flights).
    pub fn line_items_from_base_fare(
        base_fare: i64,
        policy: &FarePolicy,
        counts: &RoleCounts,
    ) -> Vec<LineItem> {
        let rows = [
            (ParticipantRole::Adult, counts.adults),
            (ParticipantRole::Child, counts.children),
            (ParticipantRole::Infant, counts.infants),
            (ParticipantRole::Senior, counts.seniors),
        ];
        rows.into_iter()
            .filter(|(_, quantity)| *quantity > 0)
            .map(|(role, quantity)| LineItem {
                role,
                unit_price: policy.role_fare(base_fare, role),
                quantity,
            })
            .collect()
    }

    /// Line items for products with one flat per-person price (activities).
    pub fn line_items_per_person(price_per_person: i64, counts: &RoleCounts) -> Vec<LineItem> {
        Self::line_items_from_role_prices(
            price_per_person,
            price_per_person,
            price_per_person,
            Some(price_per_person),
            counts,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(adults: u32, children: u32, infants: u32) -> RoleCounts {
        RoleCounts {
            adults,
            children,
            infants,
            seniors: 0,
        }
    }

    #[test]
    fn test_subtotal_sums_quantity_times_price() {
        let items = vec![
            LineItem {
                role: ParticipantRole::Adult,
                unit_price: 500_000,
                quantity: 2,
            },
            LineItem {
                role: ParticipantRole::Child,
                unit_price: 300_000,
                quantity: 1,
            },
        ];
        assert_eq!(PricingService::subtotal(&items, &[]), 1_300_000);
    }

    #[test]
    fn test_subtotal_includes_add_ons() {
        let items = vec![LineItem {
            role: ParticipantRole::Adult,
            unit_price: 500_000,
            quantity: 1,
        }];
        let add_ons = vec![AddOnCharge {
            name: "Airport pickup".to_string(),
            fee: 150_000,
            quantity: 2,
        }];
        assert_eq!(PricingService::subtotal(&items, &add_ons), 800_000);
    }

    #[test]
    fn test_zero_quantity_roles_contribute_zero() {
        let items = vec![
            LineItem {
                role: ParticipantRole::Adult,
                unit_price: 500_000,
                quantity: 1,
            },
            LineItem {
                role: ParticipantRole::Infant,
                unit_price: 50_000,
                quantity: 0,
            },
        ];
        assert_eq!(PricingService::subtotal(&items, &[]), 500_000);
        assert_eq!(PricingService::subtotal(&[], &[]), 0);
    }

    #[test]
    fn test_pricing_is_pure() {
        let items = vec![LineItem {
            role: ParticipantRole::Adult,
            unit_price: 123_456,
            quantity: 3,
        }];
        let first = PricingService::subtotal(&items, &[]);
        let second = PricingService::subtotal(&items, &[]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_flight_fare_policy_ratios() {
        let policy = FarePolicy::flight();
        assert_eq!(policy.role_fare(1_000_000, ParticipantRole::Adult), 1_000_000);
        assert_eq!(policy.role_fare(1_000_000, ParticipantRole::Child), 900_000);
        assert_eq!(policy.role_fare(1_000_000, ParticipantRole::Infant), 100_000);
    }

    #[test]
    fn test_base_fare_line_items_skip_empty_roles() {
        let items = PricingService::line_items_from_base_fare(
            1_000_000,
            &FarePolicy::flight(),
            &counts(2, 1, 0),
        );
        assert_eq!(items.len(), 2);
        assert_eq!(
            PricingService::subtotal(&items, &[]),
            2 * 1_000_000 + 900_000
        );
    }

    #[test]
    fn test_role_price_line_items() {
        let items =
            PricingService::line_items_from_role_prices(400_000, 300_000, 0, None, &counts(1, 2, 1));
        assert_eq!(PricingService::subtotal(&items, &[]), 400_000 + 600_000);
    }
}
