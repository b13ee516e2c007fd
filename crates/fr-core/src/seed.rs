//! Fixed example dataset used when nothing usable has been persisted.

use chrono::NaiveDate;

use crate::models::{Donation, DonationId, DonationStatus, Request, RequestId, RequestStatus};
use crate::state::StoreState;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn donation(
    id: &str,
    food_type: &str,
    quantity: f64,
    unit: &str,
    expiry_date: NaiveDate,
    description: &str,
    status: DonationStatus,
    claimed_by: Option<&str>,
    created_at: NaiveDate,
    donor: (&str, &str),
) -> Donation {
    Donation {
        id: DonationId::from(id),
        food_type: food_type.to_string(),
        quantity,
        unit: unit.to_string(),
        expiry_date,
        location: donor.1.to_string(),
        description: description.to_string(),
        status,
        claimed_by: claimed_by.map(str::to_string),
        created_at,
        donor_id: donor.0.to_string(),
        donor_name: donor.1.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn request(
    id: &str,
    donation_id: &str,
    food: (&str, f64, &str),
    donor: &str,
    pickup_date: NaiveDate,
    beneficiaries: u32,
    created_at: NaiveDate,
    recipient: (&str, &str),
) -> Request {
    Request {
        id: RequestId::from(id),
        donation_id: DonationId::from(donation_id),
        food_type: food.0.to_string(),
        quantity: food.1,
        unit: food.2.to_string(),
        donor: donor.to_string(),
        pickup_date,
        status: RequestStatus::Completed,
        beneficiaries,
        created_at,
        recipient_id: recipient.0.to_string(),
        recipient_name: recipient.1.to_string(),
    }
}

/// Five donations, three completed requests and an empty activity log.
/// Always returns the same value.
pub fn initial_state() -> StoreState {
    use DonationStatus::*;

    let downtown = ("donor1", "Downtown Grocery Store");
    let city_food_bank = ("recipient1", "City Food Bank");

    StoreState {
        donations: vec![
            donation(
                "1",
                "Fresh Vegetables",
                50.0,
                "kg",
                date(2025, 11, 5),
                "Mixed seasonal vegetables in good condition",
                Completed,
                Some("City Food Bank"),
                date(2025, 10, 28),
                downtown,
            ),
            donation(
                "2",
                "Bread & Bakery Items",
                100.0,
                "units",
                date(2025, 11, 3),
                "Fresh bread and pastries from today",
                Claimed,
                Some("Community Kitchen"),
                date(2025, 11, 1),
                ("donor2", "Main Street Bakery"),
            ),
            donation(
                "3",
                "Dairy Products",
                25.0,
                "liters",
                date(2025, 10, 20),
                "Fresh milk and yogurt",
                Completed,
                Some("Local Shelter"),
                date(2025, 10, 10),
                downtown,
            ),
            donation(
                "4",
                "Canned Goods",
                80.0,
                "units",
                date(2026, 4, 15),
                "Mixed canned vegetables",
                Available,
                None,
                date(2025, 9, 15),
                ("donor3", "Westside Supermarket"),
            ),
            donation(
                "5",
                "Fruits",
                35.0,
                "kg",
                date(2025, 9, 5),
                "Assorted seasonal fruits",
                Completed,
                Some("City Food Bank"),
                date(2025, 9, 1),
                ("donor4", "Farm Fresh Market"),
            ),
        ],
        requests: vec![
            request(
                "r1",
                "1",
                ("Fresh Vegetables", 50.0, "kg"),
                "Downtown Grocery Store",
                date(2025, 11, 4),
                120,
                date(2025, 10, 28),
                city_food_bank,
            ),
            request(
                "r2",
                "2",
                ("Bakery Items", 80.0, "units"),
                "Local Bakery",
                date(2025, 10, 15),
                95,
                date(2025, 10, 10),
                ("recipient2", "Community Kitchen"),
            ),
            request(
                "r3",
                "3",
                ("Canned Soup", 120.0, "units"),
                "Metro Foods",
                date(2025, 9, 20),
                140,
                date(2025, 9, 15),
                city_food_bank,
            ),
        ],
        activity_logs: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_deterministic_and_valid() {
        let seed = initial_state();
        assert_eq!(seed, initial_state());
        assert_eq!(seed.donations.len(), 5);
        assert_eq!(seed.requests.len(), 3);
        assert!(seed.activity_logs.is_empty());
        seed.check_invariants().unwrap();
    }

    #[test]
    fn test_only_canned_goods_are_available() {
        let available: Vec<_> = initial_state()
            .donations
            .into_iter()
            .filter(Donation::is_available)
            .map(|d| d.food_type)
            .collect();
        assert_eq!(available, vec!["Canned Goods".to_string()]);
    }
}
