//! Shared fixtures for the cross-crate scenario tests.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use fr_core::{DonationId, FixedClock, LifecycleStore, MemoryStorage, NewDonation, NewRequest};

pub struct Harness {
    pub store: LifecycleStore,
    pub storage: MemoryStorage,
    pub clock: Arc<FixedClock>,
}

/// Fresh store on seed data, memory storage and a clock fixed at
/// 2025-11-15T10:00:00Z.
pub fn harness() -> Harness {
    let storage = MemoryStorage::new();
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 11, 15, 10, 0, 0)
            .single()
            .unwrap_or_default(),
    ));
    let store = LifecycleStore::with_clock(Box::new(storage.clone()), Box::new(clock.clone()));
    Harness {
        store,
        storage,
        clock,
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

pub fn donation(food_type: &str, quantity: f64, unit: &str) -> NewDonation {
    NewDonation {
        donor_id: "donor5".into(),
        donor_name: "Riverside Co-op".into(),
        food_type: food_type.into(),
        quantity,
        unit: unit.into(),
        expiry_date: date(2026, 1, 10),
        location: "Riverside Co-op, bay 2".into(),
        description: "Surplus stock".into(),
    }
}

pub fn request(donation_id: &DonationId, beneficiaries: u32) -> NewRequest {
    NewRequest {
        recipient_id: "recipient3".into(),
        recipient_name: "Northside Shelter".into(),
        donation_id: donation_id.clone(),
        pickup_date: date(2025, 11, 18),
        beneficiaries,
    }
}
