//! # Derived Reads
//!
//! Counters, filters and per-user summaries computed from the collections on
//! demand. Nothing here is stored.

use std::str::FromStr;

use chrono::{Months, NaiveDate};
use serde::Serialize;

use crate::error::AppError;
use crate::models::{Donation, DonationStatus, Request, RequestStatus};

/// Dashboard estimate of people fed per completed donation.
pub const PEOPLE_PER_COMPLETED_DONATION: u32 = 15;

/// Look-back window applied to `created_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRange {
    #[default]
    All,
    OneMonth,
    ThreeMonths,
    SixMonths,
}

impl TimeRange {
    /// Earliest creation date still inside the window, or `None` for `All`.
    pub fn cutoff(self, today: NaiveDate) -> Option<NaiveDate> {
        let months = match self {
            Self::All => return None,
            Self::OneMonth => 1,
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
        };
        Some(today.checked_sub_months(Months::new(months)).unwrap_or(NaiveDate::MIN))
    }

    pub fn contains(self, created_at: NaiveDate, today: NaiveDate) -> bool {
        self.cutoff(today).map_or(true, |cutoff| created_at >= cutoff)
    }
}

impl FromStr for TimeRange {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "1month" | "1m" => Ok(Self::OneMonth),
            "3months" | "3m" => Ok(Self::ThreeMonths),
            "6months" | "6m" => Ok(Self::SixMonths),
            other => Err(AppError::validation(format!("unknown time range '{other}'"))),
        }
    }
}

/// The six platform counters shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_donations: usize,
    /// Donations still `available`.
    pub active_donations: usize,
    pub completed_donations: usize,
    pub total_requests: usize,
    pub pending_requests: usize,
    pub completed_requests: usize,
}

impl StoreStats {
    pub fn compute<'a>(
        donations: impl IntoIterator<Item = &'a Donation>,
        requests: impl IntoIterator<Item = &'a Request>,
    ) -> Self {
        let mut stats = Self::default();
        for donation in donations {
            stats.total_donations += 1;
            match donation.status {
                DonationStatus::Available => stats.active_donations += 1,
                DonationStatus::Completed => stats.completed_donations += 1,
                DonationStatus::Claimed => {}
            }
        }
        for request in requests {
            stats.total_requests += 1;
            match request.status {
                RequestStatus::Pending => stats.pending_requests += 1,
                RequestStatus::Completed => stats.completed_requests += 1,
                RequestStatus::Approved => {}
            }
        }
        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonationFilter {
    pub range: TimeRange,
    pub status: Option<DonationStatus>,
    pub donor_id: Option<String>,
    /// Case-insensitive match on food type, donor name or location.
    pub search: Option<String>,
}

impl DonationFilter {
    pub fn matches(&self, donation: &Donation, today: NaiveDate) -> bool {
        if !self.range.contains(donation.created_at, today) {
            return false;
        }
        if self.status.is_some_and(|status| status != donation.status) {
            return false;
        }
        if self.donor_id.as_deref().is_some_and(|id| id != donation.donor_id) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                [&donation.food_type, &donation.donor_name, &donation.location]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFilter {
    pub range: TimeRange,
    pub status: Option<RequestStatus>,
    pub recipient_id: Option<String>,
}

impl RequestFilter {
    pub fn matches(&self, request: &Request, today: NaiveDate) -> bool {
        self.range.contains(request.created_at, today)
            && self.status.map_or(true, |status| status == request.status)
            && self
                .recipient_id
                .as_deref()
                .map_or(true, |id| id == request.recipient_id)
    }
}

/// Admin dashboard metrics beyond the raw counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformMetrics {
    /// Completed donations as a rounded percentage of all donations; 0 when
    /// there are none.
    pub success_rate: u32,
}

impl PlatformMetrics {
    pub fn compute<'a>(donations: impl IntoIterator<Item = &'a Donation>) -> Self {
        let (total, completed) = donations.into_iter().fold((0u64, 0u64), |(t, c), d| {
            (t + 1, c + u64::from(d.status == DonationStatus::Completed))
        });
        if total == 0 {
            return Self::default();
        }
        // Half rounds up.
        let rate = (200 * completed + total) / (2 * total);
        Self {
            success_rate: u32::try_from(rate).unwrap_or(100),
        }
    }
}

/// Donor dashboard summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorImpact {
    pub total_donations: usize,
    pub active_donations: usize,
    pub completed_donations: usize,
    pub people_helped: u32,
    /// Sum of completed quantities, regardless of unit.
    pub food_rescued: f64,
}

impl DonorImpact {
    pub fn compute<'a>(donations: impl IntoIterator<Item = &'a Donation>) -> Self {
        let mut impact = Self::default();
        for donation in donations {
            impact.total_donations += 1;
            match donation.status {
                DonationStatus::Available => impact.active_donations += 1,
                DonationStatus::Completed => {
                    impact.completed_donations += 1;
                    impact.people_helped += PEOPLE_PER_COMPLETED_DONATION;
                    impact.food_rescued += donation.quantity;
                }
                DonationStatus::Claimed => {}
            }
        }
        impact
    }
}

/// Recipient dashboard summary; totals cover completed requests only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientSummary {
    pub total_received: usize,
    pub pending_requests: usize,
    pub total_beneficiaries: u64,
    pub food_received: f64,
}

impl RecipientSummary {
    pub fn compute<'a>(requests: impl IntoIterator<Item = &'a Request>) -> Self {
        let mut summary = Self::default();
        for request in requests {
            match request.status {
                RequestStatus::Pending => summary.pending_requests += 1,
                RequestStatus::Completed => {
                    summary.total_received += 1;
                    summary.total_beneficiaries += u64::from(request.beneficiaries);
                    summary.food_received += request.quantity;
                }
                RequestStatus::Approved => {}
            }
        }
        summary
    }
}
