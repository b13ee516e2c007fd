//! # Domain Models
//!
//! These structs represent the core entities of the food rescue store.
//! Field names serialize in camelCase so the persisted document keeps the
//! layout dashboards already read (`foodType`, `claimedBy`, `activityLogs`...).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh id, unique within this process.
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "-{}"), Uuid::now_v7().simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Opaque donation identifier, immutable after creation.
    DonationId,
    "donation"
);
string_id!(
    /// Opaque request identifier, immutable after creation.
    RequestId,
    "request"
);
string_id!(LogId, "log");

/// Availability of a donation. Declaration order is lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    Available,
    Claimed,
    Completed,
}

/// Approval state of a request. Declaration order is lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Completed,
}

impl DonationStatus {
    pub const ALL: [Self; 3] = [Self::Available, Self::Claimed, Self::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Claimed => "claimed",
            Self::Completed => "completed",
        }
    }
}

impl RequestStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("unknown donation status '{s}'")))
    }
}

impl FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("unknown request status '{s}'")))
    }
}

/// An offer of surplus food listed by a donor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: DonationId,
    pub food_type: String,
    pub quantity: f64,
    /// Free text: "kg", "liters", "units"...
    pub unit: String,
    pub expiry_date: NaiveDate,
    pub location: String,
    pub description: String,
    pub status: DonationStatus,
    /// Name of the recipient organization holding the claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
    pub created_at: NaiveDate,
    pub donor_id: String,
    pub donor_name: String,
}

impl Donation {
    /// Checks the per-record invariants: a positive quantity and a claimant
    /// present exactly when the donation is no longer available.
    pub fn check_invariants(&self) -> Result<()> {
        check_quantity(self.quantity)?;
        match (self.status, self.claimed_by.as_deref()) {
            (DonationStatus::Available, None) => Ok(()),
            (DonationStatus::Available, Some(_)) => Err(AppError::validation(format!(
                "donation {} is available but has a claimant",
                self.id
            ))),
            (_, Some(claimant)) if !claimant.trim().is_empty() => Ok(()),
            _ => Err(AppError::validation(format!(
                "donation {} is {} without a claimant",
                self.id, self.status
            ))),
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == DonationStatus::Available
    }
}

/// A recipient's claim against a specific donation.
///
/// Food type, quantity, unit and donor are copies taken when the request was
/// created, not live links to the donation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: RequestId,
    /// May dangle once the donation is deleted.
    pub donation_id: DonationId,
    pub food_type: String,
    pub quantity: f64,
    pub unit: String,
    /// Donor display name.
    pub donor: String,
    pub pickup_date: NaiveDate,
    pub status: RequestStatus,
    pub beneficiaries: u32,
    pub created_at: NaiveDate,
    pub recipient_id: String,
    pub recipient_name: String,
}

impl Request {
    pub fn check_invariants(&self) -> Result<()> {
        check_beneficiaries(self.beneficiaries)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    DonationCreated,
    DonationClaimed,
    DonationCompleted,
    RequestCreated,
    RequestApproved,
    RequestCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Donor,
    Recipient,
    Admin,
    Analyst,
}

/// One line of the append-only audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: LogId,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub user_id: String,
    pub user_name: String,
    pub user_role: UserRole,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    /// Id of the donation or request the event is about.
    pub related_id: String,
}

/// The user an activity log entry is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    /// Administrative deletes are recorded under this fixed actor.
    pub fn administrator() -> Self {
        Self::new("admin", "Administrator", UserRole::Admin)
    }
}

pub(crate) fn check_quantity(quantity: f64) -> Result<()> {
    if quantity.is_finite() && quantity > 0.0 {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "quantity must be a positive number, got {quantity}"
        )))
    }
}

pub(crate) fn check_beneficiaries(beneficiaries: u32) -> Result<()> {
    if beneficiaries >= 1 {
        Ok(())
    } else {
        Err(AppError::validation("beneficiaries must be at least 1"))
    }
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(AppError::validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}
