//! # Commands
//!
//! Inputs to the store's write operations. Updates are tagged variants, one
//! per allowed transition, instead of an arbitrary bag of fields.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{check_beneficiaries, check_quantity, require_text, DonationId};

/// Fields a donor supplies when listing a donation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
    pub donor_id: String,
    pub donor_name: String,
    pub food_type: String,
    pub quantity: f64,
    pub unit: String,
    pub expiry_date: NaiveDate,
    pub location: String,
    pub description: String,
}

impl NewDonation {
    pub fn validate(&self) -> Result<()> {
        require_text("donor id", &self.donor_id)?;
        require_text("donor name", &self.donor_name)?;
        require_text("food type", &self.food_type)?;
        check_quantity(self.quantity)?;
        require_text("unit", &self.unit)?;
        require_text("location", &self.location)?;
        require_text("description", &self.description)
    }
}

/// Fields a recipient supplies when requesting a donation. The food details
/// are copied from the donation by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRequest {
    pub recipient_id: String,
    pub recipient_name: String,
    pub donation_id: DonationId,
    pub pickup_date: NaiveDate,
    pub beneficiaries: u32,
}

impl NewRequest {
    pub fn validate(&self) -> Result<()> {
        require_text("recipient id", &self.recipient_id)?;
        require_text("recipient name", &self.recipient_name)?;
        check_beneficiaries(self.beneficiaries)
    }
}

/// Editable descriptive fields of a donation. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonationAmendment {
    pub food_type: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl DonationAmendment {
    pub fn validate(&self) -> Result<()> {
        if let Some(quantity) = self.quantity {
            check_quantity(quantity)?;
        }
        let texts = [
            ("food type", &self.food_type),
            ("unit", &self.unit),
            ("location", &self.location),
            ("description", &self.description),
        ];
        for (field, value) in texts {
            if let Some(value) = value {
                require_text(field, value)?;
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DonationUpdate {
    /// `available -> claimed`, recording the claimant.
    Claim { claimant: String },
    /// `claimed -> completed`. No-op when already completed.
    Complete,
    /// Edit descriptive fields without touching the status.
    Amend(DonationAmendment),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestUpdate {
    /// `pending -> approved`. No-op when already approved.
    Approve,
    /// `pending | approved -> completed`; also completes the linked donation.
    Complete,
    Reschedule { pickup_date: NaiveDate },
    SetBeneficiaries(u32),
}

/// Result of an update or delete addressed by id.
///
/// A missing id is not an error; callers that don't care can ignore this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    NotFound,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}
