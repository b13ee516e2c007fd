//! # Lifecycle Store
//!
//! Sole owner and mutator of the donations, requests and activity log.
//!
//! Every write follows the same order: validate, mutate in memory, then
//! persist the whole state once. A failed persist is returned to the caller
//! but the mutation stays applied, so reads in the same session still see it.

use tracing::{debug, info, warn};

use crate::activity;
use crate::commands::{DonationUpdate, NewDonation, NewRequest, Outcome, RequestUpdate};
use crate::error::{AppError, Result};
use crate::models::{
    check_beneficiaries, require_text, ActivityKind, ActivityLogEntry, Actor, Donation,
    DonationId, DonationStatus, Request, RequestId, RequestStatus, UserRole,
};
use crate::seed;
use crate::state::StoreState;
use crate::stats::{
    DonationFilter, DonorImpact, PlatformMetrics, RecipientSummary, RequestFilter, StoreStats,
    TimeRange,
};
use crate::traits::{Clock, StateStorage, SystemClock};

/// Where the state in memory came from when the store was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitSource {
    Storage,
    Seed,
}

pub struct LifecycleStore {
    state: StoreState,
    storage: Box<dyn StateStorage>,
    clock: Box<dyn Clock>,
    init_source: InitSource,
    unsaved: bool,
}

impl LifecycleStore {
    /// Opens the store on the system clock. See [`LifecycleStore::with_clock`].
    pub fn open(storage: Box<dyn StateStorage>) -> Self {
        Self::with_clock(storage, Box::new(SystemClock))
    }

    /// Loads persisted state, falling back to the seed dataset when nothing
    /// was saved or the saved document is unreadable. Never fails.
    pub fn with_clock(storage: Box<dyn StateStorage>, clock: Box<dyn Clock>) -> Self {
        let loaded = match storage.load() {
            Ok(Some(text)) => match StoreState::from_json(&text) {
                Ok(state) => Some(state),
                Err(err) => {
                    warn!(error = %err, "persisted state is unusable, using seed data");
                    None
                }
            },
            Ok(None) => {
                info!("no persisted state, using seed data");
                None
            }
            Err(err) => {
                warn!(error = %err, "failed to read persisted state, using seed data");
                None
            }
        };

        let (state, init_source) = match loaded {
            Some(state) => {
                debug!(
                    donations = state.donations.len(),
                    requests = state.requests.len(),
                    activity_logs = state.activity_logs.len(),
                    "loaded persisted state"
                );
                (state, InitSource::Storage)
            }
            None => (seed::initial_state(), InitSource::Seed),
        };

        Self {
            state,
            storage,
            clock,
            init_source,
            unsaved: false,
        }
    }

    pub fn init_source(&self) -> InitSource {
        self.init_source
    }

    /// True when the last persist attempt failed.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Copy of the whole state, as it would be persisted.
    pub fn snapshot(&self) -> StoreState {
        self.state.clone()
    }

    // Donations

    pub fn list_donations(&self) -> Vec<Donation> {
        self.state.donations.clone()
    }

    pub fn donations_by_donor(&self, donor_id: &str) -> Vec<Donation> {
        self.collect_donations(|d| d.donor_id == donor_id)
    }

    pub fn available_donations(&self) -> Vec<Donation> {
        self.collect_donations(Donation::is_available)
    }

    pub fn find_donation(&self, id: &DonationId) -> Option<Donation> {
        self.state.donations.iter().find(|d| &d.id == id).cloned()
    }

    pub fn search_donations(&self, filter: &DonationFilter) -> Vec<Donation> {
        let today = self.clock.today();
        self.collect_donations(|d| filter.matches(d, today))
    }

    /// Lists a new donation as `available`, newest first.
    pub fn create_donation(&mut self, new: NewDonation) -> Result<Donation> {
        new.validate()?;

        let donation = Donation {
            id: self.fresh_donation_id(),
            food_type: new.food_type,
            quantity: new.quantity,
            unit: new.unit,
            expiry_date: new.expiry_date,
            location: new.location,
            description: new.description,
            status: DonationStatus::Available,
            claimed_by: None,
            created_at: self.clock.today(),
            donor_id: new.donor_id,
            donor_name: new.donor_name,
        };

        self.state.donations.insert(0, donation.clone());
        let donor = Actor::new(&donation.donor_id, &donation.donor_name, UserRole::Donor);
        self.append_log(
            ActivityKind::DonationCreated,
            &donor,
            format!(
                "Created donation: {} ({} {})",
                donation.food_type, donation.quantity, donation.unit
            ),
            donation.id.as_str(),
        );
        info!(donation_id = %donation.id, donor_id = %donation.donor_id, "donation created");

        self.persist()?;
        Ok(donation)
    }

    /// Applies one transition or amendment. Does not write to the activity log.
    pub fn update_donation(&mut self, id: &DonationId, update: DonationUpdate) -> Result<Outcome> {
        let Some(index) = self.donation_index(id) else {
            warn!(donation_id = %id, "update ignored, donation not found");
            return Ok(Outcome::NotFound);
        };
        if matches!(&update, DonationUpdate::Amend(amendment) if amendment.is_empty()) {
            debug!(donation_id = %id, "empty amendment, nothing to persist");
            return Ok(Outcome::Applied);
        }

        let next = next_donation(&self.state.donations[index], update)?;
        info!(donation_id = %id, status = %next.status, "donation updated");
        self.state.donations[index] = next;

        self.persist()?;
        Ok(Outcome::Applied)
    }

    /// Administrative hard delete. Linked requests are left untouched.
    pub fn delete_donation(&mut self, id: &DonationId) -> Result<Outcome> {
        let Some(donation) = self.find_donation(id) else {
            warn!(donation_id = %id, "delete ignored, donation not found");
            return Ok(Outcome::NotFound);
        };

        self.append_log(
            ActivityKind::DonationCompleted,
            &Actor::administrator(),
            format!(
                "Deleted donation: {} ({} {})",
                donation.food_type, donation.quantity, donation.unit
            ),
            id.as_str(),
        );
        self.state.donations.retain(|d| &d.id != id);
        info!(donation_id = %id, "donation deleted");

        self.persist()?;
        Ok(Outcome::Applied)
    }

    // Requests

    pub fn list_requests(&self) -> Vec<Request> {
        self.state.requests.clone()
    }

    pub fn requests_by_recipient(&self, recipient_id: &str) -> Vec<Request> {
        self.collect_requests(|r| r.recipient_id == recipient_id)
    }

    pub fn find_request(&self, id: &RequestId) -> Option<Request> {
        self.state.requests.iter().find(|r| &r.id == id).cloned()
    }

    pub fn search_requests(&self, filter: &RequestFilter) -> Vec<Request> {
        let today = self.clock.today();
        self.collect_requests(|r| filter.matches(r, today))
    }

    /// Claims an available donation on behalf of a recipient.
    ///
    /// The request copies the donation's food details and donor name; the
    /// donation moves to `claimed` with the recipient as claimant. Only one log
    /// entry (`request_created`) is written and the state is persisted once.
    pub fn create_request(&mut self, new: NewRequest) -> Result<Request> {
        new.validate()?;

        let index = self.donation_index(&new.donation_id).ok_or_else(|| {
            AppError::validation(format!("donation {} does not exist", new.donation_id))
        })?;
        let donation = &self.state.donations[index];
        let claimed = next_donation(
            donation,
            DonationUpdate::Claim {
                claimant: new.recipient_name.clone(),
            },
        )?;

        let request = Request {
            id: self.fresh_request_id(),
            donation_id: new.donation_id,
            food_type: donation.food_type.clone(),
            quantity: donation.quantity,
            unit: donation.unit.clone(),
            donor: donation.donor_name.clone(),
            pickup_date: new.pickup_date,
            status: RequestStatus::Pending,
            beneficiaries: new.beneficiaries,
            created_at: self.clock.today(),
            recipient_id: new.recipient_id,
            recipient_name: new.recipient_name,
        };

        self.state.requests.insert(0, request.clone());
        self.state.donations[index] = claimed;
        self.append_log(
            ActivityKind::RequestCreated,
            &recipient_of(&request),
            format!(
                "Requested: {} ({} {}) from {}",
                request.food_type, request.quantity, request.unit, request.donor
            ),
            request.id.as_str(),
        );
        info!(
            request_id = %request.id,
            donation_id = %request.donation_id,
            recipient_id = %request.recipient_id,
            "request created, donation claimed"
        );

        self.persist()?;
        Ok(request)
    }

    /// Applies one request transition. Completing a request also completes
    /// its donation, when that donation still exists.
    pub fn update_request(&mut self, id: &RequestId, update: RequestUpdate) -> Result<Outcome> {
        let Some(index) = self.request_index(id) else {
            warn!(request_id = %id, "update ignored, request not found");
            return Ok(Outcome::NotFound);
        };

        let current = &self.state.requests[index];
        let (next, event) = next_request(current, update)?;
        let linked = if event == Some(ActivityKind::RequestCompleted) {
            self.donation_index(&next.donation_id).map(|i| {
                let donation = complete_for(&self.state.donations[i], &next.recipient_name);
                (i, donation)
            })
        } else {
            None
        };

        if let Some((i, donation)) = linked {
            debug!(donation_id = %donation.id, "completing linked donation");
            self.state.donations[i] = donation;
        }
        if let Some(kind) = event {
            self.append_log(kind, &recipient_of(&next), describe(kind, &next), next.id.as_str());
        }
        info!(request_id = %id, status = %next.status, "request updated");
        self.state.requests[index] = next;

        self.persist()?;
        Ok(Outcome::Applied)
    }

    /// Administrative hard delete. The linked donation keeps its status.
    pub fn delete_request(&mut self, id: &RequestId) -> Result<Outcome> {
        let Some(request) = self.find_request(id) else {
            warn!(request_id = %id, "delete ignored, request not found");
            return Ok(Outcome::NotFound);
        };

        self.append_log(
            ActivityKind::RequestCompleted,
            &Actor::administrator(),
            format!("Deleted request: {} from {}", request.food_type, request.donor),
            id.as_str(),
        );
        self.state.requests.retain(|r| &r.id != id);
        info!(request_id = %id, "request deleted");

        self.persist()?;
        Ok(Outcome::Applied)
    }

    // Activity log and derived reads

    /// All entries, most recent first.
    pub fn activity_log(&self) -> Vec<ActivityLogEntry> {
        activity::newest_first(&self.state.activity_logs)
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats::compute(&self.state.donations, &self.state.requests)
    }

    /// The six counters restricted to records created inside `range`.
    pub fn stats_within(&self, range: TimeRange) -> StoreStats {
        let today = self.clock.today();
        StoreStats::compute(
            self.state
                .donations
                .iter()
                .filter(|d| range.contains(d.created_at, today)),
            self.state
                .requests
                .iter()
                .filter(|r| range.contains(r.created_at, today)),
        )
    }

    /// Success rate over donations created inside `range`.
    pub fn platform_metrics(&self, range: TimeRange) -> PlatformMetrics {
        let today = self.clock.today();
        PlatformMetrics::compute(
            self.state
                .donations
                .iter()
                .filter(|d| range.contains(d.created_at, today)),
        )
    }

    pub fn donor_impact(&self, donor_id: &str, range: TimeRange) -> DonorImpact {
        let today = self.clock.today();
        DonorImpact::compute(
            self.state
                .donations
                .iter()
                .filter(|d| d.donor_id == donor_id && range.contains(d.created_at, today)),
        )
    }

    pub fn recipient_summary(&self, recipient_id: &str, range: TimeRange) -> RecipientSummary {
        let filter = RequestFilter {
            range,
            status: None,
            recipient_id: Some(recipient_id.to_string()),
        };
        let today = self.clock.today();
        RecipientSummary::compute(
            self.state
                .requests
                .iter()
                .filter(|r| filter.matches(r, today)),
        )
    }

    // Maintenance

    /// Replaces everything, activity log included, with the seed dataset.
    pub fn reset_to_seed(&mut self) -> Result<()> {
        self.state = seed::initial_state();
        info!("store reset to seed data");
        self.persist()
    }

    /// Retries persisting the current state after an earlier failure.
    pub fn flush(&mut self) -> Result<()> {
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        let result = self
            .state
            .to_json()
            .and_then(|json| self.storage.save(&json));
        match &result {
            Ok(()) => self.unsaved = false,
            Err(err) => {
                self.unsaved = true;
                warn!(error = %err, "failed to persist state, changes kept in memory");
            }
        }
        result
    }

    fn append_log(&mut self, kind: ActivityKind, actor: &Actor, description: String, related_id: &str) {
        let entry = activity::entry(kind, actor, description, related_id, self.clock.now());
        self.state.activity_logs.push(entry);
    }

    fn collect_donations(&self, keep: impl Fn(&Donation) -> bool) -> Vec<Donation> {
        self.state
            .donations
            .iter()
            .filter(|d| keep(*d))
            .cloned()
            .collect()
    }

    fn collect_requests(&self, keep: impl Fn(&Request) -> bool) -> Vec<Request> {
        self.state
            .requests
            .iter()
            .filter(|r| keep(*r))
            .cloned()
            .collect()
    }

    fn donation_index(&self, id: &DonationId) -> Option<usize> {
        self.state.donations.iter().position(|d| &d.id == id)
    }

    fn request_index(&self, id: &RequestId) -> Option<usize> {
        self.state.requests.iter().position(|r| &r.id == id)
    }

    fn fresh_donation_id(&self) -> DonationId {
        loop {
            let id = DonationId::generate();
            if self.donation_index(&id).is_none() {
                return id;
            }
        }
    }

    fn fresh_request_id(&self) -> RequestId {
        loop {
            let id = RequestId::generate();
            if self.request_index(&id).is_none() {
                return id;
            }
        }
    }
}

/// The donation after `update`, or a validation error if the transition is
/// not allowed. `current` is never modified.
fn next_donation(current: &Donation, update: DonationUpdate) -> Result<Donation> {
    let mut next = current.clone();
    match update {
        DonationUpdate::Claim { claimant } => {
            require_text("claimant", &claimant)?;
            if current.status != DonationStatus::Available {
                return Err(AppError::validation(format!(
                    "donation {} is {}, only available donations can be claimed",
                    current.id, current.status
                )));
            }
            next.status = DonationStatus::Claimed;
            next.claimed_by = Some(claimant);
        }
        DonationUpdate::Complete => match current.status {
            DonationStatus::Available => {
                return Err(AppError::validation(format!(
                    "donation {} has not been claimed",
                    current.id
                )));
            }
            DonationStatus::Claimed => next.status = DonationStatus::Completed,
            DonationStatus::Completed => {}
        },
        DonationUpdate::Amend(amendment) => {
            amendment.validate()?;
            if let Some(food_type) = amendment.food_type {
                next.food_type = food_type;
            }
            if let Some(quantity) = amendment.quantity {
                next.quantity = quantity;
            }
            if let Some(unit) = amendment.unit {
                next.unit = unit;
            }
            if let Some(expiry_date) = amendment.expiry_date {
                next.expiry_date = expiry_date;
            }
            if let Some(location) = amendment.location {
                next.location = location;
            }
            if let Some(description) = amendment.description {
                next.description = description;
            }
        }
    }
    Ok(next)
}

/// Completion of a donation driven by its request. A donation that somehow
/// was never claimed takes the recipient as claimant so the claimant
/// invariant still holds.
fn complete_for(donation: &Donation, recipient_name: &str) -> Donation {
    let mut next = donation.clone();
    if next.claimed_by.is_none() {
        next.claimed_by = Some(recipient_name.to_string());
    }
    next.status = DonationStatus::Completed;
    next
}

/// The request after `update` plus the log event it produces, if any.
fn next_request(current: &Request, update: RequestUpdate) -> Result<(Request, Option<ActivityKind>)> {
    let mut next = current.clone();
    let completed = current.status == RequestStatus::Completed;
    let event = match update {
        RequestUpdate::Approve => match current.status {
            RequestStatus::Pending => {
                next.status = RequestStatus::Approved;
                Some(ActivityKind::RequestApproved)
            }
            RequestStatus::Approved => None,
            RequestStatus::Completed => {
                return Err(AppError::validation(format!(
                    "request {} is already completed",
                    current.id
                )));
            }
        },
        RequestUpdate::Complete if completed => None,
        RequestUpdate::Complete => {
            next.status = RequestStatus::Completed;
            Some(ActivityKind::RequestCompleted)
        }
        RequestUpdate::Reschedule { .. } | RequestUpdate::SetBeneficiaries(_) if completed => {
            return Err(AppError::validation(format!(
                "request {} is completed and can no longer change",
                current.id
            )));
        }
        RequestUpdate::Reschedule { pickup_date } => {
            next.pickup_date = pickup_date;
            None
        }
        RequestUpdate::SetBeneficiaries(beneficiaries) => {
            check_beneficiaries(beneficiaries)?;
            next.beneficiaries = beneficiaries;
            None
        }
    };
    Ok((next, event))
}

fn recipient_of(request: &Request) -> Actor {
    Actor::new(&request.recipient_id, &request.recipient_name, UserRole::Recipient)
}

fn describe(kind: ActivityKind, request: &Request) -> String {
    match kind {
        ActivityKind::RequestApproved => {
            format!("Request approved: {} from {}", request.food_type, request.donor)
        }
        _ => format!(
            "Picked up: {} ({} {}) from {}",
            request.food_type, request.quantity, request.unit, request.donor
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::DonationAmendment;
    use crate::storage::MemoryStorage;
    use crate::traits::{FixedClock, MockStateStorage};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use std::sync::Arc;

    struct Fixture {
        store: LifecycleStore,
        storage: MemoryStorage,
        clock: Arc<FixedClock>,
    }

    fn fixture() -> Fixture {
        let storage = MemoryStorage::new();
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 11, 15, 10, 0, 0).unwrap(),
        ));
        let store = LifecycleStore::with_clock(Box::new(storage.clone()), Box::new(clock.clone()));
        Fixture { store, storage, clock }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rice() -> NewDonation {
        NewDonation {
            donor_id: "donor9".into(),
            donor_name: "Harbor Market".into(),
            food_type: "Rice".into(),
            quantity: 20.0,
            unit: "kg".into(),
            expiry_date: date(2026, 2, 1),
            location: "Harbor Market back door".into(),
            description: "Sealed sacks".into(),
        }
    }

    fn request_for(donation_id: &DonationId, beneficiaries: u32) -> NewRequest {
        NewRequest {
            recipient_id: "recipient7".into(),
            recipient_name: "Eastside Pantry".into(),
            donation_id: donation_id.clone(),
            pickup_date: date(2025, 11, 17),
            beneficiaries,
        }
    }

    #[test]
    fn test_opens_on_seed_when_storage_is_empty() {
        let f = fixture();
        assert_eq!(f.store.init_source(), InitSource::Seed);
        assert_eq!(f.store.snapshot(), seed::initial_state());
        // Seed data is not written until the first mutation.
        assert!(f.storage.contents().is_none());
    }

    #[test]
    fn test_opens_on_seed_when_document_is_corrupt() {
        let storage = MemoryStorage::with_contents("{\"donations\": [");
        let store = LifecycleStore::open(Box::new(storage));
        assert_eq!(store.init_source(), InitSource::Seed);
        assert_eq!(store.list_donations().len(), 5);
    }

    #[test]
    fn test_opens_on_seed_when_storage_read_fails() {
        let mut mock = MockStateStorage::new();
        mock.expect_load()
            .returning(|| Err(AppError::Io(std::io::Error::other("permission denied"))));
        let store = LifecycleStore::open(Box::new(mock));
        assert_eq!(store.init_source(), InitSource::Seed);
    }

    #[test]
    fn test_create_donation_is_available_and_logged() {
        let mut f = fixture();
        let before: Vec<_> = f.store.list_donations().into_iter().map(|d| d.id).collect();

        let donation = f.store.create_donation(rice()).unwrap();
        assert_eq!(donation.status, DonationStatus::Available);
        assert_eq!(donation.claimed_by, None);
        assert_eq!(donation.created_at, date(2025, 11, 15));
        assert!(!before.contains(&donation.id));
        assert_eq!(f.store.list_donations()[0], donation);

        let log = f.store.activity_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].kind, ActivityKind::DonationCreated);
        assert_eq!(log[0].user_role, UserRole::Donor);
        assert_eq!(log[0].description, "Created donation: Rice (20 kg)");
        assert_eq!(log[0].related_id, donation.id.as_str());
    }

    #[test]
    fn test_create_donation_with_zero_quantity_changes_nothing() {
        let mut f = fixture();
        let before = f.store.snapshot();

        let err = f
            .store
            .create_donation(NewDonation { quantity: 0.0, ..rice() })
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(f.store.snapshot(), before);
        assert!(f.storage.contents().is_none());
    }

    #[test]
    fn test_every_write_persists_full_state() {
        let mut f = fixture();
        let donation = f.store.create_donation(rice()).unwrap();
        let saved = StoreState::from_json(&f.storage.contents().unwrap()).unwrap();
        assert_eq!(saved, f.store.snapshot());

        f.store.create_request(request_for(&donation.id, 10)).unwrap();
        let saved = StoreState::from_json(&f.storage.contents().unwrap()).unwrap();
        assert_eq!(saved, f.store.snapshot());
    }

    #[test]
    fn test_request_claims_donation_with_single_log_entry() {
        let mut f = fixture();
        let donation = f.store.create_donation(rice()).unwrap();
        let logs_before = f.store.activity_log().len();

        let request = f.store.create_request(request_for(&donation.id, 10)).unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.food_type, "Rice");
        assert_eq!(request.quantity, 20.0);
        assert_eq!(request.donor, "Harbor Market");

        let claimed = f.store.find_donation(&donation.id).unwrap();
        assert_eq!(claimed.status, DonationStatus::Claimed);
        assert_eq!(claimed.claimed_by.as_deref(), Some("Eastside Pantry"));
        assert!(!f.store.available_donations().iter().any(|d| d.id == donation.id));

        let log = f.store.activity_log();
        assert_eq!(log.len(), logs_before + 1);
        assert_eq!(log[0].kind, ActivityKind::RequestCreated);
        assert_eq!(log[0].description, "Requested: Rice (20 kg) from Harbor Market");
    }

    #[test]
    fn test_request_rejections_leave_state_unchanged() {
        let mut f = fixture();
        let before = f.store.snapshot();

        let missing = f.store.create_request(request_for(&DonationId::from("nope"), 3));
        assert!(matches!(missing, Err(AppError::ValidationError(_))));

        let zero = f.store.create_request(request_for(&DonationId::from("4"), 0));
        assert!(matches!(zero, Err(AppError::ValidationError(_))));

        // Donation "2" is already claimed in the seed data.
        let taken = f.store.create_request(request_for(&DonationId::from("2"), 5));
        assert!(matches!(taken, Err(AppError::ValidationError(_))));

        assert_eq!(f.store.snapshot(), before);
    }

    #[test]
    fn test_completing_request_completes_donation() {
        let mut f = fixture();
        let donation = f.store.create_donation(rice()).unwrap();
        let request = f.store.create_request(request_for(&donation.id, 10)).unwrap();

        let outcome = f.store.update_request(&request.id, RequestUpdate::Complete).unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(
            f.store.find_request(&request.id).unwrap().status,
            RequestStatus::Completed
        );
        let completed = f.store.find_donation(&donation.id).unwrap();
        assert_eq!(completed.status, DonationStatus::Completed);
        assert_eq!(completed.claimed_by.as_deref(), Some("Eastside Pantry"));
        assert_eq!(f.store.activity_log()[0].kind, ActivityKind::RequestCompleted);
    }

    #[test]
    fn test_request_transitions_are_forward_only() {
        let mut f = fixture();
        let donation = f.store.create_donation(rice()).unwrap();
        let request = f.store.create_request(request_for(&donation.id, 10)).unwrap();

        f.store.update_request(&request.id, RequestUpdate::Approve).unwrap();
        assert_eq!(
            f.store.find_request(&request.id).unwrap().status,
            RequestStatus::Approved
        );
        f.store.update_request(&request.id, RequestUpdate::Complete).unwrap();

        let before = f.store.snapshot();
        let err = f.store.update_request(&request.id, RequestUpdate::Approve).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        let err = f
            .store
            .update_request(&request.id, RequestUpdate::SetBeneficiaries(4))
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(f.store.snapshot(), before);

        // Completing twice is a no-op, not a second log entry.
        f.store.update_request(&request.id, RequestUpdate::Complete).unwrap();
        assert_eq!(f.store.activity_log().len(), before.activity_logs.len());
    }

    #[test]
    fn test_completing_request_with_deleted_donation() {
        let mut f = fixture();
        let donation = f.store.create_donation(rice()).unwrap();
        let request = f.store.create_request(request_for(&donation.id, 10)).unwrap();
        f.store.delete_donation(&donation.id).unwrap();

        let outcome = f.store.update_request(&request.id, RequestUpdate::Complete).unwrap();
        assert!(outcome.is_applied());
        assert!(f.store.find_donation(&donation.id).is_none());
    }

    #[test]
    fn test_donation_updates_enforce_claimant_invariant() {
        let mut f = fixture();
        let id = DonationId::from("4");

        let err = f.store.update_donation(&id, DonationUpdate::Complete).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let blank = DonationUpdate::Claim { claimant: " ".into() };
        assert!(f.store.update_donation(&id, blank).is_err());

        let claim = DonationUpdate::Claim { claimant: "Local Shelter".into() };
        f.store.update_donation(&id, claim.clone()).unwrap();
        assert!(f.store.update_donation(&id, claim).is_err());

        f.store.update_donation(&id, DonationUpdate::Complete).unwrap();
        f.store.update_donation(&id, DonationUpdate::Complete).unwrap();
        for donation in f.store.list_donations() {
            assert_eq!(donation.claimed_by.is_none(), donation.is_available());
        }
        // Updates are not logged.
        assert!(f.store.activity_log().is_empty());
    }

    #[test]
    fn test_amend_keeps_status_and_validates() {
        let mut f = fixture();
        let id = DonationId::from("2");
        let amendment = DonationAmendment {
            quantity: Some(90.0),
            description: Some("Day-old bread".into()),
            ..Default::default()
        };
        f.store.update_donation(&id, DonationUpdate::Amend(amendment)).unwrap();
        let amended = f.store.find_donation(&id).unwrap();
        assert_eq!(amended.quantity, 90.0);
        assert_eq!(amended.description, "Day-old bread");
        assert_eq!(amended.status, DonationStatus::Claimed);

        let bad = DonationAmendment { quantity: Some(0.0), ..Default::default() };
        assert!(f.store.update_donation(&id, DonationUpdate::Amend(bad)).is_err());
        assert_eq!(f.store.find_donation(&id).unwrap().quantity, 90.0);
    }

    #[test]
    fn test_empty_amendment_does_not_write() {
        let mut mock = MockStateStorage::new();
        mock.expect_load().returning(|| Ok(None));
        mock.expect_save().times(0);
        let mut store = LifecycleStore::open(Box::new(mock));
        let before = store.snapshot();

        let outcome = store
            .update_donation(&DonationId::from("2"), DonationUpdate::Amend(DonationAmendment::default()))
            .unwrap();

        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(store.snapshot(), before);
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn test_missing_ids_are_silent_no_ops() {
        let mut f = fixture();
        f.store.create_donation(rice()).unwrap();
        let before = f.store.snapshot();
        let saved_before = f.storage.contents();

        let donation = DonationId::from("missing");
        let request = RequestId::from("missing");
        assert_eq!(
            f.store.update_donation(&donation, DonationUpdate::Complete).unwrap(),
            Outcome::NotFound
        );
        assert_eq!(f.store.delete_donation(&donation).unwrap(), Outcome::NotFound);
        assert_eq!(
            f.store.update_request(&request, RequestUpdate::Complete).unwrap(),
            Outcome::NotFound
        );
        assert_eq!(f.store.delete_request(&request).unwrap(), Outcome::NotFound);

        assert_eq!(f.store.snapshot(), before);
        assert_eq!(f.storage.contents(), saved_before);
    }

    #[test]
    fn test_deletes_log_under_administrator_without_cascade() {
        let mut f = fixture();
        let donation = f.store.create_donation(rice()).unwrap();
        let request = f.store.create_request(request_for(&donation.id, 10)).unwrap();

        f.store.delete_request(&request.id).unwrap();
        assert!(f.store.find_request(&request.id).is_none());
        // The claim is not reverted.
        assert_eq!(
            f.store.find_donation(&donation.id).unwrap().status,
            DonationStatus::Claimed
        );
        let log = f.store.activity_log();
        assert_eq!(log[0].kind, ActivityKind::RequestCompleted);
        assert_eq!(log[0].user_id, "admin");
        assert_eq!(log[0].description, "Deleted request: Rice from Harbor Market");

        f.store.delete_donation(&DonationId::from("1")).unwrap();
        let log = f.store.activity_log();
        assert_eq!(log[0].kind, ActivityKind::DonationCompleted);
        assert_eq!(log[0].user_role, UserRole::Admin);
        assert_eq!(log[0].description, "Deleted donation: Fresh Vegetables (50 kg)");
        // Seed request r1 still points at the deleted donation.
        assert!(f.store.find_request(&RequestId::from("r1")).is_some());
    }

    #[test]
    fn test_activity_log_is_newest_first_and_grows() {
        let mut f = fixture();
        let mut lengths = vec![];
        let first = f.store.create_donation(rice()).unwrap();
        lengths.push(f.store.activity_log().len());

        f.clock.advance(Duration::minutes(3));
        f.store.create_request(request_for(&first.id, 2)).unwrap();
        lengths.push(f.store.activity_log().len());

        f.clock.advance(Duration::minutes(3));
        f.store.delete_donation(&DonationId::from("5")).unwrap();
        lengths.push(f.store.activity_log().len());

        assert_eq!(lengths, vec![1, 2, 3]);
        let log = f.store.activity_log();
        assert!(log.windows(2).all(|pair| pair[0].timestamp >= pair[1].timestamp));
        assert_eq!(log[2].kind, ActivityKind::DonationCreated);
    }

    #[test]
    fn test_reads_are_copies() {
        let f = fixture();
        let mut donations = f.store.list_donations();
        donations[0].food_type = "Tampered".into();
        donations.clear();
        assert_eq!(f.store.list_donations()[0].food_type, "Fresh Vegetables");
    }

    #[test]
    fn test_filtered_reads() {
        let f = fixture();
        let downtown = f.store.donations_by_donor("donor1");
        assert_eq!(downtown.len(), 2);
        assert_eq!(f.store.available_donations().len(), 1);
        assert_eq!(f.store.requests_by_recipient("recipient1").len(), 2);
        assert_eq!(f.store.stats().total_donations, 5);

        let recent = f.store.stats_within(TimeRange::OneMonth);
        assert_eq!(recent.total_donations, 2);
        assert_eq!(recent.total_requests, 1);

        let impact = f.store.donor_impact("donor1", TimeRange::All);
        assert_eq!(impact.completed_donations, 2);
        let summary = f.store.recipient_summary("recipient2", TimeRange::All);
        assert_eq!(summary.total_beneficiaries, 95);
    }

    #[test]
    fn test_failed_persist_keeps_mutation_in_memory() {
        let mut mock = MockStateStorage::new();
        mock.expect_load().returning(|| Ok(None));
        mock.expect_save()
            .returning(|_| Err(AppError::Io(std::io::Error::other("disk full"))));
        let mut store = LifecycleStore::open(Box::new(mock));

        let err = store.create_donation(rice()).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
        assert!(err.is_persistence());
        assert!(store.has_unsaved_changes());
        assert_eq!(store.list_donations().len(), 6);
        assert_eq!(store.list_donations()[0].food_type, "Rice");
        assert!(store.flush().is_err());
    }

    #[test]
    fn test_flush_recovers_after_failure() {
        let mut mock = MockStateStorage::new();
        mock.expect_load().returning(|| Ok(None));
        let mut calls = 0;
        mock.expect_save().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(AppError::Io(std::io::Error::other("busy")))
            } else {
                Ok(())
            }
        });
        let mut store = LifecycleStore::open(Box::new(mock));

        assert!(store.reset_to_seed().is_err());
        assert!(store.has_unsaved_changes());
        store.flush().unwrap();
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn test_reopen_restores_persisted_state() {
        let mut f = fixture();
        let donation = f.store.create_donation(rice()).unwrap();
        f.store.create_request(request_for(&donation.id, 10)).unwrap();
        let expected = f.store.snapshot();

        let reopened = LifecycleStore::open(Box::new(f.storage.clone()));
        assert_eq!(reopened.init_source(), InitSource::Storage);
        assert_eq!(reopened.snapshot(), expected);
    }

    #[test]
    fn test_platform_metrics_follow_range() {
        let mut f = fixture();
        assert_eq!(f.store.platform_metrics(TimeRange::All).success_rate, 60);

        f.store.create_donation(rice()).unwrap();
        assert_eq!(f.store.platform_metrics(TimeRange::All).success_rate, 50);
        assert_eq!(f.store.platform_metrics(TimeRange::OneMonth).success_rate, 33);
    }

    #[test]
    fn test_reset_to_seed_clears_history() {
        let mut f = fixture();
        f.store.create_donation(rice()).unwrap();
        f.store.reset_to_seed().unwrap();
        assert_eq!(f.store.snapshot(), seed::initial_state());
        let saved = StoreState::from_json(&f.storage.contents().unwrap()).unwrap();
        assert_eq!(saved, seed::initial_state());
    }
}
