//! # Food Rescue Binary
//!
//! The entry point that assembles settings, logging, storage and the store,
//! then runs one dashboard action and prints the result as JSON.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use fr_config::{LogSettings, Settings};
use fr_core::{
    DonationFilter, DonationId, DonationUpdate, LifecycleStore, NewDonation, NewRequest, Outcome,
    RequestFilter, RequestId, RequestUpdate,
};
use fr_storage_local::LocalFileStorage;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, DonationCommand, ImpactTarget, RequestCommand};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Settings: defaults, file, .env, environment, then flags
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir.clone() {
        settings.storage.data_dir = dir;
    }

    // 2. Logging goes to stderr so stdout stays machine-readable
    init_tracing(&settings.log);

    // 3. Storage and store
    let storage = LocalFileStorage::new(
        settings.storage.data_dir.clone(),
        settings.storage.file_name.clone(),
    );
    tracing::debug!(path = %storage.path().display(), "opening store");
    let mut store = LifecycleStore::open(Box::new(storage));

    let output = run(cli.command, &mut store)
        .with_context(|| format!("using {}", settings.state_file().display()))?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if log.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn run(command: Command, store: &mut LifecycleStore) -> Result<Value> {
    let value = match command {
        Command::Donation { command } => run_donation(command, store)?,
        Command::Request { command } => run_request(command, store)?,
        Command::Activity => serde_json::to_value(store.activity_log())?,
        Command::Stats { range } => {
            let counters = serde_json::to_value(store.stats_within(range))?;
            let metrics = serde_json::to_value(store.platform_metrics(range))?;
            json!({ "counters": counters, "metrics": metrics })
        }
        Command::Impact { target } => match target {
            ImpactTarget::Donor { id, range } => serde_json::to_value(store.donor_impact(&id, range))?,
            ImpactTarget::Recipient { id, range } => {
                serde_json::to_value(store.recipient_summary(&id, range))?
            }
        },
        Command::Reset => {
            store.reset_to_seed()?;
            json!({ "reset": true })
        }
    };
    Ok(value)
}

fn run_donation(command: DonationCommand, store: &mut LifecycleStore) -> Result<Value> {
    let value = match command {
        DonationCommand::Create {
            donor_id,
            donor_name,
            food_type,
            quantity,
            unit,
            expiry,
            location,
            description,
        } => {
            let donation = store.create_donation(NewDonation {
                donor_id,
                donor_name,
                food_type,
                quantity,
                unit,
                expiry_date: expiry,
                location,
                description,
            })?;
            serde_json::to_value(donation)?
        }
        DonationCommand::List {
            donor,
            status,
            search,
            range,
        } => serde_json::to_value(store.search_donations(&DonationFilter {
            range,
            status,
            donor_id: donor,
            search,
        }))?,
        DonationCommand::Available => serde_json::to_value(store.available_donations())?,
        DonationCommand::Complete { id } => {
            outcome(&id, store.update_donation(&DonationId::from(id.as_str()), DonationUpdate::Complete)?)
        }
        DonationCommand::Delete { id } => {
            outcome(&id, store.delete_donation(&DonationId::from(id.as_str()))?)
        }
    };
    Ok(value)
}

fn run_request(command: RequestCommand, store: &mut LifecycleStore) -> Result<Value> {
    let value = match command {
        RequestCommand::Create {
            recipient_id,
            recipient_name,
            donation,
            pickup,
            beneficiaries,
        } => {
            let request = store.create_request(NewRequest {
                recipient_id,
                recipient_name,
                donation_id: DonationId::from(donation),
                pickup_date: pickup,
                beneficiaries,
            })?;
            serde_json::to_value(request)?
        }
        RequestCommand::List {
            recipient,
            status,
            range,
        } => serde_json::to_value(store.search_requests(&RequestFilter {
            range,
            status,
            recipient_id: recipient,
        }))?,
        RequestCommand::Approve { id } => update_request(store, &id, RequestUpdate::Approve)?,
        RequestCommand::Complete { id } => update_request(store, &id, RequestUpdate::Complete)?,
        RequestCommand::Reschedule { id, pickup } => update_request(
            store,
            &id,
            RequestUpdate::Reschedule {
                pickup_date: pickup,
            },
        )?,
        RequestCommand::Delete { id } => {
            outcome(&id, store.delete_request(&RequestId::from(id.as_str()))?)
        }
    };
    Ok(value)
}

fn update_request(store: &mut LifecycleStore, id: &str, update: RequestUpdate) -> Result<Value> {
    Ok(outcome(id, store.update_request(&RequestId::from(id), update)?))
}

fn outcome(id: &str, outcome: Outcome) -> Value {
    let status = match outcome {
        Outcome::Applied => "applied",
        Outcome::NotFound => "not_found",
    };
    json!({ "id": id, "outcome": status })
}
