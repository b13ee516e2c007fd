//! Command-line surface. Each subcommand is one dashboard action.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fr_core::{DonationStatus, RequestStatus, TimeRange};

#[derive(Parser)]
#[command(name = "food-rescue")]
#[command(about = "Coordinate food donations between donors and recipient organizations")]
pub struct Cli {
    /// Settings file (TOML). Defaults to ./food-rescue.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Overrides `storage.data_dir`.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Donor and admin actions on donations.
    Donation {
        #[command(subcommand)]
        command: DonationCommand,
    },
    /// Recipient and admin actions on requests.
    Request {
        #[command(subcommand)]
        command: RequestCommand,
    },
    /// Activity log, most recent first.
    Activity,
    /// Platform counters and success rate.
    Stats {
        #[arg(long, default_value = "all")]
        range: TimeRange,
    },
    /// Per-donor or per-recipient summary.
    Impact {
        #[command(subcommand)]
        target: ImpactTarget,
    },
    /// Replace all data with the example dataset.
    Reset,
}

#[derive(Subcommand)]
pub enum DonationCommand {
    Create {
        #[arg(long)]
        donor_id: String,
        #[arg(long)]
        donor_name: String,
        #[arg(long)]
        food_type: String,
        #[arg(long)]
        quantity: f64,
        #[arg(long, default_value = "kg")]
        unit: String,
        /// YYYY-MM-DD
        #[arg(long)]
        expiry: NaiveDate,
        #[arg(long)]
        location: String,
        #[arg(long)]
        description: String,
    },
    List {
        #[arg(long)]
        donor: Option<String>,
        #[arg(long)]
        status: Option<DonationStatus>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "all")]
        range: TimeRange,
    },
    Available,
    /// Mark a claimed donation as picked up.
    Complete { id: String },
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum RequestCommand {
    Create {
        #[arg(long)]
        recipient_id: String,
        #[arg(long)]
        recipient_name: String,
        #[arg(long)]
        donation: String,
        /// YYYY-MM-DD
        #[arg(long)]
        pickup: NaiveDate,
        #[arg(long)]
        beneficiaries: u32,
    },
    List {
        #[arg(long)]
        recipient: Option<String>,
        #[arg(long)]
        status: Option<RequestStatus>,
        #[arg(long, default_value = "all")]
        range: TimeRange,
    },
    Approve { id: String },
    Complete { id: String },
    Reschedule {
        id: String,
        #[arg(long)]
        pickup: NaiveDate,
    },
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ImpactTarget {
    Donor {
        id: String,
        #[arg(long, default_value = "all")]
        range: TimeRange,
    },
    Recipient {
        id: String,
        #[arg(long, default_value = "all")]
        range: TimeRange,
    },
}
