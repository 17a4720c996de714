//! Seed demo patients for one clinic user.
//!
//! # Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/clinic \
//!   cargo run -p clinic-outreach --bin seed -- --user-id <uuid> --email staff@example.com
//! ```
//!
//! Registers the user when `--email` is given and the user does not exist yet.
//! Pass `--rng-seed` to reproduce the same patients.

use anyhow::{Context as _, Result, bail};
use chrono::Utc;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use sea_orm::Database;
use tracing::info;
use uuid::Uuid;
use validator::ValidateEmail;

use clinic_core::config::Config;
use clinic_core::tracing::init_cli_tracing;
use clinic_outreach::config::OutreachConfig;
use clinic_outreach::domain::repository::UserRepository;
use clinic_outreach::infra::sms::SmsGateway;
use clinic_outreach::state::AppState;
use clinic_outreach::usecase::seed::{
    DEFAULT_DEMO_PATIENTS, SeedDemoPatientsUseCase, generate_drafts,
};
use clinic_outreach::usecase::user::RegisterUserUseCase;

#[derive(Parser)]
#[command(about = "Seed demo patients for a clinic user")]
struct Args {
    /// Owning user id (the value the gateway sends as x-clinic-user-id)
    #[arg(long)]
    user_id: Uuid,

    /// Register the user with this email if they do not exist yet
    #[arg(long)]
    email: Option<String>,

    /// Number of patients to create
    #[arg(long, default_value_t = DEFAULT_DEMO_PATIENTS)]
    count: usize,

    /// Seed for reproducible fixtures
    #[arg(long)]
    rng_seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_cli_tracing();
    let args = Args::parse();

    let config = OutreachConfig::try_from_env().context("load configuration")?;
    let db = Database::connect(&config.database_url)
        .await
        .context("connect to database")?;
    let state = AppState {
        db,
        sms: SmsGateway::from_config(&config)?,
        timezone: config.clinic_timezone,
    };

    if state.user_repo().find_by_id(args.user_id).await?.is_none() {
        let Some(email) = args.email else {
            bail!(
                "user {} does not exist; pass --email to register it",
                args.user_id
            );
        };
        if !email.validate_email() {
            bail!("--email {email:?} is not a valid email address");
        }
        RegisterUserUseCase {
            repo: state.user_repo(),
        }
        .execute(args.user_id, &email)
        .await?;
        info!(user_id = %args.user_id, "registered user");
    }

    let rng_seed = args
        .rng_seed
        .unwrap_or_else(|| rand::rng().random_range(0..u64::MAX));
    let now = Utc::now();
    let drafts = generate_drafts(
        &mut StdRng::seed_from_u64(rng_seed),
        args.count,
        now,
        state.timezone,
    );

    let created = SeedDemoPatientsUseCase {
        patients: state.patient_repo(),
        outreach: state.outreach_repo(),
    }
    .execute(args.user_id, drafts, now)
    .await?;

    info!(user_id = %args.user_id, created, rng_seed, "seeded demo patients");
    Ok(())
}
