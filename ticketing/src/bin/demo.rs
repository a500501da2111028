//! Stagepass Demo
//!
//! Walks through the life of one paid event:
//! - Deploying and wiring the three components
//! - Creating an event and registering a participant with exact payment
//! - Minting, transferring, verifying and using the ticket
//! - Withdrawing organizer earnings and sweeping platform fees
//!
//! # Usage
//!
//! ```bash
//! # Optional overrides, also read from .env
//! export STAGEPASS_PLATFORM_FEE_PERCENT=5
//!
//! cargo run --bin demo
//! ```

use chrono::{Duration, Utc};
use stagepass::{
    EventDetails, InMemoryTransfer, MintRequest, Money, Platform, PlatformConfig,
    PlatformEnvironment, Principal, ValueTransfer, metrics::register_platform_metrics,
};
use stagepass_core::environment::SystemClock;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TICKET_PRICE: u128 = 10_000_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present; a missing file is not an error.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stagepass=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    register_platform_metrics();

    println!("\n============================================");
    println!("   Stagepass - Live Demo");
    println!("============================================\n");

    let config = PlatformConfig::from_env();
    let admin = config.admin;

    let organizer = Principal::new();
    let alice = Principal::new();
    let bob = Principal::new();

    let transfer = Arc::new(InMemoryTransfer::new());
    transfer.fund(alice, Money::from_units(TICKET_PRICE * 3));

    let book: Arc<dyn ValueTransfer> = transfer.clone();
    let environment = PlatformEnvironment::new(Arc::new(SystemClock), book);
    let platform = Platform::deploy(config, environment)?;
    let mut notifications = platform.subscribe();
    println!("1. Deployed platform (fee {})", platform.platform_fee_percent());

    let start_date = Utc::now() + Duration::days(30);
    let event_id = platform.create_event(
        organizer,
        EventDetails {
            title: "Summer Music Festival".to_string(),
            description: "Three stages, one night".to_string(),
            start_date,
            end_date: start_date + Duration::hours(10),
            ticket_price: Money::from_units(TICKET_PRICE),
            capacity: 100,
            location: "Riverside Park".to_string(),
            categories: vec!["music".to_string(), "outdoor".to_string()],
        },
    )?;
    println!("2. Created event {event_id}");

    let payment_id = platform.register_for_event(event_id, alice, Money::from_units(TICKET_PRICE))?;
    if let Some(payment) = payment_id.and_then(|id| platform.payment_record(id)) {
        println!(
            "3. Alice registered: paid {}, platform fee {}, organizer share {}",
            payment.amount, payment.platform_fee, payment.organizer_share
        );
    }

    let token_id = platform.mint_ticket(
        platform.addresses().event_registry,
        MintRequest {
            recipient: alice,
            event_id,
            seat_info: "GA-001".to_string(),
            ticket_type: "General Admission".to_string(),
            metadata_uri: "ipfs://stagepass/summer/1".to_string(),
        },
    )?;
    println!("4. Minted ticket {token_id} for Alice");

    platform.transfer_from(alice, alice, bob, token_id)?;
    println!(
        "5. Alice transferred the ticket to Bob (valid: {})",
        platform.verify_ticket(token_id, event_id)
    );

    platform.use_ticket(bob, token_id)?;
    println!(
        "6. Bob used the ticket at the door (still valid: {})",
        platform.verify_ticket(token_id, event_id)
    );

    let available = platform.organizer_balance(organizer).available_balance();
    platform.withdraw_organizer_funds(organizer, available)?;
    println!("7. Organizer withdrew {available}");

    let fees = platform.withdraw_platform_fees(admin)?;
    println!("8. Admin swept {fees} in platform fees");

    println!("\nBalances held by the transfer book:");
    println!("   alice     {}", transfer.balance_of(alice));
    println!("   organizer {}", transfer.balance_of(organizer));
    println!("   admin     {}", transfer.balance_of(admin));

    println!("\nPayment stats:\n{}", serde_json::to_string_pretty(&platform.payment_stats())?);
    println!("Ticket stats:\n{}", serde_json::to_string_pretty(&platform.ticket_stats())?);

    println!("\nNotifications:");
    while let Ok(notification) = notifications.try_recv() {
        println!("   {}", serde_json::to_string(&notification)?);
    }

    println!("\n============================================\n");
    Ok(())
}
