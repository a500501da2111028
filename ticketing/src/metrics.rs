//! Business metrics for the platform.
//!
//! Counters are recorded by the [`Platform`](crate::Platform) facade after a
//! call commits, one notification at a time, so a rolled-back call never
//! shows up in the numbers.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `stagepass_events_created_total` - Events created
//! - `stagepass_registrations_total` - Registrations recorded
//! - `stagepass_payments_total` - Payments processed
//! - `stagepass_payment_volume_total` - Sum of payment amounts, in base units
//! - `stagepass_platform_fees_total` - Sum of platform fees, in base units
//! - `stagepass_withdrawals_total{kind}` - Withdrawals by kind (organizer, platform)
//! - `stagepass_tickets_minted_total` - Tickets minted
//! - `stagepass_tickets_used_total` - Tickets used
//! - `stagepass_tickets_cancelled_total` - Tickets cancelled
//! - `stagepass_rejected_commands_total{kind}` - Rejected calls by error kind
//!
//! ## Gauges
//! - `stagepass_payments_paused` - 1 while payments are paused

use crate::error::ErrorKind;
use crate::notification::Notification;
use crate::types::Money;
use metrics::{describe_counter, describe_gauge};

/// Initialize and register all business metrics descriptions.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_platform_metrics() {
    describe_counter!("stagepass_events_created_total", "Total number of events created");
    describe_counter!(
        "stagepass_registrations_total",
        "Total number of event registrations"
    );

    describe_counter!(
        "stagepass_payments_total",
        "Total number of payments processed"
    );
    describe_counter!(
        "stagepass_payment_volume_total",
        "Sum of processed payment amounts in base units"
    );
    describe_counter!(
        "stagepass_platform_fees_total",
        "Sum of platform fees charged in base units"
    );
    describe_counter!(
        "stagepass_withdrawals_total",
        "Total number of withdrawals by kind (organizer, platform)"
    );
    describe_gauge!(
        "stagepass_payments_paused",
        "1 while the payment ledger is paused, 0 otherwise"
    );

    describe_counter!("stagepass_tickets_minted_total", "Total number of tickets minted");
    describe_counter!("stagepass_tickets_used_total", "Total number of tickets used");
    describe_counter!(
        "stagepass_tickets_cancelled_total",
        "Total number of tickets cancelled"
    );

    describe_counter!(
        "stagepass_rejected_commands_total",
        "Total number of rejected calls by error kind"
    );

    tracing::info!("Platform metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record the metrics for one committed notification.
pub fn record_committed(notification: &Notification) {
    match notification {
        Notification::EventCreated { .. } => {
            metrics::counter!("stagepass_events_created_total").increment(1);
        }
        Notification::UserRegistered { .. } => {
            metrics::counter!("stagepass_registrations_total").increment(1);
        }
        Notification::PaymentProcessed {
            amount,
            platform_fee,
            ..
        } => {
            metrics::counter!("stagepass_payments_total").increment(1);
            metrics::counter!("stagepass_payment_volume_total").increment(saturating_u64(*amount));
            metrics::counter!("stagepass_platform_fees_total")
                .increment(saturating_u64(*platform_fee));
            tracing::debug!(%amount, %platform_fee, "Recorded payment metric");
        }
        Notification::WithdrawalMade { .. } => {
            metrics::counter!("stagepass_withdrawals_total", "kind" => "organizer").increment(1);
        }
        Notification::PlatformFeesWithdrawn { .. } => {
            metrics::counter!("stagepass_withdrawals_total", "kind" => "platform").increment(1);
        }
        Notification::PaymentsPaused { .. } => {
            metrics::gauge!("stagepass_payments_paused").set(1.0);
        }
        Notification::PaymentsUnpaused { .. } => {
            metrics::gauge!("stagepass_payments_paused").set(0.0);
        }
        Notification::TicketMinted { .. } => {
            metrics::counter!("stagepass_tickets_minted_total").increment(1);
        }
        Notification::TicketUsed { .. } => {
            metrics::counter!("stagepass_tickets_used_total").increment(1);
        }
        Notification::TicketCancelled { .. } => {
            metrics::counter!("stagepass_tickets_cancelled_total").increment(1);
        }
        Notification::EventUpdated { .. }
        | Notification::EventCancelled { .. }
        | Notification::PlatformFeeUpdated { .. }
        | Notification::TicketTransferred { .. }
        | Notification::ReferenceUpdated { .. }
        | Notification::MinterUpdated { .. }
        | Notification::TicketApproved { .. }
        | Notification::ApprovalForAll { .. } => {}
    }
}

/// Record a rejected call.
pub fn record_rejected(kind: ErrorKind) {
    metrics::counter!("stagepass_rejected_commands_total", "kind" => kind.as_str()).increment(1);
    tracing::debug!(%kind, "Recorded rejected_command metric");
}

/// Counters are `u64`; amounts above that saturate
fn saturating_u64(amount: Money) -> u64 {
    u64::try_from(amount.units()).unwrap_or(u64::MAX)
}
