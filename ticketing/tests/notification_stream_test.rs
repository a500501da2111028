//! Notification stream tests: order, journal, and serialization.
//!
//! Run with: `cargo test --test notification_stream_test`

#![allow(clippy::unwrap_used)]

mod common;

use common::{Harness, PRICE};
use stagepass::{Component, Money, Notification, Principal};
use stagepass_core::event::Event;
use tokio::sync::broadcast::error::TryRecvError;

#[tokio::test]
async fn test_subscribers_receive_committed_notifications_in_order() {
    let h = Harness::deploy();
    let mut receiver = h.platform.subscribe();

    let event_id = h.create_event(5, PRICE);
    let participant = h.funded_participant(PRICE);
    let payment_id = h
        .platform
        .register_for_event(event_id, participant, Money::from_units(PRICE))
        .unwrap()
        .unwrap();
    let token_id = h.mint(participant, event_id);

    assert_eq!(
        receiver.recv().await.unwrap(),
        Notification::EventCreated {
            event_id,
            organizer: h.organizer
        }
    );
    assert_eq!(
        receiver.recv().await.unwrap(),
        Notification::UserRegistered {
            event_id,
            participant
        }
    );
    assert_eq!(
        receiver.recv().await.unwrap(),
        Notification::PaymentProcessed {
            payment_id,
            event_id,
            payer: participant,
            amount: Money::from_units(PRICE),
            platform_fee: Money::from_units(500_000),
            organizer_share: Money::from_units(9_500_000),
        }
    );
    assert_eq!(
        receiver.recv().await.unwrap(),
        Notification::TicketMinted {
            token_id,
            event_id,
            owner: participant
        }
    );
    assert_eq!(receiver.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_rejected_calls_publish_nothing() {
    let h = Harness::deploy();
    let mut receiver = h.platform.subscribe();

    let error = h.platform.emergency_unpause(Principal::new());
    assert!(error.is_err());

    assert_eq!(receiver.try_recv(), Err(TryRecvError::Empty));
}

#[test]
fn test_journal_records_deployment_wiring() {
    let h = Harness::deploy();
    let addresses = h.platform.addresses();
    let journal = h.platform.journal();

    assert_eq!(journal.len(), 6);
    assert_eq!(
        journal[0],
        Notification::ReferenceUpdated {
            component: Component::EventRegistry,
            reference: Component::PaymentLedger,
            target: addresses.payment_ledger,
        }
    );
    assert_eq!(
        journal[5],
        Notification::MinterUpdated {
            minter: addresses.event_registry,
            authorized: true,
        }
    );
}

#[test]
fn test_journal_entries_serialize_for_the_gateway() {
    let h = Harness::deploy();
    let event_id = h.create_event(5, 0);
    h.platform
        .register_for_event(event_id, Principal::new(), Money::ZERO)
        .unwrap();

    for notification in h.platform.journal() {
        let bytes = notification.to_bytes().unwrap();
        assert_eq!(Notification::from_bytes(&bytes).unwrap(), notification);
        assert!(notification.event_type().ends_with(".v1"));
    }

    let last = h.platform.journal().pop().unwrap();
    let json = serde_json::to_value(&last).unwrap();
    assert_eq!(json["user_registered"]["event_id"], event_id.get());
}
