//! Property tests for the platform's accounting and capacity laws.
//!
//! Run with: `cargo test --test properties_test`

#![allow(clippy::unwrap_used)]

mod common;

use common::{Harness, details};
use proptest::prelude::*;
use stagepass::{FeePercent, Money, PlatformError, Principal};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Registrations never exceed capacity, and every seat can be filled
    #[test]
    fn registrations_never_exceed_capacity(capacity in 1u32..8, attempts in 0usize..16) {
        let h = Harness::deploy();
        let event_id = h.create_event(capacity, 0);

        let mut admitted = 0u32;
        for _ in 0..attempts {
            match h.platform.register_for_event(event_id, Principal::new(), Money::ZERO) {
                Ok(_) => admitted += 1,
                Err(error) => {
                    prop_assert!(
                        matches!(error, PlatformError::CapacityExceeded { .. }),
                        "unexpected error: {}",
                        error
                    );
                }
            }
        }

        let expected = capacity.min(u32::try_from(attempts).unwrap());
        let event = h.platform.event(event_id).unwrap();
        prop_assert_eq!(admitted, expected);
        prop_assert_eq!(event.registered_count, expected);
        prop_assert!(event.registered_count <= event.details.capacity);
    }

    /// The fee split is exact: floor for the platform, the rest for the organizer
    #[test]
    fn fee_split_is_exact(amount in 1u128..=1_000_000_000_000_000_000, percent in 0u8..=20) {
        let fee = FeePercent::new(percent).unwrap();
        let money = Money::from_units(amount);
        let platform_fee = money.percent_floor(fee);

        prop_assert_eq!(platform_fee.units(), amount * u128::from(percent) / 100);
        prop_assert_eq!(platform_fee.checked_add(money.checked_sub(platform_fee).unwrap()), Some(money));

        let h = Harness::deploy_with(|config| config.platform_fee_percent = fee);
        let payer = h.funded_participant(amount);
        let event_id = h.create_event(1, amount);
        let payment_id = h
            .platform
            .register_for_event(event_id, payer, money)
            .unwrap()
            .unwrap();

        let record = h.platform.payment_record(payment_id).unwrap();
        prop_assert_eq!(record.platform_fee, platform_fee);
        prop_assert_eq!(record.platform_fee.units() + record.organizer_share.units(), amount);
    }

    /// Value collected equals value held plus value paid out, per organizer and overall
    #[test]
    fn ledger_conserves_value(
        steps in prop::collection::vec((1u128..=50_000_000, 0u8..=20, any::<bool>(), any::<bool>()), 1..10)
    ) {
        let h = Harness::deploy();
        let organizers = [h.organizer, Principal::new()];
        let minimum = h.platform.config().min_withdrawal;

        for (price, percent, second_organizer, withdraw) in steps {
            h.platform.update_platform_fee(h.admin, percent).unwrap();
            let organizer = organizers[usize::from(second_organizer)];
            let event_id = h
                .platform
                .create_event(organizer, details(10, price))
                .unwrap();
            let participant = h.funded_participant(price);
            h.platform
                .register_for_event(event_id, participant, Money::from_units(price))
                .unwrap();

            let available = h.platform.organizer_balance(organizer).available_balance();
            if withdraw && available >= minimum {
                h.platform.withdraw_organizer_funds(organizer, available).unwrap();
            }
        }

        let stats = h.platform.payment_stats();
        let ledger = h.platform.addresses().payment_ledger;
        let mut earned = 0u128;
        let mut available = 0u128;
        for organizer in organizers {
            let balance = h.platform.organizer_balance(organizer);
            prop_assert!(balance.withdrawn_amount <= balance.total_earned);
            prop_assert_eq!(h.transfer.balance_of(organizer), balance.withdrawn_amount);
            earned += balance.total_earned.units();
            available += balance.available_balance().units();
        }

        prop_assert_eq!(earned + stats.total_platform_fees.units(), stats.total_volume.units());
        prop_assert_eq!(
            available + h.platform.pending_platform_fees().units(),
            stats.current_held_balance.units()
        );
        prop_assert_eq!(h.transfer.balance_of(ledger), stats.current_held_balance);
    }
}
