//! Property-based tests for the Tycoon reducer.
//!
//! Uses proptest to generate random action sequences against the shipped
//! catalog, then verifies the reducer's structural invariants hold after
//! every step.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rust_decimal::Decimal;
use tycoon_core::config::GameConfig;
use tycoon_core::invariants::{check_state, check_transition};
use tycoon_core::reducer::{Outcome, Reducer};
use tycoon_types::{Action, GameState};

// ===========================================================================
// Generators
// ===========================================================================

fn arb_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["Bread", "Shirts", "Cars", "Oil", "Gold", "Unobtainium"])
        .prop_map(str::to_owned)
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => Just(Action::Tick),
        3 => (arb_name(), -20_i64..20).prop_map(|(name, labor_change)| {
            Action::IncrementLabor { name, labor_change }
        }),
        2 => (arb_name(), -500_i64..500).prop_map(|(name, tenths)| {
            Action::IncrementPrice {
                name,
                price_change: Decimal::new(tenths, 1),
            }
        }),
        1 => (-50_i64..50).prop_map(|tenths| Action::IncrementWages {
            wage_change: Decimal::new(tenths, 1),
        }),
        1 => arb_name().prop_map(|name| Action::Unlock { name }),
        1 => Just(Action::StartTick),
        1 => Just(Action::StopTick),
        1 => "[a-z ]{1,12}".prop_map(|message| Action::AppendTicker { message }),
        1 => Just(Action::Unrecognized),
    ]
}

fn arb_actions(max: usize) -> impl Strategy<Value = Vec<Action>> {
    proptest::collection::vec(arb_action(), 1..=max)
}

fn reducer() -> Reducer {
    Reducer::new(GameConfig::default()).unwrap()
}

fn replay(reducer: &Reducer, actions: &[Action]) -> GameState {
    actions
        .iter()
        .fold(reducer.initial_state(), |state, action| {
            reducer.reduce(&state, action)
        })
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Replaying the same actions from the same start gives the same state.
    #[test]
    fn replay_is_deterministic(actions in arb_actions(60)) {
        let r = reducer();
        prop_assert_eq!(replay(&r, &actions), replay(&r, &actions));
    }

    /// Every reachable state satisfies the state invariants, and every
    /// transition conserves the workforce.
    #[test]
    fn invariants_hold_after_every_action(actions in arb_actions(80)) {
        let r = reducer();
        let max_ticker = r.config().max_ticker_length;
        let mut state = r.initial_state();
        for action in &actions {
            let next = r.reduce(&state, action);
            let violations = check_state(&next, max_ticker);
            prop_assert!(violations.is_empty(), "{:?} after {:?}", violations, action);
            let violations = check_transition(&state, &next, action);
            prop_assert!(violations.is_empty(), "{:?} after {:?}", violations, action);
            state = next;
        }
    }

    /// An action that is not applied returns the input state unchanged.
    #[test]
    fn unapplied_actions_are_no_ops(actions in arb_actions(40), probe in arb_action()) {
        let r = reducer();
        let state = replay(&r, &actions);
        let (next, outcome) = r.apply(&state, &probe);
        if outcome != Outcome::Applied {
            prop_assert_eq!(next, state);
        }
    }

    /// Only ticks move the clock, and each moves it by exactly one.
    #[test]
    fn tick_counter_counts_ticks(actions in arb_actions(60)) {
        let r = reducer();
        let state = replay(&r, &actions);
        let ticks = actions.iter().filter(|a| matches!(a, Action::Tick)).count();
        prop_assert_eq!(state.tick, u64::try_from(ticks).unwrap());
    }

    /// Locked commodities never produce, sell, or employ anyone.
    #[test]
    fn locked_commodities_stay_idle(actions in arb_actions(60)) {
        let r = reducer();
        let state = replay(&r, &actions);
        for commodity in state.commodities.iter().filter(|c| !c.unlocked) {
            prop_assert_eq!(commodity.labor_assigned, 0);
            prop_assert_eq!(commodity.num_sold, 0);
        }
    }
}
