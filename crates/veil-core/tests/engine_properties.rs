//! Structural properties of the engine under random event streams.
//!
//! Every sequence of events, valid or not, must leave the engine in a
//! coherent shape: the wait queue free of duplicates, partner links
//! symmetric, and each user in exactly one mode. Follow-up actions must
//! never target a user the engine already knows is unreachable.

use std::collections::BTreeSet;

use proptest::prelude::*;
use veil_core::{Action, ChatEngine, ChatEvent, MessagePayload, UserState};

fn event_strategy() -> impl Strategy<Value = ChatEvent> {
    let user = 1..=5u64;
    prop_oneof![
        4 => user.clone().prop_map(|user| ChatEvent::EnterSearch { user }),
        2 => user.clone().prop_map(|user| ChatEvent::CancelSearch { user }),
        3 => user.clone().prop_map(|user| ChatEvent::Skip { user }),
        2 => user.clone().prop_map(|user| ChatEvent::EndChat { user }),
        3 => (user.clone(), "[a-z]{0,8}").prop_map(|(user, body)| ChatEvent::Forward {
            user,
            payload: MessagePayload::Text(body),
        }),
        1 => user.clone().prop_map(|user| ChatEvent::Report { user }),
        2 => (user.clone(), user.clone())
            .prop_map(|(sender, recipient)| ChatEvent::RelayFailed { sender, recipient }),
        2 => user.prop_map(|recipient| ChatEvent::NotifyFailed { recipient }),
    ]
}

fn run(events: Vec<ChatEvent>) -> ChatEngine {
    let mut engine = ChatEngine::new();
    for event in events {
        engine.process(event);
    }
    engine
}

proptest! {
    #[test]
    fn prop_queue_holds_each_searcher_once(
        events in prop::collection::vec(event_strategy(), 0..100)
    ) {
        let engine = run(events);

        let mut seen = BTreeSet::new();
        for user in engine.waiting() {
            prop_assert!(seen.insert(user), "user {user} queued twice");
            prop_assert_eq!(engine.state(user), UserState::Searching);
        }

        let flagged: BTreeSet<_> = engine.searching().collect();
        prop_assert_eq!(seen, flagged, "queue and searching flags diverged");
    }

    #[test]
    fn prop_links_are_symmetric_and_irreflexive(
        events in prop::collection::vec(event_strategy(), 0..100)
    ) {
        let engine = run(events);

        let links: Vec<_> = engine.links().collect();
        for &(a, b) in &links {
            prop_assert_ne!(a, b, "user {} paired with themselves", a);
            prop_assert_eq!(engine.partner(b), Some(a), "link {}->{} not mirrored", a, b);
            prop_assert_eq!(engine.state(a), UserState::Chatting);
        }
        prop_assert_eq!(links.len(), engine.chatting_count());
        prop_assert_eq!(links.len() % 2, 0, "odd number of link entries");
    }

    #[test]
    fn prop_each_user_is_in_exactly_one_mode(
        events in prop::collection::vec(event_strategy(), 0..100)
    ) {
        let engine = run(events);

        let waiting: BTreeSet<_> = engine.waiting().collect();
        for user in 1..=5u64 {
            match engine.state(user) {
                UserState::Idle => {
                    prop_assert!(!waiting.contains(&user));
                    prop_assert_eq!(engine.partner(user), None);
                },
                UserState::Searching => {
                    prop_assert!(waiting.contains(&user));
                    prop_assert_eq!(engine.partner(user), None);
                },
                UserState::Chatting => {
                    prop_assert!(!waiting.contains(&user));
                    prop_assert!(engine.partner(user).is_some());
                },
            }
        }
    }

    #[test]
    fn prop_actions_never_target_marked_users(
        events in prop::collection::vec(event_strategy(), 0..100),
        next in event_strategy()
    ) {
        let mut engine = run(events);

        let actions = engine.process(next);
        for action in &actions {
            match action {
                Action::Notify { user, .. } => {
                    prop_assert!(
                        !engine.is_unreachable(*user),
                        "notice addressed to unreachable user {}", user
                    );
                },
                Action::Relay { to, .. } => {
                    prop_assert!(
                        !engine.is_unreachable(*to),
                        "relay addressed to unreachable user {}", to
                    );
                },
                Action::Mirror(_) => {},
            }
        }
    }
}
