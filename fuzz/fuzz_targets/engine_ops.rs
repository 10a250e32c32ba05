//! Fuzz target for the pairing engine state machine
//!
//! Drive the engine through arbitrary event sequences, including ids it
//! has never seen, and check structural coherence after every step.
//!
//! # Strategy
//!
//! - Population: a small pool of users exercising real flows
//! - Strays: raw u64 ids (zero, huge) thrown at any operation
//! - Degenerates: self-referencing failure reports, empty payloads
//!
//! # Invariants
//!
//! - Wait queue holds each user at most once, all flagged searching
//! - Partner links are symmetric and never self-referencing
//! - A user is never searching and chatting at the same time
//! - Actions never address a user currently marked unreachable

#![no_main]

use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use veil_core::{Action, ChatEngine, ChatEvent, MessagePayload, UserState};

#[derive(Debug, Clone, Arbitrary)]
struct ChatScenario {
    population: u8,
    ops: Vec<EngineOp>,
}

#[derive(Debug, Clone, Arbitrary)]
enum EngineOp {
    EnterSearch { user: u8 },
    CancelSearch { user: u8 },
    Skip { user: u8 },
    EndChat { user: u8 },
    ForwardText { user: u8, body: Vec<u8> },
    ForwardMedia { user: u8, caption: Option<Vec<u8>> },
    Report { user: u8 },
    RelayFailed { sender: u8, recipient: u8 },
    NotifyFailed { recipient: u8 },
    Stray { raw: u64, kind: StrayKind },
}

#[derive(Debug, Clone, Arbitrary)]
enum StrayKind {
    Search,
    Skip,
    Stop,
    Fail,
}

fuzz_target!(|scenario: ChatScenario| {
    let population = u64::from(scenario.population % 8) + 1;
    let mut engine = ChatEngine::new();
    let mut known: BTreeSet<u64> = BTreeSet::new();

    for op in scenario.ops {
        let event = build_event(&op, population, &mut known);
        let actions = engine.process(event);
        verify_action_targets(&engine, &actions);
        verify_engine_invariants(&engine, &known);
    }
});

fn user_in(raw: u8, population: u64, known: &mut BTreeSet<u64>) -> u64 {
    let user = u64::from(raw) % population + 1;
    known.insert(user);
    user
}

fn build_event(op: &EngineOp, population: u64, known: &mut BTreeSet<u64>) -> ChatEvent {
    match op {
        EngineOp::EnterSearch { user } => ChatEvent::EnterSearch {
            user: user_in(*user, population, known),
        },
        EngineOp::CancelSearch { user } => ChatEvent::CancelSearch {
            user: user_in(*user, population, known),
        },
        EngineOp::Skip { user } => ChatEvent::Skip { user: user_in(*user, population, known) },
        EngineOp::EndChat { user } => {
            ChatEvent::EndChat { user: user_in(*user, population, known) }
        },
        EngineOp::ForwardText { user, body } => ChatEvent::Forward {
            user: user_in(*user, population, known),
            payload: MessagePayload::Text(String::from_utf8_lossy(body).into_owned()),
        },
        EngineOp::ForwardMedia { user, caption } => ChatEvent::Forward {
            user: user_in(*user, population, known),
            payload: MessagePayload::Photo {
                file: "fuzz-photo".to_owned(),
                caption: caption
                    .as_ref()
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
            },
        },
        EngineOp::Report { user } => ChatEvent::Report { user: user_in(*user, population, known) },
        EngineOp::RelayFailed { sender, recipient } => ChatEvent::RelayFailed {
            sender: user_in(*sender, population, known),
            recipient: user_in(*recipient, population, known),
        },
        EngineOp::NotifyFailed { recipient } => ChatEvent::NotifyFailed {
            recipient: user_in(*recipient, population, known),
        },
        EngineOp::Stray { raw, kind } => {
            known.insert(*raw);
            match kind {
                StrayKind::Search => ChatEvent::EnterSearch { user: *raw },
                StrayKind::Skip => ChatEvent::Skip { user: *raw },
                StrayKind::Stop => ChatEvent::EndChat { user: *raw },
                StrayKind::Fail => ChatEvent::NotifyFailed { recipient: *raw },
            }
        },
    }
}

fn verify_action_targets(engine: &ChatEngine, actions: &[Action]) {
    for action in actions {
        match action {
            Action::Notify { user, .. } => {
                assert!(
                    !engine.is_unreachable(*user),
                    "notice addressed to unreachable user {user}"
                );
            },
            Action::Relay { to, .. } => {
                assert!(
                    !engine.is_unreachable(*to),
                    "relay addressed to unreachable user {to}"
                );
            },
            Action::Mirror(_) => {},
        }
    }
}

fn verify_engine_invariants(engine: &ChatEngine, known: &BTreeSet<u64>) {
    let mut queued = BTreeSet::new();
    for user in engine.waiting() {
        assert!(queued.insert(user), "user {user} queued twice");
        assert_eq!(engine.state(user), UserState::Searching);
    }

    let flagged: BTreeSet<u64> = engine.searching().collect();
    assert_eq!(queued, flagged, "queue and searching flags diverged");

    let mut linked = 0usize;
    for (a, b) in engine.links() {
        assert_ne!(a, b, "user {a} paired with themselves");
        assert_eq!(engine.partner(b), Some(a), "link {a}->{b} not mirrored");
        assert!(!queued.contains(&a), "user {a} chatting while queued");
        linked += 1;
    }
    assert_eq!(linked, engine.chatting_count());
    assert_eq!(linked % 2, 0, "odd number of link entries");

    for &user in known {
        match engine.state(user) {
            UserState::Idle => assert_eq!(engine.partner(user), None),
            UserState::Searching => assert!(queued.contains(&user)),
            UserState::Chatting => assert!(engine.partner(user).is_some()),
        }
    }
}
