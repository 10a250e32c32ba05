//! Inbound routing and engine orchestration.
//!
//! [`ChatService`] owns the engine behind a single async mutex and
//! translates classified inbound updates into engine events. Engine
//! calls are short critical sections; delivery happens afterwards with
//! the lock released. Informational screens (welcome, help, settings,
//! id lookup) are answered here without touching the engine.

use std::sync::Arc;

use veil_core::{ChatEngine, ChatEvent, MessagePayload, SpectatorEvent, UserId};

use crate::config::ServiceConfig;
use crate::executor::ActionExecutor;
use crate::spectator::ObserverSink;
use crate::transport::{Outbound, Transport, UserProfile};
use crate::ui::{self, Callback};

/// One inbound update, already classified by the transport.
#[derive(Debug, Clone)]
pub struct Incoming {
    /// Acting user.
    pub user: UserId,
    /// Identity metadata for oversight rendering, when available.
    pub profile: Option<UserProfile>,
    /// What arrived.
    pub kind: IncomingKind,
}

/// Classification of an inbound update.
#[derive(Debug, Clone)]
pub enum IncomingKind {
    /// Slash command. The leading slash and any arguments are ignored.
    Command(String),
    /// Menu button press, carrying the raw callback token.
    Callback(String),
    /// Content intended for the current partner.
    Message(MessagePayload),
}

/// Commands the service answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Stop,
    Help,
    GetId,
}

impl Command {
    fn parse(raw: &str) -> Option<Self> {
        let name = raw.trim().trim_start_matches('/');
        let name = name.split_whitespace().next().unwrap_or("");
        match name {
            "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            "help" => Some(Self::Help),
            "getid" => Some(Self::GetId),
            _ => None,
        }
    }
}

/// The assembled service: engine, transport, observer, configuration.
pub struct ChatService {
    engine: Arc<tokio::sync::Mutex<ChatEngine>>,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn ObserverSink>,
    config: ServiceConfig,
}

impl ChatService {
    /// Assemble a service with a fresh engine.
    pub fn new(
        transport: Arc<dyn Transport>,
        observer: Arc<dyn ObserverSink>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            engine: Arc::new(tokio::sync::Mutex::new(ChatEngine::new())),
            transport,
            observer,
            config,
        }
    }

    /// Shared engine handle, for the health endpoint and inspection.
    pub fn engine(&self) -> Arc<tokio::sync::Mutex<ChatEngine>> {
        Arc::clone(&self.engine)
    }

    /// Handle one inbound update end-to-end.
    ///
    /// Never fails: delivery problems are logged or fed back into the
    /// engine, and unknown commands or callbacks are ignored.
    pub async fn handle_incoming(&self, incoming: Incoming) {
        let Incoming { user, profile, kind } = incoming;
        let profile = profile.as_ref();

        match kind {
            IncomingKind::Command(raw) => match Command::parse(&raw) {
                Some(Command::Start) => self.handle_start(user, profile).await,
                Some(Command::Stop) => self.dispatch(ChatEvent::EndChat { user }, profile).await,
                Some(Command::Help) => self.respond(user, ui::help()).await,
                Some(Command::GetId) => self.respond(user, ui::chat_id(user)).await,
                None => tracing::debug!(user, command = %raw, "Ignored unknown command"),
            },

            IncomingKind::Callback(data) => match Callback::parse(&data) {
                Some(Callback::FindPartner) => {
                    self.dispatch(ChatEvent::EnterSearch { user }, profile).await;
                },
                Some(Callback::CancelSearch) => {
                    self.dispatch(ChatEvent::CancelSearch { user }, profile).await;
                },
                Some(Callback::NextPartner) => {
                    self.dispatch(ChatEvent::Skip { user }, profile).await;
                },
                Some(Callback::StopChat) => {
                    self.dispatch(ChatEvent::EndChat { user }, profile).await;
                },
                Some(Callback::Report) => {
                    self.dispatch(ChatEvent::Report { user }, profile).await;
                },
                Some(Callback::Help) => self.respond(user, ui::help()).await,
                Some(Callback::Settings) => self.respond(user, ui::settings()).await,
                Some(Callback::Back) => self.respond(user, ui::menu_prompt()).await,
                None => tracing::debug!(user, callback = %data, "Ignored unknown callback"),
            },

            IncomingKind::Message(payload) => {
                // Command text never relays, even mid-chat.
                if matches!(&payload, MessagePayload::Text(text) if text.starts_with('/')) {
                    tracing::debug!(user, "Ignored command-shaped message");
                    return;
                }
                self.dispatch(ChatEvent::Forward { user, payload }, profile).await;
            },
        }
    }

    /// First contact: typing indicator, oversight note, welcome screen.
    async fn handle_start(&self, user: UserId, profile: Option<&UserProfile>) {
        self.transport.typing(user).await;
        self.observer.observe(profile, SpectatorEvent::Started { user }).await;
        self.respond(user, ui::welcome()).await;
    }

    /// Run one engine event and execute the resulting actions.
    async fn dispatch(&self, event: ChatEvent, profile: Option<&UserProfile>) {
        let actions = {
            let mut engine = self.engine.lock().await;
            engine.process(event)
        };
        self.executor().run(profile, actions).await;
    }

    /// Answer an informational request directly.
    async fn respond(&self, user: UserId, message: Outbound) {
        let follow_up = self.executor().send_notice(user, message).await;
        self.executor().run(None, follow_up).await;
    }

    fn executor(&self) -> ActionExecutor<'_> {
        ActionExecutor {
            engine: &self.engine,
            transport: self.transport.as_ref(),
            observer: self.observer.as_ref(),
            deliver_timeout: self.config.deliver_timeout,
        }
    }
}
