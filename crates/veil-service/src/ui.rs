//! Menus and user-facing texts.
//!
//! Pure data and rendering tables. The engine emits semantic
//! [`Notice`] values; this module turns them into text plus the menu a
//! user should see next. Transports decide how menus appear on their
//! wire.

use serde::{Deserialize, Serialize};
use veil_core::{Notice, UserId};

use crate::transport::Outbound;

/// Welcome text shown on first contact.
pub const WELCOME: &str = "Welcome to Anonymous Chat!\n\n\
    Chat with a random stranger safely and privately.\n\
    - Tap Start Chatting to find a partner\n\
    - Use Next to skip, Stop to end\n\n\
    Be kind. Stay safe.";

/// Help text.
pub const HELP_TEXT: &str = "Help\n\n\
    - Start Chatting: we match you with someone random.\n\
    - Next: end the current chat and immediately search again.\n\
    - Stop: end the chat and go back to the menu.\n\
    - Report: flag spam or abuse. Our team reviews it.\n\n\
    Do not share personal info. We never ask for passwords or codes.";

/// Settings text.
pub const SETTINGS_TEXT: &str =
    "Settings\n\nNo settings yet. Tell us what you would like to customize!";

/// Menu attached to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Menu {
    /// Resting state: start chatting, help, settings.
    Main,
    /// While waiting: cancel search, help.
    Searching,
    /// While chatting: next, stop, report, help.
    InChat,
    /// Single back button under informational texts.
    Back,
}

/// Callback token carried by a menu button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Callback {
    /// Enter the wait queue.
    FindPartner,
    /// Leave the wait queue.
    CancelSearch,
    /// Swap the current partner for a new one.
    NextPartner,
    /// End the current chat.
    StopChat,
    /// Report the current partner.
    Report,
    /// Show help.
    Help,
    /// Show settings.
    Settings,
    /// Return to the main menu.
    Back,
}

impl Callback {
    /// Parse a wire callback token.
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "find_partner" => Some(Self::FindPartner),
            "cancel_search" => Some(Self::CancelSearch),
            "next_partner" => Some(Self::NextPartner),
            "stop_chat" => Some(Self::StopChat),
            "report" => Some(Self::Report),
            "help" => Some(Self::Help),
            "settings" => Some(Self::Settings),
            "back" => Some(Self::Back),
            _ => None,
        }
    }

    /// Wire token for this callback.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FindPartner => "find_partner",
            Self::CancelSearch => "cancel_search",
            Self::NextPartner => "next_partner",
            Self::StopChat => "stop_chat",
            Self::Report => "report",
            Self::Help => "help",
            Self::Settings => "settings",
            Self::Back => "back",
        }
    }
}

/// One pressable menu button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    /// Label shown to the user.
    pub label: &'static str,
    /// Token sent back when pressed.
    pub callback: Callback,
}

impl Menu {
    /// Button rows, for transports that render inline keyboards.
    pub fn rows(self) -> &'static [&'static [Button]] {
        match self {
            Self::Main => &[
                &[Button { label: "Start Chatting", callback: Callback::FindPartner }],
                &[
                    Button { label: "Help", callback: Callback::Help },
                    Button { label: "Settings", callback: Callback::Settings },
                ],
            ],
            Self::Searching => &[
                &[Button { label: "Cancel Search", callback: Callback::CancelSearch }],
                &[Button { label: "Help", callback: Callback::Help }],
            ],
            Self::InChat => &[
                &[
                    Button { label: "Next", callback: Callback::NextPartner },
                    Button { label: "Stop", callback: Callback::StopChat },
                ],
                &[
                    Button { label: "Report", callback: Callback::Report },
                    Button { label: "Help", callback: Callback::Help },
                ],
            ],
            Self::Back => &[&[Button { label: "Back", callback: Callback::Back }]],
        }
    }
}

/// Render an engine notice into deliverable form.
pub fn render_notice(notice: Notice) -> Outbound {
    let (text, menu) = match notice {
        Notice::SearchStarted => ("Finding a partner…", Menu::Searching),
        Notice::StillSearching => ("Still searching for a partner…", Menu::Searching),
        Notice::AlreadyInChat => ("You're already in a chat.", Menu::InChat),
        Notice::SearchCancelled => ("Search cancelled.", Menu::Main),
        Notice::Matched => ("Matched! Say hi!", Menu::InChat),
        Notice::PartnerLeft => ("Your partner left. Searching for a new one…", Menu::Searching),
        Notice::LookingForNewPartner => ("Looking for a new partner…", Menu::Searching),
        Notice::ChatEnded => ("Chat ended. You're back at the main menu.", Menu::Main),
        Notice::NotInChat => ("You're not in a chat yet.", Menu::Main),
        Notice::PartnerUnavailable => {
            ("Your partner is unavailable. Returning to the menu.", Menu::Main)
        },
        Notice::ReportReceived => {
            ("Report received. Thank you for helping keep the community safe.", Menu::InChat)
        },
    };
    Outbound::Notice { text: text.to_owned(), menu: Some(menu) }
}

/// Welcome message with the main menu.
pub fn welcome() -> Outbound {
    Outbound::Notice { text: WELCOME.to_owned(), menu: Some(Menu::Main) }
}

/// Help message with a back button.
pub fn help() -> Outbound {
    Outbound::Notice { text: HELP_TEXT.to_owned(), menu: Some(Menu::Back) }
}

/// Settings message with a back button.
pub fn settings() -> Outbound {
    Outbound::Notice { text: SETTINGS_TEXT.to_owned(), menu: Some(Menu::Back) }
}

/// Bare main-menu prompt, shown after backing out of a text screen.
pub fn menu_prompt() -> Outbound {
    Outbound::Notice { text: "Choose an option:".to_owned(), menu: Some(Menu::Main) }
}

/// Reply for the id lookup command.
pub fn chat_id(user: UserId) -> Outbound {
    Outbound::Notice { text: format!("This chat ID is: {user}"), menu: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CALLBACKS: [Callback; 8] = [
        Callback::FindPartner,
        Callback::CancelSearch,
        Callback::NextPartner,
        Callback::StopChat,
        Callback::Report,
        Callback::Help,
        Callback::Settings,
        Callback::Back,
    ];

    #[test]
    fn callback_tokens_round_trip() {
        for callback in ALL_CALLBACKS {
            assert_eq!(Callback::parse(callback.as_str()), Some(callback));
        }
    }

    #[test]
    fn unknown_callback_is_rejected() {
        assert_eq!(Callback::parse("self_destruct"), None);
        assert_eq!(Callback::parse(""), None);
    }

    #[test]
    fn every_menu_has_buttons() {
        for menu in [Menu::Main, Menu::Searching, Menu::InChat, Menu::Back] {
            let rows = menu.rows();
            assert!(!rows.is_empty());
            assert!(rows.iter().all(|row| !row.is_empty()));
        }
    }

    fn menu_of(notice: Notice) -> Option<Menu> {
        match render_notice(notice) {
            Outbound::Notice { menu, .. } => menu,
            Outbound::Relay(_) => None,
        }
    }

    #[test]
    fn notices_carry_the_next_menu() {
        assert_eq!(menu_of(Notice::Matched), Some(Menu::InChat));
        assert_eq!(menu_of(Notice::SearchStarted), Some(Menu::Searching));
        assert_eq!(menu_of(Notice::StillSearching), Some(Menu::Searching));
        assert_eq!(menu_of(Notice::ChatEnded), Some(Menu::Main));
        assert_eq!(menu_of(Notice::PartnerUnavailable), Some(Menu::Main));
        assert_eq!(menu_of(Notice::ReportReceived), Some(Menu::InChat));
    }
}
