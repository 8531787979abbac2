//! Floating medical assistant widget.
//!
//! The panel is either closed or open, and at most one exchange with the
//! chatbot service is outstanding at a time. Sending hands out an
//! [`InFlight`] permit which must be settled before the next message can go
//! out.

use chrono::Local;

use crate::api::models::{ChatHistoryEntry, ChatReply, MedicineInfo};
use crate::api::{ApiError, ChatApi, ErrorKind};
use crate::i18n::I18n;

pub mod card;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub medicine_info: Option<MedicineInfo>,
    pub timestamp: Option<String>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            medicine_info: None,
            timestamp: Some(now()),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            medicine_info: None,
            timestamp: Some(now()),
        }
    }
}

fn now() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Panel {
    #[default]
    Closed,
    Open,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Exchange {
    #[default]
    Idle,
    AwaitingResponse,
}

/// Proof that a message is out. Only [`ChatbotWidget::settle`] consumes it.
#[derive(Debug)]
#[must_use = "an in-flight message must be settled"]
pub struct InFlight {
    message: String,
}

impl InFlight {
    pub fn message(&self) -> &str {
        &self.message
    }
}

pub struct ChatbotWidget {
    i18n: I18n,
    panel: Panel,
    exchange: Exchange,
    messages: Vec<ChatMessage>,
    conversation: Vec<ChatHistoryEntry>,
}

impl ChatbotWidget {
    /// A closed widget whose log starts with the welcome message.
    pub fn new(i18n: I18n) -> Self {
        let welcome = ChatMessage::bot(i18n.get("chat_welcome"));
        Self {
            i18n,
            panel: Panel::Closed,
            exchange: Exchange::Idle,
            messages: vec![welcome],
            conversation: Vec::new(),
        }
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    pub fn is_open(&self) -> bool {
        self.panel == Panel::Open
    }

    /// Input and send button are usable only while the panel is open.
    pub fn input_enabled(&self) -> bool {
        self.is_open()
    }

    /// The typing indicator shows exactly while a message is in flight.
    pub fn typing(&self) -> bool {
        self.exchange == Exchange::AwaitingResponse
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn conversation(&self) -> &[ChatHistoryEntry] {
        &self.conversation
    }

    pub fn open(&mut self) {
        self.panel = Panel::Open;
    }

    pub fn close(&mut self) {
        self.panel = Panel::Closed;
    }

    pub fn toggle(&mut self) {
        match self.panel {
            Panel::Closed => self.open(),
            Panel::Open => self.close(),
        }
    }

    /// A click anywhere on the page. Clicks outside the widget close it.
    pub fn click(&mut self, inside_widget: bool) {
        if !inside_widget && self.is_open() {
            self.close();
        }
    }

    /// Starts an exchange. Returns `None` without touching the log when the
    /// text is blank, the panel is closed, or a reply is still pending.
    pub fn begin_send(&mut self, text: &str) -> Option<InFlight> {
        let message = text.trim();
        if message.is_empty() || !self.input_enabled() {
            return None;
        }
        if self.exchange == Exchange::AwaitingResponse {
            log::debug!("Chat message ignored while a reply is pending");
            return None;
        }

        self.messages.push(ChatMessage::user(message));
        self.exchange = Exchange::AwaitingResponse;
        Some(InFlight {
            message: message.to_string(),
        })
    }

    /// Ends the exchange with the service's reply or a fixed apology.
    pub fn settle(&mut self, permit: InFlight, reply: Result<ChatReply, ApiError>) {
        match reply {
            Ok(reply) => {
                let mut message = ChatMessage::bot(reply.response.clone());
                message.medicine_info = reply.medicine_info.clone();
                self.messages.push(message);
                self.conversation.push(ChatHistoryEntry {
                    timestamp: reply.timestamp,
                    user_message: permit.message,
                    bot_response: reply.response,
                    medicine_info: reply.medicine_info,
                });
            }
            Err(error) => {
                log::error!("Chatbot error: {}", error);
                let key = match error.kind() {
                    ErrorKind::Server => "chat_server_error",
                    ErrorKind::Transport => "chat_transport_error",
                };
                self.messages.push(ChatMessage::bot(self.i18n.get(key)));
            }
        }
        self.exchange = Exchange::Idle;
    }

    /// Sends one message and waits for the reply. Returns `false` when the
    /// message was refused locally.
    pub async fn send<C>(&mut self, api: &C, text: &str) -> bool
    where
        C: ChatApi + ?Sized,
    {
        let Some(permit) = self.begin_send(text) else {
            return false;
        };
        let reply = api.send_message(permit.message()).await;
        self.settle(permit, reply);
        true
    }

    /// Replays earlier exchanges after the welcome message. Failures are
    /// only logged.
    pub async fn load_history<C>(&mut self, api: &C)
    where
        C: ChatApi + ?Sized,
    {
        match api.history().await {
            Ok(history) => {
                log::info!("Loaded {} earlier chat exchanges", history.len());
                for entry in &history {
                    self.messages.push(ChatMessage {
                        sender: Sender::User,
                        text: entry.user_message.clone(),
                        medicine_info: None,
                        timestamp: entry.timestamp.clone(),
                    });
                    self.messages.push(ChatMessage {
                        sender: Sender::Bot,
                        text: entry.bot_response.clone(),
                        medicine_info: entry.medicine_info.clone(),
                        timestamp: entry.timestamp.clone(),
                    });
                }
                self.conversation = history;
            }
            Err(error) => log::warn!("Could not load chat history: {}", error),
        }
    }

    /// Markup for the whole log, oldest first.
    pub fn render(&self) -> Vec<String> {
        let disclaimer = self.i18n.get("chat_disclaimer");
        self.messages
            .iter()
            .map(|message| card::render_message(message, &disclaimer))
            .collect()
    }
}
