//! Conversational assistant.
//!
//! The system context handed to the chat model is rebuilt from current
//! catalog, margin and drop-point data before every call. Failed calls
//! produce a canned reply instead of an error.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::catalog::Catalog;
use crate::error::{MarketError, Result};
use crate::format::{format_percent, format_rupiah};
use crate::models::{ChatMessage, DropPoint, MarginConfig, MarginStage, Notice};

pub const FALLBACK_REPLY: &str = "Sorry, the assistant is unavailable right now. \
     You can still check the price list and drop-point map.";

/// Messages kept from earlier turns.
pub const HISTORY_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// ChatModel
// ---------------------------------------------------------------------------

pub trait ChatModel: Send + Sync {
    /// Produce the next assistant message. `messages` starts with the
    /// system context.
    fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Chat model behind an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChatModel {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiChatModel {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }
}

impl ChatModel for OpenAiChatModel {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": 0.7,
        });

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp: Value = request.send()?.error_for_status()?.json()?;
        resp["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| MarketError::Service("chat response has no message content".into()))
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Build the system context from current data. Same inputs, same string.
pub fn build_context(catalog: &Catalog, margins: &MarginConfig, drop_points: &[DropPoint]) -> String {
    let mut ctx = String::from(
        "You are the assistant of a waste-recycling marketplace. Prices cascade through four \
         tiers: pelapak, bank sampah induk, bank sampah unit and nasabah. Answer using only the \
         data below; quote prices in Rupiah.\n\nMargins:\n",
    );

    let stage_labels = ["pelapak -> induk", "induk -> unit", "unit -> nasabah"];
    for (stage, label) in MarginStage::ALL.iter().zip(stage_labels) {
        ctx.push_str(&format!("- {}: {}\n", label, format_percent(margins.get(*stage))));
    }

    ctx.push_str("\nPrices (pelapak / induk / unit / nasabah):\n");
    for row in catalog.price_table(margins) {
        let prices: Vec<String> = row.prices.as_array().iter().map(|p| format_rupiah(*p)).collect();
        ctx.push_str(&format!(
            "- {} {} [{}]: {} per {}\n",
            row.item.code,
            row.item.name,
            row.item.category,
            prices.join(" / "),
            row.item.unit
        ));
    }

    ctx.push_str("\nDrop points:\n");
    if drop_points.is_empty() {
        ctx.push_str("- none listed\n");
    }
    for p in drop_points {
        ctx.push_str(&format!("- {} ({}): {}\n", p.name, p.kind.as_str(), p.address));
    }
    ctx
}

// ---------------------------------------------------------------------------
// Conversation / Assistant
// ---------------------------------------------------------------------------

/// Running chat history, excluding the system context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn push_turn(&mut self, user: ChatMessage, assistant: ChatMessage) {
        self.messages.push(user);
        self.messages.push(assistant);
        if self.messages.len() > HISTORY_LIMIT {
            let excess = self.messages.len() - HISTORY_LIMIT;
            self.messages.drain(..excess);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub notice: Option<Notice>,
}

impl Reply {
    pub fn is_fallback(&self) -> bool {
        self.notice.is_some()
    }
}

pub struct Assistant<'a> {
    model: Option<&'a dyn ChatModel>,
}

impl<'a> Assistant<'a> {
    pub fn new(model: Option<&'a dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Ask a question with the given system context.
    ///
    /// Successful turns are appended to `conversation`; failed ones are not,
    /// and return [`FALLBACK_REPLY`] with a notice.
    pub fn ask(&self, conversation: &mut Conversation, context: &str, query: &str) -> Reply {
        let Some(model) = self.model else {
            return fallback("The assistant is not configured.");
        };

        let mut messages = Vec::with_capacity(conversation.messages.len() + 2);
        messages.push(ChatMessage::system(context));
        messages.extend(conversation.messages.iter().cloned());
        messages.push(ChatMessage::user(query));

        match model.complete(&messages) {
            Ok(text) => {
                conversation.push_turn(ChatMessage::user(query), ChatMessage::assistant(text.clone()));
                Reply { text, notice: None }
            }
            Err(e) => {
                warn!("assistant call failed: {}", e);
                fallback("The assistant could not be reached.")
            }
        }
    }
}

fn fallback(message: &str) -> Reply {
    Reply {
        text: FALLBACK_REPLY.to_string(),
        notice: Some(Notice::warning(message)),
    }
}
