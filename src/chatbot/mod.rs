//! Chatbot module - relays Twitch chat commands to the model.

pub mod completion;
pub mod dispatch;
pub mod engine;
pub mod history;
pub mod message;
pub mod notify;
pub mod router;
pub mod sink;
pub mod tts;
pub mod twitch;

pub use completion::CompletionClient;
pub use dispatch::ChunkScheduler;
pub use engine::BotEngine;
pub use message::ChatEvent;
pub use notify::{AudioNotifier, AudioUpdate};
pub use router::{CommandRouter, RouterConfig};
pub use sink::{ChatSink, ConnectorError};
pub use tts::TtsClient;
pub use twitch::TwitchClient;
