pub mod chatbot;
pub mod config;
pub mod keep_alive;
pub mod openai;
pub mod web;
