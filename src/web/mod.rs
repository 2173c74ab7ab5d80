pub mod public;
mod routes;
mod server;
pub use server::{app, serve};
mod state;
pub use state::{AppState, LandingPage};
pub mod templates;
