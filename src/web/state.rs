use std::path::PathBuf;
use std::sync::Arc;

use handlebars::Handlebars;
use serde::Serialize;

use crate::chatbot::{AudioNotifier, CommandRouter};
use crate::web::templates;

/// Values rendered into the landing page.
#[derive(Debug, Clone, Serialize)]
pub struct LandingPage {
    pub bot: String,
    pub channels: Vec<String>,
    pub tts: bool,
}

pub struct AppState {
    pub router: Arc<CommandRouter>,
    pub notifier: AudioNotifier,
    pub templates: Handlebars<'static>,
    pub landing: LandingPage,
    pub public_dir: PathBuf,
}

impl AppState {
    pub fn new(
        router: Arc<CommandRouter>,
        notifier: AudioNotifier,
        landing: LandingPage,
        public_dir: PathBuf,
    ) -> Self {
        Self {
            router,
            notifier,
            templates: templates::templates(),
            landing,
            public_dir,
        }
    }
}
