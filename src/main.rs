use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::prelude::*;

use twitchgpt::chatbot::{
    AudioNotifier, BotEngine, ChatSink, ChunkScheduler, CommandRouter, CompletionClient, RouterConfig,
    TtsClient, TwitchClient,
};
use twitchgpt::config::{Config, MESSAGE_INTERVAL};
use twitchgpt::keep_alive;
use twitchgpt::web::{self, AppState, LandingPage};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    std::fs::create_dir_all(&config.log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_dir.join("twitchgpt.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting twitchgpt...");
    for name in config.missing_credentials() {
        error!("No {name} found. Please set it as environment variable.");
    }
    info!("GPT_MODE is {}", config.mode);
    info!("History length is {}", config.history_length);
    info!("Model name: {}", config.model_name);
    info!("Channels: {}", config.channels.join(","));
    info!("Loaded context from {}", config.context_path.display());

    let (incoming, twitch) = TwitchClient::new(&config.twitch_user, &config.twitch_auth);
    let sink: Arc<dyn ChatSink> = Arc::new(twitch.clone());

    let notifier = AudioNotifier::new();
    let tts = if config.enable_tts {
        info!("TTS enabled, writing audio to {}", config.public_dir.display());
        Some(TtsClient::new(&config))
    } else {
        None
    };
    let scheduler = Arc::new(ChunkScheduler::new(sink.clone(), MESSAGE_INTERVAL));
    let router = Arc::new(CommandRouter::new(
        RouterConfig::from(&config),
        CompletionClient::new(&config),
        scheduler,
        tts,
        notifier.clone(),
    ));

    if let Some(ref url) = config.keep_alive_url {
        keep_alive::spawn(url.clone(), config.keep_alive_schedule.clone());
    }

    let landing = LandingPage {
        bot: config.twitch_user.clone(),
        channels: config.channels.clone(),
        tts: config.enable_tts,
    };
    let state = Arc::new(AppState::new(
        router.clone(),
        notifier,
        landing,
        config.public_dir.clone(),
    ));
    tokio::spawn(web::serve(config.port, state));

    if let Err(e) = twitch.join_all(&config.channels) {
        error!("Bot couldn't connect: {e}");
    }

    let engine = Arc::new(BotEngine::new(twitch.login(), router, sink));
    engine.run(incoming).await;
}
