use dioxus::prelude::*;
use ruuturetki_shared::models::{DailyChallenge, GameSettings, DATE_FORMAT};

/// Signals shared by every page, provided once by the app root.
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Settings the next game starts with.
    pub settings: Signal<GameSettings>,
    /// Set when the next game plays a daily challenge.
    pub challenge: Signal<Option<DailyChallenge>>,
    /// Every challenge the server knows about.
    pub dailies: Signal<Vec<DailyChallenge>>,
}

impl AppContext {
    pub fn new() -> Self {
        AppContext {
            settings: Signal::new(GameSettings::default()),
            challenge: Signal::new(None),
            dailies: Signal::new(Vec::new()),
        }
    }

    /// Prepare a normal game.
    pub fn start_normal(&mut self, settings: GameSettings) {
        self.challenge.set(None);
        self.settings.set(settings);
    }

    /// Prepare a daily challenge game; its settings replace the chosen ones.
    pub fn start_challenge(&mut self, challenge: DailyChallenge) {
        self.settings.set(challenge.settings());
        self.challenge.set(Some(challenge));
    }
}

pub fn use_app_context() -> AppContext {
    use_context::<AppContext>()
}

/// Local date as `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Local::now().date_naive().format(DATE_FORMAT).to_string()
}
