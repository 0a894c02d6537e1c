//! Weather state for the currently selected country.
//!
//! Every selection bumps a generation counter. A fetch remembers the
//! generation it started under and may only commit its result while that
//! generation is still current; anything older is dropped on arrival. The
//! counter is read and written under the watch channel's lock, so a commit can
//! never interleave with a newer selection.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    model::{Country, WeatherInfo},
    weather::WeatherSource,
};

/// The only error text the UI ever sees for weather failures.
pub const WEATHER_LOAD_ERROR: &str = "Failed to load weather information.";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum WeatherState {
    /// Nothing selected.
    #[default]
    Idle,
    Loading,
    Success(WeatherInfo),
    Failed(String),
}

impl WeatherState {
    pub fn is_loading(&self) -> bool {
        matches!(self, WeatherState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            WeatherState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn weather(&self) -> Option<&WeatherInfo> {
        match self {
            WeatherState::Success(info) => Some(info),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct WeatherController {
    source: Arc<dyn WeatherSource>,
    state: Arc<watch::Sender<WeatherState>>,
    generation: Arc<AtomicU64>,
}

impl WeatherController {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self {
            source,
            state: Arc::new(watch::channel(WeatherState::Idle).0),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Change the selection.
    ///
    /// `None` goes straight to [`WeatherState::Idle`]. A country switches to
    /// [`WeatherState::Loading`] before this returns and spawns exactly one
    /// fetch on the current tokio runtime; the handle resolves once that fetch
    /// has either committed or been discarded.
    pub fn select(&self, country: Option<&Country>) -> Option<JoinHandle<()>> {
        let Some(country) = country else {
            self.state.send_modify(|state| {
                self.generation.fetch_add(1, Ordering::SeqCst);
                *state = WeatherState::Idle;
            });
            return None;
        };

        let mut ticket = 0;
        self.state.send_modify(|state| {
            ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = WeatherState::Loading;
        });

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let generation = Arc::clone(&self.generation);
        let code = country.code.clone();
        let capital = country.capital.clone();

        Some(tokio::spawn(async move {
            let next = match source.fetch_weather(&code, &capital).await {
                Ok(info) => WeatherState::Success(info),
                Err(err) => {
                    warn!(country = %code, error = %err, "weather lookup failed");
                    WeatherState::Failed(WEATHER_LOAD_ERROR.to_string())
                }
            };

            state.send_if_modified(|current| {
                if generation.load(Ordering::SeqCst) != ticket {
                    debug!(country = %code, ticket, "discarding superseded weather result");
                    return false;
                }
                *current = next;
                true
            });
        }))
    }

    pub fn snapshot(&self) -> WeatherState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<WeatherState> {
        self.state.subscribe()
    }
}
