//! Per-visitor generation state. Each cycle takes a sequence number and may
//! only update the shared view while that number is still the newest one
//! issued, so a slow stale response can never overwrite a fresher result.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};

use serde::Serialize;
use uuid::Uuid;

use crate::recipe::{RecipeItem, format_aud, total_cost};

const MAX_SESSIONS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    GeneratingImage,
    ImageReady,
    ImageFailed,
    GeneratingRecipe,
    RecipeReady,
    RecipeEmpty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationView {
    pub sequence: u64,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Vec<RecipeItem>>,
    pub total_cost: f64,
    pub total_cost_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationView {
    pub fn idle() -> Self {
        Self {
            sequence: 0,
            phase: Phase::Idle,
            image_url: None,
            recipe: None,
            total_cost: 0.0,
            total_cost_display: format_aud(0.0),
            error: None,
        }
    }

    pub fn started(sequence: u64) -> Self {
        Self {
            sequence,
            phase: Phase::GeneratingImage,
            ..Self::idle()
        }
    }

    pub fn image_ready(&mut self, image_url: String) {
        self.phase = Phase::ImageReady;
        self.image_url = Some(image_url);
        self.error = None;
    }

    pub fn image_failed(&mut self, message: String) {
        self.phase = Phase::ImageFailed;
        self.image_url = None;
        self.recipe = Some(Vec::new());
        self.error = Some(message);
    }

    pub fn generating_recipe(&mut self) {
        self.phase = Phase::GeneratingRecipe;
    }

    /// Records the recipe. An empty list lands in `RecipeEmpty`; the image is
    /// kept either way.
    pub fn recipe_done(&mut self, recipe: Vec<RecipeItem>) {
        let total = total_cost(&recipe);
        self.phase = if recipe.is_empty() {
            Phase::RecipeEmpty
        } else {
            Phase::RecipeReady
        };
        self.total_cost = total;
        self.total_cost_display = format_aud(total);
        self.recipe = Some(recipe);
    }
}

struct SessionState {
    latest: u64,
    view: GenerationView,
    touched_at: Instant,
}

pub struct GenerationSession {
    state: Mutex<SessionState>,
}

impl Default for GenerationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationSession {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState {
                latest: 0,
                view: GenerationView::idle(),
                touched_at: Instant::now(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issues the next sequence number and resets the view to "generating".
    pub fn begin(&self) -> u64 {
        let mut state = self.lock();
        state.latest += 1;
        state.view = GenerationView::started(state.latest);
        state.touched_at = Instant::now();
        state.latest
    }

    pub fn is_current(&self, sequence: u64) -> bool {
        self.lock().latest == sequence
    }

    /// Runs `update` against the view only if `sequence` is still the newest.
    pub fn apply(&self, sequence: u64, update: impl FnOnce(&mut GenerationView)) -> bool {
        let mut state = self.lock();
        if state.latest != sequence {
            return false;
        }
        update(&mut state.view);
        state.touched_at = Instant::now();
        true
    }

    pub fn view(&self) -> GenerationView {
        self.lock().view.clone()
    }

    fn touched_at(&self) -> Instant {
        self.lock().touched_at
    }
}

/// Sessions keyed by the UUID the browser sends along.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, Arc<GenerationSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<GenerationSession>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn get_or_create(&self, id: Uuid) -> Arc<GenerationSession> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        if !sessions.contains_key(&id) && sessions.len() >= MAX_SESSIONS {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, session)| session.touched_at())
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
            }
        }

        sessions
            .entry(id)
            .or_insert_with(|| Arc::new(GenerationSession::new()))
            .clone()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
