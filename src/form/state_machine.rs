use tracing::warn;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Loading,
    Ready,
    Saving,
    Error,
}

type S = FormState;

pub fn state_transition_map(state: FormState) -> &'static [FormState] {
    match state {
        S::Loading => &[S::Ready, S::Error],
        S::Ready => &[S::Loading, S::Saving, S::Error],
        S::Saving => &[S::Loading, S::Ready, S::Error],
        S::Error => &[S::Loading, S::Saving, S::Ready, S::Error],
    }
}

pub fn is_valid_transition(from: FormState, to: FormState) -> bool {
    state_transition_map(from).contains(&to)
}

/// State and error message shared by every form.
#[derive(Debug, Clone)]
pub struct FormCore {
    name: &'static str,
    state: FormState,
    error: Option<String>,
}

impl FormCore {
    pub fn new(name: &'static str) -> Self {
        Self::starting_at(name, FormState::Loading)
    }

    pub fn starting_at(name: &'static str, state: FormState) -> Self {
        FormCore {
            name,
            state,
            error: None,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, FormState::Loading | FormState::Saving)
    }

    pub fn transition(&mut self, to: FormState) {
        if !is_valid_transition(self.state, to) {
            warn!(
                "[FORM] {}: unexpected transition {:?} -> {:?}",
                self.name, self.state, to
            );
        }
        self.state = to;
    }

    pub fn ready(&mut self) {
        self.transition(FormState::Ready);
        self.error = None;
    }

    /// Record a failure and hand it back to the caller.
    pub fn fail<T>(&mut self, e: Error) -> Result<T> {
        warn!("[FORM] {}: {}", self.name, e);
        self.transition(FormState::Error);
        self.error = Some(e.message());
        Err(e)
    }

    /// Client-side validation failure; nothing was sent.
    pub fn reject<T>(&mut self, message: &str) -> Result<T> {
        self.fail(Error::InvalidInput(message.to_string()))
    }
}
