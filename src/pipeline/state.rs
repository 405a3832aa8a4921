use std::fmt;

use thiserror::Error;

use crate::model::{DishAnalysis, GroupedResults};

/// Message shown when OCR finds nothing to analyze
pub const NO_TEXT_MESSAGE: &str = "No text could be extracted from the image";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStatus {
    Idle,
    Uploading,
    Processing,
    Complete,
    Error,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Idle => "idle",
            AnalysisStatus::Uploading => "uploading",
            AnalysisStatus::Processing => "processing",
            AnalysisStatus::Complete => "complete",
            AnalysisStatus::Error => "error",
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a pipeline run currently stands.
///
/// Results exist only when complete and the message only on error, so the
/// variants carry them instead of optional fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AnalysisState {
    #[default]
    Idle,
    Uploading,
    Processing,
    Complete {
        results: Vec<DishAnalysis>,
    },
    Error {
        message: String,
    },
}

impl AnalysisState {
    pub fn status(&self) -> AnalysisStatus {
        match self {
            AnalysisState::Idle => AnalysisStatus::Idle,
            AnalysisState::Uploading => AnalysisStatus::Uploading,
            AnalysisState::Processing => AnalysisStatus::Processing,
            AnalysisState::Complete { .. } => AnalysisStatus::Complete,
            AnalysisState::Error { .. } => AnalysisStatus::Error,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AnalysisState::Error { message } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn results(&self) -> Option<&[DishAnalysis]> {
        match self {
            AnalysisState::Complete { results } => Some(results.as_slice()),
            _ => None,
        }
    }

    pub fn grouped_results(&self) -> Option<GroupedResults> {
        self.results().map(GroupedResults::from_dishes)
    }

    /// A run is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, AnalysisState::Uploading | AnalysisState::Processing)
    }
}

/// Inputs that drive the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    /// The user picked or captured an image
    ImageSelected,
    /// OCR finished; `characters` counts characters after trimming
    TextExtracted { characters: usize },
    /// The provider returned its classification
    AnalysisFinished(Vec<DishAnalysis>),
    /// OCR or the provider failed
    Failed(String),
    /// The run was cancelled before finishing
    Abandoned,
    /// Explicit user reset
    Reset,
}

impl AnalysisEvent {
    fn name(&self) -> &'static str {
        match self {
            AnalysisEvent::ImageSelected => "image-selected",
            AnalysisEvent::TextExtracted { .. } => "text-extracted",
            AnalysisEvent::AnalysisFinished(_) => "analysis-finished",
            AnalysisEvent::Failed(_) => "failed",
            AnalysisEvent::Abandoned => "abandoned",
            AnalysisEvent::Reset => "reset",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot apply {event} while {from}")]
pub struct InvalidTransition {
    pub from: AnalysisStatus,
    pub event: &'static str,
}

/// Compute the next state. Pure; the current state is left untouched.
pub fn transition(
    state: &AnalysisState,
    event: AnalysisEvent,
) -> Result<AnalysisState, InvalidTransition> {
    use AnalysisEvent as E;
    use AnalysisState as S;

    let next = match (state, event) {
        (_, E::Failed(message)) => S::Error { message },
        (S::Idle, E::ImageSelected) => S::Uploading,
        (S::Uploading, E::TextExtracted { characters: 0 }) => S::Error {
            message: NO_TEXT_MESSAGE.to_string(),
        },
        (S::Uploading, E::TextExtracted { .. }) => S::Processing,
        (S::Processing, E::AnalysisFinished(results)) => S::Complete { results },
        (S::Uploading | S::Processing, E::Abandoned) => S::Idle,
        (S::Complete { .. } | S::Error { .. }, E::Reset) => S::Idle,
        (state, event) => {
            return Err(InvalidTransition {
                from: state.status(),
                event: event.name(),
            })
        }
    };

    Ok(next)
}
