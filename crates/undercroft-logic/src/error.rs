//! Generation errors.

use crate::pipeline::Stage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a generation attempt was abandoned. All are fatal to the attempt and
/// none is retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum FailureKind {
    #[error("invalid size template or theme table")]
    InitializationFailure,
    #[error("room layout broke its invariants")]
    RoomGenerationFailure,
    #[error("not enough rooms to place key and exit")]
    PlacementFailure,
    #[error("geometry synthesis failed")]
    GeometryFailure,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("floor {floor_index} failed at {stage} ({kind}): {}", .problems.join("; "))]
    Failed {
        floor_index: u32,
        stage: Stage,
        kind: FailureKind,
        problems: Vec<String>,
    },
    #[error("a floor is already being generated")]
    GenerationInProgress,
}

impl GenerationError {
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            GenerationError::Failed { kind, .. } => Some(*kind),
            GenerationError::GenerationInProgress => None,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            GenerationError::Failed { stage, .. } => Some(*stage),
            GenerationError::GenerationInProgress => None,
        }
    }
}
