//! Tagged results shared by the stages and the pipeline.

use serde::{Deserialize, Serialize};

/// Outcome of a stage or pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Success,
    Error,
}

/// Payload kind carried by a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    PromptOptimization,
    CritiqueFeedback,
    RefinedPrompt,
    PromptVariants,
    VariantResults,
    BestPrompt,
}

/// Result of a single stage.
///
/// A failed stage carries the default value for `T` (empty string or
/// list); check [`StageResponse::is_success`] before using `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageResponse<T> {
    pub status: StageStatus,
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub data: T,
}

impl<T> StageResponse<T> {
    /// Successful response wrapping `data`.
    pub fn success(response_type: ResponseType, data: T) -> Self {
        Self {
            status: StageStatus::Success,
            response_type,
            data,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Success
    }

    /// The payload if the stage succeeded.
    pub fn into_data(self) -> Option<T> {
        match self.status {
            StageStatus::Success => Some(self.data),
            StageStatus::Error => None,
        }
    }
}

impl<T: Default> StageResponse<T> {
    /// Failed response with an empty payload.
    pub fn failure(response_type: ResponseType) -> Self {
        Self {
            status: StageStatus::Error,
            response_type,
            data: T::default(),
        }
    }
}
