use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Ticket category assigned by the classification stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Billing,
    Technical,
    /// Catch-all, also used whenever the model reply is unrecognised.
    #[default]
    General,
}

/// Ticket priority assigned by the priority stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

/// Ticket lifecycle flag.
///
/// Only `Open` (the storage default), `Resolved` and `Escalated` are ever
/// produced by the pipeline; `InProgress` exists for the persisted schema.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Resolved,
    Escalated,
}
