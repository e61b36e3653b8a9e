use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Audience a recommendation is written for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UserType {
    #[default]
    Home,
    Industry,
}
