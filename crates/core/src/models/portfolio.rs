use serde::{Deserialize, Serialize};

use super::holding::Holding;
use super::settings::Settings;

/// The main data container. Everything in here gets serialized and saved
/// to the portable portfolio file.
///
/// `holdings` is kept sorted by symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub holdings: Vec<Holding>,

    pub settings: Settings,
}
