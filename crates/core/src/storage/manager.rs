use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;

use super::format;

/// High-level storage operations: save/load a portfolio to/from bytes or files.
pub struct StorageManager;

impl StorageManager {
    /// Serialize a portfolio to raw bytes (portable, platform-independent).
    ///
    /// Flow: Portfolio → bincode → STKD container
    pub fn save_to_bytes(portfolio: &Portfolio) -> Result<Vec<u8>, CoreError> {
        let payload = bincode::serialize(portfolio)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize portfolio: {e}")))?;
        Ok(format::write_file(format::CURRENT_VERSION, &payload))
    }

    /// Deserialize a portfolio from raw bytes.
    pub fn load_from_bytes(data: &[u8]) -> Result<Portfolio, CoreError> {
        let (_header, payload) = format::read_file(data)?;
        bincode::deserialize(payload).map_err(|e| {
            CoreError::Deserialization(format!("Failed to deserialize portfolio: {e}"))
        })
    }

    /// Save portfolio to a file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(portfolio: &Portfolio, path: &str) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(portfolio)?;
        std::fs::write(path, &bytes)?;
        log::info!("Saved {} holdings to {path} ({} bytes)", portfolio.holdings.len(), bytes.len());
        Ok(())
    }

    /// Load portfolio from a file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str) -> Result<Portfolio, CoreError> {
        let bytes = std::fs::read(path)?;
        let portfolio = Self::load_from_bytes(&bytes)?;
        log::info!("Loaded {} holdings from {path}", portfolio.holdings.len());
        Ok(portfolio)
    }
}
