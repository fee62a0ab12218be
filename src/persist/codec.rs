//! Byte encoding of [`SaveGame`].
//!
//! Two formats are supported:
//! - `Json`: pretty-printed, human-readable; the default
//! - `Bincode`: compact binary
//!
//! Decoding parses into a fresh value and runs [`SaveGame::validate`] before
//! handing it back.

use serde::{Deserialize, Serialize};

use super::error::{DecodeError, EncodeError};
use super::record::SaveGame;

/// On-disk representation of a save.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaveFormat {
    #[default]
    Json,
    Bincode,
}

impl SaveFormat {
    /// File extension used by file-backed stores.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            SaveFormat::Json => "json",
            SaveFormat::Bincode => "bin",
        }
    }
}

/// Serialize a snapshot.
pub fn encode(save: &SaveGame, format: SaveFormat) -> Result<Vec<u8>, EncodeError> {
    let bytes = match format {
        SaveFormat::Json => serde_json::to_vec_pretty(save)?,
        SaveFormat::Bincode => bincode::serialize(save)?,
    };
    Ok(bytes)
}

/// Parse and validate a snapshot.
pub fn decode(bytes: &[u8], format: SaveFormat) -> Result<SaveGame, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::corrupt("empty payload"));
    }

    let save: SaveGame = match format {
        SaveFormat::Json => {
            serde_json::from_slice(bytes).map_err(|e| DecodeError::corrupt(e.to_string()))?
        }
        SaveFormat::Bincode => {
            bincode::deserialize(bytes).map_err(|e| DecodeError::corrupt(e.to_string()))?
        }
    };

    save.validate()?;
    Ok(save)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Rgba, Vec3};
    use crate::persist::record::CardRecord;

    fn save() -> SaveGame {
        let card = |token: &str, completed: bool| CardRecord {
            pair_token: token.to_string(),
            texture_index: 3,
            color: Rgba::new(0.1, 0.2, 0.3, 1.0),
            position: Vec3::new(-0.5, 0.0, 0.5),
            completed,
            face_up: completed,
        };
        SaveGame {
            score: 10,
            grid_width: 2,
            grid_height: 2,
            card_spacing: 1.25,
            matched_pairs: 1,
            cards: vec![card("x", true), card("x", true), card("y", false), card("y", false)],
        }
    }

    #[test]
    fn test_json_round_trip() {
        let bytes = encode(&save(), SaveFormat::Json).unwrap();
        assert_eq!(decode(&bytes, SaveFormat::Json).unwrap(), save());
    }

    #[test]
    fn test_bincode_round_trip() {
        let bytes = encode(&save(), SaveFormat::Bincode).unwrap();
        assert_eq!(decode(&bytes, SaveFormat::Bincode).unwrap(), save());
    }

    #[test]
    fn test_empty_payload_is_corrupt() {
        assert!(matches!(decode(&[], SaveFormat::Json), Err(DecodeError::Corrupt(_))));
    }

    #[test]
    fn test_truncated_payload_is_corrupt() {
        let bytes = encode(&save(), SaveFormat::Json).unwrap();
        let truncated = &bytes[..bytes.len() / 2];
        assert!(matches!(decode(truncated, SaveFormat::Json), Err(DecodeError::Corrupt(_))));

        let bytes = encode(&save(), SaveFormat::Bincode).unwrap();
        let truncated = &bytes[..bytes.len() - 3];
        assert!(decode(truncated, SaveFormat::Bincode).is_err());
    }

    #[test]
    fn test_structurally_invalid_payload_is_corrupt() {
        let mut s = save();
        s.matched_pairs = 2;
        let bytes = encode(&s, SaveFormat::Json).unwrap();
        assert!(matches!(decode(&bytes, SaveFormat::Json), Err(DecodeError::Corrupt(_))));
    }

    #[test]
    fn test_extension() {
        assert_eq!(SaveFormat::Json.extension(), "json");
        assert_eq!(SaveFormat::Bincode.extension(), "bin");
    }
}
