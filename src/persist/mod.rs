//! Save/resume: the persisted layout, its byte codec and the save slot.
//!
//! ## Key Types
//!
//! - [`SaveGame`] / [`CardRecord`]: field-wise snapshot of a session
//! - [`encode`] / [`decode`]: bytes in either [`SaveFormat`]
//! - [`SaveStore`]: where the bytes live ([`FileSaveStore`], [`MemorySaveStore`])

mod codec;
mod error;
mod record;
mod store;

pub use codec::{decode, encode, SaveFormat};
pub use error::{DecodeError, EncodeError, StoreError, StoreResult};
pub use record::{CardRecord, SaveGame, NO_TEXTURE};
pub use store::{FileSaveStore, MemorySaveStore, SaveStore, SAVE_FILE_STEM};
