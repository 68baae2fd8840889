pub mod clock;
pub mod codec;
pub mod manager;
pub mod migration;
pub mod mutation;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use codec::{decode, encode, Decoded};
pub use manager::{LibraryManager, LIBRARY_KEY};
pub use migration::{plan_migration, MigrationOutcome, SkipReason, LEGACY_KEYS};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
