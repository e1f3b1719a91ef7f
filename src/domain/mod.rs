pub mod models;

pub use models::{
    CycleSummary, PlayerIdentity, PlayerRecord, SkippedFile, StatLoad, UserCacheEntry,
};
