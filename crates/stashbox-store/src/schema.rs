//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Credit ledger records, keyed by `user_id`.
    pub const CREDITS: &str = "credits";

    /// File metadata records, keyed by `file_id`.
    pub const FILES: &str = "files";

    /// Index: files by owner, keyed by `owner || file_id`.
    /// Value is empty (index only).
    pub const FILES_BY_OWNER: &str = "files_by_owner";

    /// Payment transactions, keyed by `transaction_id` (ULID).
    pub const TRANSACTIONS: &str = "transactions";

    /// Index: transactions by user, keyed by `user_id || transaction_id`.
    /// Value is empty (index only).
    pub const TRANSACTIONS_BY_USER: &str = "transactions_by_user";

    /// User display profiles, keyed by `user_id`.
    pub const PROFILES: &str = "profiles";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::CREDITS,
        cf::FILES,
        cf::FILES_BY_OWNER,
        cf::TRANSACTIONS,
        cf::TRANSACTIONS_BY_USER,
        cf::PROFILES,
    ]
}
