//! `RocksDB` storage layer for stashbox.
//!
//! This crate provides persistent storage for credit ledgers, file
//! metadata, payment transactions, and user profiles using `RocksDB` with
//! column families for efficient indexing.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `credits`: Credit ledger records, keyed by `user_id`
//! - `files`: File metadata, keyed by `file_id`
//! - `files_by_owner`: Index for listing files by owner
//! - `transactions`: Payment transactions, keyed by `transaction_id` (ULID)
//! - `transactions_by_user`: Index for listing transactions by user
//! - `profiles`: User display profiles, keyed by `user_id`
//!
//! # Concurrency
//!
//! Credit operations are read-modify-write over one record. The store
//! serializes them per user with a lock table so concurrent uploads or
//! purchases for the same user cannot lose a balance update. Records for
//! different users never contend.
//!
//! # Example
//!
//! ```no_run
//! use stashbox_store::{RocksStore, Store};
//! use stashbox_core::UserId;
//!
//! let store = RocksStore::open("/tmp/stashbox-db").unwrap();
//!
//! // First read lazily creates the default ledger record.
//! let user_id = UserId::generate();
//! let account = store.get_or_init_credits(&user_id).unwrap();
//! assert_eq!(account.credits, 5);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use stashbox_core::{
    ConsumeOutcome, CreditAccount, FileId, FileRecord, PaymentTransaction, Plan, Profile, UserId,
};

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // Credit Ledger Operations
    // =========================================================================

    /// Get a user's ledger record, creating the default `(5, Basic)` record
    /// on first access.
    ///
    /// Creation happens at most once per user, including under concurrent
    /// first access.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_or_init_credits(&self, user_id: &UserId) -> Result<CreditAccount>;

    /// Deduct exactly one credit if the balance is positive.
    ///
    /// At zero balance, or for a user with no ledger record, nothing is
    /// mutated and `ConsumeOutcome::Exhausted` is returned; the caller
    /// decides whether that matters. Consume never creates the record;
    /// creation belongs to [`Store::get_or_init_credits`] and
    /// [`Store::add_credits`].
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn consume_credit(&self, user_id: &UserId) -> Result<ConsumeOutcome>;

    /// Add credits and overwrite the plan, recording the transaction in the
    /// same atomic batch.
    ///
    /// A user with no ledger record gets the signup default plus `amount`.
    /// The plan is overwritten unconditionally (last writer wins).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn add_credits(
        &self,
        user_id: &UserId,
        amount: i64,
        plan: Plan,
        transaction: &PaymentTransaction,
    ) -> Result<CreditAccount>;

    // =========================================================================
    // File Metadata Operations
    // =========================================================================

    /// Insert or update a file metadata record.
    ///
    /// This also maintains the owner index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_file(&self, record: &FileRecord) -> Result<()>;

    /// Get a file metadata record by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_file(&self, file_id: &FileId) -> Result<Option<FileRecord>>;

    /// Delete a file metadata record and its owner index entry.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record doesn't exist.
    fn delete_file(&self, file_id: &FileId) -> Result<()>;

    /// List all file records owned by a user.
    ///
    /// The order is stable across repeated calls absent mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_files_by_owner(&self, owner: &UserId) -> Result<Vec<FileRecord>>;

    // =========================================================================
    // Payment Transaction Operations
    // =========================================================================

    /// Insert a payment transaction.
    ///
    /// This also maintains the user index. Transactions are append-only.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_transaction(&self, transaction: &PaymentTransaction) -> Result<()>;

    /// List transactions for a user, ordered by time (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions_by_user(&self, user_id: &UserId) -> Result<Vec<PaymentTransaction>>;

    // =========================================================================
    // Profile Operations
    // =========================================================================

    /// Insert or update a user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_profile(&self, profile: &Profile) -> Result<()>;

    /// Get a user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>>;

    /// Check whether a profile exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn profile_exists(&self, user_id: &UserId) -> Result<bool>;

    /// Delete a user profile.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the profile doesn't exist.
    fn delete_profile(&self, user_id: &UserId) -> Result<()>;
}
