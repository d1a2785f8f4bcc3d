//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in
//! column families.

use stashbox_core::{FileId, TransactionId, UserId};

/// Create a credit ledger key from a user ID.
#[must_use]
pub fn credit_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a profile key from a user ID.
#[must_use]
pub fn profile_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a file metadata key from a file ID.
#[must_use]
pub fn file_key(file_id: &FileId) -> Vec<u8> {
    file_id.as_bytes().to_vec()
}

/// Create an owner-file index key.
///
/// Format: `owner (16 bytes) || file_id (16 bytes)`
#[must_use]
pub fn owner_file_key(owner: &UserId, file_id: &FileId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(owner.as_bytes());
    key.extend_from_slice(file_id.as_bytes());
    key
}

/// Create a prefix for iterating all files owned by a user.
#[must_use]
pub fn owner_files_prefix(owner: &UserId) -> Vec<u8> {
    owner.as_bytes().to_vec()
}

/// Extract the file ID from an owner-file index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_file_id_from_owner_key(key: &[u8]) -> FileId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    FileId::from_uuid(uuid_from_bytes(bytes))
}

/// Create a transaction key from a transaction ID.
#[must_use]
pub fn transaction_key(transaction_id: &TransactionId) -> Vec<u8> {
    transaction_id.to_bytes().to_vec()
}

/// Create a user-transaction index key.
///
/// Format: `user_id (16 bytes) || transaction_id (16 bytes)`
///
/// Since ULIDs are time-ordered, transactions for a user will be sorted by
/// time.
#[must_use]
pub fn user_transaction_key(user_id: &UserId, transaction_id: &TransactionId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(&transaction_id.to_bytes());
    key
}

/// Create a prefix for iterating all transactions for a user.
#[must_use]
pub fn user_transactions_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Extract the transaction ID from a user-transaction index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_transaction_id_from_user_key(key: &[u8]) -> TransactionId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    TransactionId::from_bytes(bytes).expect("valid ULID bytes")
}

fn uuid_from_bytes(bytes: [u8; 16]) -> uuid::Uuid {
    uuid::Uuid::from_bytes(bytes)
}
