//! Core types and utilities for stashbox.
//!
//! This crate provides the foundational types used throughout the stashbox
//! file-sharing platform:
//!
//! - **Identifiers**: `UserId`, `FileId`, `TransactionId`
//! - **Credits**: `CreditAccount`, `Plan`, `ConsumeOutcome`, `PlanOffer`
//! - **Files**: `FileRecord` and the upload validation rules
//! - **Payments**: `PaymentTransaction`, `TransactionStatus`
//! - **Profiles**: `Profile`
//!
//! # Credits
//!
//! **1 credit = 1 file upload.**
//!
//! - New users start with 5 credits on the Basic plan
//! - Each stored file deducts exactly 1 credit
//! - Purchasing a plan adds a fixed credit amount and overwrites the plan

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod credit;
pub mod file;
pub mod ids;
pub mod payment;
pub mod profile;

pub use credit::{
    ConsumeOutcome, CreditAccount, Plan, PlanOffer, CURRENCY, PLAN_OFFERS, SIGNUP_CREDITS,
};
pub use file::{
    extension_allowed, file_extension, sanitize_file_name, storage_name_for, FileRecord,
    ALLOWED_EXTENSIONS, MAX_FILE_SIZE_BYTES,
};
pub use ids::{FileId, IdError, TransactionId, UserId};
pub use payment::{PaymentTransaction, TransactionStatus};
pub use profile::Profile;
