//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use stashbox_core::{
    ConsumeOutcome, CreditAccount, FileId, FileRecord, PaymentTransaction, Plan, Profile, UserId,
    SIGNUP_CREDITS,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,

    /// Per-user locks serializing credit read-modify-write cycles.
    /// Entries are created on first use and never removed; the table is
    /// bounded by the number of distinct users seen by this process.
    credit_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            credit_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Get (or create) the lock guarding one user's credit record.
    fn credit_lock(&self, user_id: &UserId) -> Result<Arc<Mutex<()>>> {
        let mut locks = self
            .credit_locks
            .lock()
            .map_err(|_| StoreError::Database("credit lock table poisoned".into()))?;
        Ok(locks.entry(*user_id).or_default().clone())
    }

    /// Read a user's ledger record without taking the credit lock.
    fn read_credits(&self, user_id: &UserId) -> Result<Option<CreditAccount>> {
        let cf = self.cf(cf::CREDITS)?;
        let key = keys::credit_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    /// Write a user's ledger record.
    fn write_credits(&self, account: &CreditAccount) -> Result<()> {
        let cf = self.cf(cf::CREDITS)?;
        let key = keys::credit_key(&account.user_id);
        let value = Self::serialize(account)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Credit Ledger Operations
    // =========================================================================

    fn get_or_init_credits(&self, user_id: &UserId) -> Result<CreditAccount> {
        let lock = self.credit_lock(user_id)?;
        let _guard = lock
            .lock()
            .map_err(|_| StoreError::Database("credit lock poisoned".into()))?;

        if let Some(account) = self.read_credits(user_id)? {
            return Ok(account);
        }

        let account = CreditAccount::new(*user_id);
        self.write_credits(&account)?;

        tracing::debug!(user_id = %user_id, credits = account.credits, "Ledger record created");

        Ok(account)
    }

    fn consume_credit(&self, user_id: &UserId) -> Result<ConsumeOutcome> {
        let lock = self.credit_lock(user_id)?;
        let _guard = lock
            .lock()
            .map_err(|_| StoreError::Database("credit lock poisoned".into()))?;

        // Consume never creates the ledger record; creation belongs to
        // get_or_init_credits and add_credits.
        let Some(mut account) = self.read_credits(user_id)? else {
            return Ok(ConsumeOutcome::Exhausted);
        };

        if account.credits == 0 {
            return Ok(ConsumeOutcome::Exhausted);
        }

        account.credits -= 1;
        account.updated_at = chrono::Utc::now();
        self.write_credits(&account)?;

        Ok(ConsumeOutcome::Consumed(account))
    }

    fn add_credits(
        &self,
        user_id: &UserId,
        amount: i64,
        plan: Plan,
        transaction: &PaymentTransaction,
    ) -> Result<CreditAccount> {
        let lock = self.credit_lock(user_id)?;
        let _guard = lock
            .lock()
            .map_err(|_| StoreError::Database("credit lock poisoned".into()))?;

        let now = chrono::Utc::now();
        let account = match self.read_credits(user_id)? {
            Some(mut account) => {
                account.credits += amount;
                account.plan = plan;
                account.updated_at = now;
                account
            }
            None => {
                let mut account = CreditAccount::new(*user_id);
                account.credits = SIGNUP_CREDITS + amount;
                account.plan = plan;
                account
            }
        };

        let cf_credits = self.cf(cf::CREDITS)?;
        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let cf_tx_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;

        let credit_key = keys::credit_key(user_id);
        let tx_key = keys::transaction_key(&transaction.id);
        let user_tx_key = keys::user_transaction_key(user_id, &transaction.id);

        let credit_value = Self::serialize(&account)?;
        let tx_value = Self::serialize(transaction)?;

        // Ledger update and transaction record commit together.
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_credits, &credit_key, &credit_value);
        batch.put_cf(&cf_tx, &tx_key, &tx_value);
        batch.put_cf(&cf_tx_by_user, &user_tx_key, []);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(account)
    }

    // =========================================================================
    // File Metadata Operations
    // =========================================================================

    fn put_file(&self, record: &FileRecord) -> Result<()> {
        let cf_files = self.cf(cf::FILES)?;
        let cf_by_owner = self.cf(cf::FILES_BY_OWNER)?;

        let file_key = keys::file_key(&record.id);
        let owner_key = keys::owner_file_key(&record.owner, &record.id);
        let value = Self::serialize(record)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_files, &file_key, &value);
        batch.put_cf(&cf_by_owner, &owner_key, []); // Index entry (empty value)

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_file(&self, file_id: &FileId) -> Result<Option<FileRecord>> {
        let cf = self.cf(cf::FILES)?;
        let key = keys::file_key(file_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn delete_file(&self, file_id: &FileId) -> Result<()> {
        let record = self.get_file(file_id)?.ok_or_else(|| StoreError::NotFound {
            entity: "file",
            id: file_id.to_string(),
        })?;

        let cf_files = self.cf(cf::FILES)?;
        let cf_by_owner = self.cf(cf::FILES_BY_OWNER)?;

        let file_key = keys::file_key(file_id);
        let owner_key = keys::owner_file_key(&record.owner, file_id);

        let mut batch = WriteBatch::default();
        batch.delete_cf(&cf_files, &file_key);
        batch.delete_cf(&cf_by_owner, &owner_key);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn list_files_by_owner(&self, owner: &UserId) -> Result<Vec<FileRecord>> {
        let cf_by_owner = self.cf(cf::FILES_BY_OWNER)?;
        let prefix = keys::owner_files_prefix(owner);

        let iter = self.db.iterator_cf(
            &cf_by_owner,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut records = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            let file_id = keys::extract_file_id_from_owner_key(&key);
            if let Some(record) = self.get_file(&file_id)? {
                records.push(record);
            }
        }

        Ok(records)
    }

    // =========================================================================
    // Payment Transaction Operations
    // =========================================================================

    fn put_transaction(&self, transaction: &PaymentTransaction) -> Result<()> {
        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let cf_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;

        let tx_key = keys::transaction_key(&transaction.id);
        let user_tx_key = keys::user_transaction_key(&transaction.user_id, &transaction.id);
        let value = Self::serialize(transaction)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_tx, &tx_key, &value);
        batch.put_cf(&cf_by_user, &user_tx_key, []); // Index entry (empty value)

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn list_transactions_by_user(&self, user_id: &UserId) -> Result<Vec<PaymentTransaction>> {
        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let cf_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;
        let prefix = keys::user_transactions_prefix(user_id);

        let iter = self.db.iterator_cf(
            &cf_by_user,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        // ULIDs are time-ordered, so the index walk yields oldest first.
        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            all_keys.push(key.to_vec());
        }

        // Reverse to get newest first.
        all_keys.reverse();

        let mut transactions = Vec::new();
        for key in all_keys {
            let tx_id = keys::extract_transaction_id_from_user_key(&key);
            let tx_key = keys::transaction_key(&tx_id);

            if let Some(data) = self
                .db
                .get_cf(&cf_tx, tx_key)
                .map_err(|e| StoreError::Database(e.to_string()))?
            {
                transactions.push(Self::deserialize(&data)?);
            }
        }

        Ok(transactions)
    }

    // =========================================================================
    // Profile Operations
    // =========================================================================

    fn put_profile(&self, profile: &Profile) -> Result<()> {
        let cf = self.cf(cf::PROFILES)?;
        let key = keys::profile_key(&profile.user_id);
        let value = Self::serialize(profile)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>> {
        let cf = self.cf(cf::PROFILES)?;
        let key = keys::profile_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn profile_exists(&self, user_id: &UserId) -> Result<bool> {
        Ok(self.get_profile(user_id)?.is_some())
    }

    fn delete_profile(&self, user_id: &UserId) -> Result<()> {
        if self.get_profile(user_id)?.is_none() {
            return Err(StoreError::NotFound {
                entity: "profile",
                id: user_id.to_string(),
            });
        }

        let cf = self.cf(cf::PROFILES)?;
        let key = keys::profile_key(user_id);

        self.db
            .delete_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn sample_file(owner: UserId, name: &str) -> FileRecord {
        FileRecord::new(
            format!("{}.txt", uuid::Uuid::new_v4()),
            name.to_string(),
            1024,
            "text/plain".to_string(),
            owner,
        )
    }

    fn sample_transaction(user_id: UserId) -> PaymentTransaction {
        PaymentTransaction::success(
            user_id,
            "premium".into(),
            500,
            "INR".into(),
            500,
            "jane@example.com".into(),
            "Jane Doe".into(),
        )
    }

    #[test]
    fn ledger_lazy_init_is_idempotent() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        let first = store.get_or_init_credits(&user_id).unwrap();
        assert_eq!(first.credits, 5);
        assert_eq!(first.plan, Plan::Basic);

        let second = store.get_or_init_credits(&user_id).unwrap();
        assert_eq!(second.credits, 5);
        assert_eq!(second.created_at, first.created_at);
    }

    #[test]
    fn consume_without_record_is_a_no_op() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        assert!(!store.consume_credit(&user_id).unwrap().is_consumed());

        // Nothing was created or spent: first init still yields the default.
        assert_eq!(store.get_or_init_credits(&user_id).unwrap().credits, 5);
    }

    #[test]
    fn consume_decrements_until_exhausted() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        // Default of 5 credits.
        store.get_or_init_credits(&user_id).unwrap();
        for expected in (0..5).rev() {
            match store.consume_credit(&user_id).unwrap() {
                ConsumeOutcome::Consumed(account) => assert_eq!(account.credits, expected),
                ConsumeOutcome::Exhausted => panic!("exhausted too early"),
            }
        }

        // At zero the ledger is untouched.
        assert!(!store.consume_credit(&user_id).unwrap().is_consumed());
        assert_eq!(store.get_or_init_credits(&user_id).unwrap().credits, 0);
    }

    #[test]
    fn concurrent_consume_never_loses_updates() {
        let (store, _dir) = create_test_store();
        let store = Arc::new(store);
        let user_id = UserId::generate();

        let tx = sample_transaction(user_id);
        store.add_credits(&user_id, 95, Plan::Premium, &tx).unwrap(); // 5 + 95 = 100

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for _ in 0..10 {
                    store.consume_credit(&user_id).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get_or_init_credits(&user_id).unwrap().credits, 0);
    }

    #[test]
    fn add_credits_overwrites_plan_and_records_transaction() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        // Existing record: 5 credits, Basic.
        store.get_or_init_credits(&user_id).unwrap();

        let tx = sample_transaction(user_id);
        let account = store.add_credits(&user_id, 500, Plan::Premium, &tx).unwrap();
        assert_eq!(account.credits, 505);
        assert_eq!(account.plan, Plan::Premium);

        let transactions = store.list_transactions_by_user(&user_id).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].credits_added, 500);
    }

    #[test]
    fn add_credits_without_record_includes_signup_default() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        let tx = sample_transaction(user_id);
        let account = store.add_credits(&user_id, 500, Plan::Premium, &tx).unwrap();

        assert_eq!(account.credits, 505); // signup 5 + 500
        assert_eq!(account.plan, Plan::Premium);
    }

    #[test]
    fn file_crud_and_owner_index() {
        let (store, _dir) = create_test_store();
        let owner = UserId::generate();
        let other = UserId::generate();

        let a = sample_file(owner, "a.txt");
        let b = sample_file(owner, "b.txt");
        let c = sample_file(other, "c.txt");
        store.put_file(&a).unwrap();
        store.put_file(&b).unwrap();
        store.put_file(&c).unwrap();

        let retrieved = store.get_file(&a.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "a.txt");

        let mine = store.list_files_by_owner(&owner).unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|f| f.owner == owner));

        store.delete_file(&a.id).unwrap();
        assert!(store.get_file(&a.id).unwrap().is_none());
        assert_eq!(store.list_files_by_owner(&owner).unwrap().len(), 1);

        // Deleting again is NotFound.
        assert!(matches!(
            store.delete_file(&a.id),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn transactions_list_newest_first() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        let tx1 = sample_transaction(user_id);
        store.put_transaction(&tx1).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(2)); // Ensure different ULIDs

        let mut tx2 = sample_transaction(user_id);
        tx2.plan_id = "ultimate".into();
        store.put_transaction(&tx2).unwrap();

        let transactions = store.list_transactions_by_user(&user_id).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].plan_id, "ultimate"); // Newest first
        assert_eq!(transactions[1].plan_id, "premium");
    }

    #[test]
    fn profile_crud() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        assert!(!store.profile_exists(&user_id).unwrap());

        let profile = Profile {
            user_id,
            email: "jane@example.com".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            photo_url: None,
            created_at: chrono::Utc::now(),
        };
        store.put_profile(&profile).unwrap();

        assert!(store.profile_exists(&user_id).unwrap());
        let retrieved = store.get_profile(&user_id).unwrap().unwrap();
        assert_eq!(retrieved.email, "jane@example.com");

        store.delete_profile(&user_id).unwrap();
        assert!(!store.profile_exists(&user_id).unwrap());
        assert!(matches!(
            store.delete_profile(&user_id),
            Err(StoreError::NotFound { .. })
        ));
    }
}
