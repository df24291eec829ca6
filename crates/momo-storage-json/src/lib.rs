use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use momo_core::{
    storage::{
        duplicate_category_conflict, record_warnings, sort_newest_first, OwnerSnapshot,
        RecordStore,
    },
    CoreError,
};
use momo_domain::{Budget, OwnerId, Transaction};

pub const SCHEMA_VERSION: u32 = 1;

const FILE_PREFIX: &str = "owner_";
const FILE_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";
/// Longest hex-encoded owner id used verbatim in a file name. Longer ids
/// are shortened to a prefix plus their SHA-256 digest.
const MAX_ENCODED_OWNER: usize = 128;
const DIGEST_PREFIX: usize = 32;
const DIGEST_SEPARATOR: char = '-';

/// On-disk layout of one owner's records.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OwnerDocument {
    schema_version: u32,
    owner_id: OwnerId,
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    budgets: Vec<Budget>,
}

impl OwnerDocument {
    fn empty(owner: &OwnerId) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            owner_id: owner.clone(),
            transactions: Vec::new(),
            budgets: Vec::new(),
        }
    }
}

/// Filesystem-backed JSON persistence: one pretty-printed document per owner.
pub struct JsonRecordStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonRecordStore {
    pub fn new(root: PathBuf) -> Result<Self, CoreError> {
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the owner's document. The file name is the hex encoding of
    /// the owner id, or a hex prefix plus digest when that would be too long
    /// for the filesystem. `load` rejects a document whose stored owner differs.
    pub fn owner_path(&self, owner: &OwnerId) -> PathBuf {
        self.root
            .join(format!("{FILE_PREFIX}{}.{FILE_EXTENSION}", encode_owner(owner)))
    }

    /// Owners that have a document under the root, sorted.
    pub fn list_owners(&self) -> Result<Vec<OwnerId>, CoreError> {
        let mut owners = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION)
            {
                continue;
            }
            let Some(stem) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.strip_prefix(FILE_PREFIX))
            else {
                continue;
            };
            let owner = if stem.contains(DIGEST_SEPARATOR) {
                read_owner_id(&path)
            } else {
                decode_owner(stem)
            };
            let Some(owner) = owner else {
                continue;
            };
            owners.push(owner);
        }
        owners.sort();
        Ok(owners)
    }

    fn load(&self, owner: &OwnerId) -> Result<OwnerDocument, CoreError> {
        let path = self.owner_path(owner);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(OwnerDocument::empty(owner));
            }
            Err(err) => return Err(err.into()),
        };
        let document: OwnerDocument =
            serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
        if document.schema_version > SCHEMA_VERSION {
            return Err(CoreError::Storage(format!(
                "{} uses schema version {}, newest supported is {}",
                path.display(),
                document.schema_version,
                SCHEMA_VERSION
            )));
        }
        if &document.owner_id != owner {
            return Err(CoreError::Storage(format!(
                "{} belongs to `{}`, not `{}`",
                path.display(),
                document.owner_id,
                owner
            )));
        }
        let snapshot = OwnerSnapshot {
            transactions: document.transactions.clone(),
            budgets: document.budgets.clone(),
        };
        for warning in record_warnings(owner, &snapshot) {
            tracing::warn!(owner = %owner, "{warning}");
        }
        tracing::debug!(owner = %owner, path = %path.display(), "loaded owner document");
        Ok(document)
    }

    fn save(&self, document: &OwnerDocument) -> Result<(), CoreError> {
        let path = self.owner_path(&document.owner_id);
        let data = serde_json::to_string_pretty(document)
            .map_err(|err| CoreError::Serde(err.to_string()))?;
        let tmp = tmp_path(&path);
        write_file(&tmp, &data)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Runs a read-modify-write cycle under the store's lock. The closure
    /// returns the result plus whether the document changed.
    fn mutate<T>(
        &self,
        owner: &OwnerId,
        apply: impl FnOnce(&mut OwnerDocument) -> Result<(T, bool), CoreError>,
    ) -> Result<T, CoreError> {
        let _guard = self.lock()?;
        let mut document = self.load(owner)?;
        let (result, dirty) = apply(&mut document)?;
        if dirty {
            document.schema_version = SCHEMA_VERSION;
            self.save(&document)?;
        }
        Ok(result)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, CoreError> {
        self.write_lock
            .lock()
            .map_err(|_| CoreError::Storage("json store lock poisoned".into()))
    }
}

impl RecordStore for JsonRecordStore {
    fn transactions(&self, owner: &OwnerId) -> Result<Vec<Transaction>, CoreError> {
        let mut transactions = self.load(owner)?.transactions;
        sort_newest_first(&mut transactions);
        Ok(transactions)
    }

    fn transaction(&self, owner: &OwnerId, id: Uuid) -> Result<Option<Transaction>, CoreError> {
        Ok(self
            .load(owner)?
            .transactions
            .into_iter()
            .find(|txn| txn.id == id))
    }

    fn insert_transaction(&self, transaction: &Transaction) -> Result<(), CoreError> {
        self.mutate(&transaction.owner_id, |doc| {
            if doc.transactions.iter().any(|txn| txn.id == transaction.id) {
                return Err(CoreError::Conflict(format!(
                    "transaction {} already exists",
                    transaction.id
                )));
            }
            doc.transactions.push(transaction.clone());
            Ok(((), true))
        })
    }

    fn replace_transaction(&self, transaction: &Transaction) -> Result<bool, CoreError> {
        self.mutate(&transaction.owner_id, |doc| {
            match doc.transactions.iter_mut().find(|txn| txn.id == transaction.id) {
                Some(existing) => {
                    *existing = transaction.clone();
                    Ok((true, true))
                }
                None => Ok((false, false)),
            }
        })
    }

    fn delete_transaction(&self, owner: &OwnerId, id: Uuid) -> Result<bool, CoreError> {
        self.mutate(owner, |doc| {
            let before = doc.transactions.len();
            doc.transactions.retain(|txn| txn.id != id);
            let removed = doc.transactions.len() != before;
            Ok((removed, removed))
        })
    }

    fn budgets(&self, owner: &OwnerId) -> Result<Vec<Budget>, CoreError> {
        Ok(self.load(owner)?.budgets)
    }

    fn budget(&self, owner: &OwnerId, id: Uuid) -> Result<Option<Budget>, CoreError> {
        Ok(self
            .load(owner)?
            .budgets
            .into_iter()
            .find(|budget| budget.id == id))
    }

    fn insert_budget(&self, budget: &Budget) -> Result<(), CoreError> {
        self.mutate(&budget.owner_id, |doc| {
            if doc.budgets.iter().any(|b| b.category == budget.category) {
                return Err(duplicate_category_conflict(&budget.owner_id, budget.category));
            }
            doc.budgets.push(budget.clone());
            Ok(((), true))
        })
    }

    fn replace_budget(&self, budget: &Budget) -> Result<bool, CoreError> {
        self.mutate(&budget.owner_id, |doc| {
            if doc
                .budgets
                .iter()
                .any(|b| b.category == budget.category && b.id != budget.id)
            {
                return Err(duplicate_category_conflict(&budget.owner_id, budget.category));
            }
            match doc.budgets.iter_mut().find(|b| b.id == budget.id) {
                Some(existing) => {
                    *existing = budget.clone();
                    Ok((true, true))
                }
                None => Ok((false, false)),
            }
        })
    }

    fn delete_budget(&self, owner: &OwnerId, id: Uuid) -> Result<bool, CoreError> {
        self.mutate(owner, |doc| {
            let before = doc.budgets.len();
            doc.budgets.retain(|b| b.id != id);
            let removed = doc.budgets.len() != before;
            Ok((removed, removed))
        })
    }

    fn snapshot(&self, owner: &OwnerId) -> Result<OwnerSnapshot, CoreError> {
        let document = self.load(owner)?;
        let mut snapshot = OwnerSnapshot {
            transactions: document.transactions,
            budgets: document.budgets,
        };
        sort_newest_first(&mut snapshot.transactions);
        Ok(snapshot)
    }
}

fn encode_owner(owner: &OwnerId) -> String {
    let encoded = hex::encode(owner.as_str());
    if encoded.len() <= MAX_ENCODED_OWNER {
        return encoded;
    }
    let digest = hex::encode(Sha256::digest(owner.as_str().as_bytes()));
    format!("{}{DIGEST_SEPARATOR}{digest}", &encoded[..DIGEST_PREFIX])
}

fn decode_owner(encoded: &str) -> Option<OwnerId> {
    let bytes = hex::decode(encoded).ok()?;
    let raw = String::from_utf8(bytes).ok()?;
    OwnerId::new(raw).ok()
}

/// Owner recorded inside a digest-named document.
fn read_owner_id(path: &Path) -> Option<OwnerId> {
    #[derive(Deserialize)]
    struct Header {
        owner_id: OwnerId,
    }
    let data = fs::read_to_string(path).ok()?;
    serde_json::from_str::<Header>(&data)
        .ok()
        .map(|header| header.owner_id)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    tmp.set_extension(format!("{FILE_EXTENSION}.{TMP_SUFFIX}"));
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<(), CoreError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
