//! Membership repos keep favorites and cart of a shopper.
//!
//! A signed-in shopper's lists live in the remote documents service under
//! `users/<user_id>/<list>/<product_id>`. Without a user identity the lists
//! are kept in a local JSON file on the device.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use failure::{Error as FailureError, Fail};
use futures::Future;
use futures_cpupool::CpuPool;
use serde_json;

use errors::Error;
use models::{ListKind, MembershipRecord, ProductId, UserId};
use repos::documents::DocumentsRepo;
use repos::types::{RepoFuture, RepoResult};

pub trait MembershipRepo {
    /// Record of `product_id` in `list`
    fn find(&self, list: ListKind, product_id: &ProductId) -> RepoFuture<Option<MembershipRecord>>;

    /// Creates or replaces the record of its product
    fn save(&self, list: ListKind, record: MembershipRecord) -> RepoFuture<MembershipRecord>;

    /// Removes `product_id` from `list`
    fn remove(&self, list: ListKind, product_id: &ProductId) -> RepoFuture<()>;

    /// Every record of `list`
    fn list(&self, list: ListKind) -> RepoFuture<Vec<MembershipRecord>>;
}

pub type BoxedMembershipRepo = Box<MembershipRepo>;

pub type SharedDocumentsRepo = Arc<DocumentsRepo + Send + Sync>;

/// Remote store for the shopper identified by `user_id`
pub fn membership_repo_for(user_id: Option<UserId>, documents: SharedDocumentsRepo, local: LocalMembershipRepo) -> BoxedMembershipRepo {
    match user_id {
        Some(user_id) => Box::new(UserMembershipRepo::new(documents, user_id)) as BoxedMembershipRepo,
        None => Box::new(local) as BoxedMembershipRepo,
    }
}

fn parse_record(document: serde_json::Value) -> RepoResult<MembershipRecord> {
    serde_json::from_value(document).map_err(|e| e.context(Error::Parse).into())
}

/// Lists of a signed-in shopper in the documents service
pub struct UserMembershipRepo {
    documents: SharedDocumentsRepo,
    user_id: UserId,
}

impl UserMembershipRepo {
    pub fn new(documents: SharedDocumentsRepo, user_id: UserId) -> Self {
        Self { documents, user_id }
    }

    fn list_path(&self, list: ListKind) -> String {
        format!("users/{}/{}", self.user_id, list)
    }

    fn record_path(&self, list: ListKind, product_id: &ProductId) -> String {
        format!("{}/{}", self.list_path(list), product_id)
    }
}

impl MembershipRepo for UserMembershipRepo {
    fn find(&self, list: ListKind, product_id: &ProductId) -> RepoFuture<Option<MembershipRecord>> {
        Box::new(
            self.documents
                .get(&self.record_path(list, product_id))
                .and_then(|document| match document {
                    Some(document) => parse_record(document).map(Some),
                    None => Ok(None),
                }),
        )
    }

    fn save(&self, list: ListKind, record: MembershipRecord) -> RepoFuture<MembershipRecord> {
        let path = self.record_path(list, &record.product_id);
        let document = match serde_json::to_value(&record) {
            Ok(document) => document,
            Err(e) => return Box::new(::futures::future::err(FailureError::from(e.context(Error::Parse)))),
        };
        Box::new(self.documents.set(&path, document).map(move |_| record))
    }

    fn remove(&self, list: ListKind, product_id: &ProductId) -> RepoFuture<()> {
        self.documents.delete(&self.record_path(list, product_id))
    }

    fn list(&self, list: ListKind) -> RepoFuture<Vec<MembershipRecord>> {
        Box::new(
            self.documents
                .list(&self.list_path(list))
                .and_then(|documents| documents.into_iter().map(parse_record).collect::<RepoResult<Vec<_>>>()),
        )
    }
}

/// File layout of the local store
#[derive(Serialize, Deserialize, Debug, Default)]
struct LocalStorage {
    #[serde(default)]
    favorites: BTreeMap<String, MembershipRecord>,
    #[serde(default)]
    cart: BTreeMap<String, MembershipRecord>,
}

impl LocalStorage {
    fn entries(&mut self, list: ListKind) -> &mut BTreeMap<String, MembershipRecord> {
        match list {
            ListKind::Favorites => &mut self.favorites,
            ListKind::Cart => &mut self.cart,
        }
    }
}

/// Unauthenticated single-device store backed by a JSON file
#[derive(Clone)]
pub struct LocalMembershipRepo {
    path: PathBuf,
    cpu_pool: CpuPool,
    lock: Arc<Mutex<()>>,
}

impl LocalMembershipRepo {
    pub fn new<P: AsRef<Path>>(path: P, cpu_pool: CpuPool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cpu_pool,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Runs `f` against the stored lists, writing them back when `write` is set
    fn with_storage<T, F>(&self, write: bool, f: F) -> RepoFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut LocalStorage) -> T + Send + 'static,
    {
        let path = self.path.clone();
        let lock = self.lock.clone();
        Box::new(self.cpu_pool.spawn_fn(move || -> RepoResult<T> {
            let _guard = lock
                .lock()
                .map_err(|_| format_err!("Local storage lock is poisoned").context(Error::Storage))?;
            let mut storage = load_storage(&path)?;
            let result = f(&mut storage);
            if write {
                store_storage(&path, &storage)?;
            }
            Ok(result)
        }))
    }
}

fn load_storage(path: &Path) -> RepoResult<LocalStorage> {
    if !path.exists() {
        return Ok(LocalStorage::default());
    }
    let body = fs::read_to_string(path).map_err(|e| e.context(Error::Storage))?;
    if body.trim().is_empty() {
        return Ok(LocalStorage::default());
    }
    let storage = serde_json::from_str(&body).map_err(|e| e.context(Error::Parse))?;
    Ok(storage)
}

fn store_storage(path: &Path, storage: &LocalStorage) -> RepoResult<()> {
    let body = serde_json::to_string_pretty(storage).map_err(|e| e.context(Error::Parse))?;
    fs::write(path, body).map_err(|e| {
        error!("Could not write local storage {}: {}", path.display(), e);
        e.context(Error::Storage)
    })?;
    Ok(())
}

impl MembershipRepo for LocalMembershipRepo {
    fn find(&self, list: ListKind, product_id: &ProductId) -> RepoFuture<Option<MembershipRecord>> {
        let key = product_id.0.clone();
        self.with_storage(false, move |storage| storage.entries(list).get(&key).cloned())
    }

    fn save(&self, list: ListKind, record: MembershipRecord) -> RepoFuture<MembershipRecord> {
        self.with_storage(true, move |storage| {
            storage.entries(list).insert(record.product_id.0.clone(), record.clone());
            record
        })
    }

    fn remove(&self, list: ListKind, product_id: &ProductId) -> RepoFuture<()> {
        let key = product_id.0.clone();
        self.with_storage(true, move |storage| {
            storage.entries(list).remove(&key);
        })
    }

    fn list(&self, list: ListKind) -> RepoFuture<Vec<MembershipRecord>> {
        self.with_storage(false, move |storage| storage.entries(list).values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::process;

    use super::*;
    use repos::documents::InMemoryDocumentsRepo;

    fn local_repo(name: &str) -> LocalMembershipRepo {
        let path = env::temp_dir().join(format!("storefront-{}-{}.json", name, process::id()));
        let _ = fs::remove_file(&path);
        LocalMembershipRepo::new(path, CpuPool::new(1))
    }

    fn check_repo(repo: &MembershipRepo) {
        let product_id = ProductId::from("7");
        assert_eq!(repo.find(ListKind::Cart, &product_id).wait().unwrap(), None);

        let saved = repo.save(ListKind::Cart, MembershipRecord::new(product_id.clone(), 2)).wait().unwrap();
        assert_eq!(saved.quantity, 2);
        assert_eq!(repo.find(ListKind::Cart, &product_id).wait().unwrap().map(|r| r.quantity), Some(2));
        assert_eq!(repo.find(ListKind::Favorites, &product_id).wait().unwrap(), None);
        assert_eq!(repo.list(ListKind::Cart).wait().unwrap().len(), 1);

        repo.remove(ListKind::Cart, &product_id).wait().unwrap();
        assert!(repo.list(ListKind::Cart).wait().unwrap().is_empty());
    }

    #[test]
    fn test_local_repo() {
        let repo = local_repo("membership-local");
        check_repo(&repo);
    }

    #[test]
    fn test_local_repo_persists_between_instances() {
        let repo = local_repo("membership-persist");
        repo.save(ListKind::Favorites, MembershipRecord::new(ProductId::from("1"), 1))
            .wait()
            .unwrap();
        let reopened = LocalMembershipRepo::new(repo.path.clone(), CpuPool::new(1));
        assert_eq!(reopened.list(ListKind::Favorites).wait().unwrap().len(), 1);
    }

    #[test]
    fn test_user_repo() {
        let documents = Arc::new(InMemoryDocumentsRepo::new());
        let repo = UserMembershipRepo::new(documents.clone(), UserId("u1".to_string()));
        check_repo(&repo);

        repo.save(ListKind::Favorites, MembershipRecord::new(ProductId::from("3"), 1))
            .wait()
            .unwrap();
        assert!(documents.get("users/u1/favorites/3").wait().unwrap().is_some());
    }

    #[test]
    fn test_repo_choice_follows_identity() {
        let documents = Arc::new(InMemoryDocumentsRepo::new());
        let signed_in = membership_repo_for(Some(UserId("u2".to_string())), documents.clone(), local_repo("membership-choice"));
        signed_in
            .save(ListKind::Cart, MembershipRecord::new(ProductId::from("5"), 1))
            .wait()
            .unwrap();
        assert!(documents.get("users/u2/cart/5").wait().unwrap().is_some());

        let anonymous = membership_repo_for(None, documents.clone(), local_repo("membership-anonymous"));
        anonymous
            .save(ListKind::Cart, MembershipRecord::new(ProductId::from("6"), 1))
            .wait()
            .unwrap();
        assert!(documents.get("users/u2/cart/6").wait().unwrap().is_none());
        assert_eq!(anonymous.list(ListKind::Cart).wait().unwrap().len(), 1);
    }
}
