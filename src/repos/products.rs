//! Products repo, the source of product collections shown on category pages
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use failure::Error as FailureError;
use futures::future;
use futures_cpupool::CpuPool;
use serde_json;

use errors::Error;
use models::Product;
use repos::types::{RepoFuture, RepoResult};

pub trait ProductsRepo {
    /// Fetches every product record of `collection`
    fn fetch_products(&self, collection: &str) -> RepoFuture<Vec<Product>>;
}

/// Reads `<data_dir>/<collection>.json` on the cpu pool
#[derive(Clone)]
pub struct JsonFileProductsRepo {
    data_dir: PathBuf,
    cpu_pool: CpuPool,
}

impl JsonFileProductsRepo {
    pub fn new<P: AsRef<Path>>(data_dir: P, cpu_pool: CpuPool) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            cpu_pool,
        }
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", collection))
    }
}

fn read_collection(path: &Path) -> RepoResult<Vec<Product>> {
    let body = fs::read_to_string(path).map_err(|e| format_err!("Could not read {}: {}", path.display(), e).context(Error::NotFound))?;
    let products =
        serde_json::from_str::<Vec<Product>>(&body).map_err(|e| format_err!("Malformed collection {}: {}", path.display(), e).context(Error::Parse))?;
    Ok(products)
}

impl ProductsRepo for JsonFileProductsRepo {
    fn fetch_products(&self, collection: &str) -> RepoFuture<Vec<Product>> {
        let path = self.collection_path(collection);
        debug!("Fetching products from {}", path.display());
        Box::new(self.cpu_pool.spawn_fn(move || read_collection(&path)))
    }
}

/// Collections kept in memory, for tests and demos
#[derive(Clone, Default)]
pub struct InMemoryProductsRepo {
    collections: HashMap<String, Vec<Product>>,
}

impl InMemoryProductsRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, collection: &str, products: Vec<Product>) -> Self {
        self.collections.insert(collection.to_string(), products);
        self
    }
}

impl ProductsRepo for InMemoryProductsRepo {
    fn fetch_products(&self, collection: &str) -> RepoFuture<Vec<Product>> {
        match self.collections.get(collection) {
            Some(products) => Box::new(future::ok(products.clone())),
            None => Box::new(future::err(FailureError::from(
                format_err!("There is no collection {}", collection).context(Error::NotFound),
            ))),
        }
    }
}
