//! Storefront is the browsing layer of an e-commerce shop: category pages
//! with faceted product filters, product cards and the shopper's favorites and cart.
//! The layered structure of the app is
//!
//! `Application -> Controller -> Service -> Repo`
//!
//! Each layer can throw Error with context or cover occurred error with
//! Error in the context. Errors reaching the shell are printed and the shell
//! keeps reading actions.

extern crate chrono;
extern crate config as config_crate;
#[macro_use]
extern crate failure;
extern crate futures;
extern crate futures_cpupool;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate regex;
extern crate serde;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;
extern crate tokio_core;
extern crate validator;

pub mod config;
pub mod controller;
pub mod errors;
pub mod filters;
pub mod models;
pub mod repos;
pub mod services;

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Instant;

use failure::{Error as FailureError, ResultExt};
use futures_cpupool::CpuPool;
use tokio_core::reactor::Core;

use config::Config;
use controller::ControllerImpl;
use errors::Error;
use filters::SliderSettings;
use models::UserId;
use repos::{membership_repo_for, InMemoryDocumentsRepo, JsonFileProductsRepo, LocalMembershipRepo};
use services::{CatalogService, ProductCardService, ProductCardServiceImpl, StoreState};

/// Runs the page `page_name` of the provided `Config` as an interactive shell:
/// every line read from stdin is one UI action, every outcome is printed as json
pub fn run_shell(config: Config, page_name: &str, user_id: Option<UserId>) -> Result<(), FailureError> {
    // Prepare reactor
    let mut core = Core::new().context(Error::Connection)?;

    let page = config
        .page(page_name)
        .cloned()
        .ok_or_else(|| Error::UnknownPage(page_name.to_string()))?;

    // Prepare CPU pool
    let cpu_pool = CpuPool::new(config.catalog.thread_count);

    // Repos
    let products_repo = JsonFileProductsRepo::new(&config.catalog.data_dir, cpu_pool.clone());
    let local_repo = LocalMembershipRepo::new(&config.storage.local_path, cpu_pool.clone());
    let documents_repo = Arc::new(InMemoryDocumentsRepo::new());
    let membership_repo = membership_repo_for(user_id, documents_repo, local_repo);

    // Services
    let settings = SliderSettings::from(&config.slider);
    let catalog = CatalogService::new(&page, settings, Box::new(products_repo));
    let cards = ProductCardServiceImpl::new(membership_repo, StoreState::new());
    if let Err(e) = core.run(cards.load()) {
        warn!("Favorites and cart are not available: {}", e);
    }

    let controller = ControllerImpl::new(catalog, Box::new(cards))?;
    info!("Page {} shows collection {}", page.name, page.collection);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let lines = vec!["reload".to_string()].into_iter().map(Ok).chain(stdin.lock().lines());
    for line in lines {
        let line = line.context(Error::Connection)?;
        if line.trim().is_empty() {
            continue;
        }
        if line.trim() == "quit" {
            break;
        }
        let mut out = stdout.lock();
        match core.run(controller.call(&line, Instant::now())) {
            Ok(outcome) => {
                let body = serde_json::to_string(&outcome).context(Error::Parse)?;
                writeln!(out, "{}", body).context(Error::Connection)?;
            }
            Err(e) => {
                error!("Action {} failed: {}", line.trim(), e);
                writeln!(out, "error: {}", e).context(Error::Connection)?;
            }
        }
    }

    info!("Shell closed");
    Ok(())
}
