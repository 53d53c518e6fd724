//! Storefront shell. This crate is for running a category page from `storefront_lib`.
//! See `storefront_lib` for details.
//!
//! Usage: `storefront [page] [user_id]`

extern crate env_logger;
#[macro_use]
extern crate log;
extern crate storefront_lib;

use std::env;
use std::process;

use storefront_lib::models::UserId;

fn main() {
    // Prepare logger
    env_logger::init();

    let config = storefront_lib::config::Config::new().expect("Can't load app config!");

    let mut args = env::args().skip(1);
    let page = args.next().unwrap_or_else(|| "smartwatches".to_string());
    let user_id = args.next().map(UserId);

    if let Err(e) = storefront_lib::run_shell(config, &page, user_id) {
        error!("Storefront stopped: {}", e);
        for cause in e.iter_causes() {
            error!("Caused by: {}", cause);
        }
        process::exit(1);
    }
}
