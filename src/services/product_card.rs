//! Product card service, marks products as favorites and keeps the cart
//! of the current shopper. Every change is published through `StoreState`.
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use failure::Error as FailureError;
use futures::Future;

use models::{ListKind, MembershipRecord, Product, ProductCard, ProductId};
use repos::{BoxedMembershipRepo, MembershipRepo};
use services::observable::Observable;
use services::types::ServiceFuture;

/// Favorites and cart as last known to the UI
#[derive(Clone, Debug, Default)]
pub struct StoreState {
    pub favorites: Observable<BTreeSet<ProductId>>,
    pub cart: Observable<BTreeMap<ProductId, u32>>,
}

impl StoreState {
    pub fn new() -> Self {
        Self::default()
    }
}

pub trait ProductCardService {
    /// Reads favorites and cart from the store
    fn load(&self) -> ServiceFuture<()>;
    /// Card of `product` with its current markers
    fn card(&self, product: &Product) -> ProductCard;
    /// Adds or removes `product_id` from favorites, returns whether it is a favorite now
    fn toggle_favorite(&self, product_id: &ProductId) -> ServiceFuture<bool>;
    /// Puts one more item of `product_id` into the cart, returns the new quantity
    fn add_to_cart(&self, product_id: &ProductId) -> ServiceFuture<u32>;
    /// Removes `product_id` from the cart
    fn remove_from_cart(&self, product_id: &ProductId) -> ServiceFuture<()>;
}

pub struct ProductCardServiceImpl {
    repo: Rc<MembershipRepo>,
    store_state: StoreState,
}

impl ProductCardServiceImpl {
    pub fn new(repo: BoxedMembershipRepo, store_state: StoreState) -> Self {
        Self {
            repo: Rc::from(repo),
            store_state,
        }
    }

    pub fn store_state(&self) -> &StoreState {
        &self.store_state
    }
}

impl ProductCardService for ProductCardServiceImpl {
    fn load(&self) -> ServiceFuture<()> {
        let store_state = self.store_state.clone();
        Box::new(
            self.repo
                .list(ListKind::Favorites)
                .join(self.repo.list(ListKind::Cart))
                .map(move |(favorites, cart)| {
                    debug!("Loaded {} favorites and {} cart records", favorites.len(), cart.len());
                    store_state
                        .favorites
                        .set(favorites.into_iter().map(|record| record.product_id).collect());
                    store_state
                        .cart
                        .set(cart.into_iter().map(|record| (record.product_id, record.quantity)).collect());
                }).map_err(|e| FailureError::from(e.context("Service ProductCard, load endpoint error occured."))),
        )
    }

    fn card(&self, product: &Product) -> ProductCard {
        let is_favorite = self.store_state.favorites.get().contains(&product.id);
        let cart_quantity = self.store_state.cart.get().get(&product.id).cloned().unwrap_or(0);
        ProductCard {
            product: product.clone(),
            is_favorite,
            cart_quantity,
        }
    }

    fn toggle_favorite(&self, product_id: &ProductId) -> ServiceFuture<bool> {
        let repo = self.repo.clone();
        let store_state = self.store_state.clone();
        let product_id = product_id.clone();
        Box::new(
            self.repo
                .find(ListKind::Favorites, &product_id)
                .and_then(move |existing| -> ServiceFuture<bool> {
                    match existing {
                        Some(_) => Box::new(repo.remove(ListKind::Favorites, &product_id).map(move |_| {
                            store_state.favorites.update(|favorites| {
                                favorites.remove(&product_id);
                            });
                            false
                        })),
                        None => Box::new(
                            repo.save(ListKind::Favorites, MembershipRecord::new(product_id, 1))
                                .map(move |record| {
                                    store_state.favorites.update(|favorites| {
                                        favorites.insert(record.product_id);
                                    });
                                    true
                                }),
                        ),
                    }
                }).map_err(|e| FailureError::from(e.context("Service ProductCard, toggle_favorite endpoint error occured."))),
        )
    }

    fn add_to_cart(&self, product_id: &ProductId) -> ServiceFuture<u32> {
        let repo = self.repo.clone();
        let store_state = self.store_state.clone();
        let product_id = product_id.clone();
        Box::new(
            self.repo
                .find(ListKind::Cart, &product_id)
                .and_then(move |existing| {
                    let record = match existing {
                        Some(record) => MembershipRecord {
                            quantity: record.quantity + 1,
                            ..record
                        },
                        None => MembershipRecord::new(product_id, 1),
                    };
                    repo.save(ListKind::Cart, record)
                }).map(move |record| {
                    let quantity = record.quantity;
                    store_state.cart.update(|cart| {
                        cart.insert(record.product_id, quantity);
                    });
                    quantity
                }).map_err(|e| FailureError::from(e.context("Service ProductCard, add_to_cart endpoint error occured."))),
        )
    }

    fn remove_from_cart(&self, product_id: &ProductId) -> ServiceFuture<()> {
        let store_state = self.store_state.clone();
        let product_id = product_id.clone();
        let removed = self.repo.remove(ListKind::Cart, &product_id);
        Box::new(
            removed
                .map(move |_| {
                    store_state.cart.update(|cart| {
                        cart.remove(&product_id);
                    });
                }).map_err(|e| FailureError::from(e.context("Service ProductCard, remove_from_cart endpoint error occured."))),
        )
    }
}
