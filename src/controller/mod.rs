//! `Controller` is a top layer that handles the UI action surface:
//! parsing action lines, calling the `Service` layer and forming the outcome
//! shown to the shopper.

pub mod routes;
pub mod types;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use failure::Error as FailureError;
use futures::future;
use futures::Future;

use self::routes::{create_action_parser, Action, ActionParser};
use self::types::ControllerFuture;
use errors::Error;
use filters::Handle;
use models::{FilterOption, FilterState, ProductCard, ProductId};
use services::{CatalogService, LoadState, ProductCardService};

/// Result of one action, serialized for the shell
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Products { products: Vec<ProductCard> },
    Filters {
        panel_open: bool,
        options: Vec<FilterOption>,
        state: FilterState,
    },
    Panel { open: bool },
    Slider { low: f64, high: f64, dragging: bool },
    Favorite { product_id: ProductId, is_favorite: bool },
    Cart { product_id: ProductId, quantity: u32 },
}

/// Controller handles action parsing and calling `Service` layer
pub struct ControllerImpl {
    catalog: Rc<RefCell<CatalogService>>,
    cards: Rc<ProductCardService>,
    action_parser: Rc<ActionParser<Action>>,
}

impl ControllerImpl {
    /// Create a new controller based on services
    pub fn new(catalog: CatalogService, cards: Box<ProductCardService>) -> Result<Self, FailureError> {
        let action_parser = create_action_parser().map_err(|e| format_err!("Could not build action parser: {}", e))?;
        Ok(Self {
            catalog: Rc::new(RefCell::new(catalog)),
            cards: Rc::from(cards),
            action_parser: Rc::new(action_parser),
        })
    }

    pub fn catalog(&self) -> Rc<RefCell<CatalogService>> {
        self.catalog.clone()
    }

    pub fn parse(&self, line: &str) -> Result<Action, FailureError> {
        self.action_parser
            .test(line)
            .ok_or_else(|| Error::UnknownAction(line.trim().to_string()).into())
    }

    /// Parses `line` and dispatches the action
    pub fn call(&self, line: &str, now: Instant) -> ControllerFuture<Outcome> {
        match self.parse(line) {
            Ok(action) => self.dispatch(action, now),
            Err(e) => Box::new(future::err(e)),
        }
    }

    /// Handle an action and get future outcome
    pub fn dispatch(&self, action: Action, now: Instant) -> ControllerFuture<Outcome> {
        debug!("Dispatching {:?}", action);
        match action {
            Action::Reload => self.reload(),

            Action::Products => self.products(),

            Action::Filters => {
                let catalog = self.catalog.borrow();
                ready(Outcome::Filters {
                    panel_open: catalog.panel_open(),
                    options: catalog.options().to_vec(),
                    state: catalog.state().clone(),
                })
            }

            Action::TogglePanel => {
                let open = self.catalog.borrow_mut().toggle_filters_panel();
                ready(Outcome::Panel { open })
            }

            Action::Select { key, value } => {
                self.catalog.borrow_mut().select_value(&key, &value);
                self.products()
            }

            Action::Deselect { key, value } => {
                self.catalog.borrow_mut().deselect_value(&key, &value);
                self.products()
            }

            Action::PointerDown { handle, x } => {
                self.catalog.borrow_mut().start_price_drag(handle, x);
                self.slider()
            }

            Action::PointerMove { x } => {
                self.catalog.borrow_mut().move_price_drag(x, now);
                self.slider()
            }

            Action::PointerUp => {
                self.catalog.borrow_mut().end_price_drag();
                self.products()
            }

            Action::CaptureLost => {
                self.catalog.borrow_mut().price_capture_lost();
                self.products()
            }

            Action::Drag { handle, dx } => {
                self.drag(handle, dx, now);
                self.products()
            }

            Action::Tick => {
                if self.catalog.borrow_mut().tick(now) {
                    self.products()
                } else {
                    self.slider()
                }
            }

            Action::EditPrice { low, high } => {
                self.catalog.borrow_mut().edit_price(&low, &high);
                self.products()
            }

            Action::ClearAll => {
                self.catalog.borrow_mut().clear_all();
                self.products()
            }

            Action::ToggleFavorite(product_id) => Box::new(
                self.cards
                    .toggle_favorite(&product_id)
                    .map(move |is_favorite| Outcome::Favorite { product_id, is_favorite }),
            ),

            Action::AddToCart(product_id) => Box::new(
                self.cards
                    .add_to_cart(&product_id)
                    .map(move |quantity| Outcome::Cart { product_id, quantity }),
            ),

            Action::RemoveFromCart(product_id) => Box::new(
                self.cards
                    .remove_from_cart(&product_id)
                    .map(move |_| Outcome::Cart { product_id, quantity: 0 }),
            ),
        }
    }

    fn reload(&self) -> ControllerFuture<Outcome> {
        let catalog = self.catalog.clone();
        let cards = self.cards.clone();
        let load = self.catalog.borrow_mut().begin_load();
        Box::new(load.then(move |result| -> Result<Outcome, FailureError> {
            catalog.borrow_mut().finish_load(result);
            let catalog = catalog.borrow();
            let outcome = match *catalog.load_state() {
                LoadState::Failed(ref message) => Err(format_err!("Could not load {}: {}", catalog.collection(), message)),
                _ => Ok(Outcome::Products {
                    products: visible_cards(&catalog, &*cards),
                }),
            };
            outcome
        }))
    }

    /// Whole drag of `handle` by `dx` pixels, committed on release.
    /// A drag still in progress is released first.
    fn drag(&self, handle: Handle, dx: f64, now: Instant) {
        let mut catalog = self.catalog.borrow_mut();
        if catalog.slider().is_dragging() {
            catalog.end_price_drag();
        }
        catalog.start_price_drag(handle, 0.0);
        catalog.move_price_drag(dx, now);
        catalog.end_price_drag();
    }

    fn products(&self) -> ControllerFuture<Outcome> {
        let catalog = self.catalog.borrow();
        ready(Outcome::Products {
            products: visible_cards(&catalog, &*self.cards),
        })
    }

    fn slider(&self) -> ControllerFuture<Outcome> {
        let catalog = self.catalog.borrow();
        let (low, high) = catalog.slider().values();
        ready(Outcome::Slider {
            low,
            high,
            dragging: catalog.slider().is_dragging(),
        })
    }
}

fn visible_cards(catalog: &CatalogService, cards: &ProductCardService) -> Vec<ProductCard> {
    catalog.visible_products().iter().map(|product| cards.card(product)).collect()
}

fn ready(outcome: Outcome) -> ControllerFuture<Outcome> {
    Box::new(future::ok(outcome))
}
