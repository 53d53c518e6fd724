//! Catalog service drives one category page: it loads the page's product
//! collection, derives the filter options, keeps the active filter state and
//! the price slider, and recomputes the visible products on every change.
use std::time::Instant;

use failure::Error as FailureError;
use futures::Future;

use config::Page;
use filters::{apply_filters, derive_filters, FilterScope, Handle, PointerCapture, RangeSlider, SliderSettings};
use models::{FilterOption, FilterState, Product, ProductId, PRICE_KEY};
use repos::ProductsRepo;
use services::observable::{Observable, Subscription};

/// Sequence number of a collection fetch
pub type RequestId = u64;

#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
    Idle,
    Loading(RequestId),
    Ready,
    Failed(String),
}

/// Successful fetch, tagged with the request that issued it
#[derive(Clone, Debug)]
pub struct FetchedProducts {
    pub request_id: RequestId,
    pub collection: String,
    pub products: Vec<Product>,
}

/// Failed fetch, tagged with the request that issued it
#[derive(Debug)]
pub struct FetchFailure {
    pub request_id: RequestId,
    pub error: FailureError,
}

pub type LoadFuture = Box<Future<Item = FetchedProducts, Error = FetchFailure>>;

pub struct CatalogService {
    collection: String,
    scope: FilterScope,
    products_repo: Box<ProductsRepo>,
    products: Vec<Product>,
    options: Vec<FilterOption>,
    state: FilterState,
    visible: Observable<Vec<Product>>,
    slider: RangeSlider,
    price_bounds: Option<(f64, f64)>,
    range_initialized: bool,
    panel_open: bool,
    load_state: LoadState,
    latest_request: RequestId,
}

impl CatalogService {
    pub fn new(page: &Page, settings: SliderSettings, products_repo: Box<ProductsRepo>) -> Self {
        Self::with_scope(&page.collection, page.scope(), settings, products_repo)
    }

    pub fn with_scope(collection: &str, scope: FilterScope, settings: SliderSettings, products_repo: Box<ProductsRepo>) -> Self {
        Self {
            collection: collection.to_string(),
            scope,
            products_repo,
            products: vec![],
            options: vec![],
            state: FilterState::new(),
            visible: Observable::new(vec![]),
            slider: RangeSlider::new(0.0, 0.0, settings),
            price_bounds: None,
            range_initialized: false,
            panel_open: false,
            load_state: LoadState::Idle,
            latest_request: 0,
        }
    }

    /// Starts from a previously chosen filter state, e.g. one restored from an earlier session
    pub fn with_state(mut self, state: FilterState) -> Self {
        self.state = state;
        self
    }

    pub fn with_pointer_capture(mut self, capture: Box<PointerCapture>) -> Self {
        self.slider.set_capture(capture);
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == product_id)
    }

    pub fn options(&self) -> &[FilterOption] {
        &self.options
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn slider(&self) -> &RangeSlider {
        &self.slider
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn is_loading(&self) -> bool {
        match self.load_state {
            LoadState::Loading(_) => true,
            _ => false,
        }
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn visible_products(&self) -> Vec<Product> {
        self.visible.get()
    }

    /// Calls `listener` with the visible products after every recomputation
    pub fn subscribe_visible<F: Fn(&Vec<Product>) + 'static>(&self, listener: F) -> Subscription {
        self.visible.subscribe(listener)
    }

    /// Issues a new fetch of the page's collection. Only the completion of the
    /// latest fetch is accepted by `finish_load`.
    pub fn begin_load(&mut self) -> LoadFuture {
        self.latest_request += 1;
        let request_id = self.latest_request;
        let collection = self.collection.clone();
        self.load_state = LoadState::Loading(request_id);
        info!("Loading collection {}, request {}", collection, request_id);

        Box::new(self.products_repo.fetch_products(&collection).then(move |result| match result {
            Ok(products) => Ok(FetchedProducts {
                request_id,
                collection,
                products,
            }),
            Err(e) => Err(FetchFailure {
                request_id,
                error: e
                    .context(format!("Service Catalog, load of collection {} error occured.", collection))
                    .into(),
            }),
        }))
    }

    /// Applies the outcome of a fetch. Returns `false` for outdated requests.
    pub fn finish_load(&mut self, result: Result<FetchedProducts, FetchFailure>) -> bool {
        match result {
            Ok(fetched) => self.accept_products(fetched),
            Err(failure) => self.reject_load(failure),
        }
    }

    fn accept_products(&mut self, fetched: FetchedProducts) -> bool {
        if fetched.request_id != self.latest_request {
            debug!(
                "Discarding products of outdated request {}, latest is {}",
                fetched.request_id, self.latest_request
            );
            return false;
        }
        info!("Loaded {} products of collection {}", fetched.products.len(), fetched.collection);
        self.products = fetched.products;
        self.range_initialized = false;
        self.load_state = LoadState::Ready;
        self.derive();
        true
    }

    fn reject_load(&mut self, failure: FetchFailure) -> bool {
        if failure.request_id != self.latest_request {
            debug!("Discarding failure of outdated request {}: {}", failure.request_id, failure.error);
            return false;
        }
        error!("Could not load collection {}: {}", self.collection, failure.error);
        self.load_state = LoadState::Failed(failure.error.to_string());
        true
    }

    /// Switches the page to another attribute scope. The price range chosen so far is kept.
    pub fn set_scope(&mut self, scope: FilterScope) {
        self.scope = scope;
        self.derive();
    }

    fn derive(&mut self) {
        self.options = derive_filters(&self.products, &self.scope);
        self.state.retain_known(&self.options);
        self.price_bounds = self.options.iter().find(|option| option.key == PRICE_KEY).and_then(|option| option.bounds());
        self.initialize_price_range();
        self.refresh();
    }

    fn initialize_price_range(&mut self) {
        if self.range_initialized {
            return;
        }
        if let Some((min, max)) = self.price_bounds {
            let (low, high) = self.state.init_range(PRICE_KEY, min, max);
            self.slider.rebound(min, max);
            self.slider.set_values(low, high);
            self.range_initialized = true;
        }
    }

    fn refresh(&mut self) {
        let visible: Vec<Product> = apply_filters(&self.products, &self.state).into_iter().cloned().collect();
        debug!("{} of {} products match {:?}", visible.len(), self.products.len(), self.state);
        self.visible.set(visible);
    }

    pub fn toggle_filters_panel(&mut self) -> bool {
        self.panel_open = !self.panel_open;
        self.panel_open
    }

    /// Accepts only values offered by a discrete option of the loaded collection,
    /// anything else leaves the state untouched
    pub fn select_value(&mut self, key: &str, value: &str) -> bool {
        let offered = self
            .options
            .iter()
            .any(|option| option.key == key && !option.is_range() && option.offers(value));
        if !offered {
            debug!("Ignoring selection of {} = {}, no such filter value", key, value);
            return false;
        }
        self.state.select_value(key, value);
        self.refresh();
        true
    }

    pub fn deselect_value(&mut self, key: &str, value: &str) {
        self.state.deselect_value(key, value);
        self.refresh();
    }

    /// Pointer down on a price handle
    pub fn start_price_drag(&mut self, handle: Handle, x: f64) {
        if self.price_bounds.is_some() {
            self.slider.pointer_down(handle, x);
        }
    }

    /// Pointer move during a price drag. The slider shows the new values at
    /// once, the filter state follows once the debounce period is over.
    pub fn move_price_drag(&mut self, x: f64, now: Instant) -> Option<(f64, f64)> {
        // an update that came due before this move goes out first
        self.tick(now);
        self.slider.pointer_move(x, now)
    }

    /// Pointer up anywhere: commits the final range right away
    pub fn end_price_drag(&mut self) -> Option<(f64, f64)> {
        let committed = self.slider.pointer_up();
        if let Some((low, high)) = committed {
            self.commit_range(low, high);
        }
        committed
    }

    /// Capture lost mid-drag, the range reached so far is committed
    pub fn price_capture_lost(&mut self) -> Option<(f64, f64)> {
        let committed = self.slider.capture_lost();
        if let Some((low, high)) = committed {
            self.commit_range(low, high);
        }
        committed
    }

    /// Delivers a debounced slider update whose quiet period is over
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.slider.poll(now) {
            Some((low, high)) => {
                self.commit_range(low, high);
                true
            }
            None => false,
        }
    }

    /// Numeric price fields committed on blur or Enter
    pub fn edit_price(&mut self, low_text: &str, high_text: &str) -> Option<(f64, f64)> {
        self.price_bounds?;
        let (low, high) = self.slider.commit_text(low_text, high_text);
        self.commit_range(low, high);
        Some((low, high))
    }

    /// Drops every discrete selection and resets the price range to the full bounds
    pub fn clear_all(&mut self) {
        self.state.clear_discrete();
        if let Some((min, max)) = self.price_bounds {
            self.slider.set_values(min, max);
            self.state.set_range(PRICE_KEY, min, max);
        }
        self.refresh();
    }

    fn commit_range(&mut self, low: f64, high: f64) {
        self.state.set_range(PRICE_KEY, low, high);
        self.refresh();
    }
}
