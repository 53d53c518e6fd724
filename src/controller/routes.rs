use regex::{Captures, Regex};

use filters::Handle;
use models::ProductId;

/// List of all UI actions with params
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Reload,
    Products,
    Filters,
    TogglePanel,
    Select { key: String, value: String },
    Deselect { key: String, value: String },
    PointerDown { handle: Handle, x: f64 },
    PointerMove { x: f64 },
    PointerUp,
    CaptureLost,
    Drag { handle: Handle, dx: f64 },
    EditPrice { low: String, high: String },
    ClearAll,
    Tick,
    ToggleFavorite(ProductId),
    AddToCart(ProductId),
    RemoveFromCart(ProductId),
}

type ActionBuilder<A> = Box<Fn(&[&str]) -> Option<A>>;

/// Matches input lines against regex patterns, first match wins
pub struct ActionParser<A> {
    routes: Vec<(Regex, ActionBuilder<A>)>,
}

impl<A> Default for ActionParser<A> {
    fn default() -> Self {
        Self { routes: vec![] }
    }
}

impl<A> ActionParser<A> {
    pub fn add_route<F>(&mut self, pattern: &str, builder: F) -> Result<(), ::regex::Error>
    where
        F: Fn() -> A + 'static,
    {
        self.add_route_with_params(pattern, move |_| Some(builder()))
    }

    pub fn add_route_with_params<F>(&mut self, pattern: &str, builder: F) -> Result<(), ::regex::Error>
    where
        F: Fn(&[&str]) -> Option<A> + 'static,
    {
        let regex = Regex::new(pattern)?;
        self.routes.push((regex, Box::new(builder)));
        Ok(())
    }

    /// Action of the first pattern matching `line` whose params are valid
    pub fn test(&self, line: &str) -> Option<A> {
        let line = line.trim();
        self.routes
            .iter()
            .filter_map(|&(ref regex, ref builder)| {
                regex.captures(line).and_then(|captures| {
                    let params = params(&captures);
                    builder(&params[..])
                })
            }).next()
    }
}

fn params<'t>(captures: &Captures<'t>) -> Vec<&'t str> {
    captures.iter().skip(1).filter_map(|group| group.map(|m| m.as_str())).collect()
}

fn parse_handle(name: &str) -> Option<Handle> {
    match name {
        "min" => Some(Handle::Min),
        "max" => Some(Handle::Max),
        _ => None,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|number| number.is_finite())
}

pub fn create_action_parser() -> Result<ActionParser<Action>, ::regex::Error> {
    let mut parser = ActionParser::default();

    // Collection
    parser.add_route(r"^reload$", || Action::Reload)?;
    parser.add_route(r"^products$", || Action::Products)?;
    parser.add_route(r"^filters$", || Action::Filters)?;
    parser.add_route(r"^panel$", || Action::TogglePanel)?;

    // Discrete values
    parser.add_route_with_params(r"^select\s+(\S+)\s+(.+)$", |params| {
        Some(Action::Select {
            key: params[0].to_string(),
            value: params[1].trim().to_string(),
        })
    })?;
    parser.add_route_with_params(r"^deselect\s+(\S+)\s+(.+)$", |params| {
        Some(Action::Deselect {
            key: params[0].to_string(),
            value: params[1].trim().to_string(),
        })
    })?;

    // Price slider
    parser.add_route_with_params(r"^down\s+(min|max)\s+(\S+)$", |params| {
        let handle = parse_handle(params[0])?;
        parse_number(params[1]).map(|x| Action::PointerDown { handle, x })
    })?;
    parser.add_route_with_params(r"^move\s+(\S+)$", |params| parse_number(params[0]).map(|x| Action::PointerMove { x }))?;
    parser.add_route(r"^up$", || Action::PointerUp)?;
    parser.add_route(r"^blur$", || Action::CaptureLost)?;
    parser.add_route_with_params(r"^drag\s+(min|max)\s+(\S+)$", |params| {
        let handle = parse_handle(params[0])?;
        parse_number(params[1]).map(|dx| Action::Drag { handle, dx })
    })?;
    parser.add_route(r"^tick$", || Action::Tick)?;

    // Price fields keep their raw text, unparsable input keeps the current boundary
    parser.add_route_with_params(r"^price\s+(\S+)\s+(\S+)$", |params| {
        Some(Action::EditPrice {
            low: params[0].to_string(),
            high: params[1].to_string(),
        })
    })?;
    parser.add_route(r"^clear$", || Action::ClearAll)?;

    // Product cards
    parser.add_route_with_params(r"^favorite\s+(\S+)$", |params| Some(Action::ToggleFavorite(ProductId::from(params[0]))))?;
    parser.add_route_with_params(r"^cart\s+add\s+(\S+)$", |params| Some(Action::AddToCart(ProductId::from(params[0]))))?;
    parser.add_route_with_params(r"^cart\s+remove\s+(\S+)$", |params| {
        Some(Action::RemoveFromCart(ProductId::from(params[0])))
    })?;

    Ok(parser)
}
