use validator::ValidationErrors;

#[derive(Debug, Clone, Fail)]
pub enum Error {
    #[fail(display = "Not found")]
    NotFound,
    #[fail(display = "Parse error")]
    Parse,
    #[fail(display = "Validation error: {:?}", _0)]
    Validate(ValidationErrors),
    #[fail(display = "Remote store is unreachable")]
    Connection,
    #[fail(display = "Storage error")]
    Storage,
    #[fail(display = "Unknown page: {}", _0)]
    UnknownPage(String),
    #[fail(display = "Unknown action: {}", _0)]
    UnknownAction(String),
}
