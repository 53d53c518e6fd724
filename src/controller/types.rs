use failure::Error as FailureError;
use futures::future::Future;

pub type ControllerFuture<T> = Box<Future<Item = T, Error = FailureError>>;
