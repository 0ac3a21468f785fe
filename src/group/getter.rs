//! Loader capability
//!
//! The embedding application's source of truth, consulted on a full miss.

use std::future::Future;

use async_trait::async_trait;

use crate::error::BoxError;

// == Getter ==
/// Loads the value for a key from the origin.
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>, BoxError>;
}

// == Getter Fn ==
/// Adapts an async closure `Fn(String) -> Future<Output = Result<Vec<u8>, BoxError>>`
/// into a [`Getter`]. The returned future owns everything it uses.
pub struct GetterFn<F>(pub F);

#[async_trait]
impl<F, Fut> Getter for GetterFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<u8>, BoxError>> + Send + 'static,
{
    async fn get(&self, key: &str) -> Result<Vec<u8>, BoxError> {
        (self.0)(key.to_string()).await
    }
}
