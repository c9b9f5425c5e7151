//! Domain layer for the `AuthN` manager.

pub mod adaptive;
pub mod election;
pub mod error;
pub mod handler_resolver;
pub mod local_client;
pub mod policy;
pub mod populators;
pub mod service;
pub mod transaction;

pub use adaptive::DefaultAdaptiveAuthenticationPolicy;
pub use election::DefaultPrincipalElectionStrategy;
pub use error::DomainError;
pub use handler_resolver::HandlerResolver;
pub use local_client::AuthnManagerLocalClient;
pub use policy::{AuthenticationPolicy, PolicyVerdict};
pub use populators::{
    CacheCredentialsMetadataPopulator, MetadataPopulatorChain, RememberMeMetadataPopulator,
    SuccessfulHandlerMetadataPopulator,
};
pub use service::Service;
pub use transaction::{OutcomeSet, TransactionState, TransactionTracker};
