pub mod handler;
pub mod resolver;
pub mod services;
pub mod transformer;

pub use handler::AcceptUsersAuthenticationHandler;
pub use resolver::StaticPersonDirectoryResolver;
pub use services::StaticServiceRegistry;
pub use transformer::PrincipalNameTransformer;
