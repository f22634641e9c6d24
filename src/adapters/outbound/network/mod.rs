/// Network adapters for package registry APIs
mod caching_registry_client;
mod http_fetcher;
mod maven_client;
mod npm_client;
mod nuget_client;
mod pypi_client;
mod registry_router;
mod rubygems_client;

pub use caching_registry_client::CachingRegistryClient;
pub use http_fetcher::HttpFetcher;
pub use maven_client::MavenRegistryClient;
pub use npm_client::NpmRegistryClient;
pub use nuget_client::NuGetRegistryClient;
pub use pypi_client::PyPiRegistryClient;
pub use registry_router::RegistryRouter;
pub use rubygems_client::RubyGemsRegistryClient;
