//! Rackspace Cloud Servers backend.
//!
//! Authenticates against the identity service with an API key, selects the
//! compute endpoint for the configured region from the service catalog, and
//! implements [`Backend`] over the compute servers API.

mod error;
mod http;
mod identity;
mod servers;

use std::time::Duration;

use reqwest::header::ACCEPT;
use tracing::info;

use crate::backend::{Backend, BackendFuture, CreateRequest, Instance};
use crate::config::ProviderSettings;
use crate::credentials::Credentials;
use identity::AuthToken;

pub use error::RackspaceBackendError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Backend that manages servers through the Rackspace compute API.
#[derive(Clone, Debug)]
pub struct RackspaceBackend {
    client: reqwest::Client,
    compute_endpoint: String,
    token: AuthToken,
}

impl RackspaceBackend {
    /// Authenticates with the identity service and binds the backend to the
    /// compute endpoint of the configured region.
    ///
    /// # Errors
    ///
    /// Returns [`RackspaceBackendError::Authentication`] when the credentials
    /// are rejected, [`RackspaceBackendError::RegionUnavailable`] when the
    /// catalog has no compute endpoint for the region, and
    /// [`RackspaceBackendError::Provider`] on transport failures.
    pub async fn connect(
        settings: &ProviderSettings,
        credentials: &Credentials,
    ) -> Result<Self, RackspaceBackendError> {
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        let session = identity::authenticate(
            &client,
            &settings.identity_endpoint,
            credentials,
            &settings.region,
        )
        .await?;
        info!(
            region = %settings.region,
            endpoint = %session.compute_endpoint,
            "authenticated with identity service"
        );

        Ok(Self {
            client,
            compute_endpoint: session.compute_endpoint,
            token: session.token,
        })
    }

    /// Returns the compute endpoint selected for the region.
    #[must_use]
    pub fn compute_endpoint(&self) -> &str {
        self.compute_endpoint.as_str()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.compute_endpoint)
    }

    fn authorised(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(AUTH_TOKEN_HEADER, self.token.as_str())
            .header(ACCEPT, "application/json")
    }
}

impl Backend for RackspaceBackend {
    type Error = RackspaceBackendError;

    fn list(&self) -> BackendFuture<'_, Vec<Instance>, Self::Error> {
        Box::pin(async move { self.list_servers().await })
    }

    fn create<'a>(&'a self, request: &'a CreateRequest) -> BackendFuture<'a, Instance, Self::Error> {
        Box::pin(async move { self.create_server(request).await })
    }

    fn get<'a>(&'a self, id: &'a str) -> BackendFuture<'a, Instance, Self::Error> {
        Box::pin(async move { self.get_server(id).await })
    }

    fn delete<'a>(&'a self, id: &'a str) -> BackendFuture<'a, (), Self::Error> {
        Box::pin(async move { self.delete_server(id).await })
    }
}
