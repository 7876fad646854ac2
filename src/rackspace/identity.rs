//! Token authentication and service catalog lookup.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::RackspaceBackendError;
use super::http::fault_message;
use crate::credentials::Credentials;

const PREFERRED_COMPUTE_SERVICE: &str = "cloudServersOpenStack";
const COMPUTE_SERVICE_TYPE: &str = "compute";

/// Auth token sent in the `X-Auth-Token` header.
#[derive(Clone, Eq, PartialEq)]
pub(crate) struct AuthToken(String);

impl AuthToken {
    pub(crate) fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Token plus the compute endpoint selected for the configured region.
#[derive(Clone, Debug)]
pub(crate) struct Session {
    pub(crate) token: AuthToken,
    pub(crate) compute_endpoint: String,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    auth: AuthPayload<'a>,
}

#[derive(Serialize)]
struct AuthPayload<'a> {
    #[serde(rename = "RAX-KSKEY:apiKeyCredentials")]
    api_key_credentials: ApiKeyCredentials<'a>,
}

#[derive(Serialize)]
struct ApiKeyCredentials<'a> {
    username: &'a str,
    #[serde(rename = "apiKey")]
    api_key: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access: Access,
}

#[derive(Deserialize)]
struct Access {
    token: Token,
    #[serde(rename = "serviceCatalog", default)]
    service_catalog: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
struct Token {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    endpoints: Vec<CatalogEndpoint>,
}

#[derive(Debug, Deserialize)]
struct CatalogEndpoint {
    #[serde(default)]
    region: Option<String>,
    #[serde(rename = "publicURL", default)]
    public_url: Option<String>,
}

/// Exchanges the username and API key for a token and picks the compute
/// endpoint for `region`.
pub(crate) async fn authenticate(
    client: &reqwest::Client,
    identity_endpoint: &str,
    credentials: &Credentials,
    region: &str,
) -> Result<Session, RackspaceBackendError> {
    let url = format!("{}/tokens", identity_endpoint.trim_end_matches('/'));
    let payload = TokenRequest {
        auth: AuthPayload {
            api_key_credentials: ApiKeyCredentials {
                username: &credentials.username,
                api_key: credentials.api_key(),
            },
        },
    };
    debug!(%url, username = %credentials.username, "requesting auth token");

    let response = client.post(&url).json(&payload).send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(RackspaceBackendError::Authentication {
            message: fault_message(status, &body),
        });
    }

    let parsed: TokenResponse = serde_json::from_str(&body)?;
    let compute_endpoint = compute_endpoint(&parsed.access.service_catalog, region).ok_or_else(
        || RackspaceBackendError::RegionUnavailable {
            region: region.to_owned(),
        },
    )?;

    Ok(Session {
        token: AuthToken(parsed.access.token.id),
        compute_endpoint,
    })
}

fn compute_endpoint(catalog: &[CatalogEntry], region: &str) -> Option<String> {
    let mut services: Vec<&CatalogEntry> = catalog
        .iter()
        .filter(|entry| entry.kind == COMPUTE_SERVICE_TYPE)
        .collect();
    services.sort_by_key(|entry| entry.name != PREFERRED_COMPUTE_SERVICE);

    services
        .iter()
        .flat_map(|entry| entry.endpoints.iter())
        .filter(|endpoint| {
            endpoint
                .region
                .as_deref()
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(region))
        })
        .find_map(|endpoint| endpoint.public_url.as_deref())
        .map(|url| url.trim_end_matches('/').to_owned())
}
