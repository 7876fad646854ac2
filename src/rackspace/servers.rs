//! Compute API calls and wire types for servers.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::read_body;
use super::{RackspaceBackend, RackspaceBackendError};
use crate::backend::{CreateRequest, Instance, InstanceStatus};

const PUBLIC_NETWORK: &str = "public";

#[derive(Deserialize)]
struct ServerListResponse {
    servers: Vec<ServerBody>,
}

#[derive(Deserialize)]
struct ServerResponse {
    server: ServerBody,
}

#[derive(Deserialize)]
struct CreatedServerResponse {
    server: CreatedServer,
}

#[derive(Deserialize)]
struct CreatedServer {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Reference {
    #[serde(default)]
    id: String,
}

#[derive(Debug, Deserialize)]
struct Address {
    addr: String,
    #[serde(default)]
    version: u8,
}

/// Server as returned by `GET /servers/detail` and `GET /servers/{id}`.
#[derive(Debug, Deserialize)]
struct ServerBody {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    flavor: Option<Reference>,
    /// An object with an `id`, or an empty string for volume-backed servers.
    #[serde(default)]
    image: serde_json::Value,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    #[serde(rename = "accessIPv4", default)]
    access_ipv4: Option<String>,
    #[serde(default)]
    addresses: BTreeMap<String, Vec<Address>>,
}

impl ServerBody {
    fn primary_ipv4(&self) -> Option<Ipv4Addr> {
        self.access_ipv4
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .or_else(|| self.public_ipv4())
    }

    fn public_ipv4(&self) -> Option<Ipv4Addr> {
        self.addresses
            .get(PUBLIC_NETWORK)?
            .iter()
            .filter(|address| address.version == 4)
            .find_map(|address| address.addr.parse().ok())
    }
}

impl From<ServerBody> for Instance {
    fn from(value: ServerBody) -> Self {
        let address = value.primary_ipv4();
        let image_id = value
            .image
            .get("id")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_owned();
        Self {
            id: value.id,
            name: value.name,
            flavor_id: value.flavor.map(|flavor| flavor.id).unwrap_or_default(),
            image_id,
            metadata: value.metadata,
            status: InstanceStatus::from(value.status.as_str()),
            address,
        }
    }
}

#[derive(Serialize)]
struct CreateServerBody<'a> {
    server: NewServer<'a>,
}

#[derive(Serialize)]
struct NewServer<'a> {
    name: &'a str,
    #[serde(rename = "imageRef")]
    image_ref: &'a str,
    #[serde(rename = "flavorRef")]
    flavor_ref: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    personality: Vec<Personality<'a>>,
}

#[derive(Serialize)]
struct Personality<'a> {
    path: &'a str,
    contents: String,
}

impl<'a> From<&'a CreateRequest> for CreateServerBody<'a> {
    fn from(request: &'a CreateRequest) -> Self {
        Self {
            server: NewServer {
                name: &request.name,
                image_ref: &request.image,
                flavor_ref: &request.flavor,
                metadata: Some(&request.metadata).filter(|metadata| !metadata.is_empty()),
                key_name: request.key_name.as_deref(),
                personality: request
                    .files
                    .iter()
                    .map(|file| Personality {
                        path: &file.path,
                        contents: STANDARD.encode(&file.contents),
                    })
                    .collect(),
            },
        }
    }
}

impl RackspaceBackend {
    pub(super) async fn list_servers(&self) -> Result<Vec<Instance>, RackspaceBackendError> {
        let request = self.client.get(self.url("servers/detail"));
        let body = read_body(self.authorised(request).send().await?).await?;
        let parsed: ServerListResponse = serde_json::from_str(&body)?;
        debug!(count = parsed.servers.len(), "listed servers");
        Ok(parsed.servers.into_iter().map(Instance::from).collect())
    }

    pub(super) async fn get_server(&self, id: &str) -> Result<Instance, RackspaceBackendError> {
        let request = self.client.get(self.url(&format!("servers/{id}")));
        let body = read_body(self.authorised(request).send().await?).await?;
        let parsed: ServerResponse = serde_json::from_str(&body)?;
        Ok(parsed.server.into())
    }

    pub(super) async fn create_server(
        &self,
        request: &CreateRequest,
    ) -> Result<Instance, RackspaceBackendError> {
        let payload = CreateServerBody::from(request);
        let http_request = self.client.post(self.url("servers")).json(&payload);
        let body = read_body(self.authorised(http_request).send().await?).await?;
        let created: CreatedServerResponse = serde_json::from_str(&body)?;
        debug!(instance_id = %created.server.id, "create accepted");
        self.get_server(&created.server.id).await
    }

    pub(super) async fn delete_server(&self, id: &str) -> Result<(), RackspaceBackendError> {
        let request = self.client.delete(self.url(&format!("servers/{id}")));
        read_body(self.authorised(request).send().await?).await?;
        Ok(())
    }
}
