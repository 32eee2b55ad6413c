// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Service account keys.

use {
    crate::{AssertionEncoder, Result},
    anyhow::Context,
    serde::Deserialize,
    std::path::Path,
    thiserror::Error,
};

/// The parts of a Google Cloud service account key file that matter for publishing.
///
/// Key files are the JSON documents downloaded from the Cloud console. Unknown fields
/// are ignored.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Identity of the service account. Issuer of signed assertions.
    client_email: String,

    /// PEM encoded RSA private key.
    private_key: String,

    #[serde(default)]
    project_id: Option<String>,
}

impl ServiceAccountKey {
    /// Construct an instance from serialized JSON.
    pub fn from_json(data: impl AsRef<[u8]>) -> Result<Self> {
        Ok(serde_json::from_slice(data.as_ref())?)
    }

    /// Construct an instance from a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;

        Self::from_json(data)
            .with_context(|| format!("invalid service account key {}", path.display()))
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl TryFrom<ServiceAccountKey> for AssertionEncoder {
    type Error = anyhow::Error;

    fn try_from(value: ServiceAccountKey) -> Result<Self> {
        let parsed = pem::parse(value.private_key.as_bytes()).map_err(|_| InvalidPemPrivateKey)?;

        if !matches!(parsed.tag(), "PRIVATE KEY" | "RSA PRIVATE KEY") {
            return Err(InvalidPemPrivateKey.into());
        }

        Self::from_rsa_pem(value.client_email, value.private_key.as_bytes())
            .context("invalid service account private key")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("invalid PEM formatted private key")]
pub struct InvalidPemPrivateKey;
