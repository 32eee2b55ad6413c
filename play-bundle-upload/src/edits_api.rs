// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Android Publisher edits API.
//!
//! See also <https://developers.google.com/android-publisher/api-ref/rest/v3/edits>.

use {
    crate::{unix_now, AccessToken, PlayPublisherClient, Result},
    serde::{Deserialize, Serialize},
    std::path::Path,
};

/// Request body for opening an edit.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEditRequest {
    /// UNIX time at which the edit expires, as a decimal string.
    pub expiry_time_seconds: String,
}

/// An edit: a draft set of changes to one application.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEdit {
    pub id: String,
    #[serde(default)]
    pub expiry_time_seconds: Option<String>,
}

/// An app bundle accepted into an edit.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub version_code: i64,
    pub sha256: String,
}

impl PlayPublisherClient {
    fn edits_url(&self, package_name: &str) -> String {
        format!(
            "{}/applications/{package_name}/edits",
            self.config.api_base_url
        )
    }

    fn bundles_url(&self, package_name: &str, edit_id: &str) -> String {
        format!(
            "{}/applications/{package_name}/edits/{edit_id}/bundles",
            self.config.upload_base_url
        )
    }

    fn commit_url(&self, package_name: &str, edit_id: &str) -> String {
        format!("{}/{edit_id}:commit", self.edits_url(package_name))
    }

    /// Open a new edit for a package.
    pub fn create_edit(&self, token: &AccessToken, package_name: &str) -> Result<AppEdit> {
        let body = AppEditRequest {
            expiry_time_seconds: (unix_now() + self.config.edit_lifetime.as_secs()).to_string(),
        };

        let req = self
            .authorize(self.client.post(self.edits_url(package_name)), token)
            .header("Accept", "application/json")
            .json(&body);

        Ok(self.send_request(req)?.json()?)
    }

    /// Upload an app bundle from memory into an edit.
    pub fn upload_bundle(
        &self,
        token: &AccessToken,
        package_name: &str,
        edit_id: &str,
        data: Vec<u8>,
    ) -> Result<Bundle> {
        let req = self
            .authorize(
                self.client.post(self.bundles_url(package_name, edit_id)),
                token,
            )
            .header("Accept", "application/json")
            .header("Content-Type", "application/octet-stream")
            .body(data);

        Ok(self.send_request(req)?.json()?)
    }

    /// Upload the app bundle at `path` into an edit.
    ///
    /// The whole file is read into memory and sent in a single request.
    pub fn upload_bundle_path(
        &self,
        token: &AccessToken,
        package_name: &str,
        edit_id: &str,
        path: &Path,
    ) -> Result<Bundle> {
        let data = std::fs::read(path)?;

        log::debug!("read {} bytes from {}", data.len(), path.display());

        self.upload_bundle(token, package_name, edit_id, data)
    }

    /// Commit an edit, making its changes live.
    pub fn commit_edit(
        &self,
        token: &AccessToken,
        package_name: &str,
        edit_id: &str,
    ) -> Result<()> {
        // An empty body still sends `Content-Length: 0`, which Google requires on POST.
        let req = self
            .authorize(
                self.client.post(self.commit_url(package_name, edit_id)),
                token,
            )
            .body(Vec::<u8>::new());

        self.send_request(req)?;
        Ok(())
    }
}
