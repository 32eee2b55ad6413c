// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::{
    check_inputs, AssertionEncoder, PlayPublisherClient, PublishOutcome, PublisherConfig,
    ServiceAccountKey,
};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Google Play AAB uploader.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Path to service account key file.
    #[clap(long)]
    pub key_path: PathBuf,
    /// Package name of an app.
    #[clap(long)]
    pub package_name: String,
    /// Path to app bundle file.
    #[clap(long)]
    pub aab_path: PathBuf,
}

impl Args {
    /// Upload the bundle and commit it as the pending release.
    ///
    /// If the upload or commit fails the edit is left uncommitted and expires on its own.
    pub fn run(self, config: PublisherConfig) -> Result<PublishOutcome> {
        check_inputs(&self.key_path, &self.aab_path)?;

        let client = PlayPublisherClient::new(config)?;
        let package_name = self.package_name.as_str();

        println!("obtaining access token...");
        let key = ServiceAccountKey::from_json_path(&self.key_path)?;
        log::debug!(
            "loaded service account key for project {}",
            key.project_id().unwrap_or("unknown")
        );
        let encoder = AssertionEncoder::try_from(key)?;
        log::debug!("signing as {}", encoder.issuer());
        let token = client.obtain_access_token(&encoder)?;
        println!("obtained access_token: {token:?}");

        println!("obtaining edit_id...");
        let edit = client.create_edit(&token, package_name)?;
        if let Some(expiry) = &edit.expiry_time_seconds {
            log::debug!("edit {} expires at {}", edit.id, expiry);
        }
        let edit_id = edit.id;
        println!("obtained edit_id='{edit_id}'");

        println!("uploading aab...");
        let bundle = client.upload_bundle_path(&token, package_name, &edit_id, &self.aab_path)?;
        println!(
            "successfully uploaded aab: version_code={}, sha256='{}'",
            bundle.version_code, bundle.sha256
        );

        println!("committing edit_id='{edit_id}'...");
        client.commit_edit(&token, package_name, &edit_id)?;
        println!("committed edit_id='{edit_id}'");

        println!("done");

        Ok(PublishOutcome {
            edit_id,
            version_code: bundle.version_code,
            sha256: bundle.sha256,
        })
    }
}
