//! Wire types of the blob store used for client images.

use serde::{Deserialize, Serialize};

/// Metadata returned after a successful upload.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedBlob {
    pub url: String,
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub pathname: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub content_disposition: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteBlobsRequest<'a> {
    pub urls: &'a [&'a str],
}
