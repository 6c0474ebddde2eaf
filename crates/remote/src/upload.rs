//! Image upload through the hosted edge function.
//!
//! The function re-checks type and size, forwards the image to the image
//! host and answers with `{ "url": ... }`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Deserialize;

use folio_core::backend::ImageUploader;
use folio_core::error::CoreError;
use folio_core::upload::ImageFile;

use crate::client::BackendClient;
use crate::error::RemoteError;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// [`ImageUploader`] posting multipart form data to the edge function.
#[derive(Clone)]
pub struct EdgeUploader {
    client: BackendClient,
}

impl EdgeUploader {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageUploader for EdgeUploader {
    async fn upload(&self, image: &ImageFile) -> Result<String, CoreError> {
        if self.client.access_token().await.is_none() {
            return Err(CoreError::Unauthorized(
                "User must be authenticated to upload images".into(),
            ));
        }

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|_| CoreError::UploadRejected(format!("Invalid content type '{}'", image.content_type)))?;
        let form = Form::new().part("file", part);

        let url = self.client.config().function_url();
        tracing::info!(file = %image.file_name, size = image.size(), "Uploading image");

        let response = self
            .client
            .request(Method::POST, &url)
            .await
            .multipart(form)
            .send()
            .await
            .map_err(RemoteError::from)?;

        match BackendClient::parse_response::<UploadResponse>(response).await {
            Ok(body) => {
                tracing::info!(url = %body.url, "Image uploaded");
                Ok(body.url)
            }
            // The function answers 400 for type, size and missing-file problems.
            Err(RemoteError::Api { status: 400, message }) => Err(CoreError::UploadRejected(message)),
            Err(e) => {
                tracing::error!(error = %e, "Image upload failed");
                Err(e.into())
            }
        }
    }
}
