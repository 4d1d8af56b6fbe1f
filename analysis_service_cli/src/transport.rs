use async_trait::async_trait;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::ServiceConfig;
use crate::error::TransportError;
use crate::upload::UploadFile;

/// The remote analysis service: takes a file, hands back an id, later answers
/// with the result payload for that id.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn upload(&self, file: UploadFile) -> Result<String, TransportError>;

    async fn fetch_results(&self, result_id: &str) -> Result<Value, TransportError>;
}

#[derive(Debug, Deserialize)]
struct UploadAccepted {
    id: String,
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpAnalysisService {
    client: Client,
    base_url: Url,
}

impl HttpAnalysisService {
    pub fn new(config: &ServiceConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: Client::builder().timeout(config.timeout).build()?,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn upload_url(&self) -> Result<Url, TransportError> {
        Ok(self.base_url.join("api/upload/")?)
    }

    fn results_url(&self, result_id: &str) -> Result<Url, TransportError> {
        let mut url = self.base_url.join("api/results/")?;
        url.path_segments_mut()
            .map_err(|_| TransportError::BaseUrl)?
            .pop_if_empty()
            .push(result_id);
        Ok(url)
    }
}

fn ensure_success(res: Response) -> Result<Response, TransportError> {
    if res.status().is_success() {
        Ok(res)
    } else {
        Err(TransportError::Status {
            status: res.status(),
            url: res.url().to_string(),
        })
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn upload(&self, file: UploadFile) -> Result<String, TransportError> {
        let url = self.upload_url()?;
        let mime = file.mime_type();
        let size = file.size();
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name.clone())
            .mime_str(mime)?;
        let form = Form::new().part("file", part);

        debug!("uploading {} ({} bytes) to {}", file.file_name, size, url);
        let res = self.client.post(url).multipart(form).send().await?;
        let accepted = ensure_success(res)?.json::<UploadAccepted>().await?;

        if accepted.id.trim().is_empty() {
            return Err(TransportError::MissingId);
        }
        info!(
            "{} accepted as {} ({})",
            file.file_name,
            accepted.id,
            accepted.message.as_deref().unwrap_or("no message")
        );
        Ok(accepted.id)
    }

    async fn fetch_results(&self, result_id: &str) -> Result<Value, TransportError> {
        let url = self.results_url(result_id)?;
        debug!("fetching results from {}", url);
        let res = self.client.get(url).send().await?;
        Ok(ensure_success(res)?.json::<Value>().await?)
    }
}
