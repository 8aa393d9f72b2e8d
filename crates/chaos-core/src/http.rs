//! Blocking HTTP helper
//!
//! A thin layer over [`reqwest::blocking`] with browser-like default headers.
//! Non-2xx responses are returned as results, not errors; only transport
//! failures become [`Error::Http`](crate::Error::Http). Nothing is retried.

use crate::config::HttpConfig;
use crate::io::{to_byte_array, DEFAULT_BUFFER_SIZE};
use crate::Result;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use std::collections::BTreeMap;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_4) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/81.0.4044.129 Safari/537.36";

/// Header or parameter map, kept ordered so requests are reproducible
pub type Params = BTreeMap<String, String>;

/// How `post` encodes its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Form,
    Json,
}

/// Status, headers and decoded body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResult {
    pub status: u16,
    pub headers: Params,
    pub body: String,
}

impl HttpResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn from_response(response: Response) -> Result<Self> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text()?;
        trace!(status, body_len = body.len(), "Received response");
        Ok(Self {
            status,
            headers,
            body,
        })
    }
}

/// Browser-like headers sent by the shorthand methods
pub fn default_headers() -> Params {
    let mut headers = Params::new();
    headers.insert("Cache-Control".to_string(), "no-cache".to_string());
    headers.insert("Accept".to_string(), "*/*".to_string());
    headers.insert("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string());
    headers
}

/// Blocking request client
#[derive(Debug, Clone)]
pub struct HttpRequestClient {
    client: Client,
    headers: Params,
}

impl HttpRequestClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .build()?;

        let mut headers = default_headers();
        headers.insert("User-Agent".to_string(), config.user_agent.clone());
        headers.extend(config.headers.iter().map(|(k, v)| (k.clone(), v.clone())));

        Ok(Self { client, headers })
    }

    /// Headers used when the caller does not supply any
    pub fn headers(&self) -> &Params {
        &self.headers
    }

    pub fn status_code(&self, url: &str) -> Result<u16> {
        Ok(self.get_result(url, &self.headers)?.status)
    }

    /// Whether `url` answers a GET with exactly 200
    pub fn judge_url(&self, url: &str) -> Result<bool> {
        Ok(self.status_code(url)? == 200)
    }

    /// Time between sending a GET and receiving the response head
    pub fn ping(&self, url: &str) -> Result<Duration> {
        let request = with_headers(self.client.get(url), &self.headers);
        let started = Instant::now();
        let response = request.send()?;
        let elapsed = started.elapsed();
        debug!(url, status = response.status().as_u16(), ?elapsed, "Ping");
        Ok(elapsed)
    }

    pub fn get(&self, url: &str) -> Result<String> {
        self.get_with_headers(url, &self.headers)
    }

    pub fn get_with_headers(&self, url: &str, headers: &Params) -> Result<String> {
        Ok(self.get_result(url, headers)?.body)
    }

    pub fn get_result(&self, url: &str, headers: &Params) -> Result<HttpResult> {
        debug!(url, "GET");
        self.execute(with_headers(self.client.get(url), headers))
    }

    /// POST `params` as a form or a JSON object
    pub fn post(&self, url: &str, params: &Params, headers: &Params, body_type: BodyType) -> Result<String> {
        debug!(url, ?body_type, "POST");
        let request = with_headers(self.client.post(url), headers);
        let request = match body_type {
            BodyType::Form => request.form(params),
            BodyType::Json => request.json(params),
        };
        Ok(self.execute(request)?.body)
    }

    pub fn post_form(&self, url: &str, params: &Params, headers: &Params) -> Result<String> {
        self.post(url, params, headers, BodyType::Form)
    }

    /// POST a raw JSON document
    pub fn post_json(&self, url: &str, json: &str, headers: &Params) -> Result<String> {
        debug!(url, "POST json");
        Ok(self.execute(json_request(self.client.post(url), json, headers))?.body)
    }

    /// POST either form parameters or a JSON document, never both
    ///
    /// Returns `None` when both or neither are supplied. A blank JSON string
    /// counts as absent.
    pub fn post_result(
        &self,
        url: &str,
        params: Option<&Params>,
        json: Option<&str>,
        headers: &Params,
    ) -> Result<Option<HttpResult>> {
        let params = params.filter(|p| !p.is_empty());
        let json = json.filter(|j| !j.trim().is_empty());
        match (params, json) {
            (Some(params), None) => {
                let request = with_headers(self.client.post(url), headers).form(params);
                self.execute(request).map(Some)
            }
            (None, Some(json)) => self.execute(json_request(self.client.post(url), json, headers)).map(Some),
            _ => Ok(None),
        }
    }

    pub fn put(&self, url: &str, params: &Params, headers: &Params) -> Result<String> {
        Ok(self.put_result(url, params, headers)?.body)
    }

    pub fn put_result(&self, url: &str, params: &Params, headers: &Params) -> Result<HttpResult> {
        debug!(url, "PUT");
        self.execute(with_headers(self.client.put(url), headers).form(params))
    }

    pub fn delete(&self, url: &str, headers: &Params) -> Result<()> {
        self.delete_result(url, headers)?;
        Ok(())
    }

    pub fn delete_result(&self, url: &str, headers: &Params) -> Result<HttpResult> {
        debug!(url, "DELETE");
        self.execute(with_headers(self.client.delete(url), headers))
    }

    /// Multipart upload of a file under `field`
    pub fn upload_file(&self, url: &str, headers: &Params, field: &str, path: &Path) -> Result<String> {
        self.upload_file_with_params(url, headers, &Params::new(), field, path)
    }

    /// Multipart upload of a file under `field` alongside plain text `params`
    pub fn upload_file_with_params(
        &self,
        url: &str,
        headers: &Params,
        params: &Params,
        field: &str,
        path: &Path,
    ) -> Result<String> {
        debug!(url, path = %path.display(), "Uploading file");
        let form = params
            .iter()
            .fold(Form::new(), |form, (k, v)| form.text(k.clone(), v.clone()))
            .file(field.to_string(), path)?;
        Ok(self.execute(with_headers(self.client.post(url), headers).multipart(form))?.body)
    }

    /// Multipart upload of a stream, read fully before sending, alongside
    /// plain text `params`
    #[allow(clippy::too_many_arguments)]
    pub fn upload_reader<R: Read>(
        &self,
        url: &str,
        headers: &Params,
        params: &Params,
        field: &str,
        content_type: &str,
        file_name: &str,
        reader: R,
    ) -> Result<String> {
        let mut reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, reader);
        let data = to_byte_array(&mut reader)?;
        debug!(url, file_name, len = data.len(), "Uploading stream");

        let part = Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = params
            .iter()
            .fold(Form::new(), |form, (k, v)| form.text(k.clone(), v.clone()))
            .part(field.to_string(), part);

        Ok(self.execute(with_headers(self.client.post(url), headers).multipart(form))?.body)
    }

    fn execute(&self, request: RequestBuilder) -> Result<HttpResult> {
        HttpResult::from_response(request.send()?)
    }
}

fn with_headers(mut request: RequestBuilder, headers: &Params) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }
    request
}

fn json_request(request: RequestBuilder, json: &str, headers: &Params) -> RequestBuilder {
    with_headers(request, headers)
        .header(CONTENT_TYPE, "application/json")
        .body(json.to_string())
}
