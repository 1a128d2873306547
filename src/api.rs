// API client module: a small blocking HTTP client that talks to the REST
// endpoint of a Kalliope server. Every operation builds one endpoint
// descriptor and funnels it through the same request executor, so the
// whole API surface shares one set of error semantics.

use std::fs::File;
use std::path::Path;

use reqwest::blocking::{multipart, Client, RequestBuilder};
use serde_json::json;
use tracing::debug;

use crate::audio;
use crate::config::Settings;
use crate::error::{Error, Result};

/// API client holding a reqwest blocking client, the base URL of the
/// server and the Basic auth credentials for every call.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Method {
    Get,
    Post,
}

/// One REST call before it is handed to the HTTP client: verb, path and
/// an optional JSON payload. Defined once per operation.
struct Endpoint {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
}

impl Endpoint {
    fn get(path: impl Into<String>) -> Self {
        Endpoint {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Endpoint {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// The server flag suppresses voice output, so it is the negation of the
/// user-facing one: asking for voice output means `no_voice = false`.
fn no_voice(voice: bool) -> bool {
    !voice
}

impl ApiClient {
    /// Create an ApiClient from validated settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(ApiClient {
            client,
            base_url: settings.base_url(),
            username: settings.administration.username.clone(),
            password: settings.administration.password.clone(),
        })
    }

    /// GET `/`: the version of the Kalliope server.
    pub fn version(&self) -> Result<String> {
        self.call(Endpoint::get("/"))
    }

    /// GET `/synapses`: all available synapses and their details.
    pub fn synapses(&self) -> Result<String> {
        self.call(Endpoint::get("/synapses"))
    }

    /// GET `/synapses/{name}`: one synapse and its details.
    pub fn synapse(&self, name: &str) -> Result<String> {
        self.call(Endpoint::get(format!("/synapses/{name}")))
    }

    /// GET `/mute`: whether the server is listening for vocal orders.
    pub fn listening_status(&self) -> Result<String> {
        self.call(Endpoint::get("/mute"))
    }

    /// POST `/synapses/start/id/{name}`: run a synapse by its name.
    pub fn execute_by_name(&self, name: &str, voice: bool) -> Result<String> {
        self.call(Endpoint::post(
            format!("/synapses/start/id/{name}"),
            json!({ "no_voice": no_voice(voice) }),
        ))
    }

    /// POST `/synapses/start/order`: run whichever synapse matches a
    /// textual order.
    pub fn execute_by_order(&self, order: &str, voice: bool) -> Result<String> {
        self.call(Endpoint::post(
            "/synapses/start/order",
            json!({ "order": order, "no_voice": no_voice(voice) }),
        ))
    }

    /// POST `/synapses/start/audio`: run whichever synapse matches the
    /// vocal order in an audio file.
    ///
    /// The file is validated locally first; validation failures propagate
    /// without any network call. On success the file is streamed as a
    /// multipart attachment together with the `no_voice` field and the
    /// detected MIME type.
    pub fn execute_by_audio(&self, path: &Path, voice: bool) -> Result<String> {
        let mime = audio::detect_mime(path)?;

        let file =
            File::open(path).map_err(|_| Error::AudioFileNotFound(path.to_path_buf()))?;
        let length = file
            .metadata()
            .map_err(|_| Error::AudioFileNotFound(path.to_path_buf()))?
            .len();
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("order")
            .to_string();

        let part = multipart::Part::reader_with_length(file, length)
            .file_name(file_name)
            .mime_str(mime)?;
        let form = multipart::Form::new()
            .text("no_voice", no_voice(voice).to_string())
            .part("file", part);

        let url = format!("{}/synapses/start/audio", self.base_url);
        debug!("POST {}", url);
        self.execute(self.client.post(&url).multipart(form))
    }

    /// Build the request described by an endpoint and hand it to the
    /// executor.
    fn call(&self, endpoint: Endpoint) -> Result<String> {
        let url = format!("{}{}", self.base_url, endpoint.path);
        debug!("{:?} {}", endpoint.method, url);

        let request = match endpoint.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        let request = match &endpoint.body {
            Some(payload) => request.json(payload),
            None => request,
        };
        self.execute(request)
    }

    /// Single choke point for every HTTP call: authenticate, send exactly
    /// once, and check that the body parses as JSON. The raw body string
    /// is returned unchanged; this layer never interprets the JSON
    /// structure. The server reports its own failures as JSON bodies, so
    /// the HTTP status is passed through with them.
    fn execute(&self, request: RequestBuilder) -> Result<String> {
        let response = request
            .basic_auth(&self.username, Some(&self.password))
            .send()?;
        let body = response.text()?;
        serde_json::from_str::<serde_json::Value>(&body)?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_flag_is_inverted() {
        assert!(!no_voice(true));
        assert!(no_voice(false));
    }

    #[test]
    fn descriptors_carry_body_only_for_post() {
        let get = Endpoint::get("/synapses");
        assert_eq!(get.method, Method::Get);
        assert!(get.body.is_none());

        let post = Endpoint::post("/synapses/start/order", json!({ "no_voice": true }));
        assert_eq!(post.method, Method::Post);
        assert!(post.body.is_some());
    }
}
