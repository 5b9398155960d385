use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use reqwest::{Client, ClientBuilder, Proxy, RequestBuilder, StatusCode, header::HeaderMap};
use thiserror::Error;
use tracing::{debug, warn};

use crate::configs::HttpConfig;

/// Adjusts the client builder. Stored and replayed every time the pool
/// rebuilds its client.
pub type BuilderConfigurator = Arc<dyn Fn(ClientBuilder) -> ClientBuilder + Send + Sync>;

/// Adjusts the options applied to every request issued through the pool.
pub type RequestConfigurator = Box<dyn FnOnce(RequestOptions) -> RequestOptions + Send>;

/// Anything that owns an HTTP pool and lets outside code tune it.
pub trait HttpConfigurable {
    fn configure_requests(&self, configurator: RequestConfigurator);
    fn configure_builder(&self, configurator: BuilderConfigurator);
}

/// Per-request settings layered on top of the client defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
    pub headers: HeaderMap,
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("HTTP client pool is closed")]
    Closed,
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid status code for page {url}: {status}")]
    Status { url: String, status: u16 },
}

/// Outcome of fetching a page that did not fail.
#[derive(Debug)]
pub enum PageResponse {
    Page(String),
    NotFound,
}

/// 2xx responses that are expected to carry a body.
pub fn is_success_with_content(status: StatusCode) -> bool {
    status.is_success() && status != StatusCode::NO_CONTENT
}

/// Shared HTTP client for all resolution calls of one source.
///
/// The underlying `reqwest::Client` is built lazily from the configuration
/// plus every registered builder configurator, and rebuilt after the builder
/// configuration changes. Each fetch works on its own [`HttpHandle`].
pub struct HttpClientPool {
    config: HttpConfig,
    state: Mutex<PoolState>,
}

struct PoolState {
    client: Option<Client>,
    builder_configurators: Vec<BuilderConfigurator>,
    request_options: RequestOptions,
    /// Bumped whenever the builder configuration changes.
    generation: u64,
    closed: bool,
}

impl HttpClientPool {
    pub fn new(config: HttpConfig) -> Self {
        Self {
            config,
            state: Mutex::new(PoolState {
                client: None,
                builder_configurators: Vec::new(),
                request_options: RequestOptions::default(),
                generation: 0,
                closed: false,
            }),
        }
    }

    /// Hands out a handle for a single fetch.
    ///
    /// The client is built without holding the lock. A build that raced with
    /// a new builder configurator is discarded and redone.
    pub fn acquire(&self) -> Result<HttpHandle, HttpError> {
        loop {
            let (configurators, generation) = {
                let state = self.state.lock();
                if state.closed {
                    return Err(HttpError::Closed);
                }
                if let Some(client) = &state.client {
                    return Ok(HttpHandle {
                        client: client.clone(),
                        options: state.request_options.clone(),
                    });
                }
                (state.builder_configurators.clone(), state.generation)
            };

            let mut builder = base_builder(&self.config)?;
            for configurator in &configurators {
                builder = configurator(builder);
            }
            let built = builder.build().map_err(HttpError::Build)?;

            let mut state = self.state.lock();
            if state.closed {
                return Err(HttpError::Closed);
            }
            if state.generation != generation {
                continue;
            }

            let client = state
                .client
                .get_or_insert_with(|| {
                    debug!("Built HTTP client");
                    built
                })
                .clone();
            return Ok(HttpHandle {
                client,
                options: state.request_options.clone(),
            });
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Releases the client. Safe to call any number of times.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            warn!("HTTP client pool already closed");
            return;
        }
        state.closed = true;
        if state.client.take().is_none() {
            debug!("HTTP client pool closed before any client was built");
        }
    }
}

impl HttpConfigurable for HttpClientPool {
    fn configure_requests(&self, configurator: RequestConfigurator) {
        let mut state = self.state.lock();
        if state.closed {
            warn!("Ignoring request configuration for a closed HTTP client pool");
            return;
        }
        let current = std::mem::take(&mut state.request_options);
        state.request_options = configurator(current);
    }

    fn configure_builder(&self, configurator: BuilderConfigurator) {
        let mut state = self.state.lock();
        if state.closed {
            warn!("Ignoring builder configuration for a closed HTTP client pool");
            return;
        }
        state.builder_configurators.push(configurator);
        state.generation += 1;
        state.client = None;
    }
}

fn base_builder(config: &HttpConfig) -> Result<ClientBuilder, HttpError> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_millis(config.timeout_ms))
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms));

    if let Some(url) = config.proxy.as_ref().and_then(|p| p.url.as_deref()) {
        let mut proxy = Proxy::all(url).map_err(HttpError::Build)?;
        if let Some(proxy_config) = &config.proxy {
            if let (Some(username), Some(password)) =
                (&proxy_config.username, &proxy_config.password)
            {
                proxy = proxy.basic_auth(username, password);
            }
        }
        builder = builder.proxy(proxy);
    }

    Ok(builder)
}

/// A client plus the request options in effect when it was acquired.
///
/// Lives for one fetch; the response it produces is consumed and dropped
/// inside [`HttpHandle::fetch_page`].
pub struct HttpHandle {
    client: Client,
    options: RequestOptions,
}

impl HttpHandle {
    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        let mut request = self.client.get(url).headers(self.options.headers.clone());
        if let Some(timeout) = self.options.timeout {
            request = request.timeout(timeout);
        }
        request
    }

    /// GETs a page and reads it fully as UTF-8 text. A 404 is reported as
    /// [`PageResponse::NotFound`] rather than an error.
    pub async fn fetch_page(&self, url: &str) -> Result<PageResponse, HttpError> {
        let response = self.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!("Page not found: {}", url);
            return Ok(PageResponse::NotFound);
        }

        if !is_success_with_content(status) {
            return Err(HttpError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(PageResponse::Page(String::from_utf8_lossy(&body).into_owned()))
    }
}
