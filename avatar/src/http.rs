use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lru::LruCache;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::config::CachePolicy;
use crate::loader::{AvatarImage, ImageLoader, LoadError, LoadRequest, Responder, Transform};
use crate::transform;

/// Deadline for one fetch, from connecting until the body has arrived
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Decoded images kept for [`CachePolicy::Default`] requests
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

type CacheKey = (String, Option<Transform>);

/// [`ImageLoader`] that fetches over HTTP with reqwest, decodes with the
/// `image` crate and applies the shape transform before answering.
///
/// Work runs on the given tokio runtime. Every fetch has a deadline, so a
/// stalled server still ends in a failure. Requests with
/// [`CachePolicy::Bypass`] skip the in-memory cache and ask every
/// intermediary for a fresh copy; the others share a bounded LRU cache.
#[derive(Clone)]
pub struct HttpLoader {
    client: Client,
    runtime: Handle,
    timeout: Duration,
    cache: Arc<Mutex<LruCache<CacheKey, AvatarImage>>>,
}

impl HttpLoader {
    pub fn new(runtime: Handle) -> Self {
        Self::with_client(Client::new(), runtime)
    }

    pub fn with_client(client: Client, runtime: Handle) -> Self {
        Self {
            client,
            runtime,
            timeout: DEFAULT_TIMEOUT,
            cache: Arc::new(Mutex::new(LruCache::new(cache_capacity(
                DEFAULT_CACHE_CAPACITY,
            )))),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the memory cache with an empty one holding at most
    /// `capacity` images (at least one)
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = Arc::new(Mutex::new(LruCache::new(cache_capacity(capacity))));
        self
    }

    /// Number of images held by the in-memory cache
    pub fn cached_images(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    fn cached(&self, key: &CacheKey) -> Option<AvatarImage> {
        self.cache.lock().ok()?.get(key).cloned()
    }
}

fn cache_capacity(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}

impl ImageLoader for HttpLoader {
    fn load(&self, request: LoadRequest, responder: Responder) {
        let key = (request.url.clone(), request.transform);

        if request.cache_policy == CachePolicy::Default {
            if let Some(image) = self.cached(&key) {
                debug!(url = %request.url, "Serving avatar from memory cache");
                responder.succeed(image);
                return;
            }
        }

        let client = self.client.clone();
        let timeout = self.timeout;
        let cache = Arc::clone(&self.cache);
        self.runtime.spawn(async move {
            match fetch(&client, &request, timeout).await {
                Ok(image) => {
                    if request.cache_policy == CachePolicy::Default {
                        if let Ok(mut cache) = cache.lock() {
                            cache.put(key, image.clone());
                        }
                    }
                    responder.succeed(image);
                }
                Err(error) => responder.fail(error),
            }
        });
    }
}

/// Fetch, decode and shape one image
pub async fn fetch(
    client: &Client,
    request: &LoadRequest,
    timeout: Duration,
) -> Result<AvatarImage, LoadError> {
    let mut builder = client.get(&request.url).timeout(timeout);
    if request.cache_policy.bypasses_cache() {
        builder = builder
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache");
    }

    let response = builder
        .send()
        .await
        .map_err(|e| LoadError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        debug!(url = %request.url, %status, "Avatar request rejected");
        return Err(LoadError::Status(status.as_u16()));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| LoadError::Transport(e.to_string()))?;

    let shape = request.transform;
    let pixels = tokio::task::spawn_blocking(move || {
        image::load_from_memory(&body)
            .map(|decoded| transform::apply(decoded.to_rgba8(), shape))
            .map_err(|e| LoadError::Decode(e.to_string()))
    })
    .await
    .map_err(|e| LoadError::Decode(e.to_string()))??;

    info!(
        url = %request.url,
        width = pixels.width(),
        height = pixels.height(),
        "Loaded avatar"
    );

    Ok(AvatarImage::new(request.url.clone(), pixels))
}
