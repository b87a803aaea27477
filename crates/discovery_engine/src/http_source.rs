use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio::runtime::Runtime;
use url::Url;

use crate::{
    decode_page, ContentSource, FetchSettings, Fetcher, ReqwestFetcher, SourceError,
    SourceErrorKind,
};

/// A paged HTML feed exposed as a progressively revealed page.
///
/// `navigate` loads page 1; each `reveal_more` fetches the next page and
/// appends it to the snapshot, the way an infinite scroll grows the DOM.
pub struct HttpFeedSource {
    runtime: Option<Runtime>,
    fetcher: Arc<dyn Fetcher>,
    page_param: String,
    location: Option<Url>,
    page: u32,
    snapshot: String,
    feed_ended: bool,
    failed: bool,
}

impl HttpFeedSource {
    pub fn new(
        settings: FetchSettings,
        page_param: impl Into<String>,
    ) -> Result<Self, SourceError> {
        let runtime = Runtime::new().map_err(|err| SourceError::unavailable(err.to_string()))?;
        let fetcher = {
            let _context = runtime.enter();
            ReqwestFetcher::new(settings)?
        };
        Ok(Self::with_fetcher(runtime, Arc::new(fetcher), page_param))
    }

    pub fn with_fetcher(
        runtime: Runtime,
        fetcher: Arc<dyn Fetcher>,
        page_param: impl Into<String>,
    ) -> Self {
        Self {
            runtime: Some(runtime),
            fetcher,
            page_param: page_param.into(),
            location: None,
            page: 0,
            snapshot: String::new(),
            feed_ended: false,
            failed: false,
        }
    }

    fn page_url(&self, location: &Url, page: u32) -> Url {
        if page <= 1 {
            return location.clone();
        }
        let mut url = location.clone();
        url.query_pairs_mut()
            .append_pair(&self.page_param, &page.to_string());
        url
    }

    fn fetch_text(&self, url: &Url) -> Result<String, SourceError> {
        let Some(runtime) = self.runtime.as_ref() else {
            return Err(SourceError::unavailable("content source released"));
        };
        let fetcher = self.fetcher.clone();
        let page = runtime.block_on(async move { fetcher.fetch(url).await })?;
        decode_page(&page.bytes, page.content_type.as_deref())
    }
}

impl ContentSource for HttpFeedSource {
    fn navigate(&mut self, location: &str) -> Result<(), SourceError> {
        let url = Url::parse(location)
            .map_err(|err| SourceError::new(SourceErrorKind::InvalidLocation, err.to_string()))?;
        engine_info!("navigating to {url}");
        match self.fetch_text(&url) {
            Ok(text) => {
                self.snapshot = text;
                self.location = Some(url);
                self.page = 1;
                self.feed_ended = false;
                self.failed = false;
                Ok(())
            }
            Err(err) => {
                self.failed = true;
                Err(err)
            }
        }
    }

    fn reveal_more(&mut self) -> Result<(), SourceError> {
        if self.feed_ended {
            return Ok(());
        }
        let Some(location) = self.location.clone() else {
            return Err(SourceError::unavailable("reveal requested before navigate"));
        };
        let next = self.page + 1;
        let url = self.page_url(&location, next);
        match self.fetch_text(&url) {
            Ok(text) => {
                engine_debug!("revealed page {next} ({} bytes)", text.len());
                self.snapshot.push('\n');
                self.snapshot.push_str(&text);
                self.page = next;
                Ok(())
            }
            Err(err) if err.kind == SourceErrorKind::HttpStatus(404) => {
                engine_info!("feed ended after page {}", self.page);
                self.feed_ended = true;
                Ok(())
            }
            Err(err) => {
                engine_warn!("reveal of page {next} failed: {err}");
                self.failed = true;
                Err(err)
            }
        }
    }

    fn current_snapshot(&mut self) -> Result<String, SourceError> {
        if self.location.is_none() {
            return Err(SourceError::unavailable("no location loaded"));
        }
        Ok(self.snapshot.clone())
    }

    fn is_alive(&self) -> bool {
        self.runtime.is_some() && !self.failed
    }

    fn release(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
