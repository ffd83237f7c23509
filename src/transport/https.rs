//! Anonymous HTTPS retrieval.

use reqwest::blocking::Client;
use reqwest::redirect::{Attempt, Policy};
use tracing::debug;
use url::Url;

use super::{Retriever, RetrievedFile, TransportOptions};
use crate::error::TransportError;
use crate::location::{Location, Scheme};

const MAX_REDIRECTS: usize = 10;

/// Streams an HTTPS response body into a [`RetrievedFile`].
#[derive(Debug, Clone)]
pub struct HttpsRetriever {
    client: Client,
    options: TransportOptions,
}

impl HttpsRetriever {
    /// Build a retriever with its own client. Idle connections are not pooled.
    pub fn new(options: TransportOptions) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.read_timeout)
            .pool_max_idle_per_host(0)
            .redirect(Policy::custom(follow_redirect))
            .build()?;
        Ok(Self { client, options })
    }

    /// GET `url` and buffer the body.
    ///
    /// Accepts any URL the client can speak; [`Retriever::retrieve`] is the entry point that
    /// enforces the `https` scheme.
    pub fn retrieve_url(&self, url: &Url) -> Result<RetrievedFile, TransportError> {
        debug!(url = %url, "starting http transfer");
        let mut response = self.client.get(url.clone()).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let expected = response.content_length();
        let file = RetrievedFile::spool_from_reader(
            &mut response,
            self.options.chunk_size,
            self.options.spool_threshold,
            self.options.cancel.as_ref(),
        )?;

        if let Some(expected) = expected {
            if file.len() < expected {
                return Err(TransportError::Truncated {
                    expected,
                    received: file.len(),
                });
            }
        }

        debug!(url = %url, bytes = file.len(), spilled = file.is_spilled(), "http transfer complete");
        Ok(file)
    }
}

/// Follows up to [`MAX_REDIRECTS`] hops, refusing any hop that leaves `https` once the chain
/// has used it.
fn follow_redirect(attempt: Attempt) -> reqwest::redirect::Action {
    if attempt.previous().len() > MAX_REDIRECTS {
        return attempt.error("too many redirects");
    }
    if is_downgrade(attempt.previous(), attempt.url()) {
        let message = format!("refusing redirect from https to {}", attempt.url().scheme());
        return attempt.error(message);
    }
    attempt.follow()
}

fn is_downgrade(previous: &[Url], next: &Url) -> bool {
    next.scheme() != "https" && previous.iter().any(|u| u.scheme() == "https")
}

impl Retriever for HttpsRetriever {
    fn retrieve(&self, location: &Location) -> Result<RetrievedFile, TransportError> {
        if location.scheme() != Scheme::Https {
            return Err(TransportError::SchemeMismatch {
                expected: Scheme::Https,
                found: location.scheme(),
            });
        }
        self.retrieve_url(location.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(raw: &[&str]) -> Vec<Url> {
        raw.iter().map(|u| Url::parse(u).unwrap()).collect()
    }

    #[test]
    fn https_to_http_hop_is_a_downgrade() {
        let previous = urls(&["https://data.example.org/a.csv"]);
        let next = Url::parse("http://mirror.example.org/a.csv").unwrap();
        assert!(is_downgrade(&previous, &next));
    }

    #[test]
    fn https_chain_is_not_a_downgrade() {
        let previous = urls(&["https://data.example.org/a.csv", "https://cdn.example.org/a.csv"]);
        let next = Url::parse("https://edge.example.org/a.csv").unwrap();
        assert!(!is_downgrade(&previous, &next));
    }

    #[test]
    fn plain_http_chain_is_left_alone() {
        let previous = urls(&["http://127.0.0.1:8080/a.csv"]);
        let next = Url::parse("http://127.0.0.1:8080/b.csv").unwrap();
        assert!(!is_downgrade(&previous, &next));
    }
}
