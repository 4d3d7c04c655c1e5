use log::{debug, info};

use crate::domain::models::{SearchQuery, SubtitleCandidate};
use crate::error::SearchError;

/// A single lookup against the subtitle catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupRequest {
    ByHash {
        size: u64,
        hash_hex: String,
        language: String,
    },
    ByQuery {
        query: String,
        season: Option<u32>,
        episode: Option<u32>,
        language: String,
    },
}

/// A subtitle record as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub file_name: String,
    pub download_url: String,
    pub language_name: String,
    pub format: String,
}

impl From<CatalogRecord> for SubtitleCandidate {
    fn from(record: CatalogRecord) -> Self {
        Self {
            title: record.file_name,
            download_url: record.download_url,
            language_name: record.language_name,
            format: record.format,
        }
    }
}

pub trait Catalog {
    /// Fully built URL for a request. Only used for diagnostics.
    fn lookup_url(&self, request: &LookupRequest) -> String;

    /// Issues the request. An empty list is a valid answer.
    fn lookup(&self, request: &LookupRequest) -> Result<Vec<CatalogRecord>, SearchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchState {
    TryHash,
    TryQuery,
    Exhausted,
}

impl SearchState {
    fn initial(query: &SearchQuery) -> Self {
        if query.fingerprint.is_some() {
            Self::TryHash
        } else {
            Self::TryQuery
        }
    }

    fn next(self) -> Self {
        match self {
            Self::TryHash => Self::TryQuery,
            Self::TryQuery | Self::Exhausted => Self::Exhausted,
        }
    }
}

/// Runs the hash-first, query-fallback search.
///
/// Each tier is tried at most once. An empty answer moves on to the next tier;
/// a transport failure ends the search immediately. Results keep the catalog's
/// ordering.
pub fn search<C: Catalog + ?Sized>(
    catalog: &C,
    query: &SearchQuery,
) -> Result<Vec<SubtitleCandidate>, SearchError> {
    let mut state = SearchState::initial(query);

    loop {
        let request = match state {
            SearchState::TryHash => match hash_request(query) {
                Some(request) => request,
                None => {
                    state = state.next();
                    continue;
                }
            },
            SearchState::TryQuery => query_request(query),
            SearchState::Exhausted => {
                return Err(SearchError::NotFound {
                    query: query.free_text.clone(),
                })
            }
        };

        info!("{}", catalog.lookup_url(&request));
        let records = catalog.lookup(&request)?;

        if records.is_empty() {
            debug!("{state:?} returned no results for {}", query.filename);
            state = state.next();
            continue;
        }

        return Ok(records.into_iter().map(SubtitleCandidate::from).collect());
    }
}

fn hash_request(query: &SearchQuery) -> Option<LookupRequest> {
    let fingerprint = query.fingerprint?;
    Some(LookupRequest::ByHash {
        size: fingerprint.size,
        hash_hex: fingerprint.hash_hex(),
        language: query.language_code.clone(),
    })
}

fn query_request(query: &SearchQuery) -> LookupRequest {
    LookupRequest::ByQuery {
        query: query.free_text.clone(),
        season: (query.season != 0).then_some(query.season),
        episode: (query.episode != 0).then_some(query.episode),
        language: query.language_code.clone(),
    }
}
