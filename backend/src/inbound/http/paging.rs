//! Query parameters and response envelopes for paginated endpoints.

use actix_web::HttpRequest;
use pagination::{Page, PageRequest, Paginated};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Error;
use crate::inbound::http::links::PublicLinks;
use crate::inbound::http::validation::pagination_error;

/// `limit` plus either `offset` or a one-based `page`.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page size, default 6, at most 100.
    pub limit: Option<u32>,
    /// Items to skip; cannot be combined with `page`.
    pub offset: Option<u64>,
    /// One-based page number.
    pub page: Option<u64>,
}

impl PageParams {
    pub fn to_request(&self) -> Result<PageRequest, Error> {
        PageRequest::from_params(self.limit, self.offset, self.page).map_err(pagination_error)
    }
}

/// `{count, next, previous, results}` body of list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageEnvelope<T> {
    /// Size of the whole collection.
    pub count: u64,
    /// Absolute link to the next page.
    pub next: Option<String>,
    /// Absolute link to the previous page.
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> From<Paginated<T>> for PageEnvelope<T> {
    fn from(value: Paginated<T>) -> Self {
        Self {
            count: value.count,
            next: value.next,
            previous: value.previous,
            results: value.results,
        }
    }
}

/// Wrap a page in the envelope with links derived from the current request
/// URL.
pub fn envelope<T, U>(
    page: Page<T>,
    request: PageRequest,
    req: &HttpRequest,
    links: &PublicLinks,
    convert: impl FnMut(T) -> U,
) -> Result<PageEnvelope<U>, Error> {
    let url = links.request_url(req)?;
    Ok(Paginated::from_page(page.map(convert), request, &url).into())
}
