//! Cursor-style pagination over a [`JsonSource`]
//!
//! Pages are requested strictly in increasing order, one at a time. The
//! first page decides how many pages exist; a failure on the first page is a
//! failure of the whole fetch, while a failure on a later page ends the fetch
//! early with whatever was already collected.

use crate::crawler::client::{ApiRequest, JsonSource};
use crate::crawler::json_path::JsonPath;
use crate::{FetchFailure, FetchResult};
use serde_json::Value;

/// Where to find things in a paginated response, and how to ask for pages
#[derive(Debug, Clone)]
pub struct Pagination {
    /// Path to the list of items on each page
    pub items: JsonPath,

    /// Path to the total page count on the first page
    pub total_pages: JsonPath,

    /// Number of the first page (the API is 1-indexed)
    pub first_page: u32,

    /// Page size to request, if the operation takes one
    pub page_size: Option<u32>,
}

impl Pagination {
    /// Creates a pagination starting at page 1 with the server's default page size
    pub fn new(items: impl Into<JsonPath>, total_pages: impl Into<JsonPath>) -> Self {
        Self {
            items: items.into(),
            total_pages: total_pages.into(),
            first_page: 1,
            page_size: None,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn starting_at(mut self, first_page: u32) -> Self {
        self.first_page = first_page;
        self
    }

    /// Builds the request for page `page` from the template
    fn request_for(&self, template: &ApiRequest, page: u32) -> ApiRequest {
        let request = template.clone().page(page);
        match self.page_size {
            Some(size) => request.limit(size),
            None => request,
        }
    }
}

/// Items gathered across the pages of one collection
#[derive(Debug, Clone, Default)]
pub struct PageCollection {
    /// Items from every fetched page, in page order
    pub items: Vec<Value>,

    /// Number of pages successfully fetched
    pub pages_fetched: u32,

    /// Number of pages the first response announced
    pub total_pages: u32,
}

impl PageCollection {
    /// True when every announced page was fetched
    pub fn is_complete(&self) -> bool {
        self.pages_fetched >= self.total_pages
    }
}

/// Fetches every page of a collection and concatenates the items
///
/// # Arguments
///
/// * `source` - Where requests are sent (normally the rate-limited client)
/// * `template` - The request minus its page number
/// * `pagination` - Response layout and page numbering
///
/// # Returns
///
/// * `Ok(PageCollection)` - All pages, or a prefix of them if a later page failed
/// * `Err(FetchFailure)` - The first page failed, or its page count was not a number
pub async fn fetch_all<S>(
    source: &mut S,
    template: &ApiRequest,
    pagination: &Pagination,
) -> FetchResult<PageCollection>
where
    S: JsonSource + ?Sized,
{
    let first_request = pagination.request_for(template, pagination.first_page);
    let first = source.get(&first_request).await?;

    let total_pages = match pagination.total_pages.lookup_u64(&first) {
        None => 1,
        Some(Ok(count)) => count.clamp(1, u32::MAX as u64) as u32,
        Some(Err(reason)) => {
            return Err(FetchFailure::Malformed(format!(
                "{} at {}: {}",
                template.method(),
                pagination.total_pages,
                reason
            )))
        }
    };

    let mut collection = PageCollection {
        items: extract_items(&first, &pagination.items),
        pages_fetched: 1,
        total_pages,
    };

    for offset in 1..total_pages {
        let page = pagination.first_page.saturating_add(offset);
        let request = pagination.request_for(template, page);

        match source.get(&request).await {
            Ok(response) => {
                collection
                    .items
                    .extend(extract_items(&response, &pagination.items));
                collection.pages_fetched += 1;
            }
            Err(failure) => {
                tracing::warn!(
                    "{} page {}/{} failed ({}), keeping {} items from earlier pages",
                    template.method(),
                    page,
                    total_pages,
                    failure,
                    collection.items.len()
                );
                break;
            }
        }
    }

    Ok(collection)
}

/// Pulls the item list out of one page
///
/// The API collapses single-element lists into a bare object, so an object
/// counts as one item. Anything else counts as an empty page.
pub fn extract_items(page: &Value, path: &JsonPath) -> Vec<Value> {
    match path.lookup(page) {
        Some(Value::Array(items)) => items.clone(),
        Some(item @ Value::Object(_)) => vec![item.clone()],
        _ => Vec::new(),
    }
}
