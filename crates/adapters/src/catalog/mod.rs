use std::io::Read;

use hondana_application::{ApplicationError, CatalogClient};
use hondana_domain::{BookId, SearchRecord};
use log::debug;
use serde::Deserialize;

pub const TITLE_PLACEHOLDER: &str = "タイトル不明";
pub const AUTHORS_PLACEHOLDER: &str = "著者不明";
pub const DESCRIPTION_PLACEHOLDER: &str = "説明なし";
pub const THUMBNAIL_PLACEHOLDER: &str = "https://via.placeholder.com/128x180?text=No+Image";

/// Blocking client for the Google Books volumes endpoint, restricted to a
/// fixed result language. One request per search, no retries, no timeout.
#[derive(Debug, Clone)]
pub struct GoogleBooksClient {
    endpoint: String,
    language: String,
    agent: ureq::Agent,
}

impl GoogleBooksClient {
    pub fn new(endpoint: String, language: String, user_agent: &str) -> Self {
        Self {
            endpoint,
            language,
            agent: ureq::AgentBuilder::new().user_agent(user_agent).build(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<VolumeItem>,
}

#[derive(Debug, Clone, Deserialize)]
struct VolumeItem {
    id: Option<String>,
    #[serde(rename = "volumeInfo")]
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    description: Option<String>,
    #[serde(rename = "pageCount")]
    page_count: Option<u32>,
    #[serde(rename = "imageLinks")]
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Clone, Deserialize)]
struct ImageLinks {
    thumbnail: Option<String>,
}

impl CatalogClient for GoogleBooksClient {
    fn search(&self, query: &str) -> Result<Vec<SearchRecord>, ApplicationError> {
        debug!("catalog search: q={query} langRestrict={}", self.language);
        let response = self
            .agent
            .get(&self.endpoint)
            .query("q", query)
            .query("langRestrict", &self.language)
            .call()
            .map_err(|error| ApplicationError::Network(error.to_string()))?;

        let volumes: VolumesResponse = response
            .into_json()
            .map_err(|error| ApplicationError::Network(error.to_string()))?;
        Ok(normalize_items(volumes.items))
    }

    fn fetch_thumbnail(&self, url: &str) -> Result<Vec<u8>, ApplicationError> {
        debug!("fetching thumbnail: {url}");
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|error| ApplicationError::Network(error.to_string()))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|error| ApplicationError::Network(error.to_string()))?;
        Ok(bytes)
    }
}

fn normalize_items(items: Vec<VolumeItem>) -> Vec<SearchRecord> {
    items.into_iter().filter_map(normalize_item).collect()
}

/// Fills every missing field with its placeholder. Items without a usable
/// id cannot be tracked and are dropped.
fn normalize_item(item: VolumeItem) -> Option<SearchRecord> {
    let id = BookId::new(item.id?).ok()?;
    let info = item.volume_info.unwrap_or_default();

    let title = info
        .title
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| TITLE_PLACEHOLDER.to_string());
    let thumbnail = info
        .image_links
        .and_then(|links| links.thumbnail)
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| THUMBNAIL_PLACEHOLDER.to_string());
    let authors = match info.authors.unwrap_or_default() {
        authors if authors.is_empty() => AUTHORS_PLACEHOLDER.to_string(),
        authors => authors.join(", "),
    };
    let description = info
        .description
        .filter(|description| !description.is_empty())
        .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string());

    Some(SearchRecord {
        id,
        title,
        thumbnail,
        authors,
        description,
        total_pages: info.page_count.unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize_fixture(body: &str) -> Vec<SearchRecord> {
        let volumes: VolumesResponse = serde_json::from_str(body).expect("fixture should parse");
        normalize_items(volumes.items)
    }

    #[test]
    fn full_item_maps_through() {
        let records = normalize_fixture(
            r#"{"items":[{"id":"abc","volumeInfo":{
                "title":"坊っちゃん",
                "authors":["夏目漱石","訳者"],
                "description":"物語",
                "pageCount":300,
                "imageLinks":{"thumbnail":"http://example.com/c.jpg"}}}]}"#,
        );
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id.as_str(), "abc");
        assert_eq!(record.title, "坊っちゃん");
        assert_eq!(record.authors, "夏目漱石, 訳者");
        assert_eq!(record.description, "物語");
        assert_eq!(record.total_pages, 300);
        assert_eq!(record.thumbnail, "http://example.com/c.jpg");
    }

    #[test]
    fn missing_fields_fall_back_to_placeholders() {
        let records = normalize_fixture(r#"{"items":[{"id":"abc","volumeInfo":{}}]}"#);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.title, TITLE_PLACEHOLDER);
        assert_eq!(record.authors, AUTHORS_PLACEHOLDER);
        assert_eq!(record.description, DESCRIPTION_PLACEHOLDER);
        assert_eq!(record.thumbnail, THUMBNAIL_PLACEHOLDER);
        assert_eq!(record.total_pages, 0);
    }

    #[test]
    fn missing_volume_info_falls_back_entirely() {
        let records = normalize_fixture(r#"{"items":[{"id":"abc"}]}"#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, TITLE_PLACEHOLDER);
    }

    #[test]
    fn empty_author_list_uses_placeholder() {
        let records =
            normalize_fixture(r#"{"items":[{"id":"abc","volumeInfo":{"authors":[]}}]}"#);
        assert_eq!(records[0].authors, AUTHORS_PLACEHOLDER);
    }

    #[test]
    fn absent_items_array_yields_no_records() {
        assert!(normalize_fixture(r#"{"kind":"books#volumes","totalItems":0}"#).is_empty());
    }

    #[test]
    fn items_without_id_are_dropped() {
        let records = normalize_fixture(
            r#"{"items":[{"volumeInfo":{"title":"x"}},{"id":"","volumeInfo":{}},{"id":"ok"}]}"#,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_str(), "ok");
    }
}
