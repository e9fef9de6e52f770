// Collectors fetch raw listings from a job board and map them into vacancies.
// Both boards share the same paged GET protocol; only the endpoint
// description and the field mapping differ.

pub mod hh;
pub mod runner;
pub mod superjob;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::SourceSettings;
use crate::error::AppError;
use crate::models::platform::{Catalog, Platform};
use crate::models::vacancy::Vacancy;

/// Trait that all vacancy collectors implement.
#[async_trait]
pub trait VacancyCollector: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetch raw listings, page by page, enough to cover `count`.
    async fn fetch(&self, keyword: &str, count: u32) -> Result<Vec<Value>, AppError>;

    /// Map one raw listing into a vacancy.
    fn map_listing(&self, raw: &Value) -> Result<Vacancy, AppError>;

    /// Fetch and map. A single bad listing fails the whole batch.
    async fn collect(&self, keyword: &str, count: u32) -> Result<Vec<Vacancy>, AppError> {
        let listings = self.fetch(keyword, count).await?;
        listings.iter().map(|raw| self.map_listing(raw)).collect()
    }
}

/// Everything needed to page through one board's search API.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub url: String,
    pub page_size: u32,
    pub headers: Vec<(String, String)>,
    /// Query parameters sent with every page; page and keyword are overwritten.
    pub params: Vec<(String, String)>,
    pub page_param: &'static str,
    pub keyword_param: &'static str,
    /// Key of the listings array in the response body.
    pub listings_key: &'static str,
}

impl Endpoint {
    fn query_for(&self, keyword: &str, page: u32) -> Vec<(String, String)> {
        let mut params = self.params.clone();
        set_param(&mut params, self.page_param, page.to_string());
        set_param(&mut params, self.keyword_param, keyword.to_string());
        params
    }
}

fn set_param(params: &mut Vec<(String, String)>, key: &str, value: String) {
    match params.iter_mut().find(|(k, _)| k == key) {
        Some((_, v)) => *v = value,
        None => params.push((key.to_string(), value)),
    }
}

/// Number of pages requested for `count` listings.
///
/// Ceiling division, so a count of zero requests nothing.
pub fn page_count(count: u32, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// Collector for boards exposing a zero-based paged search endpoint.
pub struct PagedCollector {
    platform: Platform,
    client: reqwest::Client,
    endpoint: Endpoint,
    mapper: fn(&Value) -> Result<Vacancy, AppError>,
}

impl PagedCollector {
    pub fn new(
        platform: Platform,
        endpoint: Endpoint,
        mapper: fn(&Value) -> Result<Vacancy, AppError>,
        timeout: Option<Duration>,
    ) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            platform,
            client,
            endpoint,
            mapper,
        })
    }

    async fn fetch_page(&self, keyword: &str, page: u32) -> Result<Vec<Value>, AppError> {
        let mut request = self
            .client
            .get(&self.endpoint.url)
            .query(&self.endpoint.query_for(keyword, page));
        for (name, value) in &self.endpoint.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(AppError::Upstream {
                platform: self.platform.to_string(),
                detail: format!("HTTP {} for page {page}", resp.status()),
            });
        }

        let mut body: Value = resp.json().await?;
        match body.get_mut(self.endpoint.listings_key).map(Value::take) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(AppError::Upstream {
                platform: self.platform.to_string(),
                detail: format!(
                    "a response without '{}' for page {page}",
                    self.endpoint.listings_key
                ),
            }),
        }
    }
}

#[async_trait]
impl VacancyCollector for PagedCollector {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self, keyword: &str, count: u32) -> Result<Vec<Value>, AppError> {
        let pages = page_count(count, self.endpoint.page_size);
        let mut listings = Vec::new();

        for page in 0..pages {
            let items = self.fetch_page(keyword, page).await?;
            tracing::debug!(
                "{}: page {page} returned {} listings",
                self.platform,
                items.len()
            );
            listings.extend(items);
        }

        Ok(listings)
    }

    fn map_listing(&self, raw: &Value) -> Result<Vacancy, AppError> {
        (self.mapper)(raw)
    }
}

/// Look up the collector for a platform.
pub fn get_collector(
    platform: Platform,
    settings: &SourceSettings,
) -> Result<Box<dyn VacancyCollector>, AppError> {
    let timeout = settings.timeout;
    let collector = match platform {
        Platform::HeadHunter => {
            PagedCollector::new(platform, hh::endpoint(settings), hh::map_listing, timeout)?
        }
        Platform::SuperJob => PagedCollector::new(
            platform,
            superjob::endpoint(settings),
            superjob::map_listing,
            timeout,
        )?,
    };
    Ok(Box::new(collector))
}

/// Collectors for every platform in the catalog, in catalog order.
pub fn collectors_for(
    catalog: &Catalog,
    settings: &SourceSettings,
) -> Result<Vec<Box<dyn VacancyCollector>>, AppError> {
    catalog
        .platforms()
        .map(|platform| get_collector(platform, settings))
        .collect()
}

// Field helpers shared by the platform mappers.

fn required<'a>(
    raw: &'a Value,
    key: &'static str,
    platform: Platform,
) -> Result<&'a Value, AppError> {
    match raw.get(key) {
        Some(Value::Null) | None => Err(AppError::mapping(platform.display_name(), key)),
        Some(value) => Ok(value),
    }
}

fn required_str(raw: &Value, key: &'static str, platform: Platform) -> Result<String, AppError> {
    required(raw, key, platform)?
        .as_str()
        .map(String::from)
        .ok_or_else(|| AppError::mapping(platform.display_name(), key))
}

fn optional_str(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(|v| v.as_str()).map(String::from)
}

fn optional_int(raw: &Value, key: &str) -> Option<i64> {
    raw.get(key).and_then(|v| v.as_i64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_endpoint(url: String, page_size: u32) -> Endpoint {
        Endpoint {
            url,
            page_size,
            headers: vec![("X-Test".to_string(), "yes".to_string())],
            params: vec![
                ("page".to_string(), "1".to_string()),
                ("q".to_string(), String::new()),
            ],
            page_param: "page",
            keyword_param: "q",
            listings_key: "items",
        }
    }

    fn listing(id: i64) -> Value {
        json!({
            "id": id.to_string(),
            "name": format!("Job {id}"),
            "alternate_url": format!("https://hh.ru/vacancy/{id}"),
            "salary": null,
            "snippet": {"requirement": null, "responsibility": null}
        })
    }

    async fn mount_page(server: &MockServer, page: u32, ids: &[i64], expected: u64) {
        let items: Vec<Value> = ids.iter().map(|id| listing(*id)).collect();
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("page", page.to_string()))
            .and(query_param("q", "rust"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "items": items, "found": 99 })),
            )
            .expect(expected)
            .mount(server)
            .await;
    }

    fn collector(server: &MockServer, page_size: u32) -> PagedCollector {
        PagedCollector::new(
            Platform::HeadHunter,
            test_endpoint(format!("{}/search", server.uri()), page_size),
            hh::map_listing,
            None,
        )
        .unwrap()
    }

    #[test]
    fn page_count_is_ceiling_division() {
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(15, 10), 2);
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(50, 20), 3);
        assert_eq!(page_count(5, 0), 0);
    }

    #[test]
    fn query_overrides_template_values() {
        let endpoint = test_endpoint("http://localhost".to_string(), 10);
        let query = endpoint.query_for("rust", 3);
        assert_eq!(
            query,
            vec![
                ("page".to_string(), "3".to_string()),
                ("q".to_string(), "rust".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn exact_multiple_requests_one_page() {
        let server = MockServer::start().await;
        mount_page(&server, 0, &[1, 2], 1).await;
        mount_page(&server, 1, &[3], 0).await;

        let listings = collector(&server, 10).fetch("rust", 10).await.unwrap();
        assert_eq!(listings.len(), 2);
        server.verify().await;
    }

    #[tokio::test]
    async fn remainder_requests_an_extra_page_in_order() {
        let server = MockServer::start().await;
        mount_page(&server, 0, &[1, 2], 1).await;
        mount_page(&server, 1, &[2, 3], 1).await;

        let vacancies = collector(&server, 10).collect("rust", 15).await.unwrap();
        let ids: Vec<_> = vacancies.iter().map(Vacancy::vacancy_id).collect();
        // Overlapping pages are not deduplicated.
        assert_eq!(ids, vec![1, 2, 2, 3]);
        server.verify().await;
    }

    #[tokio::test]
    async fn zero_count_requests_nothing() {
        let server = MockServer::start().await;
        mount_page(&server, 0, &[1], 0).await;

        let listings = collector(&server, 10).fetch("rust", 0).await.unwrap();
        assert!(listings.is_empty());
        server.verify().await;
    }

    #[tokio::test]
    async fn failed_page_aborts_remaining_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("page", "0"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;
        mount_page(&server, 1, &[1], 0).await;

        let err = collector(&server, 10).fetch("rust", 20).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));
        server.verify().await;
    }

    #[tokio::test]
    async fn missing_listings_key_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "objects": [] })))
            .mount(&server)
            .await;

        let err = collector(&server, 10).fetch("rust", 5).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));
    }

    #[tokio::test]
    async fn headers_are_sent_with_each_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(wiremock::matchers::header("X-Test", "yes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .expect(2)
            .mount(&server)
            .await;

        collector(&server, 10).fetch("", 11).await.unwrap();
        server.verify().await;
    }

    #[tokio::test]
    async fn one_bad_listing_fails_the_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [listing(1), {"id": "2", "name": "No url"}]
            })))
            .mount(&server)
            .await;

        let err = collector(&server, 10).collect("rust", 10).await.unwrap_err();
        assert!(matches!(err, AppError::Mapping { field: "alternate_url", .. }));
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let collector = PagedCollector::new(
            Platform::HeadHunter,
            test_endpoint(format!("http://127.0.0.1:{port}/search"), 10),
            hh::map_listing,
            None,
        )
        .unwrap();

        let err = collector.fetch("rust", 5).await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }
}
