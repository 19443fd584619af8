// Infrastructure seam over the scraping service.
//
// The dashboard only talks to `BaseScraperApi`, so tests drive it with
// `testing::MockScraperApi` instead of a live service.

use async_trait::async_trait;
use scraper_client::{
    DeleteResponse, HealthResponse, Result, ResultsResponse, ScrapeRequest, ScrapeResult,
    ScraperClient, StartScrapeResponse, StatusResponse,
};

#[async_trait]
pub trait BaseScraperApi: Send + Sync {
    async fn health(&self) -> Result<HealthResponse>;

    async fn list_results(&self) -> Result<ResultsResponse>;

    async fn get_result(&self, keyword: &str) -> Result<ScrapeResult>;

    async fn delete_result(&self, keyword: &str) -> Result<DeleteResponse>;

    async fn start_scrape(&self, request: &ScrapeRequest) -> Result<StartScrapeResponse>;

    async fn get_status(&self, keyword: &str) -> Result<StatusResponse>;
}

#[async_trait]
impl BaseScraperApi for ScraperClient {
    async fn health(&self) -> Result<HealthResponse> {
        ScraperClient::health(self).await
    }

    async fn list_results(&self) -> Result<ResultsResponse> {
        ScraperClient::list_results(self).await
    }

    async fn get_result(&self, keyword: &str) -> Result<ScrapeResult> {
        ScraperClient::get_result(self, keyword).await
    }

    async fn delete_result(&self, keyword: &str) -> Result<DeleteResponse> {
        ScraperClient::delete_result(self, keyword).await
    }

    async fn start_scrape(&self, request: &ScrapeRequest) -> Result<StartScrapeResponse> {
        ScraperClient::start_scrape(self, request).await
    }

    async fn get_status(&self, keyword: &str) -> Result<StatusResponse> {
        ScraperClient::get_status(self, keyword).await
    }
}
