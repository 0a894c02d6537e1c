//! Client for the public countries GraphQL directory.
//!
//! Only three queries are needed: a name search, and the continent and
//! language lists that back the filter choices.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::fmt::Debug;
use thiserror::Error;
use tracing::debug;

use crate::model::{Continent, Country, Language};

const SEARCH_COUNTRIES: &str = r#"
query SearchCountries($name: String!) {
  countries(filter: { name: { regex: $name } }) {
    name
    code
    capital
    continent { code name }
    emojiU
    languages { code name }
    currencies
  }
}"#;

const GET_CONTINENTS: &str = "query GetContinents { continents { code name } }";

const GET_LANGUAGES: &str = "query GetLanguages { languages { code name } }";

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Directory request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Directory responded with status {0}")]
    Status(StatusCode),

    #[error("{0}")]
    GraphQl(String),

    #[error("Directory response contained no data")]
    MissingData,
}

#[async_trait]
pub trait CountryDirectory: Send + Sync + Debug {
    /// Countries whose name matches `name` (a case-sensitive regex).
    async fn search(&self, name: &str) -> Result<Vec<Country>, DirectoryError>;

    async fn continents(&self) -> Result<Vec<Continent>, DirectoryError>;

    async fn languages(&self) -> Result<Vec<Language>, DirectoryError>;
}

#[derive(Debug, Clone)]
pub struct GraphQlDirectory {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct GqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GqlError>,
}

#[derive(Debug, Deserialize)]
struct CountriesData {
    countries: Vec<Country>,
}

#[derive(Debug, Deserialize)]
struct ContinentsData {
    continents: Vec<Continent>,
}

#[derive(Debug, Deserialize)]
struct LanguagesData {
    languages: Vec<Language>,
}

impl GraphQlDirectory {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), http: Client::new() }
    }

    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, DirectoryError> {
        let res = self
            .http
            .post(&self.url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(DirectoryError::Status(status));
        }

        let body: GqlResponse<T> = res.json().await?;
        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(DirectoryError::GraphQl(messages.join("; ")));
        }

        body.data.ok_or(DirectoryError::MissingData)
    }
}

#[async_trait]
impl CountryDirectory for GraphQlDirectory {
    async fn search(&self, name: &str) -> Result<Vec<Country>, DirectoryError> {
        if name.is_empty() {
            return Ok(Vec::new());
        }

        debug!(name, "searching countries");
        let data: CountriesData =
            self.query(SEARCH_COUNTRIES, json!({ "name": name })).await?;
        debug!(name, found = data.countries.len(), "search finished");

        Ok(data.countries)
    }

    async fn continents(&self) -> Result<Vec<Continent>, DirectoryError> {
        let data: ContinentsData = self.query(GET_CONTINENTS, json!({})).await?;
        Ok(data.continents)
    }

    async fn languages(&self) -> Result<Vec<Language>, DirectoryError> {
        let data: LanguagesData = self.query(GET_LANGUAGES, json!({})).await?;
        Ok(data.languages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn search_posts_name_variable_and_decodes_countries() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_contains("SearchCountries")
                .body_contains(r#""variables":{"name":"Fra"}"#);
            then.status(200).json_body(json!({
                "data": { "countries": [{
                    "name": "France",
                    "code": "FR",
                    "capital": "Paris",
                    "continent": { "code": "EU", "name": "Europe" },
                    "emojiU": "U+1F1EB U+1F1F7",
                    "languages": [{ "code": "fr", "name": "French" }],
                    "currencies": ["EUR"]
                }]}
            }));
        });

        let directory = GraphQlDirectory::new(server.url("/graphql"));
        let countries = directory.search("Fra").await.expect("search succeeds");

        mock.assert();
        assert_eq!(countries.len(), 1);
        assert_eq!(countries[0].code, "FR");
        assert_eq!(countries[0].languages[0].name, "French");
    }

    #[tokio::test]
    async fn null_capital_decodes_as_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(json!({
                "data": { "countries": [{
                    "name": "Antarctica",
                    "code": "AQ",
                    "capital": null,
                    "continent": { "code": "AN", "name": "Antarctica" },
                    "emojiU": "U+1F1E6 U+1F1F6",
                    "languages": [],
                    "currencies": []
                }]}
            }));
        });

        let countries = GraphQlDirectory::new(server.url("/graphql")).search("Ant").await.unwrap();
        assert_eq!(countries[0].capital, "");
    }

    #[tokio::test]
    async fn empty_search_term_skips_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(500);
        });

        let countries = GraphQlDirectory::new(server.url("/graphql")).search("").await.unwrap();

        assert!(countries.is_empty());
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn reference_lists_decode() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql").body_contains("GetContinents");
            then.status(200).json_body(json!({
                "data": { "continents": [
                    { "code": "AS", "name": "Asia" },
                    { "code": "EU", "name": "Europe" }
                ]}
            }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/graphql").body_contains("GetLanguages");
            then.status(200).json_body(json!({
                "data": { "languages": [{ "code": "fr", "name": "French" }] }
            }));
        });

        let directory = GraphQlDirectory::new(server.url("/graphql"));

        let continents = directory.continents().await.unwrap();
        assert_eq!(continents[1], Continent { code: "EU".into(), name: "Europe".into() });

        let languages = directory.languages().await.unwrap();
        assert_eq!(languages, vec![Language { code: "fr".into(), name: "French".into() }]);
    }

    #[tokio::test]
    async fn graphql_errors_surface_their_messages() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(json!({
                "data": null,
                "errors": [{ "message": "Invalid regular expression" }]
            }));
        });

        let err = GraphQlDirectory::new(server.url("/graphql")).search("(").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid regular expression");
    }

    #[tokio::test]
    async fn http_failure_reports_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(503);
        });

        let err = GraphQlDirectory::new(server.url("/graphql")).continents().await.unwrap_err();
        assert!(matches!(err, DirectoryError::Status(s) if s == StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn missing_data_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(json!({}));
        });

        let err = GraphQlDirectory::new(server.url("/graphql")).languages().await.unwrap_err();
        assert!(matches!(err, DirectoryError::MissingData));
    }
}
