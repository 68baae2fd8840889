use movie_library_models::{MovieRef, POSTER_UNAVAILABLE};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use crate::error::CatalogError;
use crate::traits::SearchPage;

const DETAILS_FALLBACK_ERROR: &str = "Failed to load movie details";

// Longest slice of a non-JSON error body kept in `CatalogError::Http`
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchMovie>,
    #[serde(rename = "totalResults", default)]
    total_results: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchMovie {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbDetailsResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error", default)]
    error: Option<String>,
    #[serde(rename = "imdbID", default)]
    imdb_id: Option<String>,
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Year", default)]
    year: Option<String>,
    #[serde(rename = "Rated", default)]
    rated: Option<String>,
    #[serde(rename = "Released", default)]
    released: Option<String>,
    #[serde(rename = "Runtime", default)]
    runtime: Option<String>,
    #[serde(rename = "Genre", default)]
    genre: Option<String>,
    #[serde(rename = "Director", default)]
    director: Option<String>,
    #[serde(rename = "Actors", default)]
    actors: Option<String>,
    #[serde(rename = "Plot", default)]
    plot: Option<String>,
    #[serde(rename = "Poster", default)]
    poster: Option<String>,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: Option<String>,
}

/// Full catalog record for a single movie.
///
/// Fields the catalog reports as "N/A" are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieDetails {
    pub id: String,
    pub title: String,
    pub year: String,
    pub rated: Option<String>,
    pub released: Option<String>,
    pub runtime: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub plot: Option<String>,
    pub poster_url: Option<String>,
    pub imdb_rating: Option<String>,
}

impl MovieDetails {
    /// The reference stored when the user saves this movie to a list
    pub fn to_movie_ref(&self) -> MovieRef {
        MovieRef::new(
            self.id.clone(),
            self.title.clone(),
            self.year.clone(),
            self.poster_url.clone(),
        )
    }
}

/// Treat the catalog's "N/A" placeholder (and blanks) as missing
fn available(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != POSTER_UNAVAILABLE)
}

fn is_success(response: &str) -> bool {
    response.eq_ignore_ascii_case("true")
}

async fn read_json<T>(response: reqwest::Response) -> Result<T, CatalogError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    let body = response.text().await?;

    match serde_json::from_str::<T>(&body) {
        Ok(parsed) => Ok(parsed),
        // OMDb answers most errors with a JSON payload; anything else is a
        // transport-level failure worth reporting by status
        Err(_) if !status.is_success() => Err(CatalogError::Http {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY).collect(),
        }),
        Err(e) => Err(CatalogError::Decode(e)),
    }
}

pub async fn search_movies(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
    page: u32,
) -> Result<SearchPage, CatalogError> {
    let page_param = page.to_string();
    let response = client
        .get(base_url)
        .query(&[
            ("apikey", api_key),
            ("s", query),
            ("page", page_param.as_str()),
            ("type", "movie"),
        ])
        .send()
        .await?;

    let data: OmdbSearchResponse = read_json(response).await?;

    if !is_success(&data.response) {
        debug!("OMDb search for '{}' page {} reported: {:?}", query, page, data.error);
        return Ok(SearchPage {
            results: Vec::new(),
            total_results: 0,
            error: Some(data.error.unwrap_or_else(|| "Search failed".to_string())),
        });
    }

    let total_results = data
        .total_results
        .as_deref()
        .and_then(|t| t.trim().parse::<u64>().ok())
        .unwrap_or(0);

    let results: Vec<MovieRef> = data
        .search
        .into_iter()
        .map(|m| MovieRef::new(m.imdb_id, m.title, m.year, available(m.poster)))
        .collect();

    debug!(
        "OMDb search for '{}' page {}: {} results of {}",
        query,
        page,
        results.len(),
        total_results
    );

    Ok(SearchPage {
        results,
        total_results,
        error: None,
    })
}

pub async fn get_movie_details(
    client: &Client,
    base_url: &str,
    api_key: &str,
    imdb_id: &str,
) -> Result<MovieDetails, CatalogError> {
    let response = client
        .get(base_url)
        .query(&[("apikey", api_key), ("i", imdb_id), ("plot", "full")])
        .send()
        .await?;

    let data: OmdbDetailsResponse = read_json(response).await?;

    if !is_success(&data.response) {
        return Err(CatalogError::Catalog(
            data.error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DETAILS_FALLBACK_ERROR.to_string()),
        ));
    }

    Ok(MovieDetails {
        id: data.imdb_id.unwrap_or_else(|| imdb_id.to_string()),
        title: data.title.unwrap_or_default(),
        year: data.year.unwrap_or_default(),
        rated: available(data.rated),
        released: available(data.released),
        runtime: available(data.runtime),
        genre: available(data.genre),
        director: available(data.director),
        actors: available(data.actors),
        plot: available(data.plot),
        poster_url: available(data.poster),
        imdb_rating: available(data.imdb_rating),
    })
}
