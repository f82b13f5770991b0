//! Structured filter requests and their validation.
//!
//! Raw query parameters arrive as strings; [`ProductQueryParams::into_query`]
//! validates every field and produces a typed [`ProductQuery`]. Invalid
//! values are rejected with an error naming the offending parameter, never
//! silently coerced to "no filter".

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shilpkaar_core::{AgeGroup, Gender, InvalidFacetValue, Season};

/// Maximum page size; larger requested limits are clamped, not rejected.
pub const MAX_LIMIT: usize = 100;
/// Page size when the caller does not specify one.
pub const DEFAULT_LIMIT: usize = 20;

/// A query parameter carried an invalid value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid value for parameter '{parameter}': {message}")]
pub struct QueryError {
    pub parameter: String,
    pub message: String,
}

impl QueryError {
    fn new(parameter: &str, message: impl Into<String>) -> Self {
        Self {
            parameter: parameter.to_string(),
            message: message.into(),
        }
    }
}

impl From<InvalidFacetValue> for QueryError {
    fn from(e: InvalidFacetValue) -> Self {
        Self::new(e.parameter, format!("unknown value '{}'", e.value))
    }
}

/// Sort key for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Relevance,
    Price,
    Rating,
    Newest,
    Name,
}

impl SortBy {
    /// Direction used when the caller does not pass `sortOrder`.
    #[must_use]
    pub const fn natural_order(self) -> SortOrder {
        match self {
            Self::Price | Self::Name => SortOrder::Asc,
            Self::Relevance | Self::Rating | Self::Newest => SortOrder::Desc,
        }
    }

    fn parse(s: &str) -> Result<Self, QueryError> {
        match s {
            "relevance" => Ok(Self::Relevance),
            "price" => Ok(Self::Price),
            "rating" => Ok(Self::Rating),
            "newest" | "createdAt" => Ok(Self::Newest),
            "name" => Ok(Self::Name),
            other => Err(QueryError::new("sortBy", format!("unknown value '{other}'"))),
        }
    }
}

/// Sort direction. Absent on the wire means the sort key's natural
/// direction, see [`SortBy::natural_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn parse(s: &str) -> Result<Self, QueryError> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(QueryError::new(
                "sortOrder",
                format!("unknown value '{other}'"),
            )),
        }
    }
}

/// Raw product search parameters, as they appear on the wire.
///
/// Numeric and boolean fields are strings here so that a malformed value
/// becomes a structured [`QueryError`] instead of a framework-level
/// deserialization failure. List facets are comma-separated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductQueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub craft: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materials: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub techniques: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occasions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sustainability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trending: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

/// A validated product search request. Every field is optional; absence
/// means "no constraint on this facet".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub craft: Option<String>,
    pub location: Option<String>,
    pub region: Option<String>,
    /// Inclusive price bounds, in paise.
    pub min_price_paise: Option<u64>,
    pub max_price_paise: Option<u64>,
    /// Inclusive minimum rating, in tenths (e.g. 40 = 4.0 stars).
    pub min_rating_tenths: Option<u64>,
    pub materials: Vec<String>,
    pub colors: Vec<String>,
    pub techniques: Vec<String>,
    pub occasions: Vec<String>,
    pub age_group: Option<AgeGroup>,
    pub gender: Option<Gender>,
    pub season: Option<Season>,
    pub sustainability: Option<bool>,
    pub featured: Option<bool>,
    pub trending: Option<bool>,
    pub sort_by: SortBy,
    pub sort_order: Option<SortOrder>,
    /// 1-based page number.
    pub page: usize,
    pub limit: usize,
}

impl ProductQuery {
    /// Zero-based offset into the result set.
    #[must_use]
    pub const fn offset(&self) -> usize {
        (self.page - 1) * self.limit
    }

    /// The requested direction, or the sort key's natural one.
    #[must_use]
    pub fn effective_order(&self) -> SortOrder {
        self.sort_order
            .unwrap_or_else(|| self.sort_by.natural_order())
    }

    /// Stable signature for caching filter-option aggregations. Excludes
    /// pagination and sort, which do not affect the matched corpus.
    #[must_use]
    pub fn facet_signature(&self) -> String {
        format!(
            "q={:?};cat={:?};craft={:?};loc={:?};reg={:?};p={:?}..{:?};r={:?};mat={:?};col={:?};tech={:?};occ={:?};age={:?};gen={:?};sea={:?};sus={:?};feat={:?};trend={:?}",
            self.q,
            self.category,
            self.craft,
            self.location,
            self.region,
            self.min_price_paise,
            self.max_price_paise,
            self.min_rating_tenths,
            self.materials,
            self.colors,
            self.techniques,
            self.occasions,
            self.age_group,
            self.gender,
            self.season,
            self.sustainability,
            self.featured,
            self.trending,
        )
    }
}

impl Default for ProductQueryBase {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Shared pagination defaults.
struct ProductQueryBase {
    page: usize,
    limit: usize,
}

impl ProductQueryParams {
    /// Validate the raw parameters into a typed query.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] naming the first offending parameter.
    pub fn into_query(self) -> Result<ProductQuery, QueryError> {
        let min_price_paise = parse_price("minPrice", self.min_price.as_deref())?;
        let max_price_paise = parse_price("maxPrice", self.max_price.as_deref())?;
        if let (Some(min), Some(max)) = (min_price_paise, max_price_paise)
            && min > max
        {
            return Err(QueryError::new("minPrice", "must not exceed maxPrice"));
        }

        let min_rating_tenths = parse_rating("minRating", self.min_rating.as_deref())?;
        let ProductQueryBase { page, limit } =
            parse_pagination(self.page.as_deref(), self.limit.as_deref())?;

        Ok(ProductQuery {
            q: normalize_text(self.q),
            category: normalize_facet(self.category),
            craft: normalize_facet(self.craft),
            location: normalize_facet(self.location),
            region: normalize_facet(self.region),
            min_price_paise,
            max_price_paise,
            min_rating_tenths,
            materials: split_list(self.materials.as_deref()),
            colors: split_list(self.colors.as_deref()),
            techniques: split_list(self.techniques.as_deref()),
            occasions: split_list(self.occasions.as_deref()),
            age_group: self
                .age_group
                .as_deref()
                .map(AgeGroup::parse)
                .transpose()?,
            gender: self.gender.as_deref().map(Gender::parse).transpose()?,
            season: self.season.as_deref().map(Season::parse).transpose()?,
            sustainability: parse_flag("sustainability", self.sustainability.as_deref())?,
            featured: parse_flag("featured", self.featured.as_deref())?,
            trending: parse_flag("trending", self.trending.as_deref())?,
            sort_by: self
                .sort_by
                .as_deref()
                .map(SortBy::parse)
                .transpose()?
                .unwrap_or_default(),
            sort_order: self
                .sort_order
                .as_deref()
                .map(SortOrder::parse)
                .transpose()?,
            page,
            limit,
        })
    }
}

/// Raw artisan search parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtisanQueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub craft: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

/// A validated artisan search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtisanQuery {
    pub q: Option<String>,
    pub craft: Option<String>,
    pub location: Option<String>,
    pub region: Option<String>,
    pub min_rating_tenths: Option<u64>,
    pub sort_by: SortBy,
    pub sort_order: Option<SortOrder>,
    pub page: usize,
    pub limit: usize,
}

impl ArtisanQuery {
    /// Zero-based offset into the result set.
    #[must_use]
    pub const fn offset(&self) -> usize {
        (self.page - 1) * self.limit
    }

    /// The requested direction, or the sort key's natural one.
    #[must_use]
    pub fn effective_order(&self) -> SortOrder {
        self.sort_order
            .unwrap_or_else(|| self.sort_by.natural_order())
    }
}

impl ArtisanQueryParams {
    /// Validate the raw parameters into a typed query.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] naming the first offending parameter.
    pub fn into_query(self) -> Result<ArtisanQuery, QueryError> {
        let sort_by = self
            .sort_by
            .as_deref()
            .map(SortBy::parse)
            .transpose()?
            .unwrap_or_default();
        if sort_by == SortBy::Price {
            return Err(QueryError::new(
                "sortBy",
                "price sorting does not apply to artisans",
            ));
        }
        let ProductQueryBase { page, limit } =
            parse_pagination(self.page.as_deref(), self.limit.as_deref())?;

        Ok(ArtisanQuery {
            q: normalize_text(self.q),
            craft: normalize_facet(self.craft),
            location: normalize_facet(self.location),
            region: normalize_facet(self.region),
            min_rating_tenths: parse_rating("minRating", self.min_rating.as_deref())?,
            sort_by,
            sort_order: self
                .sort_order
                .as_deref()
                .map(SortOrder::parse)
                .transpose()?,
            page,
            limit,
        })
    }
}

/// Raw suggestion (type-ahead) parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub q: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

const DEFAULT_SUGGESTIONS: usize = 8;
const MAX_SUGGESTIONS: usize = 25;

impl SuggestParams {
    /// Trimmed input and clamped suggestion count.
    #[must_use]
    pub fn into_parts(self) -> (String, usize) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_SUGGESTIONS)
            .clamp(1, MAX_SUGGESTIONS);
        (self.q.trim().to_string(), limit)
    }
}

// =============================================================================
// Parameter parsing helpers
// =============================================================================

fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

fn normalize_facet(value: Option<String>) -> Option<String> {
    normalize_text(value)
}

/// Split a comma-separated facet list, dropping blanks, lowercasing.
fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|s| {
            s.split(',')
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a rupee amount into paise. Rejects non-numeric, non-finite, and
/// negative values.
fn parse_price(parameter: &str, value: Option<&str>) -> Result<Option<u64>, QueryError> {
    let Some(raw) = value else { return Ok(None) };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let amount: f64 = raw
        .parse()
        .map_err(|_| QueryError::new(parameter, format!("'{raw}' is not a number")))?;
    if !amount.is_finite() {
        return Err(QueryError::new(parameter, "must be a finite number"));
    }
    if amount < 0.0 {
        return Err(QueryError::new(parameter, "must not be negative"));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(Some((amount * 100.0).round() as u64))
}

/// Parse a star rating into tenths. Valid range is [0, 5].
fn parse_rating(parameter: &str, value: Option<&str>) -> Result<Option<u64>, QueryError> {
    let Some(raw) = value else { return Ok(None) };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let rating: f64 = raw
        .parse()
        .map_err(|_| QueryError::new(parameter, format!("'{raw}' is not a number")))?;
    if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
        return Err(QueryError::new(parameter, "must be between 0 and 5"));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(Some((rating * 10.0).round() as u64))
}

fn parse_flag(parameter: &str, value: Option<&str>) -> Result<Option<bool>, QueryError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some("true" | "1") => Ok(Some(true)),
        Some("false" | "0") => Ok(Some(false)),
        Some(other) => Err(QueryError::new(
            parameter,
            format!("'{other}' is not a boolean"),
        )),
    }
}

fn parse_pagination(
    page: Option<&str>,
    limit: Option<&str>,
) -> Result<ProductQueryBase, QueryError> {
    let page = match page.map(str::trim).filter(|s| !s.is_empty()) {
        None => 1,
        Some(raw) => {
            let parsed: usize = raw
                .parse()
                .map_err(|_| QueryError::new("page", format!("'{raw}' is not an integer")))?;
            if parsed < 1 {
                return Err(QueryError::new("page", "must be at least 1"));
            }
            parsed
        }
    };
    let limit = match limit.map(str::trim).filter(|s| !s.is_empty()) {
        None => DEFAULT_LIMIT,
        Some(raw) => {
            let parsed: usize = raw
                .parse()
                .map_err(|_| QueryError::new("limit", format!("'{raw}' is not an integer")))?;
            if parsed < 1 {
                return Err(QueryError::new("limit", "must be at least 1"));
            }
            parsed.min(MAX_LIMIT)
        }
    };
    Ok(ProductQueryBase { page, limit })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params_mean_no_constraints() {
        let query = ProductQueryParams::default()
            .into_query()
            .expect("must parse");
        assert_eq!(query, ProductQuery {
            page: 1,
            limit: DEFAULT_LIMIT,
            ..Default::default()
        });
    }

    #[test]
    fn test_price_bounds_parse_to_paise() {
        let params = ProductQueryParams {
            min_price: Some("100".to_string()),
            max_price: Some("500.50".to_string()),
            ..Default::default()
        };
        let query = params.into_query().expect("must parse");
        assert_eq!(query.min_price_paise, Some(10_000));
        assert_eq!(query.max_price_paise, Some(50_050));
    }

    #[test]
    fn test_invalid_price_rejected_not_ignored() {
        for raw in ["abc", "-5", "NaN", "inf"] {
            let params = ProductQueryParams {
                min_price: Some(raw.to_string()),
                ..Default::default()
            };
            let err = params.into_query().expect_err("must reject");
            assert_eq!(err.parameter, "minPrice", "value '{raw}'");
        }
    }

    #[test]
    fn test_inverted_price_range_rejected() {
        let params = ProductQueryParams {
            min_price: Some("500".to_string()),
            max_price: Some("100".to_string()),
            ..Default::default()
        };
        let err = params.into_query().expect_err("must reject");
        assert_eq!(err.parameter, "minPrice");
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let params = ProductQueryParams {
            min_rating: Some("5.5".to_string()),
            ..Default::default()
        };
        let err = params.into_query().expect_err("must reject");
        assert_eq!(err.parameter, "minRating");
    }

    #[test]
    fn test_list_facets_split_and_normalized() {
        let params = ProductQueryParams {
            materials: Some("Wood, silver ,,".to_string()),
            ..Default::default()
        };
        let query = params.into_query().expect("must parse");
        assert_eq!(query.materials, vec!["wood", "silver"]);
    }

    #[test]
    fn test_unknown_enum_facet_rejected() {
        let params = ProductQueryParams {
            gender: Some("other".to_string()),
            ..Default::default()
        };
        let err = params.into_query().expect_err("must reject");
        assert_eq!(err.parameter, "gender");
    }

    #[test]
    fn test_unknown_sort_rejected() {
        let params = ProductQueryParams {
            sort_by: Some("popularity".to_string()),
            ..Default::default()
        };
        let err = params.into_query().expect_err("must reject");
        assert_eq!(err.parameter, "sortBy");
    }

    #[test]
    fn test_page_zero_rejected_and_limit_clamped() {
        let params = ProductQueryParams {
            page: Some("0".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.into_query().expect_err("must reject").parameter,
            "page"
        );

        let params = ProductQueryParams {
            limit: Some("5000".to_string()),
            ..Default::default()
        };
        assert_eq!(params.into_query().expect("must parse").limit, MAX_LIMIT);
    }

    #[test]
    fn test_bad_flag_rejected() {
        let params = ProductQueryParams {
            featured: Some("yes".to_string()),
            ..Default::default()
        };
        let err = params.into_query().expect_err("must reject");
        assert_eq!(err.parameter, "featured");
    }

    #[test]
    fn test_offset_computation() {
        let query = ProductQuery {
            page: 3,
            limit: 20,
            ..Default::default()
        };
        assert_eq!(query.offset(), 40);
    }

    #[test]
    fn test_facet_signature_ignores_pagination() {
        let mut a = ProductQuery {
            category: Some("textiles".to_string()),
            page: 1,
            limit: 20,
            ..Default::default()
        };
        let sig = a.facet_signature();
        a.page = 7;
        a.sort_by = SortBy::Price;
        assert_eq!(a.facet_signature(), sig);
    }

    #[test]
    fn test_artisan_query_rejects_price_sort() {
        let params = ArtisanQueryParams {
            sort_by: Some("price".to_string()),
            ..Default::default()
        };
        let err = params.into_query().expect_err("must reject");
        assert_eq!(err.parameter, "sortBy");
    }
}
