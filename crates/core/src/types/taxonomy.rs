//! Constrained facet taxonomies.
//!
//! These enums define the closed value sets for facets that only accept a
//! fixed vocabulary. Open-vocabulary facets (category, craft, materials,
//! colors, and so on) stay free-form strings and are validated only for
//! non-emptiness at the schema layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error for a facet value outside its legal vocabulary.
///
/// Carries the parameter name so callers can surface which query or body
/// field was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value '{value}' for parameter '{parameter}'")]
pub struct InvalidFacetValue {
    pub parameter: &'static str,
    pub value: String,
}

macro_rules! closed_facet {
    ($(#[$meta:meta])* $name:ident, $parameter:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Stable string form used in query parameters and the index.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            /// Parse a query-parameter value, rejecting anything outside the vocabulary.
            ///
            /// # Errors
            ///
            /// Returns [`InvalidFacetValue`] naming the parameter for unknown values.
            pub fn parse(value: &str) -> Result<Self, InvalidFacetValue> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err(InvalidFacetValue {
                        parameter: $parameter,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

closed_facet!(
    /// Intended age group for a product.
    AgeGroup,
    "ageGroup",
    {
        Kids => "kids",
        Teens => "teens",
        Adults => "adults",
        Seniors => "seniors",
        All => "all",
    }
);

closed_facet!(
    /// Intended gender for a product.
    Gender,
    "gender",
    {
        Men => "men",
        Women => "women",
        Unisex => "unisex",
    }
);

closed_facet!(
    /// Season a product is marketed for.
    Season,
    "season",
    {
        Summer => "summer",
        Winter => "winter",
        Monsoon => "monsoon",
        AllSeason => "all_season",
        Festive => "festive",
    }
);
