//! Character portrait URL resolution.
//!
//! # Responsibility
//! - Map a stored blob path to a publicly resolvable URL, in one place,
//!   after raw records are fetched.
//!
//! # Invariants
//! - Resolution is pure: no I/O, same input gives the same URL.
//! - Path segments are percent-encoded; `/` inside a stored path keeps its
//!   directory meaning.

use std::error::Error;
use std::fmt::{Display, Formatter};
use url::Url;

/// Default blob bucket holding character portraits.
pub const DEFAULT_BUCKET: &str = "characters";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageResolverError {
    InvalidBaseUrl { url: String, message: String },
    /// Base URL cannot carry path segments (e.g. `mailto:`).
    NotHierarchical(String),
    BlankBucket,
}

impl Display for ImageResolverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBaseUrl { url, message } => {
                write!(f, "invalid image base url `{url}`: {message}")
            }
            Self::NotHierarchical(url) => {
                write!(f, "image base url `{url}` cannot hold a path")
            }
            Self::BlankBucket => write!(f, "image bucket must not be blank"),
        }
    }
}

impl Error for ImageResolverError {}

/// Resolves stored image paths against a public blob-store root.
///
/// Produces `<base_url>/<bucket>/<path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResolver {
    base: Url,
    bucket: String,
}

impl ImageResolver {
    pub fn new(base_url: &str, bucket: &str) -> Result<Self, ImageResolverError> {
        let base = Url::parse(base_url.trim()).map_err(|err| ImageResolverError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: err.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ImageResolverError::NotHierarchical(base_url.to_string()));
        }

        let bucket = bucket.trim().trim_matches('/');
        if bucket.is_empty() {
            return Err(ImageResolverError::BlankBucket);
        }

        Ok(Self {
            base,
            bucket: bucket.to_string(),
        })
    }

    /// Returns the public URL for `image_path`, or `None` when there is no
    /// (non-blank) path.
    pub fn resolve(&self, image_path: Option<&str>) -> Option<String> {
        let path = image_path.map(str::trim).filter(|path| !path.is_empty())?;

        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().ok()?;
            segments.pop_if_empty().push(&self.bucket);
            segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
        }
        Some(url.into())
    }
}
