//! Audit configuration.

use percent_encoding::percent_decode_str;

use crate::error::{Error, Result};

/// Pixel area at or above which an image is reported as oversized.
pub const DEFAULT_PIXEL_THRESHOLD: u64 = 5_600_000;

/// Switches controlling which documents are scanned and which images count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Also scan `.html` and `.htm` documents.
    pub include_html: bool,
    /// Scan `.css` stylesheets and embedded `<style>` blocks.
    pub include_css: bool,
    /// Scan `.svg` documents and `<image>` links inside markup.
    pub include_svg: bool,
    /// Drop the requirement that candidates live in an `images` directory.
    pub search_all_images: bool,
    /// Restrict candidates to images declared in the package manifest.
    pub follow_manifest_only: bool,
    pub pixel_threshold: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            include_html: false,
            include_css: false,
            include_svg: false,
            search_all_images: false,
            follow_manifest_only: false,
            pixel_threshold: DEFAULT_PIXEL_THRESHOLD,
        }
    }
}

impl Options {
    pub fn with_html(mut self, on: bool) -> Self {
        self.include_html = on;
        self
    }

    pub fn with_css(mut self, on: bool) -> Self {
        self.include_css = on;
        self
    }

    pub fn with_svg(mut self, on: bool) -> Self {
        self.include_svg = on;
        self
    }

    pub fn with_search_all_images(mut self, on: bool) -> Self {
        self.search_all_images = on;
        self
    }

    pub fn with_follow_manifest_only(mut self, on: bool) -> Self {
        self.follow_manifest_only = on;
        self
    }

    pub fn with_pixel_threshold(mut self, threshold: u64) -> Self {
        self.pixel_threshold = threshold;
        self
    }

    /// Build options from string-typed flags.
    ///
    /// Keys may be written `includeHtml`, `include_html` or `include-html`.
    /// Boolean flags are on for `1`, `true`, `yes` or `on` (any case) and
    /// off for anything else. Unknown keys are ignored.
    ///
    /// ```
    /// use imgaudit::Options;
    ///
    /// let options =
    ///     Options::from_flags([("includeCss", "true"), ("pixel-threshold", "1000")]).unwrap();
    /// assert!(options.include_css);
    /// assert_eq!(options.pixel_threshold, 1000);
    /// ```
    pub fn from_flags<I, K, V>(flags: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (key, value) in flags {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            match canonical_key(key).as_str() {
                "includehtml" => options.include_html = is_truthy(value),
                "includecss" => options.include_css = is_truthy(value),
                "includesvg" => options.include_svg = is_truthy(value),
                "searchallimages" => options.search_all_images = is_truthy(value),
                "followmanifestonly" => options.follow_manifest_only = is_truthy(value),
                "pixelthreshold" => {
                    options.pixel_threshold =
                        value.parse().map_err(|_| Error::InvalidOption {
                            name: key.to_string(),
                            value: value.to_string(),
                        })?;
                }
                _ => tracing::debug!(key, "ignoring unknown option"),
            }
        }
        Ok(options)
    }

    /// Build options from a `key=value&key=value` string.
    ///
    /// A key without `=` is treated as an enabled flag. Keys and values are
    /// percent-decoded.
    pub fn from_query(query: &str) -> Result<Self> {
        let decode = |s: &str| percent_decode_str(s).decode_utf8_lossy().into_owned();
        Self::from_flags(
            query
                .trim_start_matches('?')
                .split('&')
                .filter(|pair| !pair.is_empty())
                .map(|pair| pair.split_once('=').unwrap_or((pair, "true")))
                .map(|(key, value)| (decode(key), decode(value))),
        )
    }
}

fn canonical_key(key: &str) -> String {
    key.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn is_truthy(value: &str) -> bool {
    ["1", "true", "yes", "on"]
        .iter()
        .any(|t| value.eq_ignore_ascii_case(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(!options.include_html);
        assert!(!options.include_css);
        assert!(!options.include_svg);
        assert!(!options.search_all_images);
        assert!(!options.follow_manifest_only);
        assert_eq!(options.pixel_threshold, 5_600_000);
    }

    #[test]
    fn test_key_spellings() {
        let options = Options::from_flags([
            ("includeHtml", "1"),
            ("include_svg", "YES"),
            ("search-all-images", "on"),
            ("FollowManifestOnly", "True"),
        ])
        .unwrap();
        assert!(options.include_html);
        assert!(options.include_svg);
        assert!(options.search_all_images);
        assert!(options.follow_manifest_only);
        assert!(!options.include_css);
    }

    #[test]
    fn test_non_truthy_values_are_false() {
        let options = Options::default().with_css(true);
        let parsed =
            Options::from_flags([("includeCss", "false"), ("includeHtml", "nope")]).unwrap();
        assert!(options.include_css);
        assert!(!parsed.include_css);
        assert!(!parsed.include_html);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let options = Options::from_flags([("colour", "blue")]).unwrap();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn test_invalid_threshold() {
        let err = Options::from_flags([("pixelThreshold", "-5")]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidOption { ref name, ref value }
                if name == "pixelThreshold" && value == "-5"
        ));
    }

    #[test]
    fn test_from_query() {
        let options = Options::from_query("?includeCss=1&includeSvg&pixelThreshold=42").unwrap();
        assert!(options.include_css);
        assert!(options.include_svg);
        assert_eq!(options.pixel_threshold, 42);
        assert_eq!(Options::from_query("").unwrap(), Options::default());
    }

    #[test]
    fn test_from_query_percent_decoded() {
        let options = Options::from_query("pixelThreshold=5%30&include%5Fcss=%31").unwrap();
        assert_eq!(options.pixel_threshold, 50);
        assert!(options.include_css);
    }
}
