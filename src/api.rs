use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{info, warn};

const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";
const COMMONS_API_URL: &str = "https://commons.wikimedia.org/w/api.php";
const USER_AGENT: &str =
    "PlateSpotter/1.0 (https://github.com/platespotter; contact@platespotter.dev)";
const ARTICLE_TITLE: &str = "European_vehicle_registration_plate";
const REQUEST_DELAY: Duration = Duration::from_millis(1000);
const RATE_LIMIT_FALLBACK_WAIT: u64 = 60;

/// Resolved Commons image info: download URL plus licensing metadata.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub url: String,
    pub description_url: String,
    pub width: i64,
    pub height: i64,
    pub mime: String,
    pub license: String,
    pub artist: String,
    pub description: String,
    pub credit: String,
    pub attribution_required: String,
    pub restrictions: String,
}

/// Shared rate-limited client for both MediaWiki endpoints.
///
/// Every request is preceded by a fixed delay; an HTTP 429 is retried once
/// after honoring the server's Retry-After. Any other HTTP error status
/// aborts the run via `?` — a broken transport is not a per-entry failure.
pub struct WikiClient {
    http: reqwest::Client,
}

impl WikiClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http })
    }

    async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<reqwest::Response> {
        tokio::time::sleep(REQUEST_DELAY).await;

        let resp = self.http.get(url).query(params).send().await?;
        if resp.status() != StatusCode::TOO_MANY_REQUESTS {
            return Ok(resp.error_for_status()?);
        }

        let wait = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(RATE_LIMIT_FALLBACK_WAIT);
        warn!("rate-limited, waiting {}s before retry", wait);
        tokio::time::sleep(Duration::from_secs(wait)).await;

        let resp = self.http.get(url).query(params).send().await?;
        Ok(resp.error_for_status()?)
    }

    async fn api_get(&self, api_url: &str, params: &[(&str, &str)]) -> Result<Value> {
        let mut params = params.to_vec();
        params.push(("format", "json"));
        let resp = self.get(api_url, &params).await?;
        Ok(resp.json().await?)
    }

    /// Fetch the raw wikitext of the source article.
    pub async fn fetch_wikitext(&self) -> Result<String> {
        info!("fetching wikitext for '{}'", ARTICLE_TITLE);
        let data = self
            .api_get(
                WIKIPEDIA_API_URL,
                &[
                    ("action", "parse"),
                    ("page", ARTICLE_TITLE),
                    ("prop", "wikitext"),
                ],
            )
            .await?;

        data.pointer("/parse/wikitext/*")
            .and_then(Value::as_str)
            .map(str::to_string)
            .context("no wikitext in parse response")
    }

    /// Resolve URL, size, MIME and licensing metadata for a Commons file.
    /// Returns `None` when the file does not exist (sentinel page id -1).
    pub async fn image_info(&self, file_title: &str) -> Result<Option<ImageInfo>> {
        let data = self
            .api_get(
                COMMONS_API_URL,
                &[
                    ("action", "query"),
                    ("titles", file_title),
                    ("prop", "imageinfo"),
                    ("iiprop", "url|extmetadata|size|mime"),
                    (
                        "iiextmetadatafilter",
                        "LicenseShortName|Artist|ImageDescription|Credit|AttributionRequired|Restrictions",
                    ),
                ],
            )
            .await?;

        Ok(parse_image_info(&data))
    }

    /// Download a resolved image URL to a local file.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let resp = self.get(url, &[]).await?;
        let bytes = resp.bytes().await?;
        tokio::fs::write(dest, &bytes)
            .await
            .with_context(|| format!("failed to write {}", dest.display()))?;
        Ok(())
    }
}

/// Pull the fields we care about out of the imageinfo query envelope.
fn parse_image_info(data: &Value) -> Option<ImageInfo> {
    let pages = data.pointer("/query/pages")?.as_object()?;
    let (page_id, page) = pages.iter().next()?;
    if page_id == "-1" {
        return None;
    }

    let info = page.get("imageinfo").and_then(|v| v.get(0))?;
    let str_field = |v: &Value, key: &str| -> String {
        v.get(key).and_then(Value::as_str).unwrap_or("").to_string()
    };
    let meta_field = |key: &str, default: &str| -> String {
        info.pointer(&format!("/extmetadata/{}/value", key))
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    };

    Some(ImageInfo {
        url: str_field(info, "url"),
        description_url: str_field(info, "descriptionurl"),
        width: info.get("width").and_then(Value::as_i64).unwrap_or(0),
        height: info.get("height").and_then(Value::as_i64).unwrap_or(0),
        mime: str_field(info, "mime"),
        license: meta_field("LicenseShortName", "Unknown"),
        artist: meta_field("Artist", "Unknown"),
        description: meta_field("ImageDescription", ""),
        credit: meta_field("Credit", ""),
        attribution_required: meta_field("AttributionRequired", ""),
        restrictions: meta_field("Restrictions", ""),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_info_found() {
        let data = json!({
            "query": { "pages": { "12345": { "imageinfo": [{
                "url": "https://upload.wikimedia.org/x.jpg",
                "descriptionurl": "https://commons.wikimedia.org/wiki/File:X.jpg",
                "width": 800,
                "height": 200,
                "mime": "image/jpeg",
                "extmetadata": {
                    "LicenseShortName": { "value": "CC BY-SA 4.0" },
                    "Artist": { "value": "<a href=\"#\">Someone</a>" }
                }
            }]}}}
        });
        let info = parse_image_info(&data).unwrap();
        assert_eq!(info.url, "https://upload.wikimedia.org/x.jpg");
        assert_eq!(info.width, 800);
        assert_eq!(info.mime, "image/jpeg");
        assert_eq!(info.license, "CC BY-SA 4.0");
        assert_eq!(info.artist, "<a href=\"#\">Someone</a>");
        // Filtered-out metadata falls back to defaults
        assert_eq!(info.description, "");
    }

    #[test]
    fn image_info_missing_page() {
        let data = json!({
            "query": { "pages": { "-1": { "missing": "" } } }
        });
        assert!(parse_image_info(&data).is_none());
    }

    #[test]
    fn image_info_empty_envelope() {
        assert!(parse_image_info(&json!({})).is_none());
    }

    #[test]
    fn license_defaults_to_unknown() {
        let data = json!({
            "query": { "pages": { "7": { "imageinfo": [{
                "url": "https://upload.wikimedia.org/y.png",
                "mime": "image/png"
            }]}}}
        });
        let info = parse_image_info(&data).unwrap();
        assert_eq!(info.license, "Unknown");
        assert_eq!(info.artist, "Unknown");
        assert_eq!(info.width, 0);
    }
}
