use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use crate::api::{ImageInfo, WikiClient};
use crate::parser::PlateEntry;

const SOURCE_LABEL: &str = "Wikipedia - European vehicle registration plate";
const SOURCE_URL: &str = "https://en.wikipedia.org/wiki/European_vehicle_registration_plate";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Success,
    SuccessDry,
    Failed,
}

/// Per-entry outcome recorded in the run log.
#[derive(Debug, Serialize)]
pub struct EntryResult {
    pub status: EntryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Full resolved record for one territory, persisted in the metadata
/// document. Field names are the on-disk JSON schema.
#[derive(Debug, Serialize)]
pub struct PlateRecord {
    pub country_name: String,
    pub territory_id: String,
    pub section: crate::parser::Section,
    pub file_name: String,
    pub local_path: String,
    pub source_file: String,
    pub source_url: String,
    pub download_url: String,
    pub license: String,
    pub artist: String,
    pub artist_html: String,
    pub attribution_required: bool,
    pub credit_line: String,
    pub description: String,
    pub restrictions: String,
    pub image_width: i64,
    pub image_height: i64,
    pub mime_type: String,
    pub downloaded_at: String,
}

#[derive(Debug, Serialize)]
pub struct Metadata {
    pub generated_at: String,
    pub source: &'static str,
    pub source_url: &'static str,
    pub entries: BTreeMap<String, PlateRecord>,
}

#[derive(Debug, Serialize)]
pub struct RunLog {
    pub run_started: String,
    pub run_completed: String,
    pub dry_run: bool,
    pub total_entries: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: BTreeMap<String, EntryResult>,
}

impl RunLog {
    pub fn failed_entries(&self) -> impl Iterator<Item = (&String, &EntryResult)> {
        self.results
            .iter()
            .filter(|(_, r)| r.status == EntryStatus::Failed)
    }
}

/// Resolve and download every entry sequentially, writing the metadata
/// document incrementally and the run log at the end.
///
/// Resolution failures are per-entry and do not stop the run; transport
/// errors from the client abort it.
pub async fn run(
    client: &WikiClient,
    entries: &[PlateEntry],
    output_dir: &Path,
    dry_run: bool,
) -> Result<RunLog> {
    let plates_dir = output_dir.join("plates").join("europe");
    let metadata_dir = output_dir.join("metadata");
    std::fs::create_dir_all(&plates_dir)?;
    std::fs::create_dir_all(&metadata_dir)?;

    let started = Utc::now().to_rfc3339();
    let mut metadata = Metadata {
        generated_at: started.clone(),
        source: SOURCE_LABEL,
        source_url: SOURCE_URL,
        entries: BTreeMap::new(),
    };
    let mut results: BTreeMap<String, EntryResult> = BTreeMap::new();

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    for entry in entries {
        pb.set_message(format!("{} ({})", entry.territory_id, entry.display_name));
        pb.println(format!("[{}] {}", entry.territory_id, entry.display_name));
        pb.println(format!("  Wiki image: {}", entry.image_file));

        let result = process_entry(client, entry, output_dir, &plates_dir, dry_run, &mut metadata)
            .await?;
        if let Some(reason) = &result.reason {
            pb.println(format!("  failed: {}", reason));
        }
        results.insert(entry.territory_id.clone(), result);

        // Rewrite the metadata document after each entry so a crashed run
        // keeps everything resolved so far.
        if !dry_run {
            write_json(&metadata_dir.join("wiki_plates.json"), &metadata)?;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let log = RunLog {
        run_started: started,
        run_completed: Utc::now().to_rfc3339(),
        dry_run,
        total_entries: entries.len(),
        successful: results
            .values()
            .filter(|r| matches!(r.status, EntryStatus::Success | EntryStatus::SuccessDry))
            .count(),
        failed: results
            .values()
            .filter(|r| r.status == EntryStatus::Failed)
            .count(),
        results,
    };
    write_json(&metadata_dir.join("wiki_download_log.json"), &log)?;

    Ok(log)
}

async fn process_entry(
    client: &WikiClient,
    entry: &PlateEntry,
    output_dir: &Path,
    plates_dir: &Path,
    dry_run: bool,
    metadata: &mut Metadata,
) -> Result<EntryResult> {
    let Some(info) = client.image_info(&entry.image_file).await? else {
        warn!(
            "could not resolve image info for {} ({})",
            entry.image_file, entry.territory_id
        );
        return Ok(EntryResult {
            status: EntryStatus::Failed,
            image_file: None,
            reason: Some(format!("Image not found on Commons: {}", entry.image_file)),
        });
    };

    if dry_run {
        info!(
            "{}x{} [{}] license={}",
            info.width, info.height, info.mime, info.license
        );
        return Ok(EntryResult {
            status: EntryStatus::SuccessDry,
            image_file: Some(entry.image_file.clone()),
            reason: None,
        });
    }

    let ext = mime_to_ext(&info.mime);
    let file_name = format!("{}_wiki{}", entry.territory_id, ext);
    let dest = plates_dir.join(&file_name);
    client
        .download(&info.url, &dest)
        .await
        .with_context(|| format!("download failed for {}", entry.image_file))?;

    let record = build_record(entry, &info, &file_name, &dest, output_dir);
    metadata.entries.insert(entry.territory_id.clone(), record);

    Ok(EntryResult {
        status: EntryStatus::Success,
        image_file: Some(entry.image_file.clone()),
        reason: None,
    })
}

fn build_record(
    entry: &PlateEntry,
    info: &ImageInfo,
    file_name: &str,
    dest: &Path,
    output_dir: &Path,
) -> PlateRecord {
    let local_path = dest
        .strip_prefix(output_dir)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| PathBuf::from(file_name));

    PlateRecord {
        country_name: entry.display_name.clone(),
        territory_id: entry.territory_id.clone(),
        section: entry.section,
        file_name: file_name.to_string(),
        local_path: local_path.to_string_lossy().into_owned(),
        source_file: entry.image_file.clone(),
        source_url: info.description_url.clone(),
        download_url: info.url.clone(),
        license: info.license.clone(),
        artist: strip_html(&info.artist),
        artist_html: info.artist.clone(),
        attribution_required: info.attribution_required == "true",
        credit_line: strip_html(&info.credit),
        description: strip_html(&info.description),
        restrictions: info.restrictions.clone(),
        image_width: info.width,
        image_height: info.height,
        mime_type: info.mime.clone(),
        downloaded_at: Utc::now().to_rfc3339(),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Map a MIME type to the extension used for saved files. Anything
/// unrecognized is saved as .jpg.
pub fn mime_to_ext(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "image/svg+xml" => ".svg",
        "image/gif" => ".gif",
        "image/tiff" => ".tiff",
        "image/webp" => ".webp",
        _ => ".jpg",
    }
}

/// Remove HTML tags and unescape entities. Artist/credit fields from the
/// Commons extmetadata arrive as HTML fragments.
pub fn strip_html(html: &str) -> String {
    let text = TAG_RE.replace_all(html, "").replace("&nbsp;", " ");
    let unescaped = match quick_xml::escape::unescape(&text) {
        Ok(u) => u.into_owned(),
        // Fragments with entities quick-xml does not know still get the
        // basic five decoded by hand.
        Err(_) => text
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&"),
    };
    unescaped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Section;

    #[test]
    fn mime_table() {
        assert_eq!(mime_to_ext("image/jpeg"), ".jpg");
        assert_eq!(mime_to_ext("image/png"), ".png");
        assert_eq!(mime_to_ext("image/svg+xml"), ".svg");
        assert_eq!(mime_to_ext("image/webp"), ".webp");
        assert_eq!(mime_to_ext("application/pdf"), ".jpg");
        assert_eq!(mime_to_ext(""), ".jpg");
    }

    #[test]
    fn strip_html_tags_and_entities() {
        assert_eq!(
            strip_html("<a href=\"#\">M&uuml;ller &amp; S&ouml;hne</a>"),
            "M&uuml;ller & S&ouml;hne"
        );
        assert_eq!(strip_html("plain"), "plain");
        assert_eq!(strip_html("  <b>x</b>  "), "x");
        assert_eq!(strip_html("a&nbsp;b"), "a b");
    }

    #[test]
    fn entry_result_skips_absent_fields() {
        let r = EntryResult {
            status: EntryStatus::Failed,
            image_file: None,
            reason: Some("Image not found on Commons: File:X.jpg".into()),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json.get("image_file").is_none());
        assert_eq!(json["reason"], "Image not found on Commons: File:X.jpg");
    }

    #[test]
    fn status_serialization() {
        assert_eq!(
            serde_json::to_string(&EntryStatus::SuccessDry).unwrap(),
            "\"success_dry\""
        );
        assert_eq!(
            serde_json::to_string(&EntryStatus::Success).unwrap(),
            "\"success\""
        );
    }

    #[test]
    fn record_json_shape() {
        let entry = PlateEntry {
            wiki_code: "D".into(),
            territory_id: "DE".into(),
            display_name: "Germany".into(),
            section: Section::Countries,
            image_file: "File:Germany_license_plate.jpg".into(),
        };
        let info = ImageInfo {
            url: "https://upload.wikimedia.org/de.jpg".into(),
            description_url: "https://commons.wikimedia.org/wiki/File:De.jpg".into(),
            width: 800,
            height: 200,
            mime: "image/jpeg".into(),
            license: "CC BY-SA 4.0".into(),
            artist: "<a>Someone</a>".into(),
            description: "A plate".into(),
            credit: "Own work".into(),
            attribution_required: "true".into(),
            restrictions: "".into(),
        };
        let out = Path::new("dataset");
        let dest = out.join("plates").join("europe").join("DE_wiki.jpg");
        let record = build_record(&entry, &info, "DE_wiki.jpg", &dest, out);

        assert_eq!(record.territory_id, "DE");
        assert_eq!(record.artist, "Someone");
        assert_eq!(record.artist_html, "<a>Someone</a>");
        assert!(record.attribution_required);
        assert_eq!(record.local_path, "plates/europe/DE_wiki.jpg");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["section"], "countries");
        assert_eq!(json["mime_type"], "image/jpeg");
    }

    #[test]
    fn json_documents_written() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog {
            run_started: "2026-01-01T00:00:00Z".into(),
            run_completed: "2026-01-01T00:01:00Z".into(),
            dry_run: true,
            total_entries: 1,
            successful: 1,
            failed: 0,
            results: BTreeMap::from([(
                "DE".to_string(),
                EntryResult {
                    status: EntryStatus::SuccessDry,
                    image_file: Some("File:Germany_license_plate.jpg".into()),
                    reason: None,
                },
            )]),
        };
        let path = dir.path().join("wiki_download_log.json");
        write_json(&path, &log).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["total_entries"], 1);
        assert_eq!(parsed["results"]["DE"]["status"], "success_dry");
        assert_eq!(log.failed_entries().count(), 0);
    }
}
