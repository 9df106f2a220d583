/// Serializers for a finished batch: ZIP of HTML files, JSON metadata, CSV table.
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tracing::info;
use zip::write::SimpleFileOptions;

use crate::error::AppError;
use crate::model::{GeneratedContent, MetaTags, PageResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Zip,
    Json,
    Csv,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Zip, ExportFormat::Json, ExportFormat::Csv];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Zip => "seo_pages.zip",
            Self::Json => "pages_metadata.json",
            Self::Csv => "pages_metadata.csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zip" => Ok(Self::Zip),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(AppError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub format: ExportFormat,
    pub path: PathBuf,
    pub bytes: u64,
}

/// `{keyword}_{city}.html` with spaces and path separators replaced by `_`.
pub fn page_file_name(page: &PageResult) -> String {
    let stem: String = format!("{}_{}", page.keyword, page.city)
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    format!("{stem}.html")
}

/// One HTML file per page. Colliding names get a `-2`, `-3`, ... suffix.
pub fn zip_archive(pages: &[PageResult]) -> Result<Vec<u8>, AppError> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let mut used: HashSet<String> = HashSet::new();

    for page in pages {
        let base = page_file_name(page);
        let mut name = base.clone();
        let mut n = 2;
        while used.contains(&name) {
            name = format!("{}-{n}.html", base.trim_end_matches(".html"));
            n += 1;
        }
        used.insert(name.clone());

        writer.start_file(name, options)?;
        writer.write_all(page.html.as_bytes())?;
    }

    Ok(writer.finish()?.into_inner())
}

#[derive(Serialize)]
struct PageMetadata<'a> {
    keyword: &'a str,
    city: &'a str,
    meta: &'a MetaTags,
    content: &'a GeneratedContent,
}

/// Pretty-printed array of `{keyword, city, meta, content}`.
pub fn json_document(pages: &[PageResult]) -> Result<String, AppError> {
    let entries: Vec<PageMetadata<'_>> = pages
        .iter()
        .map(|p| PageMetadata {
            keyword: &p.keyword,
            city: &p.city,
            meta: &p.meta,
            content: &p.content,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

/// Keyword, city, country, title and description per page, all fields quoted.
pub fn csv_table(pages: &[PageResult]) -> Result<String, AppError> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    wtr.write_record(["Keyword", "City", "Country", "Meta Title", "Meta Description"])?;
    for page in pages {
        wtr.write_record([
            page.keyword.as_str(),
            page.city.as_str(),
            page.country.as_str(),
            page.meta.title.as_str(),
            page.meta.description.as_str(),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| AppError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write the requested formats into `dir`, creating it if needed.
pub fn write_exports(
    pages: &[PageResult],
    dir: &Path,
    formats: &[ExportFormat],
) -> Result<Vec<ExportedFile>, AppError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(formats.len());
    for &format in formats {
        let data = match format {
            ExportFormat::Zip => zip_archive(pages)?,
            ExportFormat::Json => json_document(pages)?.into_bytes(),
            ExportFormat::Csv => csv_table(pages)?.into_bytes(),
        };
        let path = dir.join(format.file_name());
        std::fs::write(&path, &data)?;
        info!(format = format.as_str(), path = %path.display(), bytes = data.len(), "export written");
        written.push(ExportedFile {
            format,
            path,
            bytes: data.len() as u64,
        });
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::content::fallback_content;
    use crate::meta::build_meta_tags;
    use crate::model::Location;

    fn page(keyword: &str, city: &str, country: &str) -> PageResult {
        let content = fallback_content(keyword, &Location::new(city, "", country));
        let meta = build_meta_tags(keyword, city, country, &content.intro);
        PageResult {
            keyword: keyword.to_string(),
            city: city.to_string(),
            country: country.to_string(),
            html: format!("<html><body>{keyword}</body></html>"),
            content,
            meta,
        }
    }

    #[test]
    fn file_names_replace_spaces() {
        assert_eq!(page_file_name(&page("aircon repair", "New York", "")), "aircon_repair_New_York.html");
        assert_eq!(page_file_name(&page("plumber", "", "")), "plumber_.html");
        assert_eq!(page_file_name(&page("a/b", "", "")), "a_b_.html");
    }

    #[test]
    fn zip_has_one_file_per_page() {
        let pages = vec![
            page("plumber", "", ""),
            page("electrician", "New York", "USA"),
            page("plumber", "", ""),
        ];
        let bytes = zip_archive(&pages).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);

        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["electrician_New_York.html", "plumber_-2.html", "plumber_.html"]
        );

        let mut html = String::new();
        archive
            .by_name("electrician_New_York.html")
            .unwrap()
            .read_to_string(&mut html)
            .unwrap();
        assert_eq!(html, "<html><body>electrician</body></html>");
    }

    #[test]
    fn json_contains_meta_and_content() {
        let json = json_document(&[page("plumber", "Dubai", "UAE")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let entry = &value[0];
        assert_eq!(entry["keyword"], "plumber");
        assert_eq!(entry["city"], "Dubai");
        assert_eq!(entry["meta"]["schema"]["@type"], "LocalBusiness");
        assert_eq!(entry["content"]["benefits"].as_array().unwrap().len(), 3);
        assert!(entry.get("html").is_none());
    }

    #[test]
    fn csv_quotes_title_and_description() {
        let csv = csv_table(&[page("plumber", "Dubai", "UAE")]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            r#""Keyword","City","Country","Meta Title","Meta Description""#
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with(r#""plumber","Dubai","UAE","plumber in Dubai, UAE | Professional Services","Expert plumber"#));
        assert!(lines.next().is_none());
    }

    #[test]
    fn csv_round_trips_commas_in_fields() {
        let csv = csv_table(&[page("plumber", "Dubai", "UAE")]).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[3], "plumber in Dubai, UAE | Professional Services");
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert_eq!("ZIP".parse::<ExportFormat>().unwrap(), ExportFormat::Zip);
        assert!(matches!("pdf".parse::<ExportFormat>(), Err(AppError::UnknownFormat(_))));
    }

    #[test]
    fn write_exports_creates_all_files() {
        let dir = std::env::temp_dir().join(format!("seo-pages-export-{}", std::process::id()));
        let files = write_exports(&[page("plumber", "", "")], &dir, &ExportFormat::ALL).unwrap();
        assert_eq!(files.len(), 3);
        for file in &files {
            assert!(file.path.exists());
            assert_eq!(std::fs::metadata(&file.path).unwrap().len(), file.bytes);
        }
        std::fs::remove_dir_all(&dir).ok();
    }
}
