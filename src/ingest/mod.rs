// Ingestion module
// Turns uploaded files into plain text. Failures become inline marker text so
// one bad file never stops a multi-file run.

pub mod html;
pub mod office;


use anyhow::{Context, Result, anyhow, bail};
use std::fs;
use std::panic;
use std::path::Path;
use tracing::{debug, info, warn};

/// Extracts plain text from the raw bytes of one document format
pub trait TextExtractor: Send + Sync {
    /// Short format label used in error markers, e.g. `DOCX`
    fn format_name(&self) -> &'static str;

    fn try_extract(&self, bytes: &[u8]) -> Result<String>;

    /// Extract text, or return `"[<FORMAT> Error] <message>"` on failure
    #[inline]
    fn extract(&self, bytes: &[u8]) -> String {
        match self.try_extract(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!("{} extraction failed: {:#}", self.format_name(), e);
                format!("[{} Error] {:#}", self.format_name(), e)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    #[inline]
    fn format_name(&self) -> &'static str {
        "TXT"
    }

    #[inline]
    fn try_extract(&self, bytes: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Re-serializes JSON with two-space indentation
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExtractor;

impl TextExtractor for JsonExtractor {
    #[inline]
    fn format_name(&self) -> &'static str {
        "JSON"
    }

    #[inline]
    fn try_extract(&self, bytes: &[u8]) -> Result<String> {
        let value: serde_json::Value = serde_json::from_slice(bytes).context("Invalid JSON")?;
        serde_json::to_string_pretty(&value).context("Failed to format JSON")
    }
}

/// Delimited tables, re-emitted as comma-separated text with the header row
#[derive(Debug, Clone, Copy)]
pub struct DelimitedExtractor {
    delimiter: u8,
}

impl DelimitedExtractor {
    pub const CSV: Self = Self { delimiter: b',' };
    pub const TSV: Self = Self { delimiter: b'\t' };
}

impl TextExtractor for DelimitedExtractor {
    #[inline]
    fn format_name(&self) -> &'static str {
        if self.delimiter == b'\t' { "TSV" } else { "CSV" }
    }

    #[inline]
    fn try_extract(&self, bytes: &[u8]) -> Result<String> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(bytes);
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer
            .write_record(reader.headers().context("Failed to read header row")?)
            .context("Failed to write header row")?;
        for (row, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("Malformed row {}", row + 1))?;
            writer.write_record(&record)?;
        }

        table_text(writer)
    }
}

/// First worksheet of a workbook, emitted as comma-separated text
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelExtractor;

impl TextExtractor for ExcelExtractor {
    #[inline]
    fn format_name(&self) -> &'static str {
        "Excel"
    }

    #[inline]
    fn try_extract(&self, bytes: &[u8]) -> Result<String> {
        let rows = office::workbook_rows(bytes)?;
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        for row in &rows {
            writer.write_record(row)?;
        }
        table_text(writer)
    }
}

fn table_text(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush table text: {}", e.error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Text layer of a PDF. A document with no text layer at all is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    #[inline]
    fn format_name(&self) -> &'static str {
        "PDF"
    }

    #[inline]
    fn try_extract(&self, bytes: &[u8]) -> Result<String> {
        // The PDF parser panics on some malformed fonts and streams
        let text = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
            .map_err(|_| anyhow!("PDF parser aborted on malformed input"))?
            .map_err(|e| anyhow!("Failed to read PDF: {}", e))?;

        if text.trim().is_empty() {
            bail!("No text layer found; scanned pages need OCR");
        }
        Ok(text)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl TextExtractor for HtmlExtractor {
    #[inline]
    fn format_name(&self) -> &'static str {
        "HTML"
    }

    #[inline]
    fn try_extract(&self, bytes: &[u8]) -> Result<String> {
        Ok(html::visible_text(&String::from_utf8_lossy(bytes)))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    #[inline]
    fn format_name(&self) -> &'static str {
        "DOCX"
    }

    #[inline]
    fn try_extract(&self, bytes: &[u8]) -> Result<String> {
        office::docx_text(bytes)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PptxExtractor;

impl TextExtractor for PptxExtractor {
    #[inline]
    fn format_name(&self) -> &'static str {
        "PPTX"
    }

    #[inline]
    fn try_extract(&self, bytes: &[u8]) -> Result<String> {
        office::pptx_text(bytes)
    }
}

/// Extractor for a file name, chosen by its lower-cased extension
#[inline]
pub fn extractor_for(name: &str) -> Option<&'static dyn TextExtractor> {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)?;

    let extractor: &'static dyn TextExtractor = match extension.as_str() {
        "pdf" => &PdfExtractor,
        "txt" | "md" => &PlainTextExtractor,
        "json" => &JsonExtractor,
        "csv" => &DelimitedExtractor::CSV,
        "tsv" => &DelimitedExtractor::TSV,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => &ExcelExtractor,
        "html" | "htm" => &HtmlExtractor,
        "docx" => &DocxExtractor,
        "pptx" => &PptxExtractor,
        _ => return None,
    };
    Some(extractor)
}

/// Extract text from a named file's bytes.
///
/// Unknown formats yield `"[Unsupported format: <name>]"`.
#[inline]
pub fn extract_file(name: &str, bytes: &[u8]) -> String {
    match extractor_for(name) {
        Some(extractor) => {
            debug!(
                "Extracting {} as {} ({} bytes)",
                name,
                extractor.format_name(),
                bytes.len()
            );
            extractor.extract(bytes)
        }
        None => {
            warn!("No extractor for {}", name);
            format!("[Unsupported format: {}]", name.to_lowercase())
        }
    }
}

/// Aggregated text of every ingested document and page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    text: String,
    documents: usize,
}

impl Corpus {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one document's text on a new line
    #[inline]
    pub fn add_document(&mut self, text: &str) {
        self.text.push('\n');
        self.text.push_str(text);
        self.documents += 1;
    }

    #[inline]
    pub fn add_file(&mut self, name: &str, bytes: &[u8]) {
        let text = extract_file(name, bytes);
        self.add_document(&text);
    }

    /// Read and extract a file from disk. Read failures are recorded as
    /// marker text like any other extraction failure.
    #[inline]
    pub fn add_path(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        match fs::read(path) {
            Ok(bytes) => {
                info!("Processing {}", name);
                self.add_file(&name, &bytes);
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                self.add_document(&format!("[File Error] {}: {}", name, e));
            }
        }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn document_count(&self) -> usize {
        self.documents
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.documents == 0
    }

    #[inline]
    pub fn into_text(self) -> String {
        self.text
    }
}
