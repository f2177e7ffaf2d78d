// Office document extraction
// DOCX and PPTX files are zip archives of XML parts; workbooks go through calamine


use anyhow::{Context, Result};
use calamine::{Reader, open_workbook_auto_from_rs};
use quick_xml::Reader as XmlReader;
use quick_xml::events::Event;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

const DOCX_BODY_PART: &str = "word/document.xml";
const PPTX_SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Non-empty paragraphs of a Word document, one per line
#[inline]
pub fn docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).context("Not a valid DOCX archive")?;
    let xml = read_part(&mut archive, DOCX_BODY_PART)?;

    let paragraphs = xml_text_blocks(&xml, b"p")
        .with_context(|| format!("Failed to parse {}", DOCX_BODY_PART))?;
    debug!("Extracted {} paragraphs from DOCX", paragraphs.len());

    Ok(paragraphs.join("\n"))
}

/// Text of every shape on every slide, in slide order
#[inline]
pub fn pptx_text(bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).context("Not a valid PPTX archive")?;

    let mut slides = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|number| (number, name.to_string())))
        .collect::<Vec<_>>();
    slides.sort_unstable();

    let mut shapes = Vec::new();
    for (_, part) in &slides {
        let xml = read_part(&mut archive, part)?;
        shapes.extend(
            xml_text_blocks(&xml, b"sp").with_context(|| format!("Failed to parse {}", part))?,
        );
    }
    debug!(
        "Extracted {} text shapes from {} slides",
        shapes.len(),
        slides.len()
    );

    Ok(shapes.join("\n"))
}

/// Cell text of the first worksheet, row by row.
///
/// Handles XLSX, XLSM, XLSB, XLS and ODS. Empty cells become empty strings.
#[inline]
pub fn workbook_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).context("Not a readable workbook")?;
    let sheet = workbook
        .sheet_names()
        .into_iter()
        .next()
        .context("Workbook has no worksheets")?;
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("Failed to read worksheet {}", sheet))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(ToString::to_string).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    debug!("Read {} rows from worksheet {}", rows.len(), sheet);

    Ok(rows)
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<String> {
    let mut part = archive
        .by_name(name)
        .with_context(|| format!("Archive has no {} part", name))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .with_context(|| format!("Failed to read {}", name))?;
    Ok(xml)
}

/// `ppt/slides/slide12.xml` -> 12
fn slide_number(part: &str) -> Option<u32> {
    part.strip_prefix(PPTX_SLIDE_PREFIX)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Collect the text of every `block` element.
///
/// Text comes from `t` runs; paragraphs (`p`) nested in a block are joined
/// with newlines. Blocks with no visible text are skipped.
fn xml_text_blocks(xml: &str, block: &[u8]) -> Result<Vec<String>> {
    let mut reader = XmlReader::from_str(xml);
    let mut blocks = Vec::new();
    let mut paragraphs: Option<Vec<String>> = None;
    let mut in_run_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                let name = element.local_name();
                if name.as_ref() == block {
                    paragraphs = Some(vec![String::new()]);
                } else if name.as_ref() == b"p" {
                    if let Some(open) = paragraphs.as_mut() {
                        open.push(String::new());
                    }
                } else if name.as_ref() == b"t" {
                    in_run_text = true;
                }
            }
            Event::Text(text) if in_run_text => {
                if let Some(current) = paragraphs.as_mut().and_then(|open| open.last_mut()) {
                    current.push_str(&text.unescape()?);
                }
            }
            Event::End(element) => {
                let name = element.local_name();
                if name.as_ref() == block {
                    if let Some(finished) = paragraphs.take() {
                        let joined = finished
                            .iter()
                            .map(|p| p.trim())
                            .filter(|p| !p.is_empty())
                            .collect::<Vec<_>>()
                            .join("\n");
                        if !joined.is_empty() {
                            blocks.push(joined);
                        }
                    }
                } else if name.as_ref() == b"t" {
                    in_run_text = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(blocks)
}
