//! PDF source: text of every page, in order.

use super::{ContentType, Extraction, Extractor, SourceDetails, SourceInput};
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// PDF extractor.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the text of a PDF file. Pages are concatenated with no separator.
    ///
    /// Parsing runs on the blocking pool; a parser panic is reported as a parse error.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn extract_file(&self, path: &Path) -> Result<String> {
        let owned: PathBuf = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || pdf_extract::extract_text_by_pages(&owned))
            .await
            .map_err(|e| RecapError::PdfParse(format!("parser aborted: {}", e)))?
            .map_err(|e| RecapError::PdfParse(e.to_string()))?;

        debug!("Extracted {} pages", pages.len());
        Ok(pages.concat())
    }
}

#[async_trait]
impl Extractor for PdfExtractor {
    fn content_type(&self) -> ContentType {
        ContentType::Pdf
    }

    async fn extract(&self, source: &SourceInput) -> Result<Extraction> {
        let SourceInput::File { path, filename } = source else {
            return Err(RecapError::InvalidInput(
                "PDF summaries require an uploaded file".to_string(),
            ));
        };

        let text = self.extract_file(path).await?;

        Ok(Extraction {
            text,
            title: Some(filename.clone()),
            details: SourceDetails::Pdf {
                filename: filename.clone(),
            },
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a PDF with one page per entry in `pages`.
    pub(crate) fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_extract_pages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two-pages.pdf");
        std::fs::write(&path, build_pdf(&["First page", "Second page"])).unwrap();

        let text = PdfExtractor::new().extract_file(&path).await.unwrap();
        let first = text.find("First page").unwrap();
        let second = text.find("Second page").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_invalid_pdf_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();

        let err = PdfExtractor::new().extract_file(&path).await.unwrap_err();
        assert!(matches!(err, RecapError::PdfParse(_)));
        assert!(err.to_string().starts_with("Error extracting PDF: "));
    }

    #[tokio::test]
    async fn test_extract_uses_filename_as_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.pdf");
        std::fs::write(&path, build_pdf(&["Quarterly numbers"])).unwrap();

        let extraction = PdfExtractor::new()
            .extract(&SourceInput::File {
                path,
                filename: "report.pdf".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(extraction.title.as_deref(), Some("report.pdf"));
        assert!(extraction.text.contains("Quarterly numbers"));
    }

    #[tokio::test]
    async fn test_url_input_is_rejected() {
        let err = PdfExtractor::new()
            .extract(&SourceInput::Url("https://example.com/a.pdf".to_string()))
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }
}
