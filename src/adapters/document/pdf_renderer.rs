//! PDF renderer adapter.
//!
//! Implements the `DocumentRenderer` port by emitting a PDF 1.4 file object
//! by object. Nothing is rendered until the returned document is polled;
//! after that, each poll yields one self-contained piece of the file:
//!
//! ```text
//! chunk 0      header, catalog, page tree, font, info
//! chunk 1..=n  page n object and its content stream
//! last chunk   cross-reference table and trailer
//! ```
//!
//! Byte offsets are tracked as chunks are produced, so the cross-reference
//! table is written without ever holding the whole file in memory.
//!
//! Output is deterministic: no creation date, no random file identifier.

use std::fmt::Write as _;
use std::sync::Arc;

use super::helvetica;
use super::layout::{self, Page, PAGE_HEIGHT, PAGE_WIDTH};
use super::template::DocumentTemplate;
use crate::domain::exam::{CopyLabel, Exam};
use crate::ports::{DocumentChunk, DocumentRenderer, ExportFormat, GeneratedDocument, RenderError};

const PRODUCER: &str = "exam-export";

// Fixed object numbers; pages start after these.
const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_ID: usize = 3;
const INFO_ID: usize = 4;
const FIRST_PAGE_ID: usize = 5;

/// Renders exams as printable PDF documents.
///
/// # Example
///
/// ```rust,ignore
/// let renderer = PdfDocumentRenderer::new(DocumentTemplate::default());
/// let document = renderer.render(exam, CopyLabel::UNLABELLED);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfDocumentRenderer {
    template: Arc<DocumentTemplate>,
}

impl PdfDocumentRenderer {
    pub fn new(template: DocumentTemplate) -> Self {
        Self {
            template: Arc::new(template),
        }
    }
}

/// Lay out `exam` under `label`. Pure; shared by preflight and rendering.
fn layout_pages(
    exam: &Exam,
    label: CopyLabel,
    template: &DocumentTemplate,
) -> Result<Vec<Page>, RenderError> {
    if exam.title().trim().is_empty() {
        return Err(RenderError::invalid_exam("exam title is blank"));
    }
    layout::paginate(&template.blocks(exam, label))
}

impl DocumentRenderer for PdfDocumentRenderer {
    fn render(&self, exam: Arc<Exam>, label: CopyLabel) -> GeneratedDocument {
        GeneratedDocument::from_chunks(PdfChunks::new(exam, label, self.template.clone()))
    }

    fn preflight(&self, exam: &Exam, label: CopyLabel) -> Result<(), RenderError> {
        layout_pages(exam, label, &self.template).map(|_| ())
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Prologue,
    Page(usize),
    Trailer,
    Done,
}

/// Lazy iterator over the chunks of one PDF file.
struct PdfChunks {
    exam: Arc<Exam>,
    label: CopyLabel,
    template: Arc<DocumentTemplate>,
    pages: Vec<Page>,
    stage: Stage,
    /// Bytes emitted so far.
    written: usize,
    /// `offsets[n - 1]` is the byte offset of object `n`.
    offsets: Vec<usize>,
}

impl PdfChunks {
    fn new(exam: Arc<Exam>, label: CopyLabel, template: Arc<DocumentTemplate>) -> Self {
        Self {
            exam,
            label,
            template,
            pages: Vec::new(),
            stage: Stage::Prologue,
            written: 0,
            offsets: Vec::new(),
        }
    }

    fn object_count(&self) -> usize {
        FIRST_PAGE_ID - 1 + 2 * self.pages.len()
    }

    fn page_id(index: usize) -> usize {
        FIRST_PAGE_ID + 2 * index
    }

    /// Append object `id` to `buf`, recording its absolute offset.
    fn push_object(&mut self, buf: &mut Vec<u8>, id: usize, body: &[u8]) {
        debug_assert_eq!(self.offsets.len() + 1, id, "objects must be written in order");
        self.offsets.push(self.written + buf.len());
        buf.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
        buf.extend_from_slice(body);
        buf.extend_from_slice(b"\nendobj\n");
    }

    fn prologue(&mut self) -> Result<Vec<u8>, RenderError> {
        self.pages = layout_pages(&self.exam, self.label, &self.template)?;

        let mut buf = Vec::with_capacity(1024);
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let catalog = format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID);
        self.push_object(&mut buf, CATALOG_ID, catalog.as_bytes());

        let mut kids = String::new();
        for index in 0..self.pages.len() {
            if index > 0 {
                kids.push(' ');
            }
            let _ = write!(kids, "{} 0 R", Self::page_id(index));
        }
        let page_tree = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            self.pages.len()
        );
        self.push_object(&mut buf, PAGES_ID, page_tree.as_bytes());

        self.push_object(
            &mut buf,
            FONT_ID,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
        );

        let mut info = b"<< /Title (".to_vec();
        helvetica::escape_literal(&helvetica::encode(self.exam.title()), &mut info);
        info.extend_from_slice(b")");
        if let Some(version) = self.template.version_line(self.label) {
            info.extend_from_slice(b" /Subject (");
            helvetica::escape_literal(&helvetica::encode(&version), &mut info);
            info.extend_from_slice(b")");
        }
        info.extend_from_slice(format!(" /Producer ({}) >>", PRODUCER).as_bytes());
        self.push_object(&mut buf, INFO_ID, &info);

        Ok(buf)
    }

    fn page(&mut self, index: usize) -> Vec<u8> {
        let page_id = Self::page_id(index);
        let contents_id = page_id + 1;

        let mut content = Vec::new();
        for line in &self.pages[index].lines {
            content.extend_from_slice(
                format!(
                    "BT\n/F1 {} Tf\n{:.2} {:.2} Td\n(",
                    line.font_size, line.x, line.y
                )
                .as_bytes(),
            );
            helvetica::escape_literal(&line.text, &mut content);
            content.extend_from_slice(b") Tj\nET\n");
        }

        let mut buf = Vec::with_capacity(content.len() + 256);
        let page = format!(
            "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 {} 0 R >> >> /Contents {} 0 R >>",
            PAGES_ID, PAGE_WIDTH, PAGE_HEIGHT, FONT_ID, contents_id
        );
        self.push_object(&mut buf, page_id, page.as_bytes());

        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(&content);
        stream.extend_from_slice(b"\nendstream");
        self.push_object(&mut buf, contents_id, &stream);

        buf
    }

    fn trailer(&self) -> Vec<u8> {
        let size = self.object_count() + 1;
        let mut out = String::with_capacity(64 + 20 * size);
        let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", size);
        for offset in &self.offsets {
            let _ = write!(out, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            size, CATALOG_ID, INFO_ID, self.written
        );
        out.into_bytes()
    }
}

impl Iterator for PdfChunks {
    type Item = DocumentChunk;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = match self.stage {
            Stage::Prologue => match self.prologue() {
                Ok(chunk) => {
                    self.stage = Stage::Page(0);
                    chunk
                }
                Err(err) => {
                    self.stage = Stage::Done;
                    return Some(Err(err));
                }
            },
            Stage::Page(index) => {
                let chunk = self.page(index);
                self.stage = if index + 1 < self.pages.len() {
                    Stage::Page(index + 1)
                } else {
                    Stage::Trailer
                };
                chunk
            }
            Stage::Trailer => {
                self.stage = Stage::Done;
                self.trailer()
            }
            Stage::Done => return None,
        };

        self.written += chunk.len();
        Some(Ok(chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ExamId;
    use futures::TryStreamExt;
    use proptest::prelude::*;

    fn exam(questions: &[&str]) -> Arc<Exam> {
        Arc::new(
            Exam::new(
                ExamId::new("exam-id-123").unwrap(),
                "Prova1_ESS",
                questions.iter().map(|q| q.to_string()).collect(),
            )
            .unwrap(),
        )
    }

    async fn render_bytes(exam: Arc<Exam>, label: CopyLabel) -> Vec<u8> {
        PdfDocumentRenderer::default()
            .render(exam, label)
            .try_concat()
            .await
            .unwrap()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    /// Text shown by `(...) Tj` operators, in content order.
    fn shown_text(pdf: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = pdf;
        while let Some(end) = rest.windows(4).position(|w| w == b") Tj") {
            let before = &rest[..end];
            if let Some(start) = before.iter().rposition(|&b| b == b'\n') {
                let literal = &before[start + 1..];
                if literal.first() == Some(&b'(') {
                    lines.push(helvetica::decode(&literal[1..]));
                }
            }
            rest = &rest[end + 4..];
        }
        lines
    }

    #[tokio::test]
    async fn single_copy_lists_questions_in_order_without_version() {
        let pdf = render_bytes(
            exam(&["O que é Engenharia de Software?", "O que é um Requisito?"]),
            CopyLabel::UNLABELLED,
        )
        .await;

        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(pdf.ends_with(b"%%EOF\n"));

        let text = shown_text(&pdf);
        assert_eq!(text[0], "Prova1_ESS");
        assert!(!text.iter().any(|l| l.starts_with("Version")));
        let questions: Vec<&String> = text.iter().filter(|l| l.starts_with(char::is_numeric)).collect();
        assert_eq!(
            questions,
            vec!["1. O que é Engenharia de Software?", "2. O que é um Requisito?"]
        );
    }

    #[tokio::test]
    async fn labelled_copy_shows_version_line() {
        let pdf = render_bytes(exam(&["q"]), CopyLabel::from(3)).await;
        let text = shown_text(&pdf);

        assert_eq!(text[1], "Version: 3");
        assert!(contains(&pdf, b"/Subject (Version: 3)"));
    }

    #[tokio::test]
    async fn output_parses_as_pdf() {
        let pdf = render_bytes(exam(&["a", "b", "c"]), CopyLabel::from(1)).await;
        let doc = lopdf::Document::load_mem(&pdf).expect("valid pdf");
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[tokio::test]
    async fn long_exam_spans_several_pages() {
        let prompt = "Explique, com exemplos, a diferença entre verificação e validação. ".repeat(4);
        let questions: Vec<String> = (0..40).map(|_| prompt.clone()).collect();
        let refs: Vec<&str> = questions.iter().map(String::as_str).collect();
        let pdf = render_bytes(exam(&refs), CopyLabel::UNLABELLED).await;

        let doc = lopdf::Document::load_mem(&pdf).expect("valid pdf");
        assert!(doc.get_pages().len() > 1);
    }

    #[tokio::test]
    async fn cross_reference_offsets_point_at_objects() {
        let pdf = render_bytes(exam(&["a"]), CopyLabel::UNLABELLED).await;
        let text = String::from_utf8_lossy(&pdf).into_owned();
        let xref = text.find("xref\n").unwrap();
        let entries: Vec<usize> = text[xref..]
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();

        assert_eq!(entries.len(), 6);
        for (i, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", i + 1);
            assert!(pdf[*offset..].starts_with(expected.as_bytes()));
        }
    }

    #[test]
    fn rendering_is_lazy_and_chunked_per_page() {
        let mut chunks = PdfChunks::new(exam(&["a"]), CopyLabel::UNLABELLED, Arc::default());
        assert!(chunks.pages.is_empty());

        let first = chunks.next().unwrap().unwrap();
        assert!(first.starts_with(b"%PDF"));
        assert_eq!(chunks.pages.len(), 1);

        let page = chunks.next().unwrap().unwrap();
        assert!(page.starts_with(b"5 0 obj"));
        let trailer = chunks.next().unwrap().unwrap();
        assert!(trailer.starts_with(b"xref"));
        assert!(chunks.next().is_none());
    }

    #[tokio::test]
    async fn delimiters_in_prompts_are_escaped() {
        let pdf = render_bytes(exam(&["f(x) = \\y"]), CopyLabel::UNLABELLED).await;
        assert!(contains(&pdf, b"(1. f\\(x\\) = \\\\y) Tj"));
        lopdf::Document::load_mem(&pdf).expect("valid pdf");
    }

    #[test]
    fn preflight_accepts_a_printable_exam_without_rendering() {
        let renderer = PdfDocumentRenderer::default();
        let exam = exam(&["O que é um Requisito?"]);

        assert!(renderer.preflight(&exam, CopyLabel::UNLABELLED).is_ok());
        assert!(renderer.preflight(&exam, CopyLabel::from(500)).is_ok());
    }

    #[test]
    fn preflight_and_rendering_share_one_layout() {
        let template = DocumentTemplate::default();
        let exam = exam(&["a", "b"]);
        let pages = layout_pages(&exam, CopyLabel::from(2), &template).unwrap();

        let mut chunks = PdfChunks::new(exam, CopyLabel::from(2), Arc::new(template));
        chunks.next().unwrap().unwrap();
        assert_eq!(chunks.pages.len(), pages.len());
    }

    #[test]
    fn renderer_reports_pdf_format() {
        assert_eq!(PdfDocumentRenderer::default().format(), ExportFormat::Pdf);
    }

    proptest! {
        #[test]
        fn rendering_is_deterministic(
            prompts in proptest::collection::vec("[a-zA-Z0-9 ?éçã()]{0,80}", 1..8),
            label in 0u32..20,
        ) {
            let refs: Vec<&str> = prompts.iter().map(String::as_str).collect();
            let exam = exam(&refs);
            let render = || -> Vec<u8> {
                PdfChunks::new(exam.clone(), CopyLabel::from(label), Arc::default())
                    .collect::<Result<Vec<_>, _>>()
                    .unwrap()
                    .concat()
            };
            prop_assert_eq!(render(), render());
        }
    }
}
