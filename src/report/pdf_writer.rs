//! Minimal PDF 1.4 writer: Helvetica text, two-column tables and embedded JPEG photos.

use thiserror::Error;

const PAGE_WIDTH: f64 = 595.28;
const PAGE_HEIGHT: f64 = 841.89;
const MARGIN: f64 = 56.0;
const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;
const ROW_HEIGHT: f64 = 18.0;
const LABEL_COLUMN: f64 = 170.0;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("not a JPEG image")]
    NotJpeg,
    #[error("JPEG frame header not found")]
    MissingFrame,
    #[error("unsupported JPEG with {0} color components")]
    Components(u8),
}

/// A baseline or progressive JPEG, embedded as-is with `DCTDecode`.
pub struct Jpeg {
    width: u16,
    height: u16,
    components: u8,
    data: Vec<u8>,
}

impl Jpeg {
    pub fn parse(data: Vec<u8>) -> Result<Self, ImageError> {
        if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
            return Err(ImageError::NotJpeg);
        }

        let mut i = 2;
        while i + 4 <= data.len() {
            if data[i] != 0xFF {
                i += 1;
                continue;
            }
            let marker = data[i + 1];
            match marker {
                0xFF => {
                    i += 1;
                    continue;
                }
                0xD0..=0xD9 | 0x01 => {
                    i += 2;
                    continue;
                }
                _ => {}
            }

            let len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
            if is_frame {
                if i + 10 > data.len() {
                    break;
                }
                let height = u16::from_be_bytes([data[i + 5], data[i + 6]]);
                let width = u16::from_be_bytes([data[i + 7], data[i + 8]]);
                let components = data[i + 9];
                if !matches!(components, 1 | 3 | 4) {
                    return Err(ImageError::Components(components));
                }
                return Ok(Jpeg {
                    width,
                    height,
                    components,
                    data,
                });
            }
            i += 2 + len;
        }

        Err(ImageError::MissingFrame)
    }

    fn color_space(&self) -> &'static str {
        match self.components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        }
    }
}

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Flowing document builder. Content runs top to bottom and breaks onto new pages as needed.
pub struct PdfDocument {
    pages: Vec<Vec<u8>>,
    current: Vec<u8>,
    cursor: f64,
    images: Vec<Jpeg>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    pub fn new() -> Self {
        PdfDocument {
            pages: Vec::new(),
            current: Vec::new(),
            cursor: PAGE_HEIGHT - MARGIN,
            images: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn page_count(&self) -> usize {
        self.pages.len() + usize::from(!self.current.is_empty())
    }

    pub fn page_break(&mut self) {
        if !self.current.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    pub fn spacer(&mut self, height: f64) {
        self.cursor -= height;
    }

    pub fn title(&mut self, text: &str) {
        let size = 24.0;
        self.ensure_space(size + 30.0);
        let width = estimate_width(text, size);
        let x = MARGIN + ((CONTENT_WIDTH - width) / 2.0).max(0.0);
        self.cursor -= size;
        self.text_at(Font::Bold, size, x, self.cursor, text);
        self.cursor -= 30.0;
    }

    pub fn heading(&mut self, text: &str) {
        let size = 16.0;
        self.ensure_space(size + 32.0 + ROW_HEIGHT);
        self.cursor -= 20.0 + size;
        self.text_at(Font::Bold, size, MARGIN, self.cursor, text);
        self.cursor -= 12.0;
    }

    /// A paragraph of regular text, wrapped to the content width.
    pub fn paragraph(&mut self, text: &str) {
        self.lines(Font::Regular, text);
    }

    pub fn bold_line(&mut self, text: &str) {
        self.lines(Font::Bold, text);
    }

    fn lines(&mut self, font: Font, text: &str) {
        let size = 10.0;
        for line in wrap(text, size) {
            self.ensure_space(size + 4.0);
            self.cursor -= size + 4.0;
            self.text_at(font, size, MARGIN, self.cursor, &line);
        }
    }

    /// Two-column table with a shaded header row.
    pub fn table(&mut self, header: (&str, &str), rows: &[(String, String)]) {
        self.table_row(header.0, header.1, true);
        for (label, value) in rows {
            self.table_row(label, value, false);
        }
        self.cursor -= 4.0;
    }

    fn table_row(&mut self, label: &str, value: &str, header: bool) {
        self.ensure_space(ROW_HEIGHT);
        let y = self.cursor - ROW_HEIGHT;
        let value_width = CONTENT_WIDTH - LABEL_COLUMN;

        if header {
            self.op(&format!(
                "0.5 g {:.2} {:.2} {:.2} {:.2} re f 0 g\n",
                MARGIN, y, CONTENT_WIDTH, ROW_HEIGHT
            ));
        }
        self.op(&format!(
            "0.5 w {:.2} {:.2} {:.2} {:.2} re S {:.2} {:.2} {:.2} {:.2} re S\n",
            MARGIN,
            y,
            LABEL_COLUMN,
            ROW_HEIGHT,
            MARGIN + LABEL_COLUMN,
            y,
            value_width,
            ROW_HEIGHT
        ));

        let font = if header { Font::Bold } else { Font::Regular };
        if header {
            self.op("1 g\n");
        }
        let size = 10.0;
        self.text_at(font, size, MARGIN + 4.0, y + 5.0, &fit(label, LABEL_COLUMN - 8.0, size));
        self.text_at(
            font,
            size,
            MARGIN + LABEL_COLUMN + 4.0,
            y + 5.0,
            &fit(value, value_width - 8.0, size),
        );
        if header {
            self.op("0 g\n");
        }
        self.cursor = y;
    }

    /// Places a photo scaled to `width` x `height` points.
    pub fn image(&mut self, jpeg: Jpeg, width: f64, height: f64) {
        self.ensure_space(height);
        let index = self.images.len();
        self.images.push(jpeg);
        self.cursor -= height;
        self.op(&format!(
            "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /Im{} Do Q\n",
            width, height, MARGIN, self.cursor, index
        ));
    }

    fn ensure_space(&mut self, height: f64) {
        if self.cursor - height < MARGIN && !self.current.is_empty() {
            self.page_break();
        }
    }

    fn op(&mut self, op: &str) {
        self.current.extend_from_slice(op.as_bytes());
    }

    fn text_at(&mut self, font: Font, size: f64, x: f64, y: f64, text: &str) {
        self.op(&format!(
            "BT /{} {} Tf {:.2} {:.2} Td (",
            font.resource(),
            size,
            x,
            y
        ));
        let encoded = encode_text(text);
        self.current.extend_from_slice(&encoded);
        self.op(") Tj ET\n");
    }

    /// Serializes the document.
    pub fn finish(mut self) -> Vec<u8> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }

        let first_image = 5;
        let first_page = first_image + self.images.len();
        let page_ids: Vec<usize> = (0..self.pages.len()).map(|i| first_page + 2 * i).collect();

        let mut out = PdfOutput::new();

        out.object(1, b"<< /Type /Catalog /Pages 2 0 R >>");
        let kids: Vec<String> = page_ids.iter().map(|id| format!("{} 0 R", id)).collect();
        out.object(
            2,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                page_ids.len()
            )
            .as_bytes(),
        );
        out.object(
            3,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
        );
        out.object(
            4,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
        );

        for (i, image) in self.images.iter().enumerate() {
            let header = format!(
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /{} /BitsPerComponent 8 /Filter /DCTDecode /Length {} >>",
                image.width,
                image.height,
                image.color_space(),
                image.data.len()
            );
            out.stream(first_image + i, &header, &image.data);
        }

        let xobjects: Vec<String> = (0..self.images.len())
            .map(|i| format!("/Im{} {} 0 R", i, first_image + i))
            .collect();
        for (i, content) in self.pages.iter().enumerate() {
            let page_id = page_ids[i];
            out.object(
                page_id,
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << /F1 3 0 R /F2 4 0 R >> /XObject << {} >> >> /Contents {} 0 R >>",
                    PAGE_WIDTH,
                    PAGE_HEIGHT,
                    xobjects.join(" "),
                    page_id + 1
                )
                .as_bytes(),
            );
            out.stream(page_id + 1, &format!("<< /Length {} >>", content.len()), content);
        }

        out.finish(1)
    }
}

struct PdfOutput {
    bytes: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfOutput {
    fn new() -> Self {
        PdfOutput {
            bytes: b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec(),
            offsets: Vec::new(),
        }
    }

    fn begin(&mut self, id: usize) {
        debug_assert_eq!(id, self.offsets.len() + 1);
        self.offsets.push(self.bytes.len());
        self.bytes
            .extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
    }

    fn object(&mut self, id: usize, body: &[u8]) {
        self.begin(id);
        self.bytes.extend_from_slice(body);
        self.bytes.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, id: usize, dict: &str, data: &[u8]) {
        self.begin(id);
        self.bytes.extend_from_slice(dict.as_bytes());
        self.bytes.extend_from_slice(b"\nstream\n");
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self, root: usize) -> Vec<u8> {
        let xref = self.bytes.len();
        let count = self.offsets.len() + 1;
        let mut table = format!("xref\n0 {}\n0000000000 65535 f \n", count);
        for offset in &self.offsets {
            table.push_str(&format!("{:010} 00000 n \n", offset));
        }
        table.push_str(&format!(
            "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            count, root, xref
        ));
        self.bytes.extend_from_slice(table.as_bytes());
        self.bytes
    }
}

/// WinAnsi bytes for a PDF literal string. Characters outside the encoding become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            ' '..='~' => out.push(c as u8),
            '\u{a0}'..='\u{ff}' => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

fn estimate_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * 0.5
}

fn wrap(text: &str, size: f64) -> Vec<String> {
    let max_chars = (CONTENT_WIDTH / (size * 0.5)) as usize;
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

fn fit(text: &str, width: f64, size: f64) -> String {
    let max_chars = (width / (size * 0.5)) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
