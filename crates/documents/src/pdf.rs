//! PDF rendering (A4, builtin Helvetica).

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use thiserror::Error;

use crate::document::OrderDocument;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pdf rendering failed: {0}")]
    Pdf(#[from] printpdf::Error),
}

/// Turns an [`OrderDocument`] into bytes of some printable format.
pub trait DocumentRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;
    fn render(&self, document: &OrderDocument) -> Result<Vec<u8>, RenderError>;
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
const LINE_HEIGHT: f32 = 6.0;

const COL_QTY: f32 = 120.0;
const COL_UNIT: f32 = 140.0;
const COL_TOTAL: f32 = 170.0;

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfRenderer;

/// Writes text top-down, adding pages as rows run out.
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: &'a IndirectFontRef,
    bold: &'a IndirectFontRef,
    y: f32,
}

impl Cursor<'_> {
    fn ensure_room(&mut self, lines: f32) {
        if self.y - lines * LINE_HEIGHT < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Camada 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn text_at(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { self.bold } else { self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn line(&mut self, text: &str, size: f32, bold: bool) {
        self.ensure_room(1.0);
        self.text_at(text, size, MARGIN, bold);
        self.y -= LINE_HEIGHT;
    }

    fn gap(&mut self) {
        self.y -= LINE_HEIGHT / 2.0;
    }
}

impl DocumentRenderer for PdfRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn render(&self, document: &OrderDocument) -> Result<Vec<u8>, RenderError> {
        let title = format!("Ordem de Serviço {}", document.order_id);
        let (doc, page, layer) = PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Camada 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

        let mut c = Cursor {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            regular: &regular,
            bold: &bold,
            y: PAGE_HEIGHT - MARGIN,
        };

        if let Some(company) = &document.company {
            c.line(&company.name, 14.0, true);
            let contact = [&company.cnpj, &company.address, &company.phone, &company.email, &company.website];
            for value in contact.into_iter().flatten() {
                c.line(value, 9.0, false);
            }
            c.gap();
        }

        c.line(&title, 13.0, true);
        c.line(&format!("Data: {}    Status: {}", document.issued_on, document.status), 10.0, false);
        c.line(&format!("Cliente: {}", document.client_name), 10.0, false);
        if let Some(notes) = &document.notes {
            c.line(&format!("Observações: {notes}"), 10.0, false);
        }
        c.gap();

        c.ensure_room(1.0);
        c.text_at("Descrição", 10.0, MARGIN, true);
        c.text_at("Qtd", 10.0, COL_QTY, true);
        c.text_at("Unitário", 10.0, COL_UNIT, true);
        c.text_at("Total", 10.0, COL_TOTAL, true);
        c.y -= LINE_HEIGHT;

        for row in &document.rows {
            c.ensure_room(1.0);
            c.text_at(&row.description, 10.0, MARGIN, false);
            c.text_at(&row.quantity.to_string(), 10.0, COL_QTY, false);
            let unit = row.unit_price.map(|p| p.to_brl()).unwrap_or_else(|| "-".to_string());
            c.text_at(&unit, 10.0, COL_UNIT, false);
            c.text_at(&row.line_total.to_brl(), 10.0, COL_TOTAL, false);
            c.y -= LINE_HEIGHT;
        }
        c.gap();

        c.line(&format!("Subtotal: {}", document.subtotal.to_brl()), 10.0, false);
        c.line(&format!("Desconto: {}", document.discount.to_brl()), 10.0, false);
        c.line(&format!("Total: {}", document.total.to_brl()), 12.0, true);

        drop(c);
        Ok(doc.save_to_bytes()?)
    }
}
