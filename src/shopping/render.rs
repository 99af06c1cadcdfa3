use printpdf::{BuiltinFont, Mm, PdfDocument};
use thiserror::Error;

use super::aggregate::ShoppingListItem;
use crate::constants::{
    PAGE_BOTTOM_MARGIN_MM, PAGE_FONT_SIZE_PT, PAGE_HEIGHT_MM, PAGE_LEFT_MARGIN_MM, PAGE_LINE_HEIGHT_MM,
    PAGE_TOP_MARGIN_MM, PAGE_WIDTH_MM, SHOPPING_LIST_HEADING,
};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font unavailable: {0}")]
    Font(String),
    #[error("could not serialize document: {0}")]
    Serialize(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub width_mm: f32,
    pub height_mm: f32,
    pub left_mm: f32,
    pub top_mm: f32,
    pub bottom_mm: f32,
    pub line_height_mm: f32,
    pub font_size_pt: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            width_mm: PAGE_WIDTH_MM,
            height_mm: PAGE_HEIGHT_MM,
            left_mm: PAGE_LEFT_MARGIN_MM,
            top_mm: PAGE_TOP_MARGIN_MM,
            bottom_mm: PAGE_BOTTOM_MARGIN_MM,
            line_height_mm: PAGE_LINE_HEIGHT_MM,
            font_size_pt: PAGE_FONT_SIZE_PT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub lines: Vec<PlacedLine>,
}

/// `n` counts from 1.
pub fn format_line(n: usize, item: &ShoppingListItem) -> String {
    format!(
        "{n}: {} - {}{}",
        item.name, item.total_amount, item.measurement_unit
    )
}

/// Positions the heading and every numbered line. The y coordinate is measured from the
/// bottom of the page; once the cursor drops below the bottom margin the next line opens
/// a new page at the top margin. Always yields at least one page.
pub fn layout(items: &[ShoppingListItem], layout: &PageLayout) -> Vec<LaidOutPage> {
    let mut pages = vec![LaidOutPage::default()];
    let mut y = layout.top_mm;

    pages[0].lines.push(PlacedLine {
        text: SHOPPING_LIST_HEADING.to_string(),
        x_mm: layout.left_mm,
        y_mm: y,
    });
    y -= layout.line_height_mm;

    for (i, item) in items.iter().enumerate() {
        if y < layout.bottom_mm {
            pages.push(LaidOutPage::default());
            y = layout.top_mm;
        }

        if let Some(page) = pages.last_mut() {
            page.lines.push(PlacedLine {
                text: format_line(i + 1, item),
                x_mm: layout.left_mm,
                y_mm: y,
            });
        }
        y -= layout.line_height_mm;
    }

    pages
}

/// Turns laid out pages into document bytes.
pub trait DocumentBackend: Send + Sync {
    fn content_type(&self) -> &'static str;
    fn render(&self, pages: &[LaidOutPage], layout: &PageLayout) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfBackend;

impl DocumentBackend for PdfBackend {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn render(&self, pages: &[LaidOutPage], layout: &PageLayout) -> Result<Vec<u8>, RenderError> {
        let (doc, first_page, first_layer) = PdfDocument::new(
            SHOPPING_LIST_HEADING,
            Mm(layout.width_mm),
            Mm(layout.height_mm),
            "Layer 1",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Font(format!("{e:?}")))?;

        for (n, page) in pages.iter().enumerate() {
            let (page_index, layer_index) = if n == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(Mm(layout.width_mm), Mm(layout.height_mm), "Layer 1")
            };
            let layer = doc.get_page(page_index).get_layer(layer_index);

            for line in &page.lines {
                layer.use_text(
                    line.text.clone(),
                    layout.font_size_pt,
                    Mm(line.x_mm),
                    Mm(line.y_mm),
                    &font,
                );
            }
        }

        doc.save_to_bytes()
            .map_err(|e| RenderError::Serialize(format!("{e:?}")))
    }
}

/// Lays out and renders a shopping list in one step.
pub fn render(
    items: &[ShoppingListItem],
    backend: &dyn DocumentBackend,
) -> Result<Vec<u8>, RenderError> {
    let page_layout = PageLayout::default();
    let pages = layout(items, &page_layout);
    backend.render(&pages, &page_layout)
}
