//! Minimal text-only PDF builder.
//!
//! Produces a well-formed document with one line of Helvetica text per page.
//! An empty string yields a blank page.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdfchat_core::ExtractError;

/// Build a PDF with one page per entry of `pages`.
pub fn text_pdf(pages: &[&str]) -> Result<Vec<u8>, ExtractError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for text in pages {
        let content = Content {
            operations: page_operations(text),
        };
        let encoded = content
            .encode()
            .map_err(|e| ExtractError::Failed(format!("content encoding failed: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let media_box: Vec<Object> = [0, 0, 595, 842].into_iter().map(Object::Integer).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ExtractError::Failed(format!("pdf write failed: {e}")))?;
    Ok(buffer)
}

fn page_operations(text: &str) -> Vec<Operation> {
    if text.is_empty() {
        return vec![];
    }
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
        ),
        Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_pdf_is_loadable() {
        let bytes = text_pdf(&["one", "two"]).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_blank_page_has_no_operations() {
        assert!(page_operations("").is_empty());
        assert_eq!(page_operations("x").len(), 5);
    }
}
