//! # pdfchat-extract
//!
//! Text extraction from PDF documents.
//!
//! [`PdfExtractor`] parses a PDF byte stream with `lopdf` and produces one
//! [`PageBlock`](pdfchat_core::PageBlock) per page, in document order,
//! numbered from 1.
//!
//! ```rust,ignore
//! use pdfchat_core::DocumentExtractor;
//! use pdfchat_extract::PdfExtractor;
//!
//! let bytes = std::fs::read("report.pdf")?;
//! let pages = PdfExtractor::new().extract(&bytes).await?;
//! println!("{} pages", pages.len());
//! ```
//!
//! The [`fixture`] module builds small text-only PDFs for tests and demos.

pub mod fixture;
pub mod pdf;

pub use pdf::PdfExtractor;
