//! Document chunking for pdfchat.

pub mod fixed;

pub use fixed::FixedSizeChunker;
