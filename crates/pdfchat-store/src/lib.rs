//! Vector index for pdfchat.
//!
//! An [`IndexHandle`] owns every chunk of one document together with its
//! embedding and the embedder that produced them. Queries are embedded with
//! that same embedder, so build and search always agree on the vector space.
//!
//! # Example
//!
//! ```rust,ignore
//! use pdfchat_store::{IndexConfig, IndexHandle};
//!
//! let index = IndexHandle::build(chunks, embedder, &IndexConfig::default()).await?;
//! let hits = index.search("What is the conclusion?", 3).await?;
//! ```

pub mod memory;

pub use memory::{IndexConfig, IndexHandle, IndexStats, DEFAULT_TOP_K};
