pub mod compose;
pub mod document;
pub mod extract;
pub mod merge;
pub mod render;
pub mod split;
pub mod text;

#[cfg(test)]
pub(crate) mod fixtures;

pub use document::PdfDocument;
