pub mod extract;
pub mod images_to_pdf;
pub mod info;
pub mod merge;
pub mod split;
pub mod text_to_pdf;
pub mod thumbnails;
pub mod to_png;
pub mod to_text;
