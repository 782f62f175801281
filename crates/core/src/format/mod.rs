//! Document formats: extraction of translatable segments and reassembly.
//!
//! A [`DocumentFormat`] turns document bytes into ordered segments and puts
//! translated lines back into the document. Formats are looked up by file
//! extension through the [`FormatRegistry`].

mod error;
mod plain_text;
mod registry;
mod traits;

pub use error::FormatError;
pub use plain_text::PlainTextFormat;
pub use registry::FormatRegistry;
pub use traits::{DocumentFormat, Extraction};
