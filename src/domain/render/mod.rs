pub mod markdown;

pub use markdown::{escape_html, MarkdownRenderer};
