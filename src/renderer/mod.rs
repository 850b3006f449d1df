//! Multi-line template rendering.
//!
//! The flat grammar is handled entirely in-crate; multi-line documents
//! go through minijinja behind the [`TemplateRenderer`] trait so the
//! engine stays swappable at the seam.

pub mod interface;
pub mod minijinja;

pub use interface::TemplateRenderer;
pub use minijinja::MiniJinjaRenderer;
