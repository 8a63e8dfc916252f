//! Pipeline stages for turning a document model into Markdown.
//!
//! Each submodule implements exactly one step, and each is independently
//! testable without a conversion engine.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ (engine) ──▶ walk ──▶ render ──▶ assemble
//! (path/URL)  (model)   (order)  (fragment)  (.md file)
//!                                   │
//!                                   └──▶ images ──▶ encode
//!                                        (store)    (jpeg + sha256)
//! ```
//!
//! 1. [`input`]    — canonicalise the user-supplied path or URL to a local file
//! 2. [`walk`]     — single forward pass over the reading order
//! 3. [`render`]   — one Markdown fragment per element
//! 4. [`images`]   — size filter and content-addressed picture files
//! 5. [`encode`]   — JPEG encoding and content ids
//! 6. [`assemble`] — concatenate fragments and write the Markdown file

pub mod assemble;
pub mod encode;
pub mod images;
pub mod input;
pub mod render;
pub mod walk;
