//! Report assembly, rendering, and delivery.
//!
//! Builds the markdown change-summary report in a fixed section order,
//! best-effort renders it to PDF via an external converter, and optionally
//! delivers the document to a Telegram chat. Rendering and delivery degrade
//! instead of failing: a missing converter writes the markdown into the
//! target path, a failed upload is logged and never retried.

pub mod builder;
pub mod render;
pub mod telegram;
