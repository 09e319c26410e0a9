//! Insert or refresh the table of contents of a markdown document.
//!
//! [`process`] is the pure text transform; [`update_file`] wraps it with the
//! read, atomic write-back, check and diff behaviour used by the CLI.

pub mod diff;
pub mod engine;
pub mod error;
pub mod fs;
pub mod options;
pub mod region;
pub mod render;

pub use engine::{
    process, update_file, FileOutcome, FileStatus, TocMode, TocOutcome, INSERTED_TITLE,
};
pub use error::{ExitCode, TocError, TocResult};
pub use markdown_toc_headings::{slugify, Heading, HeadingKind};
pub use options::TocOptions;
pub use region::{ExistingEntry, RegionKind};
pub use render::TocItem;
