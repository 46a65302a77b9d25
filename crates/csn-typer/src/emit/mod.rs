//! The emission model: paths, buffers and per-namespace source files.

pub mod buffer;
pub mod file;
pub mod path;

pub use buffer::Buffer;
pub use file::{EnumStub, InflectionRecord, SourceFile, AUTO_GENERATED_BANNER};
pub use path::{DirectoryOptions, Path};
