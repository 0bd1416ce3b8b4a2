pub mod book;
pub mod error;
pub mod json;
pub mod macos;
pub mod source;
pub mod vcf;

pub use book::ContactBook;
pub use error::{Result, SourceError};
pub use json::JsonSnapshotSource;
pub use macos::MacosContactsSource;
pub use source::ContactSource;
pub use vcf::VcfFileSource;
