use anyhow::Result;
use contactbook_config::SourceConfig;
use contactbook_source::{
    ContactBook, ContactSource, JsonSnapshotSource, MacosContactsSource, VcfFileSource,
};
use serde::Serialize;
use std::io::{self, Write};

pub mod auth;
pub mod completions;
pub mod contacts;

pub type Book = ContactBook<Box<dyn ContactSource>>;

pub struct Context<'a> {
    pub book: &'a Book,
    pub json: bool,
}

pub fn open_book(config: &SourceConfig) -> Book {
    let source: Box<dyn ContactSource> = match config {
        SourceConfig::Macos { group } => Box::new(MacosContactsSource::new(group.clone())),
        SourceConfig::Vcf { path } => Box::new(VcfFileSource::new(path.clone())),
        SourceConfig::Json { path } => Box::new(JsonSnapshotSource::new(path.clone())),
    };
    ContactBook::new(source)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
