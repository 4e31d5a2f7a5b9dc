//! Fixed demonstration sequence
//!
//! list -> insert a new Creator with one Work -> list -> merge the same
//! Creator back with one existing and one new Work -> list

use clap::Args;
use folio_core::errors::{ExError, ExErrorKind};
use folio_core::model::{Creator, Work};
use folio_core::render::write_creator_report;
use folio_store::db::{open, StoreLocation};
use folio_store::{PersistenceContext, Result};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DemoArgs {
    /// SQLite file to use instead of a fresh in-memory database
    #[arg(long)]
    pub db: Option<PathBuf>,
}

/// Run the demonstration, writing the report to `out`
///
/// # Errors
/// Store failures as reported by the context; write failures on `out` are
/// `Io`.
pub fn execute<W: Write>(args: DemoArgs, out: &mut W) -> Result<()> {
    writeln!(out, "Starting...")?;

    let location = match args.db {
        Some(path) => StoreLocation::File(path),
        None => StoreLocation::shared_memory(),
    };
    let mut conn = open(&location)?;
    let mut ctx = PersistenceContext::new(&mut conn)?;

    list_creators(&mut ctx, out)?;
    writeln!(out, "Migration successful")?;

    let handle = ctx.merge(
        &Creator::new("Daniel Abraham.")
            .with_language("EN")
            .with_work(Work::new("The Dragon's Path.").with_language("EN")),
    )?;
    ctx.commit()?;
    let created = ctx
        .creator(handle)
        .ok_or_else(|| {
            ExError::new(ExErrorKind::Internal).with_message("merged creator is no longer tracked")
        })?;

    list_creators(&mut ctx, out)?;
    writeln!(out, "Adding more data successful")?;

    let dragons_path = created.works.first().map_or(0, |w| w.id);
    let update = Creator::new("Daniel Abraham")
        .with_id(created.id)
        .with_work(
            Work::new("The Dragon's Path")
                .with_id(dragons_path)
                .with_language("EN"),
        )
        .with_work(Work::new("The Tyrant's Law").with_language("EN"));

    ctx.merge(&update)?;
    ctx.commit()?;

    list_creators(&mut ctx, out)?;
    Ok(())
}

fn list_creators<W: Write>(
    ctx: &mut PersistenceContext<'_>,
    out: &mut W,
) -> Result<()> {
    let creators = ctx.list_creators(true)?;
    write_creator_report(out, &creators)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedSink;

    impl Write for ClosedSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_io_error() {
        let err = execute(DemoArgs { db: None }, &mut ClosedSink).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Io);
    }

    #[test]
    fn test_report_written_to_sink() {
        let mut buffer = Vec::new();
        execute(DemoArgs { db: None }, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("Starting...\n"));
        assert!(text.contains("Creator : 2 - Daniel Abraham\n"));
    }
}
