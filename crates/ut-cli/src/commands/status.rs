//! Status command for showing where data lives and how much of it there is.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use ut_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, database_path: &Path) -> Result<()> {
    let count = db.interval_count()?;

    writeln!(writer, "Usage tracker status")?;
    writeln!(writer, "Database: {}", database_path.display())?;

    if count == 0 {
        writeln!(writer, "No intervals recorded.")?;
        return Ok(());
    }

    writeln!(writer, "Intervals: {count}")?;
    Ok(())
}
