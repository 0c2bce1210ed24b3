//! Plain-text rendering of a collection, for eyeballing only.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::collection::RankedCollection;
use crate::error::Result;

impl RankedCollection {
    /// Appends a table of the collection to `path`, or prints it to stdout.
    pub fn dump(&self, path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                let mut out = BufWriter::new(file);
                self.dump_to(&mut out)?;
                out.flush()?;
            }
            None => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                self.dump_to(&mut out)?;
            }
        }
        Ok(())
    }

    /// One header line, then one tab-separated row per element: rank, key,
    /// the significant factors, then every payload slot.
    pub fn dump_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let arity = self.factor_arity();
        writeln!(
            out,
            "{} size={} factors={}",
            self.path().display(),
            self.len(),
            arity
        )?;
        write!(out, "rank\tkey")?;
        for i in 1..=arity {
            write!(out, "\tf{i}")?;
        }
        writeln!(out, "\tvalues")?;
        for element in self {
            write!(out, "{}\t{}", element.rank(), element.key())?;
            for factor in element.sort_key().leading(arity) {
                write!(out, "\t{factor}")?;
            }
            for value in element.values() {
                write!(out, "\t{value}")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}
