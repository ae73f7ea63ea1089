//! CSV reader for QNM template tables
//!
//! Expected header (column order irrelevant, extra columns ignored):
//!
//! ```text
//! a,l,n,omega0_R,omega0_I,alpha1,beta1,alpha2,beta2
//! ```
//!
//! `alpha2` and `beta2` may be blank or absent altogether. Lines starting
//! with `#` are skipped.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::template::{TemplateRow, TemplateStore};
use crate::RingdownError;

/// Read raw template rows from headered CSV.
///
/// Values are not interpreted here; see [`TemplateStore::load`].
pub fn read_template_rows<R: Read>(reader: R) -> Result<Vec<TemplateRow>, RingdownError> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(reader);

    let rows = csv_reader
        .deserialize()
        .collect::<Result<Vec<TemplateRow>, csv::Error>>()?;
    Ok(rows)
}

/// Read and build a template store from a CSV file.
pub fn load_template_csv(path: &Path) -> Result<TemplateStore, RingdownError> {
    let file = File::open(path)?;
    let rows = read_template_rows(BufReader::new(file))?;
    log::info!("read {} QNM template rows from {}", rows.len(), path.display());
    TemplateStore::load(rows)
}
