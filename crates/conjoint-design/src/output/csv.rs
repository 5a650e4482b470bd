use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use conjoint_core::Survey;

use crate::model::Task;

/// Write generated tasks as CSV, one task per row.
///
/// Columns are grouped per attribute: `ATT{i}` holds the attribute name,
/// followed by `ATT{i}P{j}` holding the level shown to profile `j`. Both
/// indices are one-based and follow the display order used to draw the
/// tasks.
pub fn write_design_csv(
    path: &Path,
    survey: &Survey,
    order: &[usize],
    tasks: &[Task],
) -> Result<u64, csv::Error> {
    let writer = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    let mut header = Vec::with_capacity(order.len() * (survey.num_profiles + 1));
    for attribute in 1..=order.len() {
        header.push(format!("ATT{attribute}"));
        for profile in 1..=survey.num_profiles {
            header.push(format!("ATT{attribute}P{profile}"));
        }
    }
    writer.write_record(&header)?;

    for task in tasks {
        let mut record = Vec::with_capacity(header.len());
        for (position, &index) in order.iter().enumerate() {
            record.push(survey.attributes[index].name.clone());
            for profile in &task.profiles {
                record.push(profile.entries[position].level.clone());
            }
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
