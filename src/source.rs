//! Opening markup files, plain or bzip2-compressed.

use bzip2::read::BzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::{ExtractError, Result};

const READ_BUFFER: usize = 256 * 1024;

/// Open `path` for buffered reading, decompressing on the fly when it ends in `.bz2`.
pub fn open(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| ExtractError::io(path, e))?;
    let reader: Box<dyn BufRead> = if path.to_string_lossy().ends_with(".bz2") {
        Box::new(BufReader::with_capacity(READ_BUFFER, BzDecoder::new(file)))
    } else {
        Box::new(BufReader::with_capacity(READ_BUFFER, file))
    };
    Ok(reader)
}
