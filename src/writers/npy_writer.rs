use crate::error::Result;
use crate::readers::npy_reader::NPY_MAGIC;
use std::fs;
use std::path::Path;

const HEADER_ALIGNMENT: usize = 64;

/// Encode a 1-D little-endian `f64` array as NPY format 1.0
pub fn encode_f64(values: &[f64]) -> Vec<u8> {
    let mut header = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({},), }}",
        values.len()
    );

    // magic + version + u16 length + header + newline, padded to the alignment
    let unpadded = NPY_MAGIC.len() + 2 + 2 + header.len() + 1;
    let padding = (HEADER_ALIGNMENT - unpadded % HEADER_ALIGNMENT) % HEADER_ALIGNMENT;
    header.push_str(&" ".repeat(padding));
    header.push('\n');

    let mut bytes = Vec::with_capacity(unpadded + padding + values.len() * 8);
    bytes.extend_from_slice(NPY_MAGIC);
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    for value in values {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

pub fn write_npy(values: &[f64], path: &Path) -> Result<()> {
    fs::write(path, encode_f64(values))?;
    Ok(())
}
