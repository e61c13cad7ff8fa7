use crate::error::{ProcessingError, Result};
use crate::models::TemporalCurve;
use crate::utils::constants::CURVE_LENGTH;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

pub const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Decoded `.npy` payload, widened to `f64`
#[derive(Debug, Clone, PartialEq)]
pub struct NpyArray {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FloatType {
    F32,
    F64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

pub struct NpyReader;

impl NpyReader {
    pub fn new() -> Self {
        Self
    }

    /// Read a float array from a `.npy` file using a memory map
    pub fn read(&self, path: &Path) -> Result<NpyArray> {
        let file = File::open(path).map_err(|e| ProcessingError::from_open(e, path))?;
        let mmap = unsafe { Mmap::map(&file)? };
        decode(&mmap, &path.display().to_string())
    }

    /// Read a 1000-point temporal curve; shapes `(1000,)` and `(1000, 1)` are accepted
    pub fn read_curve(&self, path: &Path) -> Result<TemporalCurve> {
        let array = self.read(path)?;

        match array.shape.as_slice() {
            [n] | [n, 1] if *n == CURVE_LENGTH => TemporalCurve::new(array.data),
            shape => Err(ProcessingError::schema(
                path.display().to_string(),
                format!(
                    "expected shape ({},), got {:?}",
                    CURVE_LENGTH, shape
                ),
            )),
        }
    }
}

impl Default for NpyReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an in-memory `.npy` file (format versions 1.0 to 3.0)
pub fn decode(bytes: &[u8], origin: &str) -> Result<NpyArray> {
    let schema_err = |message: String| ProcessingError::schema(origin, message);

    if bytes.len() < 10 || &bytes[..6] != NPY_MAGIC {
        return Err(schema_err("missing NPY magic string".to_string()));
    }

    let major = bytes[6];
    let (header_len, header_start) = match major {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(schema_err("truncated NPY preamble".to_string()));
            }
            (
                u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize,
                12,
            )
        }
        v => return Err(schema_err(format!("unsupported NPY version {}", v))),
    };

    let data_start = header_start + header_len;
    if bytes.len() < data_start {
        return Err(schema_err("truncated NPY header".to_string()));
    }

    let header = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|e| schema_err(format!("header is not text: {}", e)))?;

    let descr = header_value(header, "descr")
        .and_then(quoted)
        .ok_or_else(|| schema_err("header has no 'descr'".to_string()))?;
    let (float_type, byte_order) = parse_descr(descr)
        .ok_or_else(|| schema_err(format!("unsupported dtype '{}'", descr)))?;

    let fortran_order = header_value(header, "fortran_order")
        .map(|v| v.starts_with("True"))
        .unwrap_or(false);

    let shape = header_value(header, "shape")
        .and_then(parse_shape)
        .ok_or_else(|| schema_err("header has no valid 'shape'".to_string()))?;

    if fortran_order && shape.iter().filter(|&&d| d > 1).count() > 1 {
        return Err(schema_err(
            "Fortran-ordered multi-dimensional arrays are not supported".to_string(),
        ));
    }

    let width: usize = match float_type {
        FloatType::F32 => 4,
        FloatType::F64 => 8,
    };
    let needed = shape
        .iter()
        .try_fold(width, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| schema_err(format!("shape {:?} overflows", shape)))?;
    let payload = &bytes[data_start..];
    if payload.len() < needed {
        return Err(schema_err(format!(
            "payload holds {} bytes, shape {:?} needs {}",
            payload.len(),
            shape,
            needed
        )));
    }

    let data = payload[..needed]
        .chunks_exact(width)
        .map(|chunk| read_float(chunk, float_type, byte_order))
        .collect();

    Ok(NpyArray { shape, data })
}

fn read_float(chunk: &[u8], float_type: FloatType, byte_order: ByteOrder) -> f64 {
    match float_type {
        FloatType::F64 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            match byte_order {
                ByteOrder::Little => f64::from_le_bytes(raw),
                ByteOrder::Big => f64::from_be_bytes(raw),
            }
        }
        FloatType::F32 => {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(chunk);
            let value = match byte_order {
                ByteOrder::Little => f32::from_le_bytes(raw),
                ByteOrder::Big => f32::from_be_bytes(raw),
            };
            value as f64
        }
    }
}

fn parse_descr(descr: &str) -> Option<(FloatType, ByteOrder)> {
    let order = descr.get(..1)?;
    let kind = descr.get(1..)?;
    let byte_order = match order {
        "<" | "=" => ByteOrder::Little,
        ">" => ByteOrder::Big,
        _ => return None,
    };
    let float_type = match kind {
        "f8" => FloatType::F64,
        "f4" => FloatType::F32,
        _ => return None,
    };
    Some((float_type, byte_order))
}

/// Text following `'key':` in the header dict literal
fn header_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let single = format!("'{}'", key);
    let double = format!("\"{}\"", key);
    let (pos, len) = header
        .find(&single)
        .map(|p| (p, single.len()))
        .or_else(|| header.find(&double).map(|p| (p, double.len())))?;

    let rest = header[pos + len..].trim_start();
    Some(rest.strip_prefix(':')?.trim_start())
}

fn quoted(value: &str) -> Option<&str> {
    let quote = value.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let inner = &value[1..];
    inner.find(quote).map(|end| &inner[..end])
}

fn parse_shape(value: &str) -> Option<Vec<usize>> {
    let inner = value.strip_prefix('(')?;
    let inner = &inner[..inner.find(')')?];

    inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().ok())
        .collect()
}
