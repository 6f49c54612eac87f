//! Projection of a decoded edge row onto an index definition's key bytes.

use crate::schema::{FieldValue, RowReader};

/// Collects the ordered field values of one index definition from a
/// decoded row, encoded order-preserving for the index key.
///
/// Returns `None` when any field is absent from the row (the row predates
/// the definition, or the definition outlived the schema). Callers skip
/// that single index; absence is not an error.
pub fn collect_index_values(row: &RowReader, fields: &[String]) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    for name in fields {
        let value = row.field(name)?;
        encode_value(&mut buf, value);
    }
    Some(buf)
}

fn encode_value(buf: &mut Vec<u8>, value: &FieldValue) {
    match value {
        FieldValue::Bool(v) => buf.push(u8::from(*v)),
        FieldValue::Int(v) => {
            buf.extend_from_slice(&((*v as u64) ^ (1 << 63)).to_be_bytes());
        }
        FieldValue::Float(v) => {
            // Total-order encoding: positive floats flip the sign bit,
            // negative floats flip every bit.
            let bits = v.to_bits();
            let ordered = if bits & (1 << 63) == 0 {
                bits ^ (1 << 63)
            } else {
                !bits
            };
            buf.extend_from_slice(&ordered.to_be_bytes());
        }
        FieldValue::Str(v) => {
            buf.extend_from_slice(v.as_bytes());
            buf.extend_from_slice(&(v.len() as u16).to_be_bytes());
        }
    }
}
