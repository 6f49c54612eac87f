//! Space metadata, edge schemas, and the stored row format.
//!
//! Rows are written positionally against the schema in effect at write
//! time. A row may therefore carry fewer fields than the current schema;
//! readers treat the missing tail as absent rather than malformed.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::{ErrorCode, Result};
use crate::types::{EdgeType, SpaceId};

const ROW_VERSION: u8 = 1;

const TAG_BOOL: u8 = 0x01;
const TAG_INT: u8 = 0x02;
const TAG_FLOAT: u8 = 0x03;
const TAG_STRING: u8 = 0x04;

/// Logical type of one schema field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldType {
    /// Boolean field.
    Bool,
    /// 64-bit signed integer field.
    Int,
    /// 64-bit floating point field.
    Float,
    /// UTF-8 string field.
    String,
}

/// One named, typed field of an edge schema.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDef {
    /// Field name, unique within the schema.
    pub name: String,
    /// Field type.
    pub field_type: FieldType,
}

impl FieldDef {
    /// Builds a field definition.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered field layout of one edge type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EdgeSchema {
    /// The edge type this schema describes.
    pub edge_type: EdgeType,
    /// Fields in storage order.
    pub fields: Vec<FieldDef>,
}

/// A decoded property value.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer value.
    Int(i64),
    /// 64-bit floating point value.
    Float(f64),
    /// Owned string value.
    Str(String),
}

/// Encodes a row holding the leading `values.len()` fields of `schema`.
pub fn encode_row(schema: &EdgeSchema, values: &[FieldValue]) -> Result<Vec<u8>> {
    if values.len() > schema.fields.len() || values.len() > u16::MAX as usize {
        return Err(ErrorCode::InvalidData);
    }
    let mut buf = Vec::new();
    buf.push(ROW_VERSION);
    buf.extend_from_slice(&(values.len() as u16).to_be_bytes());
    for (value, field) in values.iter().zip(&schema.fields) {
        match (value, field.field_type) {
            (FieldValue::Bool(v), FieldType::Bool) => {
                buf.push(TAG_BOOL);
                buf.push(u8::from(*v));
            }
            (FieldValue::Int(v), FieldType::Int) => {
                buf.push(TAG_INT);
                buf.extend_from_slice(&v.to_be_bytes());
            }
            (FieldValue::Float(v), FieldType::Float) => {
                buf.push(TAG_FLOAT);
                buf.extend_from_slice(&v.to_bits().to_be_bytes());
            }
            (FieldValue::Str(v), FieldType::String) => {
                if v.len() > u16::MAX as usize {
                    return Err(ErrorCode::InvalidData);
                }
                buf.push(TAG_STRING);
                buf.extend_from_slice(&(v.len() as u16).to_be_bytes());
                buf.extend_from_slice(v.as_bytes());
            }
            _ => return Err(ErrorCode::InvalidData),
        }
    }
    Ok(buf)
}

/// Read-only view over one decoded edge row.
///
/// Holds the schema it was decoded with; field lookup is by name, and
/// fields the stored row predates resolve to `None`.
#[derive(Clone, Debug)]
pub struct RowReader {
    schema: Arc<EdgeSchema>,
    values: Vec<FieldValue>,
}

impl RowReader {
    /// Decodes a stored row. Returns `None` when the payload is malformed.
    pub fn decode(schema: Arc<EdgeSchema>, raw: &[u8]) -> Option<Self> {
        let mut cursor = raw;
        if take_byte(&mut cursor)? != ROW_VERSION {
            return None;
        }
        let count = u16::from_be_bytes(take_array::<2>(&mut cursor)?) as usize;
        if count > schema.fields.len() {
            return None;
        }
        let mut values = Vec::with_capacity(count);
        for field in schema.fields.iter().take(count) {
            let tag = take_byte(&mut cursor)?;
            let value = match (tag, field.field_type) {
                (TAG_BOOL, FieldType::Bool) => FieldValue::Bool(take_byte(&mut cursor)? != 0),
                (TAG_INT, FieldType::Int) => {
                    FieldValue::Int(i64::from_be_bytes(take_array::<8>(&mut cursor)?))
                }
                (TAG_FLOAT, FieldType::Float) => {
                    FieldValue::Float(f64::from_bits(u64::from_be_bytes(take_array::<8>(
                        &mut cursor,
                    )?)))
                }
                (TAG_STRING, FieldType::String) => {
                    let len = u16::from_be_bytes(take_array::<2>(&mut cursor)?) as usize;
                    if cursor.len() < len {
                        return None;
                    }
                    let (bytes, rest) = cursor.split_at(len);
                    cursor = rest;
                    FieldValue::Str(String::from_utf8(bytes.to_vec()).ok()?)
                }
                _ => return None,
            };
            values.push(value);
        }
        if !cursor.is_empty() {
            return None;
        }
        Some(Self { schema, values })
    }

    /// Looks up a field by name; `None` when the schema has no such field
    /// or the stored row predates it.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        let pos = self.schema.fields.iter().position(|f| f.name == name)?;
        self.values.get(pos)
    }

    /// Number of fields present in the stored row.
    pub fn stored_fields(&self) -> usize {
        self.values.len()
    }
}

fn take_byte(cursor: &mut &[u8]) -> Option<u8> {
    let (&first, rest) = cursor.split_first()?;
    *cursor = rest;
    Some(first)
}

fn take_array<const N: usize>(cursor: &mut &[u8]) -> Option<[u8; N]> {
    if cursor.len() < N {
        return None;
    }
    let (head, rest) = cursor.split_at(N);
    *cursor = rest;
    head.try_into().ok()
}

/// Supplies per-space metadata to the mutation path.
pub trait SchemaManager: Send + Sync {
    /// Configured vertex-id byte length of the space.
    fn space_vid_len(&self, space: SpaceId) -> Result<usize>;

    /// Schema of one edge type, when known.
    fn edge_schema(&self, space: SpaceId, edge_type: EdgeType) -> Option<Arc<EdgeSchema>>;
}

/// Decodes one stored edge row against the space's schema. `None` signals
/// a malformed row or an unknown edge type.
pub fn decode_edge_row(
    schema: &dyn SchemaManager,
    space: SpaceId,
    edge_type: EdgeType,
    raw: &[u8],
) -> Option<RowReader> {
    let edge_schema = schema.edge_schema(space, edge_type)?;
    RowReader::decode(edge_schema, raw)
}

#[derive(Default)]
struct SpaceEntry {
    vid_len: usize,
    edge_schemas: FxHashMap<EdgeType, Arc<EdgeSchema>>,
}

/// In-process schema registry.
#[derive(Default)]
pub struct MemSchemaManager {
    spaces: Mutex<FxHashMap<SpaceId, SpaceEntry>>,
}

impl MemSchemaManager {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a space with its vertex-id byte length.
    pub fn register_space(&self, space: SpaceId, vid_len: usize) {
        let mut spaces = self.spaces.lock();
        spaces.entry(space).or_default().vid_len = vid_len;
    }

    /// Registers an edge schema under a previously registered space.
    pub fn register_edge_schema(&self, space: SpaceId, schema: EdgeSchema) {
        let mut spaces = self.spaces.lock();
        spaces
            .entry(space)
            .or_default()
            .edge_schemas
            .insert(schema.edge_type, Arc::new(schema));
    }
}

impl SchemaManager for MemSchemaManager {
    fn space_vid_len(&self, space: SpaceId) -> Result<usize> {
        let spaces = self.spaces.lock();
        match spaces.get(&space) {
            Some(entry) if entry.vid_len > 0 => Ok(entry.vid_len),
            _ => Err(ErrorCode::InvalidSpaceVidLen),
        }
    }

    fn edge_schema(&self, space: SpaceId, edge_type: EdgeType) -> Option<Arc<EdgeSchema>> {
        let spaces = self.spaces.lock();
        spaces.get(&space)?.edge_schemas.get(&edge_type).cloned()
    }
}
