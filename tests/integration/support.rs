#![allow(dead_code)]

use std::sync::{Arc, Once};

use vesper::env::StorageEnv;
use vesper::index::projection::collect_index_values;
use vesper::index::{IndexDef, MemIndexManager};
use vesper::keys;
use vesper::kvstore::MemStore;
use vesper::schema::{
    encode_row, EdgeSchema, FieldDef, FieldType, FieldValue, MemSchemaManager, RowReader,
};
use vesper::types::{EdgeRank, EdgeRef, EdgeType, PartitionId, SpaceId};

pub const SPACE: SpaceId = SpaceId(1);
pub const VID_LEN: usize = 8;
pub const KNOWS: EdgeType = EdgeType(101);

static TRACING: Once = Once::new();

/// Installs the test log subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn knows_schema() -> EdgeSchema {
    EdgeSchema {
        edge_type: KNOWS,
        fields: vec![
            FieldDef::new("since", FieldType::Int),
            FieldDef::new("weight", FieldType::Float),
        ],
    }
}

/// Schema and index managers pre-registered for `SPACE`.
pub fn managers() -> (Arc<MemSchemaManager>, Arc<MemIndexManager>) {
    let schema = Arc::new(MemSchemaManager::new());
    schema.register_space(SPACE, VID_LEN);
    schema.register_edge_schema(SPACE, knows_schema());
    let index = Arc::new(MemIndexManager::new());
    index.register_space(SPACE);
    (schema, index)
}

pub struct Fixture {
    pub env: Arc<StorageEnv>,
    pub schema: Arc<MemSchemaManager>,
    pub index: Arc<MemIndexManager>,
    pub store: Arc<MemStore>,
}

pub fn fixture(parts: &[PartitionId]) -> Fixture {
    init_tracing();
    let (schema, index) = managers();
    let store = Arc::new(MemStore::new());
    for part in parts {
        store.add_part(SPACE, *part);
    }
    let env = StorageEnv::new(schema.clone(), index.clone(), store.clone());
    Fixture {
        env,
        schema,
        index,
        store,
    }
}

pub fn vid(byte: u8) -> Vec<u8> {
    vec![byte; VID_LEN]
}

pub fn knows_edge(src: u8, dst: u8) -> EdgeRef {
    EdgeRef::new(vid(src), KNOWS, EdgeRank(0), vid(dst))
}

pub fn record_key(part: PartitionId, edge: &EdgeRef) -> Vec<u8> {
    keys::edge_key(VID_LEN, part, &edge.src, edge.edge_type, edge.rank, &edge.dst)
}

pub fn lock_marker_key(part: PartitionId, edge: &EdgeRef) -> Vec<u8> {
    keys::lock_key(VID_LEN, part, &edge.src, edge.edge_type, edge.rank, &edge.dst)
}

pub fn obsolete_key(part: PartitionId, edge: &EdgeRef, generation: u8) -> Vec<u8> {
    keys::obsolete_edge_key(
        VID_LEN,
        part,
        &edge.src,
        edge.edge_type,
        edge.rank,
        &edge.dst,
        generation,
    )
}

/// Writes the current record row for `edge`, returning its key.
pub fn seed_record(
    store: &MemStore,
    part: PartitionId,
    edge: &EdgeRef,
    values: &[FieldValue],
) -> Vec<u8> {
    let raw = encode_row(&knows_schema(), values).expect("encodable fixture row");
    let key = record_key(part, edge);
    store
        .put(SPACE, part, key.clone(), raw)
        .expect("fixture partition exists");
    key
}

/// Writes a lock marker row for `edge`, returning its key.
pub fn seed_lock_marker(store: &MemStore, part: PartitionId, edge: &EdgeRef) -> Vec<u8> {
    let key = lock_marker_key(part, edge);
    store
        .put(SPACE, part, key.clone(), Vec::new())
        .expect("fixture partition exists");
    key
}

/// Writes a stale version row for `edge`, returning its key.
pub fn seed_obsolete(
    store: &MemStore,
    part: PartitionId,
    edge: &EdgeRef,
    generation: u8,
) -> Vec<u8> {
    let key = obsolete_key(part, edge, generation);
    store
        .put(SPACE, part, key.clone(), Vec::new())
        .expect("fixture partition exists");
    key
}

/// The index entry key the engine maintains for `edge` under `def`, given
/// the record row `values`.
pub fn index_entry_key(
    part: PartitionId,
    def: &IndexDef,
    edge: &EdgeRef,
    values: &[FieldValue],
) -> Vec<u8> {
    let schema = Arc::new(knows_schema());
    let raw = encode_row(&schema, values).expect("encodable fixture row");
    let row = RowReader::decode(schema, &raw).expect("decodable fixture row");
    let encoded = collect_index_values(&row, &def.fields).expect("fields present in fixture row");
    keys::edge_index_key(
        VID_LEN,
        part,
        def.index_id,
        &edge.src,
        edge.rank,
        &edge.dst,
        &encoded,
    )
}

/// Seeds the index entry row for `edge` under `def`, returning its key.
pub fn seed_index_entry(
    store: &MemStore,
    part: PartitionId,
    def: &IndexDef,
    edge: &EdgeRef,
    values: &[FieldValue],
) -> Vec<u8> {
    let key = index_entry_key(part, def, edge, values);
    store
        .put(SPACE, part, key.clone(), Vec::new())
        .expect("fixture partition exists");
    key
}
