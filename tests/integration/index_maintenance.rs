#![allow(missing_docs)]

mod support;

use support::*;
use vesper::error::{ErrorCode, Result};
use vesper::index::{IndexDef, IndexState};
use vesper::keys;
use vesper::mutate::{DeleteEdgesProcessor, DeleteEdgesRequest};
use vesper::schema::FieldValue;
use vesper::types::{IndexId, PartitionId};

const PART_A: PartitionId = PartitionId(1);
const PART_B: PartitionId = PartitionId(2);

fn values() -> Vec<FieldValue> {
    vec![FieldValue::Int(2019), FieldValue::Float(0.5)]
}

fn request(parts: Vec<(PartitionId, Vec<vesper::types::EdgeRef>)>) -> DeleteEdgesRequest {
    DeleteEdgesRequest {
        space: SPACE,
        parts,
    }
}

#[tokio::test]
async fn normal_state_removes_the_index_entry_directly() -> Result<()> {
    let fx = fixture(&[PART_A]);
    let def = IndexDef::new(IndexId(1), KNOWS, ["since"]);
    fx.index.add_index(SPACE, def.clone());
    let edge = knows_edge(1, 2);
    seed_record(&fx.store, PART_A, &edge, &values());
    let entry = seed_index_entry(&fx.store, PART_A, &def, &edge, &values());

    let resp = DeleteEdgesProcessor::new(fx.env.clone())
        .process(request(vec![(PART_A, vec![edge])]))
        .await;

    assert_eq!(resp.partition(PART_A), Some(Ok(())));
    assert_eq!(fx.store.get(SPACE, PART_A, &entry), None);
    assert_eq!(fx.store.part_len(SPACE, PART_A), 0);
    Ok(())
}

#[tokio::test]
async fn rebuilding_state_stages_rebuild_log_puts_instead_of_removes() -> Result<()> {
    let fx = fixture(&[PART_A]);
    let def = IndexDef::new(IndexId(1), KNOWS, ["since"]);
    fx.index.add_index(SPACE, def.clone());
    fx.index
        .set_index_state(SPACE, PART_A, IndexState::Rebuilding);

    let edges = [knows_edge(1, 2), knows_edge(3, 4)];
    let mut entries = Vec::new();
    for edge in &edges {
        seed_record(&fx.store, PART_A, edge, &values());
        entries.push(seed_index_entry(&fx.store, PART_A, &def, edge, &values()));
    }

    let resp = DeleteEdgesProcessor::new(fx.env.clone())
        .process(request(vec![(PART_A, edges.to_vec())]))
        .await;
    assert_eq!(resp.partition(PART_A), Some(Ok(())));

    for (edge, entry) in edges.iter().zip(&entries) {
        assert_eq!(
            fx.store.get(SPACE, PART_A, &record_key(PART_A, edge)),
            None,
            "records are removed regardless of rebuild state"
        );
        assert!(
            fx.store.get(SPACE, PART_A, entry).is_some(),
            "the live index entry is left for the rebuild to reconcile"
        );
    }

    let log: Vec<(Vec<u8>, Vec<u8>)> = fx
        .store
        .entries(SPACE, PART_A)
        .into_iter()
        .filter(|(key, _)| keys::is_delete_operation(key))
        .collect();
    assert_eq!(log.len(), 2, "one pending-delete marker per edge");
    assert_ne!(log[0].0, log[1].0, "marker keys never collide");
    let mut staged: Vec<&[u8]> = log.iter().map(|(_, value)| value.as_slice()).collect();
    staged.sort_unstable();
    let mut expected: Vec<&[u8]> = entries.iter().map(Vec::as_slice).collect();
    expected.sort_unstable();
    assert_eq!(staged, expected, "markers carry the staged index keys");
    Ok(())
}

#[tokio::test]
async fn locked_index_aborts_the_partition_without_submitting() -> Result<()> {
    let fx = fixture(&[PART_A, PART_B]);
    let def = IndexDef::new(IndexId(1), KNOWS, ["since"]);
    fx.index.add_index(SPACE, def.clone());
    fx.index.set_index_state(SPACE, PART_A, IndexState::Locked);

    let locked_edge = knows_edge(1, 2);
    seed_record(&fx.store, PART_A, &locked_edge, &values());
    let locked_entry = seed_index_entry(&fx.store, PART_A, &def, &locked_edge, &values());
    let free_edge = knows_edge(3, 4);
    seed_record(&fx.store, PART_B, &free_edge, &values());

    let resp = DeleteEdgesProcessor::new(fx.env.clone())
        .process(request(vec![
            (PART_A, vec![locked_edge.clone()]),
            (PART_B, vec![free_edge]),
        ]))
        .await;

    assert_eq!(
        resp.partition(PART_A),
        Some(Err(ErrorCode::DataConflict)),
        "a locked index forbids structural mutation"
    );
    assert_eq!(resp.partition(PART_B), Some(Ok(())));
    assert!(
        fx.store
            .get(SPACE, PART_A, &record_key(PART_A, &locked_edge))
            .is_some(),
        "no partial commit for the aborted partition"
    );
    assert!(fx.store.get(SPACE, PART_A, &locked_entry).is_some());
    assert_eq!(fx.store.part_len(SPACE, PART_B), 0);
    assert_eq!(fx.env.index_writes.active(), 0);
    Ok(())
}

#[tokio::test]
async fn locked_index_is_irrelevant_when_no_record_exists() -> Result<()> {
    let fx = fixture(&[PART_A]);
    fx.index
        .add_index(SPACE, IndexDef::new(IndexId(1), KNOWS, ["since"]));
    fx.index.set_index_state(SPACE, PART_A, IndexState::Locked);

    let resp = DeleteEdgesProcessor::new(fx.env.clone())
        .process(request(vec![(PART_A, vec![knows_edge(1, 2)])]))
        .await;
    assert_eq!(
        resp.partition(PART_A),
        Some(Ok(())),
        "state is only consulted once a record feeds an index"
    );
    Ok(())
}

#[tokio::test]
async fn definition_with_absent_field_is_skipped_not_fatal() -> Result<()> {
    let fx = fixture(&[PART_A]);
    let by_since = IndexDef::new(IndexId(1), KNOWS, ["since"]);
    let by_weight = IndexDef::new(IndexId(2), KNOWS, ["weight"]);
    fx.index.add_index(SPACE, by_since.clone());
    fx.index.add_index(SPACE, by_weight.clone());

    let edge = knows_edge(1, 2);
    // The stored row predates the `weight` field.
    let short_row = vec![FieldValue::Int(2019)];
    seed_record(&fx.store, PART_A, &edge, &short_row);
    let since_entry = seed_index_entry(&fx.store, PART_A, &by_since, &edge, &short_row);

    let resp = DeleteEdgesProcessor::new(fx.env.clone())
        .process(request(vec![(PART_A, vec![edge.clone()])]))
        .await;

    assert_eq!(resp.partition(PART_A), Some(Ok(())));
    assert_eq!(
        fx.store.get(SPACE, PART_A, &record_key(PART_A, &edge)),
        None
    );
    assert_eq!(
        fx.store.get(SPACE, PART_A, &since_entry),
        None,
        "the collectable definition still gets its remove"
    );
    Ok(())
}

#[tokio::test]
async fn undecodable_row_fails_the_partition_with_invalid_data() -> Result<()> {
    let fx = fixture(&[PART_A]);
    fx.index
        .add_index(SPACE, IndexDef::new(IndexId(1), KNOWS, ["since"]));

    let edge = knows_edge(1, 2);
    let lock = seed_lock_marker(&fx.store, PART_A, &edge);
    fx.store
        .put(
            SPACE,
            PART_A,
            record_key(PART_A, &edge),
            b"not a row".to_vec(),
        )
        .expect("partition exists");

    let resp = DeleteEdgesProcessor::new(fx.env.clone())
        .process(request(vec![(PART_A, vec![edge])]))
        .await;

    assert_eq!(resp.partition(PART_A), Some(Err(ErrorCode::InvalidData)));
    assert!(
        fx.store.get(SPACE, PART_A, &lock).is_some(),
        "failure happens before commit, nothing already staged applies"
    );
    Ok(())
}
