//! Sled-backed persistence of the workflow state.
//!
//! The whole state (registries plus approval queue) is one CBOR value under
//! a fixed key, written after every successful mutation. Restoring it keeps
//! registry insertion order and the pending/queue correspondence intact; the
//! engine itself never touches the database.
use crate::engine::WorkflowState;
use sled::Db;

const STATE_KEY: &[u8] = b"workflow/state";

pub fn save(db: &Db, state: &WorkflowState) -> anyhow::Result<()> {
    let encoded = minicbor::to_vec(state)?;
    db.insert(STATE_KEY, encoded)?;
    db.flush()?;
    Ok(())
}

pub fn load(db: &Db) -> anyhow::Result<Option<WorkflowState>> {
    match db.get(STATE_KEY)? {
        Some(bytes) => Ok(Some(minicbor::decode(&bytes)?)),
        None => Ok(None),
    }
}
