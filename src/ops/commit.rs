use crate::io::record_store::{RecordStore, StoreError};
use crate::ops::day_state::DayState;

/// Write every date touched this session to the record file.
///
/// The visible date is cached first, so it's saved even if unedited. On error
/// the file is unchanged and the session cache is kept for a retry.
pub fn commit(state: &mut DayState, store: &mut RecordStore) -> Result<(), StoreError> {
    state.cache_current();
    if store.reconcile_header()? {
        tracing::info!("record header extended before commit");
    }
    let dates = state.cached_dates().len();
    store.persist(state.cached_dates().clone())?;
    tracing::info!(dates, "committed session");
    Ok(())
}
