pub mod commit;
pub mod day_state;
pub mod stats;
