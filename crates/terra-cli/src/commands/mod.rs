pub mod backfill;
pub mod completions;
pub mod doctor;
pub mod execute;
pub mod generate;
pub mod import;
