mod id_gen;
pub mod serde_utils;

pub use id_gen::{IdSource, OsIdSource, SequenceIdSource, ID_BYTES};
