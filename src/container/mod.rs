//! Disk-backed container structures.

mod extendible_hash_table;

pub use extendible_hash_table::{
    DefaultKeyHasher, DiskExtendibleHashTable, IdentityHasher, KeyHasher,
};
