//! Shared primitive types used across the engine.

/// Canonical store key: the numeric suffix of a raw `<prefix>_<digits>` store field.
pub type StoreKey = u32;

/// Opaque identifier of a single application row. Integer ids from a
/// loader are kept as their decimal text.
pub type ApplicationId = String;

/// Master seed for synthetic ledgers.
pub type Seed = u64;
