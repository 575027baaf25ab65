//! Identifier types for herd owners and their animals
//!
//! Both identifiers come from the record store as positive integers. Wrapping
//! them keeps an owner id from being passed where a cattle id is expected.

use nutype::nutype;

/// Identifier of the account that owns a herd
#[nutype(
    validate(greater = 0),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize,
        Display
    )
)]
pub struct OwnerId(i64);

/// Identifier of a single animal
#[nutype(
    validate(greater = 0),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize,
        Display
    )
)]
pub struct CattleId(i64);
