//! # bitmapped-vector
//!
//! A persistent (immutable) indexed sequence built on a 32-way bitmapped trie.
//!
//! ## Overview
//!
//! Every operation on a [`PersistentVector`](persistent::PersistentVector)
//! returns a new value and leaves the original observably unchanged. Only the
//! nodes on the path to the edited position are rebuilt; every other subtree is
//! shared between the old and the new vector.
//!
//! - **Point access and update**: `O(log32 N)`, effectively constant
//! - **Range extraction**: proportional to the output, bulk-copying aligned subtrees
//! - **Suffix replacement**: one primitive behind append, insert, delete,
//!   truncation, concatenation and fill
//!
//! ## Feature Flags
//!
//! - `arc`: Use `Arc` instead of `Rc` so vectors can be shared across threads
//! - `tracing`: Emit TRACE-level `tracing` events on structural changes
//!
//! ## Example
//!
//! ```rust
//! use bitmapped_vector::prelude::*;
//!
//! let vector: PersistentVector<i32> = (1..=65).collect();
//! let updated = vector.set(40, 999).unwrap();
//!
//! assert_eq!(vector.get(40), Some(&41));
//! assert_eq!(updated.get(40), Some(&999));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use bitmapped_vector::prelude::*;
/// ```
pub mod prelude {
    pub use crate::persistent::*;
}

pub mod persistent;
