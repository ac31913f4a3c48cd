//! User-facing workflows, composed from the pure logic in `processing`
//! and the cloud access behind [`crate::azure::Provider`].

pub mod cleanup;
pub mod connectivity;
pub mod discover;
pub mod grant;
pub mod removal;
pub mod select;
