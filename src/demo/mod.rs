//! Sample feature wired to the store, used by the `mvistore` binary and the
//! integration tests.

pub mod counter;
