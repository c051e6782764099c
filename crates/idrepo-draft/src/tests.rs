//! Draft service tests.

mod helpers;
mod update;
