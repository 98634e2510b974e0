// External collaborators: where accepted listings go.
//
// The gate only talks to the traits in traits.rs. The concrete backends
// here (SQLite records, files on local disk, a configured identity) are
// what the CLI wires in; a hosted deployment would swap them out.

pub mod identity;
pub mod local;
pub mod models;
pub mod sqlite;
pub mod traits;
