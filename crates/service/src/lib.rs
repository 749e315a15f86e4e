//! Service layer for the todo API.
//! - `storage`: whole-collection persistence behind the `TodoStorage` trait.
//! - `todos`: the todo model and the list/get/create/update/delete operations.

pub mod errors;
pub mod storage;
pub mod todos;
