//! Wire types shared by the Agora API and its clients.

pub mod api;
pub mod models;
pub mod paging;
