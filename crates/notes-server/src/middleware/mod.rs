//! Tower middleware applied around the router.

pub mod request_id;
