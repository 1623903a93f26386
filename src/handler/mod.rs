// Request handling module
// Routes incoming requests to the listing endpoint or the static file server

pub mod router;
pub mod static_files;

pub use router::handle_request;
