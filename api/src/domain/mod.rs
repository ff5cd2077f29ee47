pub mod environment;
pub mod export;
pub mod history;
pub mod request;
pub mod response;
pub mod saved;
