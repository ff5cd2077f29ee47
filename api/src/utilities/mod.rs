pub mod formatting;
pub mod request;
pub mod response;
