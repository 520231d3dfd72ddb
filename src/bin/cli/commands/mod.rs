pub mod project;
pub mod quotation;
pub mod quote;
pub mod rate;
pub mod request;
