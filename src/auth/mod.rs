pub mod codes;
pub mod extractor;
pub mod jwt;
pub mod password;
