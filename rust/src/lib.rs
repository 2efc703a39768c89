//! Hash the contents of a text file with bcrypt and print the self-describing
//! encoded hash. Hashing, configuration and file input live in separate
//! modules so the hasher can be exercised with in-memory bytes.

pub mod config;
pub mod crypto;
pub mod input;
