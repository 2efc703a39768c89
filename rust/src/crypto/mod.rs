//! bcrypt hashing split into the textual hash layout and the hasher that
//! produces and checks it. Neither half touches the filesystem.

pub mod encoded;
pub mod passwords;

pub use encoded::{EncodedHash, Salt, Version};
pub use passwords::{hash_password, verify_password, HashError, LongInputPolicy, PasswordHasher};
