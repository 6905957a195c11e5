pub mod body;

pub use body::DecryptedJson;
