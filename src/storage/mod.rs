pub mod sqlite;

pub use sqlite::{Review, ReviewStore, StoreError};
