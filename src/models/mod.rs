//! Data models for Libraria

pub mod author;
pub mod book;
pub mod borrow;
pub mod copy;
pub mod enums;
pub mod favorite;
pub mod genre;
pub mod stats;
pub mod student;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use borrow::{BookAvailability, Borrow};
pub use copy::BookCopy;
pub use enums::{BorrowStatus, CopyStatus, FavorableType};
pub use favorite::{Favorite, FavoriteTarget, ToggleOutcome};
pub use genre::Genre;
pub use stats::LibraryStats;
pub use student::Student;
pub use user::{Role, User, UserClaims};
