//! Stayhaven Database Layer
//!
//! PostgreSQL storage for users, properties, property images and
//! password-reset tokens, accessed through sqlx.
//!
//! # Example
//!
//! ```rust,no_run
//! use stayhaven_db::{Database, PoolOptions, PropertyRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/stayhaven", PoolOptions::default()).await?;
//!     db.initialize().await?;
//!
//!     let properties = PropertyRepository::new(&db);
//!     let featured = properties.featured(12).await?;
//!     println!("{} featured listings", featured.len());
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod schema;
pub mod users;
pub mod properties;
pub mod tokens;

pub use database::{Database, DatabaseStats, PoolOptions};
pub use error::{DbError, Result};
pub use schema::{
    BankDetails, BankUpdate, ModerationPatch, NewImage, NewUser, OwnerSummary, Property, PropertyImage,
    PropertyStatus, PropertyWithImages, PropertyWrite, User, UserProfileUpdate, UserSummary,
    VerificationToken,
};
pub use users::UserRepository;
pub use properties::{ListingQuery, ListingSort, PropertyRepository};
pub use tokens::VerificationTokenRepository;
