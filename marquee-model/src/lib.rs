//! Shared data models for the Marquee movie catalog client.
//!
//! Everything in this crate describes what travels over the wire: entity
//! schemas for movies, people, reviews and user accounts, the paging envelope
//! returned by list endpoints, and the identity key used to deduplicate
//! entities across pages.

pub mod identity;
pub mod movie;
pub mod page;
pub mod person;
pub mod review;
pub mod routes;
pub mod user;

mod wire;

pub use identity::{EntityKey, Identified, Identity};
pub use movie::{BoxOffice, Credit, DEFAULT_TOP_RATED_CATEGORY, MovieDetails, MovieSummary};
pub use page::{DEFAULT_PAGE_SIZE, LocalPages, Page, PageRequest, Pagination};
pub use person::{KnownFor, PersonDetails, PersonSummary};
pub use review::Review;
pub use user::{AuthSession, LoginRequest, ProfileUpdate, RegisterRequest, UserProfile};
