//! Persisted entity types
//!
//! Wire names are camelCase; ids are UUIDv7 and timestamps use the fixed
//! precision encoding in [`timestamp`].

pub mod comment;
pub mod like;
pub mod macros;
pub mod playlist;
pub mod subscription;
pub mod timestamp;
pub mod tweet;
pub mod user;
pub mod video;

pub use comment::Comment;
pub use like::{Like, LikeTarget};
pub use playlist::Playlist;
pub use subscription::Subscription;
pub use tweet::{MAX_TWEET_CHARS, Tweet};
pub use user::User;
pub use video::Video;
