//! Aggregates module
pub mod artwork;
pub mod cart;
pub mod community_event;
pub mod order;
pub mod user;

pub use artwork::{Artwork, ArtworkError, ArtworkUpdate, NewArtwork};
pub use cart::{Cart, CartError, CartItem, CartLine, ResolvedCart};
pub use community_event::{CommunityEvent, CommunityEventUpdate, NewCommunityEvent};
pub use order::{Order, OrderError, OrderLine, OrderLineView, OrderView};
pub use user::{Role, User, UserType};
