/// Database models and their operations
///
/// # Models
///
/// - `user`: User accounts
/// - `tag`: Recipe tags (immutable reference data)
/// - `ingredient`: Ingredient catalog with inline measurement units
/// - `recipe`: Recipes, ingredient lines, and the atomic edit transaction
/// - `follow`: The follower/author graph
/// - `favorite`: Favorite-recipe membership set
/// - `cart`: Shopping-cart membership set (one cart per user, lazily created)
///
/// The favorite and cart edge sets share strict add/remove semantics:
/// adding an existing edge or removing an absent one is a reported error,
/// never a silent set operation.

pub mod cart;
pub mod favorite;
pub mod follow;
pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod user;

/// Error type for the strict membership edge sets (favorites, cart)
#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    /// The edge already exists
    #[error("Already a member")]
    AlreadyMember,

    /// The edge does not exist
    #[error("Not a member")]
    NotMember,

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
