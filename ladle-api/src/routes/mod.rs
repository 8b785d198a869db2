/// API route handlers
///
/// # Modules
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, token refresh
/// - `tags`: Tag catalog (read-only; creation is admin-only)
/// - `ingredients`: Ingredient catalog with prefix search
/// - `recipes`: Recipe CRUD, favorites, cart, shopping-list download
/// - `users`: Profiles and the subscription graph

pub mod auth;
pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;
