pub mod user_favorites;
pub mod users;

pub use user_favorites::Entity as UserFavorites;
pub use user_favorites::Model as UserFavorite;
pub use users::Entity as Users;
pub use users::Model as User;
