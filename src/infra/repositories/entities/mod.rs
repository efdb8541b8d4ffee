//! SeaORM entity definitions, kept separate from the domain models.

pub mod user;

pub use user::{ActiveModel as UserActiveModel, Column as UserColumn, Entity as UserEntity, Model as UserModel};
