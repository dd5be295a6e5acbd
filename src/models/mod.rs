pub mod room;
pub mod image;

pub use room::Room;
pub use image::{RoomImage, ALL_USERS};
