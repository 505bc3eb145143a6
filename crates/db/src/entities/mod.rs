//! `SeaORM` entity definitions.

pub mod hotel_pictures;
pub mod room_pictures;
pub mod stored_files;
