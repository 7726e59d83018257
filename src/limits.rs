//! Upper bounds enforced at the mutation boundary.

pub const MAX_ROOMS: usize = 1024;
pub const MAX_ROOM_ID_LEN: usize = 64;
pub const MAX_NAME_LEN: usize = 128;
pub const MAX_TITLE_LEN: usize = 256;
pub const MAX_OWNER_LEN: usize = 128;
pub const MAX_SHAPES_PER_ROOM: usize = 16;
pub const MAX_RESERVATIONS_PER_ROOM: usize = 65_536;
