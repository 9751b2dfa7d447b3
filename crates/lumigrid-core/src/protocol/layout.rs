pub const TYPE_OFFSET: usize = 0;
pub const LENGTH_RANGE: std::ops::Range<usize> = 1..3;
pub const HEADER_LEN: usize = 3;
pub const PAYLOAD_OFFSET: usize = HEADER_LEN;
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

pub const TAG_SET_PIXEL: u8 = 0x01;
pub const TAG_SET_RANGE: u8 = 0x02;
pub const TAG_SET_ALL: u8 = 0x03;
pub const TAG_SHOW: u8 = 0x04;
pub const TAG_CLEAR: u8 = 0x05;

pub const COLOR_LEN: usize = 3;

// Payload-relative offsets.
pub const SET_PIXEL_INDEX_RANGE: std::ops::Range<usize> = 0..2;
pub const SET_PIXEL_COLOR_OFFSET: usize = 2;
pub const SET_PIXEL_LEN: usize = 5;

pub const SET_ALL_COLOR_OFFSET: usize = 0;
pub const SET_ALL_LEN: usize = 3;

pub const SET_RANGE_START_RANGE: std::ops::Range<usize> = 0..2;
pub const SET_RANGE_COUNT_RANGE: std::ops::Range<usize> = 2..4;
pub const SET_RANGE_COLORS_OFFSET: usize = 4;
pub const SET_RANGE_FIXED_LEN: usize = 4;
pub const SET_RANGE_MAX_COUNT: usize = (MAX_PAYLOAD_LEN - SET_RANGE_FIXED_LEN) / COLOR_LEN;

pub const MAX_INDEX: u32 = u16::MAX as u32;
pub const MAX_CHANNEL: u32 = u8::MAX as u32;
/// Size of the addressable index space (indices `0..=MAX_INDEX`).
pub const INDEX_SPACE: usize = MAX_INDEX as usize + 1;

pub const fn set_range_len(count: usize) -> usize {
    SET_RANGE_FIXED_LEN + COLOR_LEN * count
}
