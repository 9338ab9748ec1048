pub mod calendar;
pub mod challenge_info;
pub mod game_summary;
pub mod help;
pub mod round_end;
pub mod tile_map;
