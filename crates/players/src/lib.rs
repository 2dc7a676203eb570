//! `roster-players` — teams, players and the building blocks used to load
//! them from spreadsheets.
//!
//! Pure domain logic; storage uniqueness checks are passed in as closures or
//! performed by the caller.

pub mod birthplace;
pub mod csv_schema;
pub mod dates;
pub mod player;
pub mod slug;
pub mod team;

pub use birthplace::{Birthplace, REGION_SEPARATOR};
pub use csv_schema::{RosterColumns, RosterRow, RowError};
pub use dates::{DateFormat, DateParser, DEFAULT_FORMATS, parse_date};
pub use player::{
    GENERAL_POSITION_ORDER, Player, PlayerDraft, PositionGroup, TeamSummary, specific_position_name,
};
pub use slug::{SlugError, SlugGenerator, slug_base};
pub use team::{NewTeam, Team};
