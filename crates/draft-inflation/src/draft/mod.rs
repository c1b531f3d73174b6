// Draft data: picks, positions and team rosters.

pub mod pick;
pub mod team;
