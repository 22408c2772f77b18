use serde::{Deserialize, Serialize};

/// One football contest as the feed reports it. Wire names are PascalCase
/// to match the spreadsheet export (`Date`, `Away`, `AScore`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Game {
    pub date: String,
    pub away: String,
    #[serde(default)]
    pub a_score: Option<i64>,
    pub home: String,
    #[serde(default)]
    pub h_score: Option<i64>,
    /// Free-text status: kickoff time, quarter/clock, or a final marker.
    pub time: String,
    #[serde(default)]
    pub details: String,
}

/// The `{ "data": [...] }` document served upstream and downstream alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamesResponse {
    pub data: Vec<Game>,
}
