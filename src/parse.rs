use tracing::{debug, instrument};

use crate::feed::FeedError;
use crate::model::game::{Game, GamesResponse};

/// Normalize a feed body into a `GamesResponse`. The feed serves either the
/// JSON document `{ data: [...] }` or a published-to-web CSV table with
/// loosely named columns; both shapes funnel through here so the heuristics
/// live in exactly one place.
#[instrument(level = "debug", skip(body), fields(bytes = body.len()))]
pub fn parse_games(body: &str) -> Result<GamesResponse, FeedError> {
    if body.trim_start().starts_with('{') {
        serde_json::from_str::<GamesResponse>(body)
            .map_err(|e| FeedError::Malformed(e.to_string()))
    } else {
        parse_csv(body)
    }
}

/// Field categories a CSV column can map to. The header row is scanned once;
/// the first column matching a category claims it.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Column {
    Date,
    Away,
    AwayScore,
    Home,
    HomeScore,
    Time,
    Details,
}

/// Case-insensitive substring heuristics for spreadsheet headers like
/// "Home Team", "Visitor Score", "Status". Score checks come first so
/// "home score" does not claim the Home category.
fn classify_header(header: &str) -> Option<Column> {
    let h = header.to_ascii_lowercase();
    let away_ish = h.contains("away") || h.contains("visitor");
    if h.contains("score") {
        if h.contains("home") {
            return Some(Column::HomeScore);
        }
        if away_ish {
            return Some(Column::AwayScore);
        }
        return None;
    }
    if h.contains("home") {
        Some(Column::Home)
    } else if away_ish {
        Some(Column::Away)
    } else if h.contains("status") || h.contains("time") {
        Some(Column::Time)
    } else if h.contains("date") {
        Some(Column::Date)
    } else if h.contains("detail") || h.contains("note") {
        Some(Column::Details)
    } else {
        None
    }
}

fn parse_score(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

fn parse_csv(body: &str) -> Result<GamesResponse, FeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FeedError::Malformed(format!("bad CSV header row: {}", e)))?
        .clone();

    // First matching column wins per category.
    let mut columns: Vec<(usize, Column)> = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if let Some(col) = classify_header(header) {
            if !columns.iter().any(|(_, c)| *c == col) {
                columns.push((idx, col));
            }
        }
    }
    if columns.is_empty() {
        return Err(FeedError::Malformed(
            "no recognizable columns in CSV header".to_string(),
        ));
    }

    let mut games: Vec<Game> = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable CSV row");
                continue;
            }
        };
        let mut game = Game {
            date: String::new(),
            away: String::new(),
            a_score: None,
            home: String::new(),
            h_score: None,
            time: String::new(),
            details: String::new(),
        };
        for (idx, col) in &columns {
            let value = record.get(*idx).unwrap_or("");
            match col {
                Column::Date => game.date = value.to_string(),
                Column::Away => game.away = value.to_string(),
                Column::AwayScore => game.a_score = parse_score(value),
                Column::Home => game.home = value.to_string(),
                Column::HomeScore => game.h_score = parse_score(value),
                Column::Time => game.time = value.to_string(),
                Column::Details => game.details = value.to_string(),
            }
        }
        // Rows without both team names are headers-within-data or filler.
        if game.home.is_empty() || game.away.is_empty() {
            continue;
        }
        games.push(game);
    }

    Ok(GamesResponse { data: games })
}
