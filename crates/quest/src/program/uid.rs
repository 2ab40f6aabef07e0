use uuid::Uuid;

/// Build a player-facing id: `TEAM-INITIALS-CODE`.
///
/// Initials are the first letter of each comma-separated player; the code is
/// six random hex digits.
pub fn make_uid(team: &str, players: &str) -> String {
    let initials: String = players
        .split(',')
        .filter_map(|player| player.trim().chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    let code: String = Uuid::new_v4().to_string()[..6].to_uppercase();
    format!("{}-{}-{}", team.to_uppercase(), initials, code)
}
