//! Per-matchup projection series

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CoreError, Result};
use crate::models::TeamProjection;

/// Two teams' projection history for one matchup
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupSeries {
    pub matchup_id: u32,

    /// Team ids, ascending
    pub teams: [u32; 2],

    /// Snapshots per team, same order as `teams`, in recorded order
    pub series: [Vec<TeamProjection>; 2],
}

/// Group a week's projections by matchup.
///
/// Every matchup must resolve to exactly two distinct teams.
pub fn group_by_matchup(projections: &[TeamProjection]) -> Result<BTreeMap<u32, MatchupSeries>> {
    let mut by_matchup: BTreeMap<u32, Vec<&TeamProjection>> = BTreeMap::new();
    for projection in projections {
        by_matchup.entry(projection.matchup_id).or_default().push(projection);
    }

    let mut grouped = BTreeMap::new();
    for (matchup_id, entries) in by_matchup {
        let team_ids: BTreeSet<u32> = entries.iter().map(|p| p.team_id).collect();
        if team_ids.len() != 2 {
            return Err(CoreError::MatchupTeamCount { matchup_id, team_count: team_ids.len() });
        }

        let mut ids = team_ids.into_iter();
        let teams = [ids.next().unwrap_or_default(), ids.next().unwrap_or_default()];
        let series = teams.map(|team| {
            entries.iter().filter(|p| p.team_id == team).map(|p| (*p).clone()).collect::<Vec<_>>()
        });

        grouped.insert(matchup_id, MatchupSeries { matchup_id, teams, series });
    }

    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection(timestamp: i64, team_id: u32, matchup_id: u32, value: f64) -> TeamProjection {
        TeamProjection { timestamp, team_id, matchup_id, projection: value }
    }

    #[test]
    fn test_groups_two_team_series() {
        let projections = vec![
            projection(1, 4, 1, 100.0),
            projection(1, 2, 1, 90.0),
            projection(1, 7, 2, 80.0),
            projection(1, 8, 2, 85.0),
            projection(2, 4, 1, 104.0),
            projection(2, 2, 1, 88.0),
        ];

        let grouped = group_by_matchup(&projections).unwrap();

        assert_eq!(grouped.len(), 2);
        let first = &grouped[&1];
        assert_eq!(first.teams, [2, 4]);
        assert_eq!(first.series[0].iter().map(|p| p.projection).collect::<Vec<_>>(), vec![90.0, 88.0]);
        assert_eq!(first.series[1].iter().map(|p| p.timestamp).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(grouped[&2].teams, [7, 8]);
    }

    #[test]
    fn test_rejects_wrong_team_count() {
        let lonely = vec![projection(1, 4, 3, 100.0), projection(2, 4, 3, 101.0)];
        assert_eq!(
            group_by_matchup(&lonely),
            Err(CoreError::MatchupTeamCount { matchup_id: 3, team_count: 1 })
        );

        let crowded = vec![projection(1, 1, 5, 1.0), projection(1, 2, 5, 1.0), projection(1, 3, 5, 1.0)];
        assert!(matches!(
            group_by_matchup(&crowded),
            Err(CoreError::MatchupTeamCount { team_count: 3, .. })
        ));
    }

    #[test]
    fn test_empty_week() {
        assert!(group_by_matchup(&[]).unwrap().is_empty());
    }
}
