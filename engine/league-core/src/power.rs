//! Two-step dominance power rankings
//!
//! `D = W·W + W` where `W[i][j]` counts wins of team i over team j. A team's
//! power is `0.8 * sum(D[i]) + 0.15 * trunc(avg score) + 0.05 * trunc(avg margin)`.

use std::collections::HashMap;

const DOMINANCE_WEIGHT: f64 = 0.8;
const SCORE_WEIGHT: f64 = 0.15;
const MARGIN_WEIGHT: f64 = 0.05;

/// A finished head-to-head game
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedGame {
    pub home_team: u32,
    pub home_points: f64,
    pub away_team: u32,
    pub away_points: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerRanking {
    pub team_id: u32,
    pub power: f64,
}

impl PowerRanking {
    /// Power formatted with two decimals
    pub fn formatted(&self) -> String {
        format!("{:.2}", self.power)
    }
}

#[derive(Default)]
struct TeamTotals {
    games: u32,
    points: f64,
    margin: f64,
}

/// Rank `teams` by power, highest first. Ties keep ascending team id order.
/// Games involving unknown teams are ignored.
pub fn power_rankings(teams: &[u32], games: &[CompletedGame]) -> Vec<PowerRanking> {
    let mut team_ids = teams.to_vec();
    team_ids.sort_unstable();
    team_ids.dedup();

    let index: HashMap<u32, usize> = team_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let n = team_ids.len();

    let mut wins = vec![vec![0.0f64; n]; n];
    let mut totals: Vec<TeamTotals> = (0..n).map(|_| TeamTotals::default()).collect();

    for game in games {
        let (Some(&home), Some(&away)) = (index.get(&game.home_team), index.get(&game.away_team)) else {
            continue;
        };
        let margin = game.home_points - game.away_points;

        totals[home].games += 1;
        totals[home].points += game.home_points;
        totals[home].margin += margin;
        totals[away].games += 1;
        totals[away].points += game.away_points;
        totals[away].margin -= margin;

        if margin > 0.0 {
            wins[home][away] += 1.0;
        } else if margin < 0.0 {
            wins[away][home] += 1.0;
        }
    }

    let dominance = two_step_dominance(&wins);

    let mut rankings: Vec<PowerRanking> = team_ids
        .iter()
        .enumerate()
        .map(|(i, team_id)| {
            let total = &totals[i];
            let (avg_score, avg_margin) = if total.games == 0 {
                (0.0, 0.0)
            } else {
                (total.points / total.games as f64, total.margin / total.games as f64)
            };
            let dominance_sum: f64 = dominance[i].iter().sum();
            let power = dominance_sum.trunc() * DOMINANCE_WEIGHT
                + avg_score.trunc() * SCORE_WEIGHT
                + avg_margin.trunc() * MARGIN_WEIGHT;
            PowerRanking { team_id: *team_id, power }
        })
        .collect();

    rankings.sort_by(|a, b| b.power.total_cmp(&a.power).then(a.team_id.cmp(&b.team_id)));
    rankings
}

fn two_step_dominance(wins: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = wins.len();
    let mut result = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            let two_step: f64 = (0..n).map(|k| wins[i][k] * wins[k][j]).sum();
            result[i][j] = two_step + wins[i][j];
        }
    }
    result
}
