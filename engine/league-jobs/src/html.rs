//! Projection chart pages

use chrono::DateTime;
use league_core::MatchupSeries;
use serde_json::json;
use std::collections::HashMap;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

/// Team name for display, falling back to the id
pub fn team_label(team_names: &HashMap<u32, String>, team_id: u32) -> String {
    team_names.get(&team_id).cloned().unwrap_or_else(|| format!("Team {}", team_id))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// One line chart per team, projection over time
pub fn render_matchup_page(series: &MatchupSeries, team_names: &HashMap<u32, String>) -> String {
    let traces: Vec<serde_json::Value> = series
        .teams
        .iter()
        .zip(series.series.iter())
        .map(|(team_id, points)| {
            let x: Vec<String> = points
                .iter()
                .map(|p| {
                    DateTime::from_timestamp(p.timestamp, 0)
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_default()
                })
                .collect();
            let y: Vec<f64> = points.iter().map(|p| p.projection).collect();
            json!({
                "type": "scatter",
                "mode": "lines",
                "name": team_label(team_names, *team_id),
                "x": x,
                "y": y,
            })
        })
        .collect();

    // `</` can't appear inside the inline script
    let data = serde_json::Value::Array(traces).to_string().replace("</", "<\\/");
    let title = escape_html(&format!(
        "{} vs. {}",
        team_label(team_names, series.teams[0]),
        team_label(team_names, series.teams[1])
    ));

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <script src="{plotly}"></script>
</head>
<body>
    <div id="chart" style="width:100%;height:100%;"></div>
    <script>
        Plotly.newPlot("chart", {data}, {{"title": {{"text": "Matchup {matchup_id}"}}, "xaxis": {{"type": "date"}}}});
    </script>
</body>
</html>
"#,
        title = title,
        plotly = PLOTLY_CDN,
        data = data,
        matchup_id = series.matchup_id,
    )
}

/// A linked matchup on the week index
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupLink {
    pub name: String,
    pub url: String,
}

pub fn render_week_index(week: u32, matchups: &[MatchupLink]) -> String {
    let items: String = matchups
        .iter()
        .map(|m| format!("        <li><a href=\"{}\">{}</a></li>\n", escape_html(&m.url), escape_html(&m.name)))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Week {week} projections</title>
</head>
<body>
    <h1>Week {week} projections</h1>
    <ul>
{items}    </ul>
</body>
</html>
"#,
        week = week,
        items = items,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_core::TeamProjection;

    fn series() -> MatchupSeries {
        let point = |timestamp, team_id, projection| TeamProjection { timestamp, team_id, matchup_id: 4, projection };
        MatchupSeries {
            matchup_id: 4,
            teams: [1, 2],
            series: [vec![point(0, 1, 101.5), point(600, 1, 97.25)], vec![point(0, 2, 88.0)]],
        }
    }

    #[test]
    fn test_matchup_page_contains_traces() {
        let names = HashMap::from([(1, "Gronk Stars".to_string()), (2, "<Bench>".to_string())]);
        let page = render_matchup_page(&series(), &names);

        assert!(page.contains(PLOTLY_CDN));
        assert!(page.contains(r#""name":"Gronk Stars""#));
        assert!(page.contains("101.5"));
        assert!(page.contains("97.25"));
        assert!(page.contains("1970-01-01 00:10:00"));
        assert!(page.contains("<title>Gronk Stars vs. &lt;Bench&gt;</title>"));
    }

    #[test]
    fn test_unknown_team_falls_back_to_id() {
        let page = render_matchup_page(&series(), &HashMap::new());
        assert!(page.contains("Team 1 vs. Team 2"));
    }

    #[test]
    fn test_week_index_links() {
        let links = vec![
            MatchupLink { name: "A vs. B".to_string(), url: "https://x/1/2021/3/1.html".to_string() },
            MatchupLink { name: "C & D".to_string(), url: "https://x/1/2021/3/2.html".to_string() },
        ];
        let page = render_week_index(3, &links);

        assert!(page.contains("<h1>Week 3 projections</h1>"));
        assert!(page.contains(r#"<li><a href="https://x/1/2021/3/1.html">A vs. B</a></li>"#));
        assert!(page.contains("C &amp; D"));
    }
}
