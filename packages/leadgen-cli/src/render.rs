//! Plain-text rendering for the terminal.

use colored::Colorize;
use leadgen::{Lead, LeadField, Page, PlanLimits, UserProfile};

const MAX_CELL_WIDTH: usize = 32;

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    format!("{value}{}", " ".repeat(width.saturating_sub(len)))
}

/// Render one page of leads using `columns`, one row per line.
pub fn lead_table(page: &Page<&Lead>, columns: &[LeadField]) -> String {
    let cells: Vec<Vec<String>> = page
        .items
        .iter()
        .map(|lead| {
            columns
                .iter()
                .map(|&c| truncate(lead.field(c).unwrap_or("—"), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(c.label().len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, &w)| pad(&c.label().to_uppercase(), w))
        .collect();

    let mut out = format!("{}\n", header.join("  ").bold());
    for row in &cells {
        let line: Vec<String> = row.iter().zip(&widths).map(|(v, &w)| pad(v, w)).collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out.push_str(
        &format!(
            "Page {} of {} ({} leads)",
            page.page, page.total_pages, page.total
        )
        .dimmed()
        .to_string(),
    );
    out
}

/// Render quota state for a profile.
pub fn profile_summary(profile: &UserProfile, limits: &PlanLimits) -> String {
    let tier = limits.for_plan(profile.plan);
    let daily = tier
        .daily_runs
        .map_or_else(|| "unlimited".to_string(), |max| max.to_string());
    let lifetime = tier
        .lifetime_leads
        .map_or_else(|| "unlimited".to_string(), |max| max.to_string());

    format!(
        "{}  plan: {}\n  runs today: {} / {}\n  leads extracted: {} / {}",
        profile.email.bold(),
        profile.plan.as_str().cyan(),
        profile.searches_today,
        daily,
        profile.total_leads_extracted,
        lifetime,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadgen::paginate;

    #[test]
    fn truncates_long_cells() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn table_shows_placeholder_for_missing_values() {
        colored::control::set_override(false);
        let leads = vec![Lead::new("1").with_name("Ada")];
        let refs: Vec<&Lead> = leads.iter().collect();
        let page = paginate(&refs, 1, 12);

        let table = lead_table(&page, &[LeadField::Name, LeadField::Email]);

        let mut lines = table.lines();
        assert_eq!(lines.next(), Some("NAME  EMAIL"));
        assert_eq!(lines.next(), Some("Ada   —"));
        assert_eq!(lines.next(), Some("Page 1 of 1 (1 leads)"));
    }
}
