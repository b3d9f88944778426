use chrono::{Duration, NaiveDate};
use serde::Serialize;
use crate::models::{UserProgress, DATE_FORMAT};
use super::sorting::FlatRequirement;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notification {
    pub module: String,
    pub description: String,
    pub date: String,
    pub in_days: i64,
    pub credits: f64,
}

/// Open requirements due between `today` and `today + window_days`
/// (inclusive), ordered by date and then module name ignoring case.
pub fn daily_notifications(progress: &UserProgress, today: NaiveDate, window_days: i64) -> Vec<Notification> {
    let upper = today + Duration::days(window_days);

    let mut result: Vec<Notification> = progress
        .modules
        .iter()
        .flat_map(|module| {
            module
                .requirements
                .iter()
                .filter(|r| !r.done)
                .filter_map(move |r| {
                    let date = r.parsed_date()?;
                    (date >= today && date <= upper).then(|| Notification {
                        module: module.name.clone(),
                        description: r.description.clone(),
                        date: date.format(DATE_FORMAT).to_string(),
                        in_days: (date - today).num_days(),
                        credits: r.credits,
                    })
                })
        })
        .collect();

    result.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.module.to_lowercase().cmp(&b.module.to_lowercase()))
    });
    result
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Past,
    /// More than a week left.
    Far,
    /// Three to seven days left.
    Soon,
    /// Less than three days left.
    Due,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimeUntil {
    pub label: String,
    pub urgency: Urgency,
}

/// Compact distance label like `12d`, `2M 3d`, `1y 40d` or `2y 1M`,
/// prefixed with `-` for past dates.
pub fn time_until(date: NaiveDate, today: NaiveDate) -> TimeUntil {
    let diff = (date - today).num_days();
    let past = diff < 0;
    // a date yesterday reads as "-1d", not "-0d"
    let days = if past { diff.abs() + 1 } else { diff };
    let magnitude = format_days(days);

    let urgency = match days {
        _ if past => Urgency::Past,
        d if d > 7 => Urgency::Far,
        d if d >= 3 => Urgency::Soon,
        _ => Urgency::Due,
    };

    TimeUntil {
        label: if past { format!("-{}", magnitude) } else { magnitude },
        urgency,
    }
}

fn format_days(days: i64) -> String {
    if days > 365 + 30 {
        format!("{}y {}M", days / 365, (days % 365) / 30)
    } else if days > 365 {
        format!("{}y {}d", days / 365, days % 365)
    } else if days > 30 {
        format!("{}M {}d", days / 30, days % 30)
    } else {
        format!("{}d", days)
    }
}

/// Unsigned distance between two dates, in the same units as `time_until`.
pub fn time_between(a: NaiveDate, b: NaiveDate) -> String {
    format_days((a - b).num_days().abs())
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequirementRow {
    #[serde(flatten)]
    pub requirement: FlatRequirement,
    pub time_until: Option<TimeUntil>,
    /// Gap to the previous row, when both rows carry a date.
    pub time_between: Option<String>,
    /// Still open although its date has passed.
    pub overdue: bool,
}

/// Annotates an already ordered requirement list for display.
pub fn requirement_rows(flat: Vec<FlatRequirement>, today: NaiveDate) -> Vec<RequirementRow> {
    let mut previous: Option<NaiveDate> = None;
    flat.into_iter()
        .map(|requirement| {
            let date = requirement
                .date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok());
            let gap = date.zip(previous).map(|(date, last)| time_between(date, last));
            previous = date;

            RequirementRow {
                time_until: date.map(|d| time_until(d, today)),
                time_between: gap,
                overdue: !requirement.done && date.is_some_and(|d| d < today),
                requirement,
            }
        })
        .collect()
}
