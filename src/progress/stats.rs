use std::collections::BTreeMap;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::models::{Module, UserProgress, MAX_TERM};
use super::shared::{split_module_peers, ModulePeers};

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Credit-weighted average over graded, finished requirements of the
/// given modules. Rounded to two decimals, 0 when nothing
/// is graded yet.
fn weighted_average<'a>(modules: impl Iterator<Item = &'a Module>) -> f64 {
    let (points, credits) = modules
        .flat_map(|m| m.requirements.iter())
        .filter(|r| r.is_graded_exam())
        .fold((0.0, 0.0), |(points, credits), r| {
            (points + r.grade_value().unwrap_or(0.0) * r.credits, credits + r.credits)
        });

    if credits > 0.0 {
        round_to(points / credits, 2)
    } else {
        0.0
    }
}

pub fn average_grade(modules: &[Module]) -> f64 {
    weighted_average(modules.iter())
}

pub fn average_grade_for_term(modules: &[Module], term: i32) -> f64 {
    weighted_average(modules.iter().filter(|m| m.term == term))
}

pub fn average_grade_up_to_term(modules: &[Module], term: i32) -> f64 {
    weighted_average(modules.iter().filter(|m| m.term <= term))
}

pub fn total_credits_so_far(modules: &[Module]) -> f64 {
    modules
        .iter()
        .flat_map(|m| m.requirements.iter())
        .filter(|r| r.done)
        .map(|r| r.credits)
        .sum()
}

pub fn completed_credits_up_to_term(modules: &[Module], term: i32) -> f64 {
    modules
        .iter()
        .filter(|m| m.term <= term)
        .flat_map(|m| m.requirements.iter())
        .filter(|r| r.done)
        .map(|r| r.credits)
        .sum()
}

pub fn all_credits_up_to_term(modules: &[Module], term: i32) -> f64 {
    modules
        .iter()
        .filter(|m| m.term <= term)
        .map(Module::total_credits)
        .sum()
}

pub fn term_credits(modules: &[Module], term: i32) -> f64 {
    modules
        .iter()
        .filter(|m| m.term == term)
        .map(Module::total_credits)
        .sum()
}

/// Credits a student finishing in `target` terms should have after `term`.
pub fn target_credits(term: i32, target: u32, total_needed: u32) -> i64 {
    if target == 0 {
        return i64::from(total_needed);
    }
    let ideal = (f64::from(term) / f64::from(target) * f64::from(total_needed)).floor() as i64;
    ideal.min(i64::from(total_needed))
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TargetLine {
    pub name: String,
    pub target: u32,
    pub data: Vec<i64>,
}

/// Planned/earned credit series per term, aligned on labels `1..=max_term`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TermStatistics {
    pub labels: Vec<i32>,
    pub planned_per_term: Vec<f64>,
    pub earned_per_term: Vec<f64>,
    pub missing_per_term: Vec<f64>,
    pub cumulative_planned: Vec<f64>,
    /// None for terms without earned credits so charts break the line there.
    pub cumulative_earned: Vec<Option<f64>>,
    pub target_lines: Vec<TargetLine>,
}

/// Per-term statistics, or None when no requirement carries credits.
/// Modules outside `1..=MAX_TERM` are left out of the charts.
pub fn term_statistics(progress: &UserProgress) -> Option<TermStatistics> {
    let mut planned: BTreeMap<i32, f64> = BTreeMap::new();
    let mut earned: BTreeMap<i32, f64> = BTreeMap::new();

    let charted = progress.modules.iter().filter(|m| (1..=MAX_TERM).contains(&m.term));
    for module in charted {
        for req in module.requirements.iter().filter(|r| r.credits > 0.0) {
            *planned.entry(module.term).or_insert(0.0) += req.credits;
            if req.done {
                *earned.entry(module.term).or_insert(0.0) += req.credits;
            }
        }
    }

    // earned is a subset of planned
    let max_term = *planned.keys().next_back()?;
    let labels: Vec<i32> = (1..=max_term).collect();

    let mut stats = TermStatistics {
        labels: labels.clone(),
        planned_per_term: Vec::with_capacity(labels.len()),
        earned_per_term: Vec::with_capacity(labels.len()),
        missing_per_term: Vec::with_capacity(labels.len()),
        cumulative_planned: Vec::with_capacity(labels.len()),
        cumulative_earned: Vec::with_capacity(labels.len()),
        target_lines: Vec::new(),
    };

    let (mut running_planned, mut running_earned) = (0.0, 0.0);
    for term in &labels {
        let p = planned.get(term).copied().unwrap_or(0.0);
        let e = earned.get(term).copied().unwrap_or(0.0);
        running_planned += p;
        running_earned += e;

        stats.planned_per_term.push(p);
        stats.earned_per_term.push(e);
        stats.missing_per_term.push((p - e).max(0.0));
        stats.cumulative_planned.push(running_planned);
        stats.cumulative_earned.push((e > 0.0).then_some(running_earned));
    }

    stats.target_lines = progress
        .semester_targets
        .iter()
        .map(|&target| TargetLine {
            name: format!("Target {}", target),
            target,
            data: labels
                .iter()
                .map(|&t| target_credits(t, target, progress.total_needed_credits))
                .collect(),
        })
        .collect();

    Some(stats)
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TermView {
    /// Group by the term each module is assigned to.
    #[default]
    Assigned,
    /// Group by the study plan's ideal term.
    Ideal,
}

/// Copies of the modules with `term` replaced according to `view`. Indexes
/// match the input so callers can address the stored modules.
pub fn display_modules(modules: &[Module], view: TermView) -> Vec<Module> {
    modules
        .iter()
        .map(|m| {
            let mut copy = m.clone();
            if view == TermView::Ideal {
                copy.term = m.ideal_term;
            }
            copy
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TargetRow {
    pub target: u32,
    pub credits: i64,
    pub met: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModuleCard {
    /// Position in the stored module list, used to address mutations.
    pub index: usize,
    pub module: Module,
    pub total_credits: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peers: Option<ModulePeers>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TermGroup {
    pub term: i32,
    pub label: String,
    pub credits: f64,
    pub average_grade: f64,
    pub average_grade_up_to: f64,
    pub credits_have: f64,
    pub credits_want: f64,
    pub want_met: bool,
    pub targets: Vec<TargetRow>,
    pub modules: Vec<ModuleCard>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Overview {
    pub view: TermView,
    pub total_credits_so_far: f64,
    pub total_needed_credits: u32,
    pub average_grade: f64,
    pub terms: Vec<TermGroup>,
}

/// Module ids mapped to the users sharing that module and their terms.
pub type PeerIndex = BTreeMap<String, BTreeMap<String, Vec<i32>>>;

/// Builds the main dashboard: modules grouped by display term with the
/// per-term averages, credit balances and target rows.
pub fn overview(progress: &UserProgress, view: TermView, peers: &PeerIndex) -> Overview {
    let display = display_modules(&progress.modules, view);
    let total_needed = progress.total_needed_credits;

    let mut by_term: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (index, module) in display.iter().enumerate() {
        by_term.entry(module.term).or_default().push(index);
    }

    let terms = by_term
        .into_iter()
        .map(|(term, indexes)| {
            let label = match view {
                TermView::Assigned => format!("Term {}", term),
                TermView::Ideal => format!("Ideal Term {}", term),
            };
            let have = completed_credits_up_to_term(&display, term);
            let want = all_credits_up_to_term(&display, term);

            let targets = progress
                .semester_targets
                .iter()
                .map(|&target| {
                    let credits = target_credits(term, target, total_needed);
                    TargetRow { target, credits, met: have >= credits as f64 }
                })
                .collect();

            let modules = indexes
                .into_iter()
                .map(|index| {
                    let stored = &progress.modules[index];
                    let module_peers = stored
                        .module_id()
                        .and_then(|id| peers.get(id))
                        .filter(|users| !users.is_empty())
                        .map(|users| split_module_peers(users, term));
                    ModuleCard {
                        index,
                        module: stored.clone(),
                        total_credits: stored.total_credits(),
                        peers: module_peers,
                    }
                })
                .collect();

            TermGroup {
                term,
                label,
                credits: term_credits(&display, term),
                average_grade: average_grade_for_term(&display, term),
                average_grade_up_to: average_grade_up_to_term(&display, term),
                credits_have: have,
                credits_want: want,
                want_met: have >= want,
                targets,
                modules,
            }
        })
        .collect();

    Overview {
        view,
        total_credits_so_far: total_credits_so_far(&progress.modules),
        total_needed_credits: total_needed,
        average_grade: average_grade(&progress.modules),
        terms,
    }
}

/// A finished, graded, credit-bearing requirement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Exam {
    pub credits: f64,
    pub grade: f64,
    pub date: Option<NaiveDate>,
}

/// Finished exams ordered by date; undated exams follow in stored order.
pub(crate) fn finished_exams(modules: &[Module]) -> Vec<Exam> {
    let mut exams: Vec<Exam> = modules
        .iter()
        .flat_map(|m| m.requirements.iter())
        .filter(|r| r.is_graded_exam())
        .map(|r| Exam {
            credits: r.credits,
            grade: r.grade_value().unwrap_or(0.0),
            date: r.parsed_date(),
        })
        .collect();

    // stable sort keeps stored order among undated exams
    exams.sort_by(|a, b| match (a.date, b.date) {
        (Some(a), Some(b)) => a.cmp(&b),
        (None, None) => std::cmp::Ordering::Equal,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (Some(_), None) => std::cmp::Ordering::Less,
    });
    exams
}

/// Running credit-weighted averages after each exam, rounded to 3 decimals.
pub(crate) fn running_averages(exams: &[Exam]) -> Vec<f64> {
    let (mut sum, mut credits) = (0.0, 0.0);
    exams
        .iter()
        .map(|e| {
            sum += e.grade * e.credits;
            credits += e.credits;
            round_to(sum / credits, 3)
        })
        .collect()
}

/// The user's own running grade average, one point per finished exam.
pub fn own_grade_progression(modules: &[Module]) -> Vec<f64> {
    running_averages(&finished_exams(modules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Requirement;

    fn req(credits: f64, done: bool, grade: Option<f64>, date: Option<&str>) -> Requirement {
        let mut r = Requirement::new("req", credits, date.map(str::to_string));
        r.done = done;
        r.grade = grade;
        r
    }

    fn module(name: &str, ideal_term: i32, term: i32, reqs: Vec<Requirement>) -> Module {
        let mut m = Module::new(name, ideal_term, term);
        m.requirements = reqs;
        m.update_completion_status();
        m
    }

    fn sample_progress() -> UserProgress {
        let mut progress = UserProgress::new(180, vec![6, 9]);
        progress.modules = vec![
            module("A", 1, 1, vec![req(10.0, true, Some(1.0), Some("2024-01-10"))]),
            module("B", 1, 2, vec![
                req(5.0, true, Some(3.0), Some("2024-07-01")),
                req(5.0, false, None, Some("2024-08-01")),
            ]),
            module("C", 3, 3, vec![req(8.0, false, None, None)]),
        ];
        progress
    }

    #[test]
    fn weighted_average_uses_credits() {
        let progress = sample_progress();
        // (1.0 * 10 + 3.0 * 5) / 15
        assert_eq!(average_grade(&progress.modules), 1.67);
        assert_eq!(average_grade_for_term(&progress.modules, 2), 3.0);
        assert_eq!(average_grade_up_to_term(&progress.modules, 1), 1.0);
        assert_eq!(average_grade_for_term(&progress.modules, 3), 0.0);
    }

    #[test]
    fn ungraded_or_open_requirements_are_ignored_in_averages() {
        let modules = vec![module("X", 1, 1, vec![
            req(5.0, false, Some(1.0), None),
            req(5.0, true, None, None),
            req(0.0, true, Some(4.0), None),
        ])];
        assert_eq!(average_grade(&modules), 0.0);
    }

    #[test]
    fn credit_totals() {
        let progress = sample_progress();
        assert_eq!(total_credits_so_far(&progress.modules), 15.0);
        assert_eq!(completed_credits_up_to_term(&progress.modules, 1), 10.0);
        assert_eq!(all_credits_up_to_term(&progress.modules, 2), 20.0);
        assert_eq!(term_credits(&progress.modules, 3), 8.0);
    }

    #[test]
    fn targets_are_floored_and_capped() {
        assert_eq!(target_credits(1, 6, 180), 30);
        assert_eq!(target_credits(1, 7, 180), 25);
        assert_eq!(target_credits(8, 6, 180), 180);
    }

    #[test]
    fn term_statistics_align_series() {
        let stats = term_statistics(&sample_progress()).unwrap();
        assert_eq!(stats.labels, vec![1, 2, 3]);
        assert_eq!(stats.planned_per_term, vec![10.0, 10.0, 8.0]);
        assert_eq!(stats.earned_per_term, vec![10.0, 5.0, 0.0]);
        assert_eq!(stats.missing_per_term, vec![0.0, 5.0, 8.0]);
        assert_eq!(stats.cumulative_planned, vec![10.0, 20.0, 28.0]);
        assert_eq!(stats.cumulative_earned, vec![Some(10.0), Some(15.0), None]);
        assert_eq!(stats.target_lines[0].name, "Target 6");
        assert_eq!(stats.target_lines[0].data, vec![30, 60, 90]);
    }

    #[test]
    fn term_statistics_empty_without_credits() {
        let mut progress = UserProgress::new(180, vec![6]);
        progress.modules.push(module("Empty", 1, 1, vec![req(0.0, true, None, None)]));
        assert_eq!(term_statistics(&progress), None);
    }

    #[test]
    fn term_statistics_skip_unchartable_terms() {
        let mut progress = sample_progress();
        progress.modules.push(module("Legacy", 1, 3_000_000, vec![req(4.0, true, None, None)]));
        progress.modules.push(module("Zero", 1, 0, vec![req(4.0, true, None, None)]));
        let stats = term_statistics(&progress).unwrap();
        assert_eq!(stats.labels, vec![1, 2, 3]);
        assert_eq!(stats.planned_per_term, vec![10.0, 10.0, 8.0]);

        progress.modules.retain(|m| m.name == "Legacy");
        assert_eq!(term_statistics(&progress), None);
    }

    #[test]
    fn ideal_view_regroups_by_ideal_term() {
        let progress = sample_progress();
        let view = overview(&progress, TermView::Ideal, &PeerIndex::new());
        let terms: Vec<_> = view.terms.iter().map(|t| t.term).collect();
        assert_eq!(terms, vec![1, 3]);
        assert_eq!(view.terms[0].label, "Ideal Term 1");
        assert_eq!(view.terms[0].modules.len(), 2);
        // stored term is kept on the card
        assert_eq!(view.terms[0].modules[1].module.term, 2);
        assert_eq!(view.terms[0].credits, 20.0);
    }

    #[test]
    fn overview_reports_credit_balance_per_term() {
        let progress = sample_progress();
        let view = overview(&progress, TermView::Assigned, &PeerIndex::new());
        assert_eq!(view.total_credits_so_far, 15.0);
        assert_eq!(view.average_grade, 1.67);

        let second = &view.terms[1];
        assert_eq!(second.label, "Term 2");
        assert_eq!(second.credits_have, 15.0);
        assert_eq!(second.credits_want, 20.0);
        assert!(!second.want_met);
        // targets sorted as configured: 6 terms -> 60, 9 terms -> 40
        assert_eq!(second.targets[0], TargetRow { target: 6, credits: 60, met: false });
        assert_eq!(second.targets[1], TargetRow { target: 9, credits: 40, met: false });
    }

    #[test]
    fn own_progression_follows_exam_dates() {
        let modules = vec![
            module("late", 1, 1, vec![req(5.0, true, Some(3.0), Some("2024-06-01"))]),
            module("undated", 1, 1, vec![req(5.0, true, Some(2.0), None)]),
            module("early", 1, 1, vec![req(5.0, true, Some(1.0), Some("2024-01-01"))]),
        ];
        assert_eq!(own_grade_progression(&modules), vec![1.0, 2.0, 2.0]);
    }
}
