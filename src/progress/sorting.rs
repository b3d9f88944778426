use std::cmp::Ordering;
use chrono::NaiveDate;
use serde::Serialize;
use crate::models::{Module, Requirement};

/// Sort key used in the flat requirement list for requirements without a date.
const UNDATED_SORT_KEY: &str = "9999-12-31";

/// Sorts requirements in place: open before done, then by date ascending
/// with undated requirements last inside their group.
pub fn sort_requirements(requirements: &mut [Requirement]) {
    requirements.sort_by(|a, b| {
        a.done
            .cmp(&b.done)
            .then_with(|| compare_optional_dates(a.parsed_date(), b.parsed_date()))
    });
}

/// Sorts modules in place.
///
/// 1. Modules with at least one open requirement come first. Among them the
///    one with the earliest dated open requirement wins; modules whose open
///    requirements are all undated follow the dated ones.
/// 2. Fully done modules are ordered by their earliest dated done
///    requirement, undated ones last.
/// 3. When neither side has a relevant date, `ideal_term` then `term`
///    ascending decide.
///
/// Requirements inside every module are sorted with [`sort_requirements`].
pub fn sort_modules(modules: &mut [Module]) {
    for module in modules.iter_mut() {
        sort_requirements(&mut module.requirements);
    }
    modules.sort_by(compare_modules);
}

fn compare_modules(a: &Module, b: &Module) -> Ordering {
    let open_a = has_open_requirement(&a.requirements);
    let open_b = has_open_requirement(&b.requirements);

    if open_a != open_b {
        return if open_a { Ordering::Less } else { Ordering::Greater };
    }

    let (date_a, date_b) = if open_a {
        (earliest_open_date(&a.requirements), earliest_open_date(&b.requirements))
    } else {
        (earliest_done_date(&a.requirements), earliest_done_date(&b.requirements))
    };

    if date_a.is_some() || date_b.is_some() {
        return compare_optional_dates(date_a, date_b);
    }

    a.ideal_term
        .cmp(&b.ideal_term)
        .then_with(|| a.term.cmp(&b.term))
}

/// Dated before undated, earlier before later.
fn compare_optional_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(&b),
    }
}

pub fn has_open_requirement(requirements: &[Requirement]) -> bool {
    requirements.iter().any(|r| !r.done)
}

pub fn earliest_open_date(requirements: &[Requirement]) -> Option<NaiveDate> {
    earliest_date_by_done(requirements, false)
}

pub fn earliest_done_date(requirements: &[Requirement]) -> Option<NaiveDate> {
    earliest_date_by_done(requirements, true)
}

fn earliest_date_by_done(requirements: &[Requirement], done: bool) -> Option<NaiveDate> {
    requirements
        .iter()
        .filter(|r| r.done == done)
        .filter_map(Requirement::parsed_date)
        .min()
}

/// One requirement together with the module it belongs to.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FlatRequirement {
    pub module_name: String,
    pub term: i32,
    pub description: String,
    pub credits: f64,
    pub done: bool,
    pub date: Option<String>,
    pub uuid: String,
}

/// Every requirement of every module in one list: open first, then by date
/// (undated last), then by the module's term.
pub fn flatten_requirements(modules: &[Module]) -> Vec<FlatRequirement> {
    let mut all: Vec<FlatRequirement> = modules
        .iter()
        .flat_map(|module| {
            module.requirements.iter().map(move |req| FlatRequirement {
                module_name: module.name.clone(),
                term: module.term,
                description: req.description.clone(),
                credits: req.credits,
                done: req.done,
                date: req
                    .date
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
                uuid: req.uuid.clone(),
            })
        })
        .collect();

    all.sort_by(|a, b| {
        let date_a = a.date.as_deref().unwrap_or(UNDATED_SORT_KEY);
        let date_b = b.date.as_deref().unwrap_or(UNDATED_SORT_KEY);
        a.done
            .cmp(&b.done)
            .then_with(|| date_a.cmp(date_b))
            .then_with(|| a.term.cmp(&b.term))
    });

    all
}
