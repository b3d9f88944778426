use std::collections::{HashMap, HashSet};
use chrono::NaiveDate;
use crate::errors::{EditError, EditResult};
use crate::models::{
    Module, Requirement, RequirementDetails, SubRequirement, UserProgress, DATE_FORMAT, MAX_TERM,
};
use super::sorting::sort_modules;

fn module_mut(progress: &mut UserProgress, index: usize) -> EditResult<&mut Module> {
    progress
        .modules
        .get_mut(index)
        .ok_or(EditError::ModuleNotFound(index))
}

fn requirement_mut(
    progress: &mut UserProgress,
    module_index: usize,
    req_index: usize,
) -> EditResult<&mut Requirement> {
    module_mut(progress, module_index)?
        .requirements
        .get_mut(req_index)
        .ok_or(EditError::RequirementNotFound(module_index, req_index))
}

fn ensure_unique_name(progress: &UserProgress, name: &str) -> EditResult<()> {
    let lower = name.to_lowercase();
    if progress.modules.iter().any(|m| m.name.to_lowercase() == lower) {
        return Err(EditError::DuplicateModuleName(name.to_string()));
    }
    Ok(())
}

fn check_term(term: i32) -> EditResult<i32> {
    if (1..=MAX_TERM).contains(&term) {
        Ok(term)
    } else {
        Err(EditError::InvalidTerm(term))
    }
}

// NaN and infinity would be written as null and make the document unreadable
fn check_credits(credits: f64) -> EditResult<f64> {
    if !credits.is_finite() {
        Err(EditError::InvalidCredits)
    } else if credits < 0.0 {
        Err(EditError::NegativeCredits)
    } else {
        Ok(credits)
    }
}

/// Empty or whitespace-only dates mean "no date".
fn normalize_date(date: Option<&str>) -> EditResult<Option<String>> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(None),
        Some(d) => NaiveDate::parse_from_str(d, DATE_FORMAT)
            .map(|_| Some(d.to_string()))
            .map_err(|_| EditError::InvalidDate(d.to_string())),
    }
}

/// Splits a comma separated list, trimming entries and dropping empty ones.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn set_total_needed_credits(progress: &mut UserProgress, credits: u32) {
    progress.total_needed_credits = credits;
}

/// Keeps the positive numbers of a comma separated list, largest first,
/// without duplicates.
pub fn parse_semester_targets(raw: &str) -> Vec<u32> {
    let mut targets: Vec<u32> = parse_list(raw)
        .iter()
        .filter_map(|v| v.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .filter_map(|v| u32::try_from(v).ok())
        .collect();
    targets.sort_unstable_by(|a, b| b.cmp(a));
    targets.dedup();
    targets
}

pub fn set_semester_targets(progress: &mut UserProgress, raw: &str) {
    progress.semester_targets = parse_semester_targets(raw);
}

pub fn set_starting_term(progress: &mut UserProgress, term: i32) -> EditResult<()> {
    progress.starting_term = check_term(term)?;
    Ok(())
}

pub fn add_module(progress: &mut UserProgress, name: &str, ideal_term: i32, term: i32) -> EditResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EditError::Empty("Module name"));
    }
    let (ideal_term, term) = (check_term(ideal_term)?, check_term(term)?);
    ensure_unique_name(progress, name)?;

    let mut module = Module::new(name, ideal_term, term);
    module.update_completion_status();
    progress.modules.push(module);
    sort_modules(&mut progress.modules);
    Ok(())
}

pub fn rename_module(progress: &mut UserProgress, index: usize, name: &str) -> EditResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EditError::Empty("Module name"));
    }
    module_mut(progress, index)?;
    ensure_unique_name(progress, name)?;
    module_mut(progress, index)?.name = name.to_string();
    sort_modules(&mut progress.modules);
    Ok(())
}

pub fn reassign_term(progress: &mut UserProgress, index: usize, term: i32) -> EditResult<()> {
    let term = check_term(term)?;
    module_mut(progress, index)?.term = term;
    sort_modules(&mut progress.modules);
    Ok(())
}

pub fn set_ideal_term(progress: &mut UserProgress, index: usize, ideal_term: i32) -> EditResult<()> {
    let ideal_term = check_term(ideal_term)?;
    module_mut(progress, index)?.ideal_term = ideal_term;
    sort_modules(&mut progress.modules);
    Ok(())
}

pub fn delete_module(progress: &mut UserProgress, index: usize) -> EditResult<Module> {
    if index >= progress.modules.len() {
        return Err(EditError::ModuleNotFound(index));
    }
    let removed = progress.modules.remove(index);
    sort_modules(&mut progress.modules);
    Ok(removed)
}

pub fn set_module_notes(progress: &mut UserProgress, index: usize, notes: &str) -> EditResult<()> {
    let notes = notes.trim();
    module_mut(progress, index)?.notes = (!notes.is_empty()).then(|| notes.to_string());
    sort_modules(&mut progress.modules);
    Ok(())
}

/// Flips the highlight flag, returning the new state.
pub fn toggle_highlight(progress: &mut UserProgress, index: usize) -> EditResult<bool> {
    let module = module_mut(progress, index)?;
    let highlighted = !module.is_highlighted();
    module.highlighted = Some(highlighted);
    sort_modules(&mut progress.modules);
    Ok(highlighted)
}

pub fn set_module_id(progress: &mut UserProgress, index: usize, id: &str) -> EditResult<()> {
    let id = id.trim();
    module_mut(progress, index)?.id = Some(id.to_string());
    sort_modules(&mut progress.modules);
    Ok(())
}

/// Registers `id` in the global module id list. Ids no longer used by any
/// user are pruned first. Returns false when `id` was already known.
pub fn register_module_id(registry: &mut Vec<String>, id: &str, used: &HashSet<String>) -> bool {
    if registry.iter().any(|known| known == id) {
        return false;
    }
    registry.retain(|known| used.contains(known));
    let mut seen = HashSet::new();
    registry.retain(|known| seen.insert(known.clone()));
    registry.push(id.to_string());
    true
}

/// Adds a requirement and returns its uuid.
pub fn add_requirement(
    progress: &mut UserProgress,
    index: usize,
    description: &str,
    credits: f64,
    date: Option<&str>,
) -> EditResult<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(EditError::Empty("Description"));
    }
    let credits = check_credits(credits)?;
    let date = normalize_date(date)?;

    let module = module_mut(progress, index)?;
    let requirement = Requirement::new(description, credits, date);
    let uuid = requirement.uuid.clone();
    module.requirements.push(requirement);
    module.update_completion_status();
    sort_modules(&mut progress.modules);
    Ok(uuid)
}

/// Replacement values for an existing requirement.
#[derive(Debug, Clone)]
pub struct RequirementUpdate<'a> {
    pub done: bool,
    pub description: &'a str,
    pub credits: f64,
    pub grade: Option<f64>,
    pub date: Option<&'a str>,
}

/// Overwrites a requirement. Non-positive grades and empty dates clear the
/// stored value.
pub fn update_requirement(
    progress: &mut UserProgress,
    module_index: usize,
    req_index: usize,
    update: RequirementUpdate<'_>,
) -> EditResult<()> {
    let credits = check_credits(update.credits)?;
    let date = normalize_date(update.date)?;

    let requirement = requirement_mut(progress, module_index, req_index)?;
    requirement.done = update.done;
    requirement.description = update.description.trim().to_string();
    requirement.credits = credits;
    requirement.grade = update.grade.filter(|g| g.is_finite() && *g > 0.0);
    requirement.date = date;

    module_mut(progress, module_index)?.update_completion_status();
    sort_modules(&mut progress.modules);
    Ok(())
}

pub fn set_requirement_done(
    progress: &mut UserProgress,
    module_index: usize,
    req_index: usize,
    done: bool,
) -> EditResult<()> {
    requirement_mut(progress, module_index, req_index)?.done = done;
    module_mut(progress, module_index)?.update_completion_status();
    sort_modules(&mut progress.modules);
    Ok(())
}

pub fn delete_requirement(
    progress: &mut UserProgress,
    module_index: usize,
    req_index: usize,
) -> EditResult<Requirement> {
    let module = module_mut(progress, module_index)?;
    if req_index >= module.requirements.len() {
        return Err(EditError::RequirementNotFound(module_index, req_index));
    }
    let removed = module.requirements.remove(req_index);
    module.update_completion_status();
    sort_modules(&mut progress.modules);
    Ok(removed)
}

/// Moves modules to new terms as planned. Keys that are not module indexes
/// and terms outside `1..=MAX_TERM` are skipped. Returns the number of moved
/// modules.
pub fn apply_plan(progress: &mut UserProgress, changes: &HashMap<String, i32>) -> usize {
    let indexed: Vec<(usize, i32)> = changes
        .iter()
        .filter_map(|(index, term)| index.trim().parse::<usize>().ok().map(|i| (i, *term)))
        .filter(|(i, term)| *i < progress.modules.len() && check_term(*term).is_ok())
        .collect();

    for (index, term) in &indexed {
        progress.modules[*index].term = *term;
    }
    sort_modules(&mut progress.modules);
    indexed.len()
}

fn requirement_by_uuid<'a>(progress: &'a mut UserProgress, uuid: &str) -> EditResult<&'a mut Requirement> {
    let (mi, ri) = progress
        .find_requirement(uuid)
        .ok_or_else(|| EditError::UnknownRequirement(uuid.to_string()))?;
    Ok(&mut progress.modules[mi].requirements[ri])
}

fn details_by_uuid<'a>(progress: &'a mut UserProgress, uuid: &str) -> EditResult<&'a mut RequirementDetails> {
    Ok(requirement_by_uuid(progress, uuid)?
        .details
        .get_or_insert_with(RequirementDetails::default))
}

/// Validates and stores the main fields of the detail editor. All problems
/// are reported together; nothing is written unless every field is valid.
pub fn update_requirement_main(
    progress: &mut UserProgress,
    uuid: &str,
    description: &str,
    date: &str,
    credits: &str,
) -> EditResult<()> {
    let mut errors = Vec::new();

    let description = description.trim();
    if description.is_empty() {
        errors.push("Description is required.".to_string());
    }

    let date = date.trim();
    let date = if date.is_empty() {
        None
    } else {
        // strict round trip: "2024-1-5" is rejected
        match NaiveDate::parse_from_str(date, DATE_FORMAT) {
            Ok(parsed) if parsed.format(DATE_FORMAT).to_string() == date => Some(date.to_string()),
            _ => {
                errors.push("Date must be in YYYY-MM-DD format.".to_string());
                None
            }
        }
    };

    // "5", "+5" and "5.0" are all five credits
    let credits = match credits.trim().parse::<f64>() {
        Ok(c) if c.is_finite() && c >= 0.0 && c.fract() == 0.0 => Some(c),
        _ => {
            errors.push("Credits must be a non-negative integer.".to_string());
            None
        }
    };

    // look the requirement up before reporting field errors so a bad uuid is a 404
    let requirement = requirement_by_uuid(progress, uuid)?;
    if !errors.is_empty() {
        return Err(EditError::Invalid(errors));
    }

    requirement.description = description.to_string();
    requirement.date = date;
    requirement.credits = credits.unwrap_or(0.0);
    sort_modules(&mut progress.modules);
    Ok(())
}

pub fn set_requirement_notes(progress: &mut UserProgress, uuid: &str, notes: &str) -> EditResult<()> {
    details_by_uuid(progress, uuid)?.notes = notes.trim().to_string();
    Ok(())
}

pub fn add_sub_requirement(progress: &mut UserProgress, uuid: &str, desc: &str) -> EditResult<()> {
    let desc = desc.trim();
    if desc.is_empty() {
        return Err(EditError::Empty("Sub-requirement"));
    }
    details_by_uuid(progress, uuid)?.subs.push(SubRequirement {
        desc: desc.to_string(),
        done: false,
    });
    Ok(())
}

pub fn toggle_sub_requirement(progress: &mut UserProgress, uuid: &str, index: usize) -> EditResult<bool> {
    let sub = details_by_uuid(progress, uuid)?
        .subs
        .get_mut(index)
        .ok_or(EditError::SubNotFound(index))?;
    sub.done = !sub.done;
    Ok(sub.done)
}

pub fn delete_sub_requirement(progress: &mut UserProgress, uuid: &str, index: usize) -> EditResult<()> {
    let details = details_by_uuid(progress, uuid)?;
    if index >= details.subs.len() {
        return Err(EditError::SubNotFound(index));
    }
    details.subs.remove(index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress_with(names: &[&str]) -> UserProgress {
        let mut progress = UserProgress::new(180, vec![9, 6]);
        for (i, name) in names.iter().enumerate() {
            add_module(&mut progress, name, i as i32 + 1, i as i32 + 1).unwrap();
        }
        progress
    }

    fn index_of(progress: &UserProgress, name: &str) -> usize {
        progress.modules.iter().position(|m| m.name == name).unwrap()
    }

    #[test]
    fn module_names_are_unique_ignoring_case() {
        let mut progress = progress_with(&["Algebra"]);
        assert_eq!(
            add_module(&mut progress, "ALGEBRA", 1, 1),
            Err(EditError::DuplicateModuleName("ALGEBRA".into()))
        );
        assert_eq!(add_module(&mut progress, "   ", 1, 1), Err(EditError::Empty("Module name")));
        assert_eq!(progress.modules.len(), 1);
    }

    #[test]
    fn rename_rejects_taken_names() {
        let mut progress = progress_with(&["Algebra", "Analysis"]);
        let i = index_of(&progress, "Analysis");
        assert!(rename_module(&mut progress, i, "algebra").is_err());
        rename_module(&mut progress, i, "Analysis II").unwrap();
        assert!(progress.modules.iter().any(|m| m.name == "Analysis II"));
        assert_eq!(rename_module(&mut progress, 9, "x"), Err(EditError::ModuleNotFound(9)));
    }

    #[test]
    fn requirement_mutations_keep_all_done_in_sync() {
        let mut progress = progress_with(&["Algebra"]);
        add_requirement(&mut progress, 0, "Exam", 6.0, Some("2024-02-01")).unwrap();
        add_requirement(&mut progress, 0, "Homework", 3.0, None).unwrap();
        assert!(!progress.modules[0].all_done);

        // requirements are re-sorted after every change, so look them up each time
        let position = |p: &UserProgress, desc: &str| {
            p.modules[0].requirements.iter().position(|r| r.description == desc).unwrap()
        };

        let exam = position(&progress, "Exam");
        set_requirement_done(&mut progress, 0, exam, true).unwrap();
        let homework = position(&progress, "Homework");
        set_requirement_done(&mut progress, 0, homework, true).unwrap();
        assert!(progress.modules[0].all_done);

        let exam = position(&progress, "Exam");
        set_requirement_done(&mut progress, 0, exam, false).unwrap();
        assert!(!progress.modules[0].all_done);
        assert_eq!(progress.modules[0].requirements[0].description, "Exam");

        delete_requirement(&mut progress, 0, 0).unwrap();
        assert!(progress.modules[0].all_done);
        assert_eq!(
            delete_requirement(&mut progress, 0, 4),
            Err(EditError::RequirementNotFound(0, 4))
        );
    }

    #[test]
    fn add_requirement_validates_input() {
        let mut progress = progress_with(&["Algebra"]);
        assert_eq!(
            add_requirement(&mut progress, 0, "Exam", -1.0, None),
            Err(EditError::NegativeCredits)
        );
        assert_eq!(
            add_requirement(&mut progress, 0, "Exam", 1.0, Some("tomorrow")),
            Err(EditError::InvalidDate("tomorrow".into()))
        );
        assert_eq!(
            add_requirement(&mut progress, 3, "Exam", 1.0, None),
            Err(EditError::ModuleNotFound(3))
        );
        let uuid = add_requirement(&mut progress, 0, "Exam", 1.0, Some("  ")).unwrap();
        assert_eq!(progress.find_requirement(&uuid), Some((0, 0)));
        assert_eq!(progress.modules[0].requirements[0].date, None);
    }

    #[test]
    fn non_finite_credits_are_rejected() {
        let mut progress = progress_with(&["Algebra"]);
        for credits in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(
                add_requirement(&mut progress, 0, "Exam", credits, None),
                Err(EditError::InvalidCredits)
            );
        }
        assert!(progress.modules[0].requirements.is_empty());

        add_requirement(&mut progress, 0, "Exam", 6.0, None).unwrap();
        let update = RequirementUpdate { done: false, description: "Exam", credits: f64::NAN, grade: None, date: None };
        assert_eq!(update_requirement(&mut progress, 0, 0, update), Err(EditError::InvalidCredits));
        assert_eq!(progress.modules[0].requirements[0].credits, 6.0);

        let update = RequirementUpdate { done: false, description: "Exam", credits: 6.0, grade: Some(f64::NAN), date: None };
        update_requirement(&mut progress, 0, 0, update).unwrap();
        assert_eq!(progress.modules[0].requirements[0].grade, None);
        assert!(serde_json::to_string(&progress).unwrap().contains("\"credits\":6.0"));
    }

    #[test]
    fn terms_are_bounded() {
        let mut progress = progress_with(&["Algebra"]);
        assert_eq!(add_module(&mut progress, "Analysis", 0, 1), Err(EditError::InvalidTerm(0)));
        assert_eq!(
            add_module(&mut progress, "Analysis", 1, MAX_TERM + 1),
            Err(EditError::InvalidTerm(MAX_TERM + 1))
        );
        assert_eq!(reassign_term(&mut progress, 0, 3_000_000), Err(EditError::InvalidTerm(3_000_000)));
        assert_eq!(set_ideal_term(&mut progress, 0, -2), Err(EditError::InvalidTerm(-2)));
        assert_eq!(set_starting_term(&mut progress, MAX_TERM + 1), Err(EditError::InvalidTerm(MAX_TERM + 1)));
        assert_eq!(progress.modules.len(), 1);
        assert_eq!(progress.modules[0].term, 1);

        reassign_term(&mut progress, 0, MAX_TERM).unwrap();
        assert_eq!(progress.modules[0].term, MAX_TERM);
    }

    #[test]
    fn update_clears_grade_and_date() {
        let mut progress = progress_with(&["Algebra"]);
        add_requirement(&mut progress, 0, "Exam", 6.0, Some("2024-02-01")).unwrap();
        let update = RequirementUpdate {
            done: true,
            description: " Final exam ",
            credits: 6.0,
            grade: Some(1.3),
            date: Some("2024-02-03"),
        };
        update_requirement(&mut progress, 0, 0, update).unwrap();
        let req = &progress.modules[0].requirements[0];
        assert_eq!(req.description, "Final exam");
        assert_eq!(req.grade, Some(1.3));
        assert!(progress.modules[0].all_done);

        let clear = RequirementUpdate { done: true, description: "Final exam", credits: 6.0, grade: Some(0.0), date: Some("") };
        update_requirement(&mut progress, 0, 0, clear).unwrap();
        let req = &progress.modules[0].requirements[0];
        assert_eq!(req.grade, None);
        assert_eq!(req.date, None);
    }

    #[test]
    fn semester_targets_are_positive_descending_and_unique() {
        assert_eq!(parse_semester_targets("6, 9, x, -3, 0, 9,12"), vec![12, 9, 6]);
        assert!(parse_semester_targets("").is_empty());
    }

    #[test]
    fn starting_term_must_be_positive() {
        let mut progress = progress_with(&[]);
        assert_eq!(set_starting_term(&mut progress, 0), Err(EditError::InvalidTerm(0)));
        set_starting_term(&mut progress, 3).unwrap();
        assert_eq!(progress.starting_term, 3);
    }

    #[test]
    fn notes_and_highlight() {
        let mut progress = progress_with(&["Algebra"]);
        set_module_notes(&mut progress, 0, "  bring calculator ").unwrap();
        assert_eq!(progress.modules[0].notes.as_deref(), Some("bring calculator"));
        set_module_notes(&mut progress, 0, "").unwrap();
        assert_eq!(progress.modules[0].notes, None);

        assert!(toggle_highlight(&mut progress, 0).unwrap());
        assert!(!toggle_highlight(&mut progress, 0).unwrap());
    }

    #[test]
    fn plan_moves_only_valid_entries() {
        let mut progress = progress_with(&["Algebra", "Analysis"]);
        let algebra = index_of(&progress, "Algebra");
        let changes = HashMap::from([
            (algebra.to_string(), 4),
            ("7".to_string(), 2),
            ("nope".to_string(), 2),
            (((algebra + 1) % 2).to_string(), 0),
        ]);
        assert_eq!(apply_plan(&mut progress, &changes), 1);
        let changes = HashMap::from([(index_of(&progress, "Analysis").to_string(), MAX_TERM + 1)]);
        assert_eq!(apply_plan(&mut progress, &changes), 0);
        let algebra = index_of(&progress, "Algebra");
        let analysis = index_of(&progress, "Analysis");
        assert_eq!(progress.modules[algebra].term, 4);
        assert_eq!(progress.modules[analysis].term, 2);
    }

    #[test]
    fn module_id_registry_prunes_unused_ids() {
        let mut registry = vec!["MA-1".to_string(), "CS-2".to_string(), "MA-1".to_string()];
        let used = HashSet::from(["MA-1".to_string()]);

        assert!(!register_module_id(&mut registry, "CS-2", &used));
        assert_eq!(registry.len(), 3);

        assert!(register_module_id(&mut registry, "PH-3", &used));
        assert_eq!(registry, vec!["MA-1".to_string(), "PH-3".to_string()]);
    }

    #[test]
    fn detail_editor_reports_all_errors() {
        let mut progress = progress_with(&["Algebra"]);
        let uuid = add_requirement(&mut progress, 0, "Exam", 6.0, None).unwrap();

        let err = update_requirement_main(&mut progress, &uuid, "", "2024-2-1", "-4").unwrap_err();
        match err {
            EditError::Invalid(errors) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(progress.modules[0].requirements[0].description, "Exam");

        update_requirement_main(&mut progress, &uuid, "Oral exam", "2024-02-01", "8").unwrap();
        let req = &progress.modules[0].requirements[0];
        assert_eq!(req.description, "Oral exam");
        assert_eq!(req.credits, 8.0);
        assert_eq!(req.date.as_deref(), Some("2024-02-01"));

        assert_eq!(
            update_requirement_main(&mut progress, "missing", "x", "", "1"),
            Err(EditError::UnknownRequirement("missing".into()))
        );
    }

    #[test]
    fn detail_editor_credits_must_be_whole() {
        let mut progress = progress_with(&["Algebra"]);
        let uuid = add_requirement(&mut progress, 0, "Exam", 6.0, None).unwrap();

        for (raw, expected) in [("5.0", 5.0), ("+5", 5.0), (" 7 ", 7.0), ("0", 0.0)] {
            update_requirement_main(&mut progress, &uuid, "Exam", "", raw).unwrap();
            assert_eq!(progress.modules[0].requirements[0].credits, expected);
        }
        for raw in ["5.5", "NaN", "inf", "-1", ""] {
            assert!(matches!(
                update_requirement_main(&mut progress, &uuid, "Exam", "", raw),
                Err(EditError::Invalid(_))
            ));
        }
        assert_eq!(progress.modules[0].requirements[0].credits, 0.0);
    }

    #[test]
    fn detail_editor_resorts_modules() {
        let mut progress = progress_with(&["Algebra", "Analysis"]);
        let algebra = index_of(&progress, "Algebra");
        let exam = add_requirement(&mut progress, algebra, "Exam", 6.0, Some("2024-03-01")).unwrap();
        let analysis = index_of(&progress, "Analysis");
        add_requirement(&mut progress, analysis, "Exam", 6.0, Some("2024-02-01")).unwrap();
        assert_eq!(progress.modules[0].name, "Analysis");

        update_requirement_main(&mut progress, &exam, "Exam", "2024-01-15", "6").unwrap();
        assert_eq!(progress.modules[0].name, "Algebra");
    }

    #[test]
    fn sub_requirements_lifecycle() {
        let mut progress = progress_with(&["Algebra"]);
        let uuid = add_requirement(&mut progress, 0, "Project", 5.0, None).unwrap();

        add_sub_requirement(&mut progress, &uuid, "Outline").unwrap();
        add_sub_requirement(&mut progress, &uuid, "Draft").unwrap();
        assert!(add_sub_requirement(&mut progress, &uuid, " ").is_err());
        assert!(toggle_sub_requirement(&mut progress, &uuid, 1).unwrap());
        assert_eq!(toggle_sub_requirement(&mut progress, &uuid, 5), Err(EditError::SubNotFound(5)));
        delete_sub_requirement(&mut progress, &uuid, 0).unwrap();
        set_requirement_notes(&mut progress, &uuid, "due friday").unwrap();

        let details = progress.modules[0].requirements[0].details.as_ref().unwrap();
        assert_eq!(details.notes, "due friday");
        assert_eq!(details.subs, vec![SubRequirement { desc: "Draft".into(), done: true }]);
    }

    #[test]
    fn share_list_drops_empty_entries() {
        assert_eq!(parse_list(" alice, ,bob ,"), vec!["alice", "bob"]);
    }
}
