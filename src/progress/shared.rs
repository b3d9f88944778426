use std::collections::BTreeMap;
use serde::Serialize;
use crate::models::{User, UserProgress, UserTable, MAX_TERM};
use super::stats::{finished_exams, running_averages, PeerIndex};

/// Progress of a user who shares with the current user.
#[derive(Debug, Clone)]
pub struct PeerProgress {
    pub username: String,
    pub progress: UserProgress,
}

/// Users, other than `origin`, that opted in to share with `origin`.
pub fn sharing_users<'a>(origin: &'a str, users: &'a UserTable) -> impl Iterator<Item = &'a User> {
    users.values().filter(move |user| user.shares_with(origin))
}

/// Terms, normalized by each peer's starting term, in which every peer
/// takes the module with `module_id`. Peers without a match are left out.
pub fn users_with_module_terms(module_id: &str, peers: &[PeerProgress]) -> BTreeMap<String, Vec<i32>> {
    peers
        .iter()
        .filter_map(|peer| {
            let offset = peer.progress.starting_term.saturating_sub(1);
            let mut terms: Vec<i32> = peer
                .progress
                .modules
                .iter()
                .filter(|m| m.module_id() == Some(module_id))
                .map(|m| m.term.saturating_sub(offset))
                .collect();
            terms.sort_unstable();
            terms.dedup();
            (!terms.is_empty()).then(|| (peer.username.clone(), terms))
        })
        .collect()
}

/// Peer lookups for every module id the user has set.
pub fn peer_index(progress: &UserProgress, peers: &[PeerProgress]) -> PeerIndex {
    let mut index = PeerIndex::new();
    for id in progress.modules.iter().filter_map(|m| m.module_id()) {
        if !index.contains_key(id) {
            index.insert(id.to_string(), users_with_module_terms(id, peers));
        }
    }
    index
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PeerTerms {
    pub username: String,
    pub terms: Vec<i32>,
}

/// Peers of one module, split by whether they take it in the displayed term.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModulePeers {
    pub same_term: Vec<String>,
    pub other_terms: Vec<PeerTerms>,
}

pub fn split_module_peers(users: &BTreeMap<String, Vec<i32>>, display_term: i32) -> ModulePeers {
    let mut peers = ModulePeers { same_term: Vec::new(), other_terms: Vec::new() };
    for (username, terms) in users {
        if terms.contains(&display_term) {
            peers.same_term.push(username.clone());
        } else {
            peers.other_terms.push(PeerTerms {
                username: username.clone(),
                terms: terms.clone(),
            });
        }
    }
    peers
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProgressSeries {
    pub label: String,
    /// Cumulative earned credits per term; None while nothing is earned.
    pub data: Vec<Option<f64>>,
}

/// Cumulative earned-credit series for every peer with earned credits.
///
/// All series share the label range `1..=max(min_terms, highest term)` so
/// they line up with each other and with the caller's own chart. Credits
/// earned outside `1..=MAX_TERM` are not charted.
pub fn shared_progress_datasets(peers: &[PeerProgress], min_terms: i32) -> Vec<ProgressSeries> {
    let earned: Vec<(&str, BTreeMap<i32, f64>)> = peers
        .iter()
        .filter_map(|peer| {
            let mut per_term = BTreeMap::new();
            let charted = peer.progress.modules.iter().filter(|m| (1..=MAX_TERM).contains(&m.term));
            for module in charted {
                for req in module.requirements.iter().filter(|r| r.done && r.credits > 0.0) {
                    *per_term.entry(module.term).or_insert(0.0) += req.credits;
                }
            }
            (!per_term.is_empty()).then_some((peer.username.as_str(), per_term))
        })
        .collect();

    let last_term = earned
        .iter()
        .filter_map(|(_, per_term)| per_term.keys().next_back().copied())
        .fold(min_terms.clamp(1, MAX_TERM), i32::max);

    earned
        .into_iter()
        .map(|(username, per_term)| {
            let mut running = 0.0;
            let data = (1..=last_term)
                .map(|term| {
                    running += per_term.get(&term).copied().unwrap_or(0.0);
                    (running > 0.0).then_some(running)
                })
                .collect();
            ProgressSeries { label: username.to_string(), data }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GradeSeries {
    pub label: String,
    pub data: Vec<Point>,
}

/// Running grade averages of every peer, stretched onto the caller's x-axis:
/// a peer's first exam lands on 0 and their last on `origin_count - 1`.
pub fn shared_grade_datasets(peers: &[PeerProgress], origin_count: usize) -> Vec<GradeSeries> {
    if origin_count < 1 {
        return Vec::new();
    }

    peers
        .iter()
        .filter_map(|peer| {
            let averages = running_averages(&finished_exams(&peer.progress.modules));
            if averages.is_empty() {
                return None;
            }

            let their_count = averages.len();
            let data = averages
                .into_iter()
                .enumerate()
                .map(|(i, y)| {
                    let x = if their_count > 1 {
                        (origin_count - 1) as f64 * i as f64 / (their_count - 1) as f64
                    } else {
                        0.0
                    };
                    Point { x, y }
                })
                .collect();

            Some(GradeSeries { label: peer.username.clone(), data })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Module, Requirement};

    fn module(id: Option<&str>, term: i32, reqs: Vec<(f64, bool, Option<f64>)>) -> Module {
        let mut m = Module::new("m", term, term);
        m.id = id.map(str::to_string);
        m.requirements = reqs
            .into_iter()
            .map(|(credits, done, grade)| {
                let mut r = Requirement::new("r", credits, None);
                r.done = done;
                r.grade = grade;
                r
            })
            .collect();
        m
    }

    fn peer(name: &str, starting_term: i32, modules: Vec<Module>) -> PeerProgress {
        let mut progress = UserProgress::new(180, vec![6]);
        progress.starting_term = starting_term;
        progress.modules = modules;
        PeerProgress { username: name.into(), progress }
    }

    fn user(name: &str, shares: &[&str]) -> User {
        User {
            username: name.into(),
            password_hash: String::new(),
            userid: name.into(),
            share_usernames: shares.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn only_opted_in_users_are_peers() {
        let mut users = UserTable::new();
        for u in [user("alice", &["*"]), user("bob", &["alice"]), user("carol", &["dave"])] {
            users.insert(u.username.clone(), u);
        }
        let names: Vec<_> = sharing_users("alice", &users).map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["bob"]);
    }

    #[test]
    fn module_terms_are_normalized_by_starting_term() {
        let peers = vec![
            peer("bob", 3, vec![module(Some("MA-101"), 4, vec![]), module(Some("MA-101"), 4, vec![])]),
            peer("carol", 1, vec![module(Some("MA-101"), 1, vec![]), module(Some("MA-101"), 3, vec![])]),
            peer("dave", 1, vec![module(Some("CS-200"), 1, vec![])]),
        ];
        let terms = users_with_module_terms("MA-101", &peers);
        assert_eq!(terms.len(), 2);
        assert_eq!(terms["bob"], vec![2]);
        assert_eq!(terms["carol"], vec![1, 3]);
    }

    #[test]
    fn peers_split_by_display_term() {
        let mut users = BTreeMap::new();
        users.insert("bob".to_string(), vec![2]);
        users.insert("carol".to_string(), vec![1, 3]);
        let split = split_module_peers(&users, 2);
        assert_eq!(split.same_term, vec!["bob"]);
        assert_eq!(split.other_terms, vec![PeerTerms { username: "carol".into(), terms: vec![1, 3] }]);
    }

    #[test]
    fn progress_series_share_one_label_range() {
        let peers = vec![
            peer("bob", 1, vec![module(None, 2, vec![(5.0, true, None)])]),
            peer("carol", 1, vec![
                module(None, 1, vec![(3.0, true, None)]),
                module(None, 4, vec![(4.0, true, None), (9.0, false, None)]),
            ]),
            peer("idle", 1, vec![module(None, 1, vec![(3.0, false, None)])]),
        ];
        let series = shared_progress_datasets(&peers, 2);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "bob");
        assert_eq!(series[0].data, vec![None, Some(5.0), Some(5.0), Some(5.0)]);
        assert_eq!(series[1].data, vec![Some(3.0), Some(3.0), Some(3.0), Some(7.0)]);
    }

    #[test]
    fn own_term_count_widens_the_label_range() {
        let peers = vec![peer("bob", 1, vec![module(None, 2, vec![(5.0, true, None)])])];
        let series = shared_progress_datasets(&peers, 5);
        assert_eq!(series[0].data, vec![None, Some(5.0), Some(5.0), Some(5.0), Some(5.0)]);
        assert_eq!(shared_progress_datasets(&peers, i32::MAX)[0].data.len(), MAX_TERM as usize);
    }

    #[test]
    fn credits_outside_chartable_terms_are_ignored() {
        let peers = vec![
            peer("zero", 1, vec![module(None, 0, vec![(5.0, true, None)])]),
            peer("huge", 1, vec![module(None, i32::MAX, vec![(5.0, true, None)])]),
            peer("bob", 1, vec![module(None, 1, vec![(2.0, true, None)])]),
        ];
        let series = shared_progress_datasets(&peers, 2);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label, "bob");
        assert_eq!(series[0].data, vec![Some(2.0), Some(2.0)]);
    }

    #[test]
    fn starting_term_offset_does_not_overflow() {
        let peers = vec![peer("bob", i32::MIN, vec![module(Some("MA-101"), i32::MAX, vec![])])];
        assert_eq!(users_with_module_terms("MA-101", &peers)["bob"], vec![i32::MAX]);
    }

    #[test]
    fn grade_series_are_scaled_onto_origin_axis() {
        let peers = vec![
            peer("bob", 1, vec![module(None, 1, vec![
                (5.0, true, Some(1.0)),
                (5.0, true, Some(2.0)),
                (10.0, true, Some(4.0)),
            ])]),
            peer("carol", 1, vec![module(None, 1, vec![(5.0, true, Some(2.5))])]),
        ];
        let series = shared_grade_datasets(&peers, 5);
        assert_eq!(series[0].data, vec![
            Point { x: 0.0, y: 1.0 },
            Point { x: 2.0, y: 1.5 },
            Point { x: 4.0, y: 2.75 },
        ]);
        assert_eq!(series[1].data, vec![Point { x: 0.0, y: 2.5 }]);
    }

    #[test]
    fn no_grade_series_without_own_exams() {
        let peers = vec![peer("bob", 1, vec![module(None, 1, vec![(5.0, true, Some(1.0))])])];
        assert!(shared_grade_datasets(&peers, 0).is_empty());
    }
}
