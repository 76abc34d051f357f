use super::budget::BudgetValue;
use super::novelty::LinkNoveltyTracker;
use std::hash::{Hash, Hasher};

/// How a link's target relates to the concept holding the link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkType {
    SelfLink,
    Component,
    Compound,
    ComponentStatement,
    CompoundStatement,
    ComponentCondition,
    CompoundCondition,
    Transform,
}

/// Shape a new task link copies its type and component index from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTemplate {
    pub link_type: LinkType,
    pub index: Vec<u16>, // Up to four levels of component position
}

/// A budgeted reference from a concept to a task.
///
/// Task links are unique by the task term they reference. Each one owns the
/// novelty record of the term links it has recently been paired with.
#[derive(Debug, Clone)]
pub struct TaskLink<K> {
    target: K,
    budget: BudgetValue,
    link_type: LinkType,
    index: Vec<u16>,
    records: LinkNoveltyTracker<K>,
}

impl<K: Eq + Hash + Clone> TaskLink<K> {
    /// Creates a link to `target`; without a template the link points at itself
    pub fn new(
        target: K,
        template: Option<&LinkTemplate>,
        budget: BudgetValue,
        record_length: usize,
    ) -> Self {
        let (link_type, index) = match template {
            Some(t) => (t.link_type, t.index.clone()),
            None => (LinkType::SelfLink, Vec::new()),
        };
        Self {
            records: LinkNoveltyTracker::new(target.clone(), record_length),
            target,
            budget,
            link_type,
            index,
        }
    }

    // Getters
    pub fn target(&self) -> &K { &self.target }
    pub fn budget(&self) -> &BudgetValue { &self.budget }
    pub fn link_type(&self) -> LinkType { self.link_type }
    pub fn records(&self) -> &LinkNoveltyTracker<K> { &self.records }

    /// Component index at `level`, if the link has one that deep
    pub fn index(&self, level: usize) -> Option<u16> {
        self.index.get(level).copied()
    }

    /// Merges an externally computed budget into this link
    pub fn apply_budget(&mut self, budget: &BudgetValue) {
        self.budget.merge(budget);
    }

    /// Whether this link should be paired with `term_link` now.
    ///
    /// A term link pointing back at the task's own term is never novel.
    pub fn novel(&mut self, term_link: &K, current_time: u64, horizon: u64) -> bool {
        self.records.novel(term_link, current_time, horizon, false)
    }

    /// Like [`TaskLink::novel`], but lets a transformation pair the task with itself
    pub fn novel_for_transform(&mut self, term_link: &K, current_time: u64, horizon: u64) -> bool {
        self.records.novel(term_link, current_time, horizon, true)
    }

    /// Releases the recorded pairings when the link leaves its bag
    pub fn end(&mut self) {
        self.records.end();
    }
}

impl<K: PartialEq> PartialEq for TaskLink<K> {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

impl<K: Eq> Eq for TaskLink<K> {}

impl<K: Hash> Hash for TaskLink<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn link(target: &'static str) -> TaskLink<&'static str> {
        TaskLink::new(target, None, BudgetValue::default(), 10)
    }

    #[test]
    fn test_link_without_template_is_self_link() {
        let l = link("<a --> b>");
        assert_eq!(l.link_type(), LinkType::SelfLink);
        assert_eq!(l.index(0), None);
    }

    #[test]
    fn test_template_copies_type_and_index() {
        let template = LinkTemplate {
            link_type: LinkType::CompoundStatement,
            index: vec![1, 0],
        };
        let l = TaskLink::new("t", Some(&template), BudgetValue::default(), 10);
        assert_eq!(l.link_type(), LinkType::CompoundStatement);
        assert_eq!(l.index(0), Some(1));
        assert_eq!(l.index(1), Some(0));
        assert_eq!(l.index(2), None);
    }

    #[test]
    fn test_links_unique_by_target() {
        let mut a = link("t");
        a.apply_budget(&BudgetValue::new(0.9, 0.9, 0.9));
        let b = link("t");
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b, link("u")].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_novel_skips_own_term_unless_transforming() {
        let mut l = link("t");
        assert!(!l.novel(&"t", 0, 10));
        assert!(l.novel_for_transform(&"t", 0, 10));
        assert!(l.novel(&"u", 0, 10));
        assert!(!l.novel(&"u", 5, 10));
    }

    #[test]
    fn test_end_releases_records() {
        let mut l = link("t");
        l.novel(&"u", 0, 10);
        l.end();
        assert!(l.records().is_empty());
        assert!(l.novel(&"u", 1, 10));
    }
}
