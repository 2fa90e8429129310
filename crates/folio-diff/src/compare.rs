//! Node comparison: the change list between two trees.
//!
//! Text is never diffed character by character: a text-bearing node whose
//! text changed is one `replace`. Containers with matching markup (same type
//! and attrs) are compared child by child, aligned by a longest common
//! subsequence over markup so that "the same paragraph with edited text"
//! comes out as one nested replace rather than a remove plus an insert.

use folio_model::Node;

use crate::change::Change;

/// One step of a child alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    /// `old[i]` pairs with `modified[j]`.
    Match(usize, usize),
    /// `old[i]` has no counterpart.
    Remove(usize),
    /// `modified[j]` has no counterpart.
    Insert(usize),
}

/// Compare two optional nodes and list the changes from `old` to `modified`.
pub fn compare_nodes(old: Option<&Node>, modified: Option<&Node>) -> Vec<Change> {
    let mut changes = Vec::new();
    compare_into(old, modified, &mut changes);
    changes
}

fn compare_into(old: Option<&Node>, modified: Option<&Node>, changes: &mut Vec<Change>) {
    let (old, modified) = match (old, modified) {
        (None, None) => return,
        (Some(old), None) => return changes.push(Change::remove(old)),
        (None, Some(modified)) => return changes.push(Change::insert(modified)),
        (Some(old), Some(modified)) => (old, modified),
    };
    if old == modified {
        return;
    }
    if !old.same_markup(modified) || old.is_text() || modified.is_text() {
        return changes.push(Change::replace(old, modified));
    }

    let before = old.content().nodes();
    let after = modified.content().nodes();
    for step in align(before, after, Node::same_markup) {
        match step {
            Alignment::Match(i, j) => compare_into(Some(&before[i]), Some(&after[j]), changes),
            Alignment::Remove(i) => changes.push(Change::remove(&before[i])),
            Alignment::Insert(j) => changes.push(Change::insert(&after[j])),
        }
    }
}

/// Align two sequences by their longest common subsequence under `matches`.
///
/// The table is filled in O(n·m). Backtracking from the end prefers an
/// insert, then a remove, then a match when the table allows more than one,
/// so trailing `modified` items stay unmatched on ties. The result is in
/// forward order.
pub fn align<T>(old: &[T], modified: &[T], matches: impl Fn(&T, &T) -> bool) -> Vec<Alignment> {
    let (n, m) = (old.len(), modified.len());
    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            table[i][j] = if matches(&old[i - 1], &modified[j - 1]) {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }

    let mut steps = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        if j > 0 && table[i][j - 1] == table[i][j] {
            steps.push(Alignment::Insert(j - 1));
            j -= 1;
        } else if i > 0 && table[i - 1][j] == table[i][j] {
            steps.push(Alignment::Remove(i - 1));
            i -= 1;
        } else {
            steps.push(Alignment::Match(i - 1, j - 1));
            i -= 1;
            j -= 1;
        }
    }
    steps.reverse();
    steps
}
