//! Character diff with semantic cleanup
//!
//! The raw diff comes from a Myers diff over characters. Three passes then
//! make it readable:
//! - merge: coalesce neighbors, put deletions before insertions, and move
//!   text common to both sides of an edit back into the equalities
//! - semantic: fold short equalities that sit between larger edits into the
//!   edits, so "brown" -> "red" is one edit instead of b/r/own/ed fragments
//! - lossless: slide single edits sideways onto word, punctuation or line
//!   boundaries without changing what they mean
//!
//! A final overlap pass turns `<del>abcxxx</del><ins>xxxdef</ins>` into
//! `<del>abc</del>xxx<ins>def</ins>` when the shared part is large enough.

use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, TextDiff};
use std::time::Duration;

/// Kind of a diff segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffOp {
    Equal,
    Insert,
    Delete,
}

/// A run of text sharing one diff operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub op: DiffOp,
    pub text: String,
}

impl Segment {
    pub fn equal(text: impl Into<String>) -> Self {
        Self { op: DiffOp::Equal, text: text.into() }
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Self { op: DiffOp::Insert, text: text.into() }
    }

    pub fn delete(text: impl Into<String>) -> Self {
        Self { op: DiffOp::Delete, text: text.into() }
    }

    /// Check if this segment is an edit (insert or delete)
    pub fn is_edit(&self) -> bool {
        self.op != DiffOp::Equal
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Diff and grouping options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffSettings {
    /// Characters of context kept on each side of a change block
    pub context_chars: usize,
    /// Upper bound on diff time; a less minimal diff is returned when hit
    pub timeout_ms: Option<u64>,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            context_chars: 50,
            timeout_ms: None,
        }
    }
}

/// Compute a cleaned-up character diff between two texts
pub fn compute_diff(original: &str, optimized: &str, settings: &DiffSettings) -> Vec<Segment> {
    let mut config = TextDiff::configure();
    config.algorithm(Algorithm::Myers);
    if let Some(ms) = settings.timeout_ms {
        config.timeout(Duration::from_millis(ms));
    }
    let diff = config.diff_chars(original, optimized);

    let mut segments: Vec<Segment> = Vec::new();
    for change in diff.iter_all_changes() {
        let op = match change.tag() {
            ChangeTag::Equal => DiffOp::Equal,
            ChangeTag::Insert => DiffOp::Insert,
            ChangeTag::Delete => DiffOp::Delete,
        };
        match segments.last_mut() {
            Some(last) if last.op == op => last.text.push_str(change.value()),
            _ => segments.push(Segment { op, text: change.value().to_string() }),
        }
    }

    cleanup_merge(&mut segments);
    cleanup_semantic(&mut segments);
    segments
}

/// Coalesce neighbors and factor shared prefixes/suffixes out of edits.
///
/// Afterwards no two neighbors share an op, each edit group is one delete
/// followed by one insert, and no segment is empty.
pub fn cleanup_merge(diffs: &mut Vec<Segment>) {
    loop {
        let mut merged: Vec<Segment> = Vec::with_capacity(diffs.len());
        let mut deleted = String::new();
        let mut inserted = String::new();

        for seg in diffs.drain(..) {
            match seg.op {
                DiffOp::Delete => deleted.push_str(&seg.text),
                DiffOp::Insert => inserted.push_str(&seg.text),
                // An empty equality does not separate two edit groups
                DiffOp::Equal if seg.text.is_empty() => {}
                DiffOp::Equal => flush_edit(&mut merged, &mut deleted, &mut inserted, &seg.text),
            }
        }
        flush_edit(&mut merged, &mut deleted, &mut inserted, "");
        *diffs = merged;

        if !shift_single_edits(diffs) {
            break;
        }
    }
}

fn flush_edit(out: &mut Vec<Segment>, deleted: &mut String, inserted: &mut String, next_equal: &str) {
    let mut trailing = String::new();

    if !deleted.is_empty() && !inserted.is_empty() {
        let prefix = common_prefix(deleted, inserted);
        if prefix > 0 {
            push_equal(out, &deleted[..prefix]);
            deleted.drain(..prefix);
            inserted.drain(..prefix);
        }
        let suffix = common_suffix(deleted, inserted);
        if suffix > 0 {
            trailing.push_str(&deleted[deleted.len() - suffix..]);
            deleted.truncate(deleted.len() - suffix);
            inserted.truncate(inserted.len() - suffix);
        }
    }

    if !deleted.is_empty() {
        out.push(Segment::delete(std::mem::take(deleted)));
    }
    if !inserted.is_empty() {
        out.push(Segment::insert(std::mem::take(inserted)));
    }

    trailing.push_str(next_equal);
    if !trailing.is_empty() {
        push_equal(out, &trailing);
    }
}

fn push_equal(out: &mut Vec<Segment>, text: &str) {
    match out.last_mut() {
        Some(last) if last.op == DiffOp::Equal => last.text.push_str(text),
        _ => out.push(Segment::equal(text)),
    }
}

/// Slide single edits sitting between two equalities when one equality can
/// be absorbed entirely, e.g. `A<ins>BA</ins>C` -> `<ins>AB</ins>AC`.
fn shift_single_edits(diffs: &mut Vec<Segment>) -> bool {
    let mut changed = false;
    let mut i = 1;

    while i + 1 < diffs.len() {
        if diffs[i - 1].op == DiffOp::Equal && diffs[i + 1].op == DiffOp::Equal {
            let prev = diffs[i - 1].text.clone();
            let next = diffs[i + 1].text.clone();
            let edit = diffs[i].text.clone();

            if !prev.is_empty() && edit.ends_with(prev.as_str()) {
                diffs[i].text = format!("{}{}", prev, &edit[..edit.len() - prev.len()]);
                diffs[i + 1].text = format!("{}{}", prev, next);
                diffs.remove(i - 1);
                changed = true;
            } else if !next.is_empty() && edit.starts_with(next.as_str()) {
                diffs[i - 1].text.push_str(&next);
                diffs[i].text = format!("{}{}", &edit[next.len()..], next);
                diffs.remove(i + 1);
                changed = true;
            }
        }
        i += 1;
    }

    changed
}

/// Fold equalities that are no longer than the edits on both of their sides
/// into those edits, align edit boundaries, then split off overlaps between
/// a deletion and its insertion.
///
/// The result keeps the [`cleanup_merge`] shape.
pub fn cleanup_semantic(diffs: &mut Vec<Segment>) {
    let mut changed = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<String> = None;
    // Edit lengths before and after the last equality
    let (mut ins_before, mut del_before) = (0usize, 0usize);
    let (mut ins_after, mut del_after) = (0usize, 0usize);

    let mut pointer = 0;
    while pointer < diffs.len() {
        if diffs[pointer].op == DiffOp::Equal {
            equalities.push(pointer);
            ins_before = ins_after;
            del_before = del_after;
            ins_after = 0;
            del_after = 0;
            last_equality = Some(diffs[pointer].text.clone());
            pointer += 1;
            continue;
        }

        if diffs[pointer].op == DiffOp::Insert {
            ins_after += diffs[pointer].char_len();
        } else {
            del_after += diffs[pointer].char_len();
        }

        let collapse = match (&last_equality, equalities.last()) {
            (Some(eq), Some(&index)) => {
                let len = eq.chars().count();
                (len <= ins_before.max(del_before) && len <= ins_after.max(del_after))
                    .then_some((index, eq.clone()))
            }
            _ => None,
        };

        if let Some((index, text)) = collapse {
            // Turn the equality into a delete + insert pair
            diffs.insert(index, Segment::delete(text));
            diffs[index + 1].op = DiffOp::Insert;

            equalities.pop();
            equalities.pop();
            pointer = equalities.last().map_or(0, |&i| i + 1);

            ins_before = 0;
            del_before = 0;
            ins_after = 0;
            del_after = 0;
            last_equality = None;
            changed = true;
            continue;
        }

        pointer += 1;
    }

    if changed {
        cleanup_merge(diffs);
    }
    if cleanup_semantic_lossless(diffs) {
        cleanup_merge(diffs);
    }
    if eliminate_overlaps(diffs) {
        cleanup_merge(diffs);
    }
}

/// Shift single edits surrounded by equalities to the most natural boundary.
///
/// Returns whether anything moved. An equality absorbed entirely leaves two
/// edit groups side by side, so callers re-merge after a change.
pub fn cleanup_semantic_lossless(diffs: &mut Vec<Segment>) -> bool {
    let mut changed = false;
    let mut pointer = 1;

    while pointer + 1 < diffs.len() {
        if diffs[pointer - 1].op != DiffOp::Equal || diffs[pointer + 1].op != DiffOp::Equal {
            pointer += 1;
            continue;
        }

        let mut eq1: Vec<char> = diffs[pointer - 1].text.chars().collect();
        let mut edit: Vec<char> = diffs[pointer].text.chars().collect();
        let mut eq2: Vec<char> = diffs[pointer + 1].text.chars().collect();

        // Shift the edit as far left as possible
        let common = common_suffix_chars(&eq1, &edit);
        if common > 0 {
            let shared: Vec<char> = edit[edit.len() - common..].to_vec();
            eq1.truncate(eq1.len() - common);
            edit = shared.iter().chain(&edit[..edit.len() - common]).copied().collect();
            eq2 = shared.iter().chain(eq2.iter()).copied().collect();
        }

        // Step right one character at a time, keeping the best-scoring split
        let mut best = (eq1.clone(), edit.clone(), eq2.clone());
        let mut best_score = boundary_score(&eq1, &edit) + boundary_score(&edit, &eq2);
        while !edit.is_empty() && !eq2.is_empty() && edit[0] == eq2[0] {
            eq1.push(edit.remove(0));
            edit.push(eq2.remove(0));
            let score = boundary_score(&eq1, &edit) + boundary_score(&edit, &eq2);
            // >= favors the rightmost of equally good positions
            if score >= best_score {
                best_score = score;
                best = (eq1.clone(), edit.clone(), eq2.clone());
            }
        }

        let (best_eq1, best_edit, best_eq2) = best;
        let best_eq1: String = best_eq1.into_iter().collect();
        if diffs[pointer - 1].text != best_eq1 {
            changed = true;
            if best_eq1.is_empty() {
                diffs.remove(pointer - 1);
                pointer -= 1;
            } else {
                diffs[pointer - 1].text = best_eq1;
            }
            diffs[pointer].text = best_edit.into_iter().collect();
            if best_eq2.is_empty() {
                diffs.remove(pointer + 1);
                pointer = pointer.saturating_sub(1);
            } else {
                diffs[pointer + 1].text = best_eq2.into_iter().collect();
            }
        }
        pointer += 1;
    }

    changed
}

/// Split a delete/insert pair whose texts overlap into edit, equality, edit.
///
/// Applies when the overlap covers at least half of either text. A deletion
/// ending with the start of the insertion keeps its order; an insertion
/// ending with the start of the deletion swaps the pair around the equality.
fn eliminate_overlaps(diffs: &mut Vec<Segment>) -> bool {
    let mut changed = false;
    let mut pointer = 1;

    while pointer < diffs.len() {
        if diffs[pointer - 1].op != DiffOp::Delete || diffs[pointer].op != DiffOp::Insert {
            pointer += 1;
            continue;
        }

        let deletion: Vec<char> = diffs[pointer - 1].text.chars().collect();
        let insertion: Vec<char> = diffs[pointer].text.chars().collect();
        let forward = common_overlap(&deletion, &insertion);
        let reverse = common_overlap(&insertion, &deletion);
        let large = |overlap: usize| {
            overlap > 0 && (2 * overlap >= deletion.len() || 2 * overlap >= insertion.len())
        };

        let split = if forward >= reverse && large(forward) {
            Some((
                Segment::delete(collect(&deletion[..deletion.len() - forward])),
                Segment::equal(collect(&insertion[..forward])),
                Segment::insert(collect(&insertion[forward..])),
            ))
        } else if reverse > forward && large(reverse) {
            Some((
                Segment::insert(collect(&insertion[..insertion.len() - reverse])),
                Segment::equal(collect(&deletion[..reverse])),
                Segment::delete(collect(&deletion[reverse..])),
            ))
        } else {
            None
        };

        match split {
            Some((first, shared, last)) => {
                diffs[pointer - 1] = first;
                diffs[pointer] = last;
                diffs.insert(pointer, shared);
                changed = true;
                pointer += 3;
            }
            None => pointer += 2,
        }
    }

    changed
}

/// Length of the longest suffix of `a` that is also a prefix of `b`
fn common_overlap(a: &[char], b: &[char]) -> usize {
    let max = a.len().min(b.len());
    (1..=max)
        .rev()
        .find(|&len| a[a.len() - len..] == b[..len])
        .unwrap_or(0)
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

/// Score how natural a boundary between `one` and `two` is, 0 (mid-word)
/// to 6 (edge of the text)
fn boundary_score(one: &[char], two: &[char]) -> u8 {
    let (Some(&c1), Some(&c2)) = (one.last(), two.first()) else {
        return 6;
    };

    let non_alnum1 = !c1.is_alphanumeric();
    let non_alnum2 = !c2.is_alphanumeric();
    let space1 = non_alnum1 && c1.is_whitespace();
    let space2 = non_alnum2 && c2.is_whitespace();
    let break1 = space1 && (c1 == '\n' || c1 == '\r');
    let break2 = space2 && (c2 == '\n' || c2 == '\r');
    let blank1 = break1 && (one.ends_with(&['\n', '\n']) || one.ends_with(&['\n', '\r', '\n']));
    let blank2 = break2
        && (two.starts_with(&['\n', '\n'])
            || two.starts_with(&['\n', '\r', '\n'])
            || two.starts_with(&['\r', '\n', '\r', '\n']));

    if blank1 || blank2 {
        5
    } else if break1 || break2 {
        4
    } else if non_alnum1 && !space1 && space2 {
        3
    } else if space1 || space2 {
        2
    } else if non_alnum1 || non_alnum2 {
        1
    } else {
        0
    }
}

/// Length in bytes of the common prefix of two strings
fn common_prefix(a: &str, b: &str) -> usize {
    let mut len = 0;
    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca != cb {
            break;
        }
        len += ca.len_utf8();
    }
    len
}

/// Length in bytes of the common suffix of two strings
fn common_suffix(a: &str, b: &str) -> usize {
    let mut len = 0;
    for (ca, cb) in a.chars().rev().zip(b.chars().rev()) {
        if ca != cb {
            break;
        }
        len += ca.len_utf8();
    }
    len
}

fn common_suffix_chars(a: &[char], b: &[char]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}
