//! Line-level diff based on the longest common subsequence.

/// One line of a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange<'a> {
    Same(&'a str),
    Removed(&'a str),
    Added(&'a str),
}

impl LineChange<'_> {
    fn prefix(&self) -> char {
        match self {
            LineChange::Same(_) => ' ',
            LineChange::Removed(_) => '-',
            LineChange::Added(_) => '+',
        }
    }

    fn text(&self) -> &str {
        match self {
            LineChange::Same(line) | LineChange::Removed(line) | LineChange::Added(line) => line,
        }
    }
}

fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').collect()
    }
}

/// Diff `old` against `new` line by line.
///
/// Within a changed region removals are listed before additions.
pub fn diff_lines<'a>(old: &'a str, new: &'a str) -> Vec<LineChange<'a>> {
    let old = split_lines(old);
    let new = split_lines(new);

    let prefix = old
        .iter()
        .zip(&new)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let a = &old[prefix..old.len() - suffix];
    let b = &new[prefix..new.len() - suffix];

    // lcs[i][j] = length of the LCS of a[i..] and b[j..]
    let width = b.len() + 1;
    let mut lcs = vec![0u32; (a.len() + 1) * width];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            lcs[i * width + j] = if a[i] == b[j] {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let mut changes = Vec::with_capacity(old.len() + new.len());
    changes.extend(old[..prefix].iter().copied().map(LineChange::Same));

    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            changes.push(LineChange::Same(a[i]));
            i += 1;
            j += 1;
        } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
            changes.push(LineChange::Removed(a[i]));
            i += 1;
        } else {
            changes.push(LineChange::Added(b[j]));
            j += 1;
        }
    }
    changes.extend(a[i..].iter().copied().map(LineChange::Removed));
    changes.extend(b[j..].iter().copied().map(LineChange::Added));

    changes.extend(old[old.len() - suffix..].iter().copied().map(LineChange::Same));
    changes
}

/// Render changes one per line with a ` `, `-` or `+` marker. No trailing
/// newline.
pub fn render(changes: &[LineChange<'_>]) -> String {
    let mut out = String::new();
    for (n, change) in changes.iter().enumerate() {
        if n > 0 {
            out.push('\n');
        }
        out.push(change.prefix());
        out.push_str(change.text());
    }
    out
}
