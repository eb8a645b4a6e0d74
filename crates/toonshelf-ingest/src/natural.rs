//! Natural ordering of archive paths.
//!
//! Digit runs compare by numeric value, everything else compares
//! case-insensitively, so `Page2.jpg` sorts before `page10.jpg`.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Total natural order over entry names.
///
/// Names that are equal under the natural rules (`page01` vs `page1`,
/// `A.jpg` vs `a.jpg`) fall back to plain byte order, so sorting is
/// deterministic for any input.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    compare_natural(a, b).then_with(|| a.cmp(b))
}

fn compare_natural(a: &str, b: &str) -> Ordering {
    let mut a_chars = a.chars().peekable();
    let mut b_chars = b.chars().peekable();

    loop {
        match (a_chars.peek().copied(), b_chars.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ac), Some(bc)) if ac.is_ascii_digit() && bc.is_ascii_digit() => {
                let a_run = take_digit_run(&mut a_chars);
                let b_run = take_digit_run(&mut b_chars);
                match compare_digit_runs(&a_run, &b_run) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            (Some(ac), Some(bc)) => {
                a_chars.next();
                b_chars.next();
                match ac.to_lowercase().cmp(bc.to_lowercase()) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
        }
    }
}

fn take_digit_run(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

/// Compare two digit runs by value without parsing, so runs of any length work.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        names.sort_by(|a, b| natural_cmp(a, b));
        names
    }

    #[test]
    fn test_numeric_runs_compare_by_value() {
        assert_eq!(
            sorted(&["page1.png", "page10.png", "page2.png"]),
            vec!["page1.png", "page2.png", "page10.png"]
        );
        assert_eq!(natural_cmp("page2", "page10"), Ordering::Less);
        assert_eq!(natural_cmp("page10", "page2"), Ordering::Greater);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            sorted(&["b.jpg", "A.jpg", "c.jpg"]),
            vec!["A.jpg", "b.jpg", "c.jpg"]
        );
        assert_eq!(natural_cmp("Page2.jpg", "page10.jpg"), Ordering::Less);
    }

    #[test]
    fn test_ties_fall_back_to_lexicographic() {
        assert_eq!(natural_cmp("a.jpg", "A.jpg"), "a.jpg".cmp("A.jpg"));
        assert_eq!(natural_cmp("page01", "page1"), "page01".cmp("page1"));
        assert_eq!(natural_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_full_path_ordering() {
        assert_eq!(
            sorted(&[
                "chapter10/page1.jpg",
                "chapter2/page10.jpg",
                "chapter2/page9.jpg",
            ]),
            vec![
                "chapter2/page9.jpg",
                "chapter2/page10.jpg",
                "chapter10/page1.jpg",
            ]
        );
    }

    #[test]
    fn test_very_long_digit_runs() {
        assert_eq!(
            natural_cmp("p99999999999999999999999", "p100000000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(natural_cmp("page", "page1"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
    }

    #[test]
    fn test_sort_is_deterministic_regardless_of_input_order() {
        let forward = sorted(&["P1.png", "p1.png", "p01.png", "p2.png"]);
        let backward = sorted(&["p2.png", "p01.png", "p1.png", "P1.png"]);
        assert_eq!(forward, backward);
    }
}
