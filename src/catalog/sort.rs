//! Natural ordering for catalog file names

use std::cmp::Ordering;

/// Fold a name for comparison: transliterate to ASCII and lowercase
fn fold(name: &str) -> String {
    deunicode::deunicode(name).to_lowercase()
}

/// Compare two file names the way a person would
///
/// Digit runs compare by numeric value ("Game 2" before "Game 10"); letters
/// compare case- and accent-insensitively ("écran" next to "Ecran"). Names
/// that only differ by case or accents fall back to a plain comparison so the
/// order stays total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_cmp_folded(&fold(a), &fold(b)).then_with(|| a.cmp(b))
}

fn natural_cmp_folded(a: &str, b: &str) -> Ordering {
    let ab = a.as_bytes();
    let bb = b.as_bytes();
    let (mut i, mut j) = (0usize, 0usize);

    while i < ab.len() && j < bb.len() {
        let ca = ab[i];
        let cb = bb[j];

        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let (a_end, a_trim) = scan_number(ab, i);
            let (b_end, b_trim) = scan_number(bb, j);

            let ord = (a_end - a_trim)
                .cmp(&(b_end - b_trim))
                .then_with(|| ab[a_trim..a_end].cmp(&bb[b_trim..b_end]));
            if ord != Ordering::Equal {
                return ord;
            }

            // Same value: fewer leading zeros first
            let ord = (a_end - i).cmp(&(b_end - j));
            if ord != Ordering::Equal {
                return ord;
            }

            i = a_end;
            j = b_end;
            continue;
        }

        if ca != cb {
            return ca.cmp(&cb);
        }
        i += 1;
        j += 1;
    }

    (ab.len() - i).cmp(&(bb.len() - j))
}

/// Returns (end of digit run, start of significant digits)
fn scan_number(bytes: &[u8], start: usize) -> (usize, usize) {
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut trim = start;
    while trim + 1 < end && bytes[trim] == b'0' {
        trim += 1;
    }
    (end, trim)
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
    fn test_digit_runs_compare_numerically() {
        assert_eq!(
            sorted(&["Game 10.iso", "Game 2.iso", "Game 1.iso"]),
            vec!["Game 1.iso", "Game 2.iso", "Game 10.iso"]
        );
        assert_eq!(natural_cmp("Disc 02", "Disc 2"), Ordering::Greater);
        assert_eq!(natural_cmp("Disc 0", "Disc 00"), Ordering::Less);
    }

    #[test]
    fn test_case_and_accent_insensitive() {
        assert_eq!(
            sorted(&["zeta.cue", "Éxito.cue", "alpha.cue", "Beta.cue"]),
            vec!["alpha.cue", "Beta.cue", "Éxito.cue", "zeta.cue"]
        );
        assert_eq!(
            natural_cmp_folded(&fold("CRASH.bin"), &fold("crash.bin")),
            Ordering::Equal
        );
    }

    #[test]
    fn test_order_is_total() {
        assert_ne!(natural_cmp("Game.cue", "game.cue"), Ordering::Equal);
        assert_eq!(natural_cmp("Game.cue", "Game.cue"), Ordering::Equal);
        assert_eq!(natural_cmp("Game", "Game 2"), Ordering::Less);
    }
}
