use std::cmp::Ordering;

/// Compares two strings in natural order: runs of digits compare by numeric
/// value, so `"item2"` sorts before `"item10"`.
///
/// Whitespace (space, `\t`, `\n`, vertical tab, form feed and `\r`) is
/// skipped before every comparison step. A digit run that
/// starts with `0` on either side is compared left-aligned, as the digits of
/// a fraction would be (`"1.010"` < `"1.02"`). Everything else compares
/// byte by byte and is case-sensitive; a string that runs out first sorts
/// first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut ai, mut bi) = (0, 0);
    loop {
        while is_space(byte_at(a, ai)) {
            ai += 1;
        }
        while is_space(byte_at(b, bi)) {
            bi += 1;
        }
        let (ca, cb) = (byte_at(a, ai), byte_at(b, bi));

        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let digits = if ca == b'0' || cb == b'0' {
                compare_left(&a[ai..], &b[bi..])
            } else {
                compare_right(&a[ai..], &b[bi..])
            };
            if digits != Ordering::Equal {
                return digits;
            }
        }

        if ca == 0 && cb == 0 {
            return Ordering::Equal;
        }
        match ca.cmp(&cb) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        ai += 1;
        bi += 1;
    }
}

/// The C `isspace` set, which unlike `u8::is_ascii_whitespace` includes the
/// vertical tab.
fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

/// Past the end reads as a terminator.
fn byte_at(s: &[u8], index: usize) -> u8 {
    s.get(index).copied().unwrap_or(0)
}

/// Right-aligned digit runs: the longer run is the bigger number, and for
/// runs of equal length the first differing digit decides.
fn compare_right(a: &[u8], b: &[u8]) -> Ordering {
    let mut bias = Ordering::Equal;
    let mut index = 0;
    loop {
        let (ca, cb) = (byte_at(a, index), byte_at(b, index));
        match (ca.is_ascii_digit(), cb.is_ascii_digit()) {
            (false, false) => return bias,
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            (true, true) => {
                if bias == Ordering::Equal {
                    bias = ca.cmp(&cb);
                }
            }
        }
        index += 1;
    }
}

/// Left-aligned digit runs: the first differing digit decides.
fn compare_left(a: &[u8], b: &[u8]) -> Ordering {
    let mut index = 0;
    loop {
        let (ca, cb) = (byte_at(a, index), byte_at(b, index));
        match (ca.is_ascii_digit(), cb.is_ascii_digit()) {
            (false, false) => return Ordering::Equal,
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            (true, true) => match ca.cmp(&cb) {
                Ordering::Equal => {}
                unequal => return unequal,
            },
        }
        index += 1;
    }
}

#[cfg(test)]
mod test {
    use std::cmp::Ordering::{Equal, Greater, Less};

    use super::natural_cmp;

    #[test]
    fn numeric_runs_compare_by_value() {
        assert_eq!(natural_cmp("a2", "a10"), Less);
        assert_eq!(natural_cmp("item10", "item2"), Greater);
        assert_eq!(natural_cmp("a1", "a1"), Equal);
        assert_eq!(natural_cmp("version 1.9", "version 1.10"), Less);
        assert_eq!(natural_cmp("x100y", "x99z"), Greater);
    }

    #[test]
    fn equal_length_runs_use_first_difference() {
        assert_eq!(natural_cmp("a123b", "a124a"), Less);
        assert_eq!(natural_cmp("a21", "a12"), Greater);
    }

    #[test]
    fn leading_zeros_compare_left_aligned() {
        assert_eq!(natural_cmp("1.010", "1.02"), Less);
        assert_eq!(natural_cmp("x01", "x1"), Less);
        assert_eq!(natural_cmp("x05", "x05"), Equal);
        assert_eq!(natural_cmp("x0", "x00"), Less);
    }

    #[test]
    fn plain_text_compares_bytewise() {
        assert_eq!(natural_cmp("abc", "abd"), Less);
        assert_eq!(natural_cmp("a", "ab"), Less);
        assert_eq!(natural_cmp("", "a"), Less);
        assert_eq!(natural_cmp("", ""), Equal);
        // case-sensitive
        assert_eq!(natural_cmp("B", "a"), Less);
    }

    #[test]
    fn whitespace_is_skipped() {
        assert_eq!(natural_cmp("x 1", "x1"), Equal);
        assert_eq!(natural_cmp("  apple", "apple"), Equal);
        assert_eq!(natural_cmp("a", "a  "), Equal);
        assert_eq!(natural_cmp("a\x0b1", "a1"), Equal);
        assert_eq!(natural_cmp("a\x0c\r\t\n2", "a 2"), Equal);
    }

    #[test]
    fn sorting_a_slice() {
        let mut items = vec!["a10", "a2", "a1", "b", "a02"];
        items.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(items, ["a02", "a1", "a2", "a10", "b"]);
    }
}
