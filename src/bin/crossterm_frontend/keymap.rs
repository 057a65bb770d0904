/// # Keymap
/// Chip-8 input is generated with a hexadecimal keypad.
///
/// The COSMAC VIP layout is mapped to the left 4 alphanumeric columns.
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  ->  |Q|W|E|R|
/// |7|8|9|E|  ->  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
pub fn keymap(c: char) -> Option<u8> {
    match c.to_ascii_lowercase() {
        'x' => Some(0x0),
        '1' => Some(0x1),
        '2' => Some(0x2),
        '3' => Some(0x3),
        'q' => Some(0x4),
        'w' => Some(0x5),
        'e' => Some(0x6),
        'a' => Some(0x7),
        's' => Some(0x8),
        'd' => Some(0x9),
        'z' => Some(0xA),
        'c' => Some(0xB),
        '4' => Some(0xC),
        'r' => Some(0xD),
        'f' => Some(0xE),
        'v' => Some(0xF),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_is_mapped_once() {
        let mut seen = [false; 16];
        for c in "1234qwerasdfzxcv".chars() {
            let key = keymap(c).unwrap() as usize;
            assert!(!seen[key], "{} maps to a key twice", c);
            seen[key] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn layout_matches_the_keypad() {
        assert_eq!(keymap('4'), Some(0xC));
        assert_eq!(keymap('X'), Some(0x0));
        assert_eq!(keymap('v'), Some(0xF));
        assert_eq!(keymap('5'), None);
    }
}
