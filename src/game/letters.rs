/// Icelandic letter distribution as `(letter, copies in the bag, point
/// value)`. Accented letters are distinct tiles with their own counts.
pub const LETTER_DISTRIBUTION: [(char, u8, u8); 32] = [
    ('A', 10, 1),
    ('Á', 3, 3),
    ('B', 1, 5),
    ('D', 4, 2),
    ('Ð', 2, 4),
    ('E', 9, 1),
    ('É', 1, 6),
    ('F', 3, 3),
    ('G', 3, 3),
    ('H', 3, 3),
    ('I', 7, 1),
    ('Í', 2, 4),
    ('J', 1, 8),
    ('K', 3, 3),
    ('L', 4, 2),
    ('M', 2, 4),
    ('N', 8, 1),
    ('O', 2, 4),
    ('Ó', 2, 4),
    ('P', 1, 8),
    ('R', 6, 1),
    ('S', 5, 1),
    ('T', 5, 1),
    ('U', 3, 3),
    ('Ú', 1, 6),
    ('V', 2, 4),
    ('X', 1, 10),
    ('Y', 2, 4),
    ('Ý', 1, 6),
    ('Þ', 1, 8),
    ('Æ', 1, 8),
    ('Ö', 1, 8),
];

/// Number of blank tiles in the bag. Blanks carry no letter and score zero.
pub const BLANK_COUNT: u8 = 2;

/// Total number of tiles in a fresh bag, derived from the distribution.
pub const TILE_COUNT: usize = {
    let mut total = BLANK_COUNT as usize;
    let mut i = 0;
    while i < LETTER_DISTRIBUTION.len() {
        total += LETTER_DISTRIBUTION[i].1 as usize;
        i += 1;
    }
    total
};
