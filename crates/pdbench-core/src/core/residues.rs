use phf::{Map, phf_map};

/// Column order of every prediction matrix row.
pub const ALPHABET: [char; 20] = [
    'A', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V',
    'W', 'Y',
];

/// Placeholder for any residue outside the 20 standard amino acids.
pub const UNCOMMON: char = 'X';

static THREE_TO_ONE: Map<&'static str, char> = phf_map! {
    "ALA" => 'A', "CYS" => 'C', "ASP" => 'D', "GLU" => 'E', "PHE" => 'F',
    "GLY" => 'G', "HIS" => 'H', "ILE" => 'I', "LYS" => 'K', "LEU" => 'L',
    "MET" => 'M', "ASN" => 'N', "PRO" => 'P', "GLN" => 'Q', "ARG" => 'R',
    "SER" => 'S', "THR" => 'T', "VAL" => 'V', "TRP" => 'W', "TYR" => 'Y',
    // Protonation-state aliases of histidine.
    "HSE" => 'H', "HSD" => 'H', "HSP" => 'H', "HIE" => 'H', "HID" => 'H', "HIP" => 'H',
};

/// Maps a three-letter residue name to its one-letter code, or [`UNCOMMON`].
pub fn one_letter(residue_name: &str) -> char {
    THREE_TO_ONE
        .get(residue_name.trim().to_ascii_uppercase().as_str())
        .copied()
        .unwrap_or(UNCOMMON)
}

pub fn alphabet_index(code: char) -> Option<usize> {
    ALPHABET.iter().position(|&c| c == code.to_ascii_uppercase())
}

pub fn is_standard(code: char) -> bool {
    alphabet_index(code).is_some()
}
