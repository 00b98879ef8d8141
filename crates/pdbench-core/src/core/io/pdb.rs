use crate::core::geometry::BackboneAtoms;
use crate::core::residues::one_letter;
use nalgebra::Point3;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Chain '{0}' not found in structure")]
    MissingChain(char),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Line is too short for ATOM record (must be at least 54 chars)")]
    LineTooShort,
}

/// Residue key used to address a residue across files: sequence number and insertion code.
pub type ResidueKey = (isize, char);

#[derive(Debug, Clone, PartialEq)]
pub struct PdbResidue {
    pub number: isize,
    pub insertion_code: char,
    pub name: String,
    pub code: char,
    pub backbone: BackboneAtoms,
}

impl PdbResidue {
    pub fn key(&self) -> ResidueKey {
        (self.number, self.insertion_code)
    }
}

/// The protein chains of the first model in a PDB file, plus its raw records.
#[derive(Debug, Clone, Default)]
pub struct PdbStructure {
    chains: BTreeMap<char, Vec<PdbResidue>>,
    records: Vec<String>,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_coord(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

impl PdbStructure {
    pub fn read_from(reader: &mut impl BufRead) -> Result<Self, PdbError> {
        let mut structure = Self::default();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let record_type = slice_and_trim(&line, 0, 6);

            if record_type == "ENDMDL" {
                structure.records.push(line);
                break;
            }
            if record_type != "ATOM" {
                structure.records.push(line);
                continue;
            }
            if line.len() < 54 {
                return Err(PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::LineTooShort,
                });
            }

            let alt_loc = line.get(16..17).unwrap_or(" ");
            if alt_loc != " " && alt_loc != "A" {
                structure.records.push(line);
                continue;
            }

            let atom_name = slice_and_trim(&line, 12, 16);
            let res_name = slice_and_trim(&line, 17, 20);
            let chain_id = line.get(21..22).and_then(|s| s.chars().next()).unwrap_or(' ');
            let res_seq_str = slice_and_trim(&line, 22, 26);
            let insertion_code = line.get(26..27).and_then(|s| s.chars().next()).unwrap_or(' ');

            let number: isize = res_seq_str.parse().map_err(|_| PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::InvalidInt {
                    columns: "23-26".into(),
                    value: res_seq_str.into(),
                },
            })?;
            let position = Point3::new(
                parse_coord(&line, line_num, 30, 38)?,
                parse_coord(&line, line_num, 38, 46)?,
                parse_coord(&line, line_num, 46, 54)?,
            );

            let residues = structure.chains.entry(chain_id).or_default();
            let is_new_residue = residues
                .last()
                .is_none_or(|last| last.key() != (number, insertion_code));
            if is_new_residue {
                residues.push(PdbResidue {
                    number,
                    insertion_code,
                    name: res_name.to_string(),
                    code: one_letter(res_name),
                    backbone: BackboneAtoms::default(),
                });
            }
            if let Some(residue) = residues.last_mut() {
                match atom_name {
                    "N" => residue.backbone.n = Some(position),
                    "CA" => residue.backbone.ca = Some(position),
                    "C" => residue.backbone.c = Some(position),
                    _ => {}
                }
            }
            structure.records.push(line);
        }

        Ok(structure)
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, PdbError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    pub fn chain(&self, chain_id: char) -> Result<&[PdbResidue], PdbError> {
        self.chains
            .get(&chain_id)
            .map(Vec::as_slice)
            .ok_or(PdbError::MissingChain(chain_id))
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = char> + '_ {
        self.chains.keys().copied()
    }

    /// One-letter sequence of a chain, uncommon residues as `X`.
    pub fn sequence(&self, chain_id: char) -> Result<String, PdbError> {
        Ok(self.chain(chain_id)?.iter().map(|r| r.code).collect())
    }

    /// Renders the structure's records with each ATOM B-factor replaced by the value of
    /// its residue in `values`, keyed by chain letter and residue key. Atoms of residues
    /// without a value get 0.
    pub fn render_with_bfactors(&self, values: &HashMap<(char, ResidueKey), f64>) -> String {
        let mut out = String::new();
        for record in &self.records {
            if slice_and_trim(record, 0, 6) != "ATOM" {
                out.push_str(record);
                out.push('\n');
                continue;
            }
            let chain = record.get(21..22).and_then(|s| s.chars().next()).unwrap_or(' ');
            let number: Option<isize> = slice_and_trim(record, 22, 26).parse().ok();
            let insertion = record.get(26..27).and_then(|s| s.chars().next()).unwrap_or(' ');
            let value = number
                .and_then(|n| values.get(&(chain, (n, insertion))))
                .copied()
                .unwrap_or(0.0);
            let head = format!("{:<60}", record.get(..60).unwrap_or(record));
            let tail = record.get(66..).unwrap_or("");
            out.push_str(&format!("{}{:6.2}{}\n", head, value, tail));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
HEADER    TEST STRUCTURE
ATOM      1  N   MET A   1      11.104   6.134  -6.504  1.00  0.00           N
ATOM      2  CA  MET A   1      11.639   6.071  -5.147  1.00  0.00           C
ATOM      3  C   MET A   1      13.149   5.856  -5.189  1.00  0.00           C
ATOM      4  N   GLY A   2      13.714   5.549  -4.021  1.00  0.00           N
ATOM      5  CA  GLY A   2      15.150   5.300  -3.940  1.00  0.00           C
ATOM      6  C   GLY A   2      15.500   3.850  -3.600  1.00  0.00           C
ATOM      7  N   MSE B   5       1.000   2.000   3.000  1.00  0.00           N
HETATM    8  O   HOH B 101       5.000   5.000   5.000  1.00  0.00           O
END
";

    fn parse(text: &str) -> PdbStructure {
        PdbStructure::read_from(&mut Cursor::new(text)).unwrap()
    }

    #[test]
    fn reads_sequence_of_each_chain() {
        let structure = parse(SAMPLE);
        assert_eq!(structure.sequence('A').unwrap(), "MG");
        assert_eq!(structure.sequence('B').unwrap(), "X");
        assert_eq!(structure.chain_ids().collect::<Vec<_>>(), vec!['A', 'B']);
    }

    #[test]
    fn collects_backbone_atoms_per_residue() {
        let structure = parse(SAMPLE);
        let residues = structure.chain('A').unwrap();
        assert_eq!(residues[0].number, 1);
        assert!(residues[0].backbone.n.is_some());
        assert!(residues[1].backbone.c.is_some());
    }

    #[test]
    fn missing_chain_is_reported() {
        let structure = parse(SAMPLE);
        assert!(matches!(structure.chain('Z'), Err(PdbError::MissingChain('Z'))));
    }

    #[test]
    fn stops_after_first_model() {
        let text = "\
MODEL        1
ATOM      1  CA  ALA A   1       0.000   0.000   0.000  1.00  0.00           C
ENDMDL
MODEL        2
ATOM      1  CA  TRP A   1       0.000   0.000   0.000  1.00  0.00           C
ENDMDL
";
        assert_eq!(parse(text).sequence('A').unwrap(), "A");
    }

    #[test]
    fn ignores_secondary_alternate_locations() {
        let text = "\
ATOM      1  CA AALA A   1       0.000   0.000   0.000  0.50  0.00           C
ATOM      2  CA BALA A   1       0.100   0.000   0.000  0.50  0.00           C
";
        assert_eq!(parse(text).chain('A').unwrap().len(), 1);
    }

    #[test]
    fn invalid_coordinate_is_a_parse_error() {
        let text = "ATOM      1  CA  ALA A   1       0.000   abcde   0.000  1.00  0.00           C\n";
        let result = PdbStructure::read_from(&mut Cursor::new(text));
        assert!(matches!(
            result,
            Err(PdbError::Parse {
                line: 1,
                kind: PdbParseErrorKind::InvalidFloat { .. }
            })
        ));
    }

    #[test]
    fn render_with_bfactors_rewrites_matching_residues_only() {
        let structure = parse(SAMPLE);
        let mut values = HashMap::new();
        values.insert(('A', (1, ' ')), 1.0);
        values.insert(('C', (1, ' ')), 0.5);
        let rendered = structure.render_with_bfactors(&values);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "HEADER    TEST STRUCTURE");
        assert_eq!(&lines[1][60..66], "  1.00");
        assert_eq!(&lines[4][60..66], "  0.00");
        assert_eq!(&lines[7][60..66], "  0.00");
        assert!(lines[1].ends_with("N"));
    }
}
