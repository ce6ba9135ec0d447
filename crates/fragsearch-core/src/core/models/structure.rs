use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StructureError {
    #[error("Line notation is empty")]
    Empty,
    #[error("Unexpected character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },
    #[error("Unbalanced '{open}{close}' pair")]
    Unbalanced { open: char, close: char },
}

/// A chemical structure, held as its serialized line notation.
///
/// Parsing only performs a syntactic guard: the notation must be non-empty, contain no
/// whitespace or control characters, and have balanced branch `()` and atom `[]` brackets.
/// This is what makes it safe to write a structure as exactly one line of a file; it says
/// nothing about chemical validity, which is owned by the decomposition collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Structure {
    notation: String,
}

impl Structure {
    pub fn parse(notation: &str) -> Result<Self, StructureError> {
        if notation.is_empty() {
            return Err(StructureError::Empty);
        }

        let mut branch_depth: usize = 0;
        let mut in_atom = false;

        for (position, character) in notation.chars().enumerate() {
            if character.is_whitespace() || character.is_control() {
                return Err(StructureError::InvalidCharacter {
                    character,
                    position,
                });
            }
            match character {
                '[' if in_atom => {
                    return Err(StructureError::Unbalanced {
                        open: '[',
                        close: ']',
                    });
                }
                '[' => in_atom = true,
                ']' if !in_atom => {
                    return Err(StructureError::Unbalanced {
                        open: '[',
                        close: ']',
                    });
                }
                ']' => in_atom = false,
                '(' => branch_depth += 1,
                ')' => {
                    branch_depth = branch_depth.checked_sub(1).ok_or(
                        StructureError::Unbalanced {
                            open: '(',
                            close: ')',
                        },
                    )?;
                }
                _ => {}
            }
        }

        if in_atom {
            return Err(StructureError::Unbalanced {
                open: '[',
                close: ']',
            });
        }
        if branch_depth != 0 {
            return Err(StructureError::Unbalanced {
                open: '(',
                close: ')',
            });
        }

        Ok(Self {
            notation: notation.to_string(),
        })
    }

    pub fn notation(&self) -> &str {
        &self.notation
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation)
    }
}
